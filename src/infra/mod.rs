use crate::{adapters::persistence::PostgresPersistence, infra::db::init_db};

pub mod app;
pub mod config;
pub mod db;
pub mod http_client;
pub mod image_downloader;
pub mod openai_image_client;
pub mod polar_client;
pub mod setup;
pub mod supabase_storage;
pub mod webhook_verifier;

pub async fn postgres_persistence(database_url: &str) -> anyhow::Result<PostgresPersistence> {
    let pool = init_db(database_url).await?;
    let persistence = PostgresPersistence::new(pool);
    Ok(persistence)
}
