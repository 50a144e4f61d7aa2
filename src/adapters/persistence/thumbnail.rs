use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::thumbnail::{NewThumbnail, ThumbnailProfile, ThumbnailRepo},
};

const THUMBNAIL_COLUMNS: &str = "id, user_id, prompt, image_url, storage_path, created_at";

#[async_trait]
impl ThumbnailRepo for PostgresPersistence {
    async fn insert(&self, input: &NewThumbnail) -> AppResult<ThumbnailProfile> {
        sqlx::query_as::<_, ThumbnailProfile>(&format!(
            "INSERT INTO thumbnails (id, user_id, prompt, image_url, storage_path)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {THUMBNAIL_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(input.user_id)
        .bind(&input.prompt)
        .bind(&input.image_url)
        .bind(&input.storage_path)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<ThumbnailProfile>> {
        sqlx::query_as::<_, ThumbnailProfile>(&format!(
            "SELECT {THUMBNAIL_COLUMNS} FROM thumbnails
             WHERE user_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)
    }
}
