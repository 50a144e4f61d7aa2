use crate::{
    adapters::http::app_state::AppState,
    application::use_cases::{
        billing::{BillingUseCases, CheckoutUrls, PaymentLedgerRepo, UserBillingRepo},
        thumbnail::{ThumbnailRepo, ThumbnailUseCases},
    },
    infra::{
        config::AppConfig, image_downloader::HttpImageDownloader,
        openai_image_client::OpenAiImageClient, polar_client::PolarClient,
        postgres_persistence, supabase_storage::SupabaseStorage,
    },
};
use std::fs::File;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let postgres_arc = Arc::new(postgres_persistence(&config.database_url).await?);

    let ledger_repo_arc = postgres_arc.clone() as Arc<dyn PaymentLedgerRepo>;
    let user_billing_repo_arc = postgres_arc.clone() as Arc<dyn UserBillingRepo>;
    let thumbnail_repo_arc = postgres_arc.clone() as Arc<dyn ThumbnailRepo>;

    let polar = Arc::new(PolarClient::new(
        config.polar_api_base.clone(),
        config.polar_access_token.clone(),
    ));

    let billing_use_cases = BillingUseCases::new(
        ledger_repo_arc,
        user_billing_repo_arc,
        polar,
        config.plan_catalog.clone(),
        CheckoutUrls {
            success_url: Some(config.checkout_success_url.clone()),
            return_url: Some(config.checkout_return_url.clone()),
        },
    );

    let thumbnail_use_cases = ThumbnailUseCases::new(
        thumbnail_repo_arc,
        Arc::new(OpenAiImageClient::new(
            config.openai_api_base.clone(),
            config.openai_api_key.clone(),
        )),
        Arc::new(HttpImageDownloader::new()),
        Arc::new(SupabaseStorage::new(
            &config.supabase_url,
            config.storage_bucket.clone(),
            config.supabase_service_key.clone(),
        )),
        config.image_defaults.clone(),
    );

    Ok(AppState {
        config: Arc::new(config),
        billing_use_cases: Arc::new(billing_use_cases),
        thumbnail_use_cases: Arc::new(thumbnail_use_cases),
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "thumbsmith=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .pretty();

    // File (structured JSON logs)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
