//! Test app state builder for HTTP-level testing.
//!
//! `TestAppStateBuilder` wires an `AppState` to in-memory repositories and
//! scripted providers, and hands the doubles back for assertions.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use chrono::Duration;
use secrecy::SecretString;
use url::Url;
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    application::{
        jwt,
        use_cases::{
            billing::{BillingUseCases, CheckoutUrls},
            thumbnail::{ImageDefaults, ThumbnailUseCases},
        },
    },
    infra::config::AppConfig,
    test_utils::{
        InMemoryObjectStorage, InMemoryPaymentLedgerRepo, InMemoryThumbnailRepo,
        InMemoryUserBillingRepo, MockBillingProvider, ScriptedImageGenerator,
        StaticImageDownloader, test_catalog,
    },
};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";
pub const TEST_WEBHOOK_SECRET: &str = "test-polar-webhook-secret";

fn secret(value: &str) -> SecretString {
    SecretString::new(value.to_string().into())
}

/// Config with fixed secrets and no real endpoints.
pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: secret(TEST_JWT_SECRET),
        app_origin: Url::parse("http://localhost:3000").unwrap(),
        cors_origin: HeaderValue::from_static("http://localhost:3000"),
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        database_url: "postgres://unused".to_string(),
        polar_api_base: "http://polar.invalid/v1".to_string(),
        polar_access_token: secret("polar-token"),
        polar_webhook_secret: secret(TEST_WEBHOOK_SECRET),
        checkout_success_url: "http://localhost:3000/Dashboard".to_string(),
        checkout_return_url: "http://localhost:3000/Dashboard".to_string(),
        plan_catalog: test_catalog(),
        openai_api_base: "http://openai.invalid/v1".to_string(),
        openai_api_key: secret("openai-key"),
        image_defaults: ImageDefaults::default(),
        supabase_url: Url::parse("http://storage.invalid").unwrap(),
        supabase_service_key: secret("service-key"),
        storage_bucket: "images".to_string(),
    }
}

/// Signed session token for `user_id`, as the auth service would issue it.
pub fn test_access_token(user_id: Uuid) -> String {
    jwt::issue(user_id, &secret(TEST_JWT_SECRET), Duration::hours(1)).unwrap()
}

/// App state plus handles to every double behind it.
pub struct TestApp {
    pub app_state: AppState,
    pub ledger: Arc<InMemoryPaymentLedgerRepo>,
    pub users: Arc<InMemoryUserBillingRepo>,
    pub provider: Arc<MockBillingProvider>,
    pub thumbnails: Arc<InMemoryThumbnailRepo>,
    pub generator: Arc<ScriptedImageGenerator>,
    pub storage: Arc<InMemoryObjectStorage>,
}

#[derive(Default)]
pub struct TestAppStateBuilder {
    provider: Option<MockBillingProvider>,
    generator: Option<ScriptedImageGenerator>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_billing_provider(mut self, provider: MockBillingProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_image_generator(mut self, generator: ScriptedImageGenerator) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn build(self) -> TestApp {
        let config = test_config();

        let ledger = Arc::new(InMemoryPaymentLedgerRepo::default());
        let users = Arc::new(InMemoryUserBillingRepo::default());
        let provider = Arc::new(self.provider.unwrap_or_default());
        let thumbnails = Arc::new(InMemoryThumbnailRepo::default());
        let generator = Arc::new(self.generator.unwrap_or_default());
        let storage = Arc::new(InMemoryObjectStorage::default());

        let billing_use_cases = BillingUseCases::new(
            ledger.clone(),
            users.clone(),
            provider.clone(),
            config.plan_catalog.clone(),
            CheckoutUrls {
                success_url: Some(config.checkout_success_url.clone()),
                return_url: Some(config.checkout_return_url.clone()),
            },
        );
        let thumbnail_use_cases = ThumbnailUseCases::new(
            thumbnails.clone(),
            generator.clone(),
            Arc::new(StaticImageDownloader::default()),
            storage.clone(),
            config.image_defaults.clone(),
        );

        TestApp {
            app_state: AppState {
                config: Arc::new(config),
                billing_use_cases: Arc::new(billing_use_cases),
                thumbnail_use_cases: Arc::new(thumbnail_use_cases),
            },
            ledger,
            users,
            provider,
            thumbnails,
            generator,
            storage,
        }
    }
}
