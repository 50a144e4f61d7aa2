use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use url::Url;

use crate::application::use_cases::{
    plan_catalog::{
        CreditGrants, DEFAULT_PRO_CREDITS, DEFAULT_ULTRA_CREDITS, DEFAULT_UPGRADE_DELTA_CREDITS,
        PlanCatalog,
    },
    thumbnail::ImageDefaults,
};

pub const DEFAULT_POLAR_API_BASE: &str = "https://api.polar.sh/v1";
pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";

pub struct AppConfig {
    pub jwt_secret: SecretString,
    pub app_origin: Url,
    pub cors_origin: HeaderValue,
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub polar_api_base: String,
    /// Organization access token. Surrounding whitespace is stripped on load.
    pub polar_access_token: SecretString,
    pub polar_webhook_secret: SecretString,
    pub checkout_success_url: String,
    pub checkout_return_url: String,
    pub plan_catalog: PlanCatalog,
    pub openai_api_base: String,
    pub openai_api_key: SecretString,
    pub image_defaults: ImageDefaults,
    pub supabase_url: Url,
    pub supabase_service_key: SecretString,
    pub storage_bucket: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let jwt_secret: SecretString = SecretString::new(get_env::<String>("JWT_SECRET").into());

        let app_origin: Url = get_env("APP_ORIGIN");
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");
        let bind_addr: SocketAddr =
            get_env_default("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3001)));
        let database_url: String = get_env("DATABASE_URL");

        let polar_api_base: String =
            get_env_default("POLAR_API_BASE", DEFAULT_POLAR_API_BASE.to_string());
        let polar_access_token = SecretString::new(
            get_env::<String>("POLAR_ACCESS_TOKEN")
                .trim()
                .to_string()
                .into(),
        );
        let polar_webhook_secret =
            SecretString::new(get_env::<String>("POLAR_WEBHOOK_SECRET").into());

        let dashboard_url = format!("{}/Dashboard", app_origin.as_str().trim_end_matches('/'));
        let checkout_success_url: String =
            get_env_default("POLAR_SUCCESS_URL", dashboard_url.clone());
        let checkout_return_url: String = get_env_default("POLAR_RETURN_URL", dashboard_url);

        let plan_catalog = PlanCatalog::new(
            get_env::<String>("POLAR_PRODUCT_PRO_ID"),
            get_env::<String>("POLAR_PRODUCT_ULTRA_ID"),
            CreditGrants {
                pro: get_env_default("CREDITS_PRO", DEFAULT_PRO_CREDITS),
                ultra: get_env_default("CREDITS_ULTRA", DEFAULT_ULTRA_CREDITS),
                upgrade_delta: get_env_default(
                    "CREDITS_UPGRADE_DELTA",
                    DEFAULT_UPGRADE_DELTA_CREDITS,
                ),
            },
        );

        let openai_api_base: String =
            get_env_default("OPENAI_API_BASE", DEFAULT_OPENAI_API_BASE.to_string());
        let openai_api_key = SecretString::new(get_env::<String>("OPENAI_API_KEY").into());
        let defaults = ImageDefaults::default();
        let image_defaults = ImageDefaults {
            model: get_env_default("IMAGE_MODEL", defaults.model),
            size: get_env_default("IMAGE_SIZE", defaults.size),
        };

        let supabase_url: Url = get_env("SUPABASE_URL");
        let supabase_service_key =
            SecretString::new(get_env::<String>("SUPABASE_SERVICE_ROLE_KEY").into());
        let storage_bucket: String = get_env_default("STORAGE_BUCKET", "images".to_string());

        Self {
            jwt_secret,
            app_origin,
            cors_origin,
            bind_addr,
            database_url,
            polar_api_base,
            polar_access_token,
            polar_webhook_secret,
            checkout_success_url,
            checkout_return_url,
            plan_catalog,
            openai_api_base,
            openai_api_key,
            image_defaults,
            supabase_url,
            supabase_service_key,
            storage_bucket,
        }
    }
}
