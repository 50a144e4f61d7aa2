pub mod billing;
pub mod billing_webhooks;
pub mod thumbnails;

use axum::{
    Router,
    http::{HeaderMap, header::AUTHORIZATION},
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::jwt,
};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/webhooks", billing_webhooks::router())
        .nest("/billing", billing::router())
        .nest("/thumbnails", thumbnails::router())
}

/// Authenticated caller, from a Bearer token or the session cookie.
pub(crate) fn current_user_id(
    app_state: &AppState,
    headers: &HeaderMap,
    jar: &CookieJar,
) -> AppResult<Uuid> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let token = bearer
        .or_else(|| jar.get(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_string()))
        .ok_or(AppError::Unauthenticated)?;

    jwt::verify_user_id(&token, &app_state.config.jwt_secret)
}
