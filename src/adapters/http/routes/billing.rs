//! Billing routes: checkout, order sync and the caller's billing state.

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use super::current_user_id;
use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::use_cases::billing::UserBillingProfile,
    domain::entities::plan_tier::PlanTier,
};

#[derive(Deserialize)]
struct CreateCheckoutPayload {
    #[serde(default)]
    plan: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutResponse {
    success: bool,
    checkout_url: String,
}

#[derive(Serialize)]
struct SyncResponse {
    success: bool,
    synced: usize,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(create_checkout))
        .route("/sync", post(sync_orders))
        .route("/me", get(get_billing_state))
}

/// POST /api/billing/checkout
async fn create_checkout(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(payload): Json<CreateCheckoutPayload>,
) -> AppResult<Json<CheckoutResponse>> {
    let user_id = current_user_id(&app_state, &headers, &jar)?;

    let plan: PlanTier = payload
        .plan
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidInput("A valid paid plan (pro or ultra) is required".into()))?;

    let checkout_url = app_state
        .billing_use_cases
        .create_checkout(user_id, plan)
        .await?;

    Ok(Json(CheckoutResponse {
        success: true,
        checkout_url,
    }))
}

/// POST /api/billing/sync
async fn sync_orders(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> AppResult<Json<SyncResponse>> {
    let user_id = current_user_id(&app_state, &headers, &jar)?;
    let summary = app_state.billing_use_cases.sync_user_orders(user_id).await?;
    Ok(Json(SyncResponse {
        success: true,
        synced: summary.synced,
    }))
}

/// GET /api/billing/me
async fn get_billing_state(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> AppResult<Json<UserBillingProfile>> {
    let user_id = current_user_id(&app_state, &headers, &jar)?;
    let state = app_state.billing_use_cases.get_billing_state(user_id).await?;
    Ok(Json(state))
}
