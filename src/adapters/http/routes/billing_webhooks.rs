//! Billing-provider webhook endpoint.

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::helpers::payload_fields::{customer_state_from_payload, order_from_payload},
    infra::webhook_verifier::{WebhookHeaders, verify_webhook},
};

const ORDER_PAID: &str = "order.paid";
const CUSTOMER_STATE_CHANGED: &str = "customer.state_changed";

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    data: Value,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/polar", post(handle_polar_webhook))
}

/// POST /api/webhooks/polar
///
/// Verified deliveries are always acknowledged: the billing engine reports
/// failures through logs, so a provider retry would not change the outcome.
async fn handle_polar_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> AppResult<StatusCode> {
    let webhook_headers = WebhookHeaders::from_header_map(&headers)?;
    verify_webhook(
        &webhook_headers,
        &body,
        &app_state.config.polar_webhook_secret,
        Utc::now().timestamp(),
    )?;

    let event: WebhookEvent = serde_json::from_str(&body)
        .map_err(|e| AppError::InvalidInput(format!("Invalid webhook payload: {e}")))?;

    info!(
        webhook_id = %webhook_headers.id,
        event_type = %event.event_type,
        "Billing webhook received"
    );

    match event.event_type.as_str() {
        ORDER_PAID => {
            match order_from_payload(&event.data) {
                Some(order) => {
                    let outcome = app_state.billing_use_cases.apply_paid_order(&order).await;
                    info!(order_id = %order.id, ?outcome, "Paid order processed");
                }
                None => warn!(webhook_id = %webhook_headers.id, "Paid order event without an order id"),
            }
            Ok(StatusCode::OK)
        }
        CUSTOMER_STATE_CHANGED => {
            let state = customer_state_from_payload(&event.data);
            app_state
                .billing_use_cases
                .apply_customer_state_changed(&state)
                .await;
            Ok(StatusCode::OK)
        }
        other => {
            info!(event_type = %other, "Ignoring billing webhook event");
            Ok(StatusCode::ACCEPTED)
        }
    }
}
