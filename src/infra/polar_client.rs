//! Polar HTTP API client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::{
    app_error::{AppError, AppResult},
    application::helpers::payload_fields::{PayloadField, order_from_payload, pick_str},
    application::ports::billing_provider::{
        BillingProviderPort, CheckoutRequest, CheckoutSession, CustomerId,
    },
    domain::entities::order::Order,
    infra::http_client::build_client,
};

/// Most recent orders fetched per sync.
pub const ORDER_PAGE_LIMIT: u32 = 100;

pub struct PolarClient {
    client: Client,
    api_base: String,
    access_token: SecretString,
}

impl PolarClient {
    pub fn new(api_base: impl Into<String>, access_token: SecretString) -> Self {
        Self {
            client: build_client(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            access_token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    async fn read_response(response: reqwest::Response) -> AppResult<(StatusCode, String)> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to read Polar response: {}", e)))?;
        Ok((status, body))
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> AppResult<T> {
        let (status, body) = Self::read_response(response).await?;
        parse_response(status, &body)
    }
}

/// `/customers/{id}` under `api_base`, with the id percent-encoded as one segment.
pub fn customer_url(api_base: &str, customer_id: &str) -> AppResult<Url> {
    let mut url = Url::parse(api_base)
        .map_err(|e| AppError::Internal(format!("Invalid Polar API base: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| AppError::Internal("Polar API base cannot carry a path".into()))?
        .pop_if_empty()
        .push("customers")
        .push(customer_id);
    Ok(url)
}

/// Decode a Polar response body, turning non-2xx statuses into provider errors.
pub fn parse_response<T: for<'de> Deserialize<'de>>(status: StatusCode, body: &str) -> AppResult<T> {
    if !status.is_success() {
        tracing::error!(status = %status, body = %body, "Polar API error");

        if let Ok(error) = serde_json::from_str::<PolarErrorResponse>(body) {
            if let Some(detail) = error.detail_message() {
                return Err(AppError::Provider(format!("Polar error ({}): {}", status, detail)));
            }
        }

        return Err(AppError::Provider(format!(
            "Polar API error: {} - {}",
            status, body
        )));
    }

    serde_json::from_str(body).map_err(|e| {
        tracing::error!(body = %body, error = %e, "Failed to parse Polar response");
        AppError::Provider(format!("Failed to parse Polar response: {}", e))
    })
}

/// A missing customer is `Ok(None)`; any other failure is an error.
pub fn customer_external_id_from_response(
    status: StatusCode,
    body: &str,
) -> AppResult<Option<String>> {
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    let customer: Value = parse_response(status, body)?;
    Ok(pick_str(&customer, PayloadField::ExternalId).map(str::to_string))
}

#[async_trait]
impl BillingProviderPort for PolarClient {
    async fn create_checkout(&self, request: &CheckoutRequest) -> AppResult<CheckoutSession> {
        let body = PolarCheckoutCreate {
            products: vec![request.product_id.as_str()],
            external_customer_id: &request.external_customer_id,
            success_url: request.success_url.as_deref(),
            return_url: request.return_url.as_deref(),
        };

        let response = self
            .client
            .post(self.url("/checkouts"))
            .bearer_auth(self.access_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Polar request failed: {}", e)))?;

        let checkout: PolarCheckout = self.handle_response(response).await?;
        tracing::info!(checkout_id = %checkout.id, "Polar checkout created");

        Ok(CheckoutSession {
            id: checkout.id,
            url: checkout.url,
        })
    }

    async fn list_orders(&self, external_customer_id: &str) -> AppResult<Vec<Order>> {
        let response = self
            .client
            .get(self.url("/orders"))
            .bearer_auth(self.access_token.expose_secret())
            .query(&[
                ("external_customer_id", external_customer_id.to_string()),
                ("limit", ORDER_PAGE_LIMIT.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Polar request failed: {}", e)))?;

        let page: PolarListResource = self.handle_response(response).await?;
        Ok(page.items.iter().filter_map(order_from_payload).collect())
    }

    async fn get_customer_external_id(
        &self,
        customer_id: &CustomerId,
    ) -> AppResult<Option<String>> {
        let response = self
            .client
            .get(customer_url(&self.api_base, customer_id.as_str())?)
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Polar request failed: {}", e)))?;

        let (status, body) = Self::read_response(response).await?;
        customer_external_id_from_response(status, &body)
    }
}

// ============================================================================
// Polar Types
// ============================================================================

#[derive(Debug, Serialize)]
struct PolarCheckoutCreate<'a> {
    products: Vec<&'a str>,
    external_customer_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    success_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    return_url: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PolarCheckout {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PolarListResource {
    #[serde(default)]
    items: Vec<Value>,
}

/// Polar reports errors either as a plain `detail` string or as a list of
/// validation errors.
#[derive(Debug, Deserialize)]
struct PolarErrorResponse {
    detail: Option<Value>,
}

impl PolarErrorResponse {
    fn detail_message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                (!messages.is_empty()).then(|| messages.join("; "))
            }
            _ => None,
        }
    }
}
