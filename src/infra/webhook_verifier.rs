//! Standard Webhooks signature verification for billing-provider deliveries.
//!
//! Each delivery carries `webhook-id`, `webhook-timestamp` and `webhook-signature`.
//! The signature is `v1,<base64 HMAC-SHA256>` over `"{id}.{timestamp}.{body}"`;
//! several space-separated signatures may be present during secret rotation.

use axum::http::HeaderMap;
use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::app_error::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

/// Maximum clock skew accepted between the provider and us.
pub const TIMESTAMP_TOLERANCE_SECS: i64 = 5 * 60;

const SECRET_PREFIX: &str = "whsec_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookHeaders {
    pub id: String,
    pub timestamp: String,
    pub signature: String,
}

impl WebhookHeaders {
    pub fn from_header_map(headers: &HeaderMap) -> AppResult<Self> {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .ok_or(AppError::InvalidSignature)
        };
        Ok(Self {
            id: get("webhook-id")?,
            timestamp: get("webhook-timestamp")?,
            signature: get("webhook-signature")?,
        })
    }
}

/// HMAC key for a configured secret. `whsec_`-prefixed secrets are base64; any
/// other secret is used as raw bytes.
fn signing_key(secret: &str) -> AppResult<Vec<u8>> {
    match secret.strip_prefix(SECRET_PREFIX) {
        Some(encoded) => STANDARD
            .decode(encoded)
            .map_err(|_| AppError::Internal("Webhook secret is not valid base64".into())),
        None => Ok(secret.as_bytes().to_vec()),
    }
}

/// Base64 signature (without the `v1,` prefix) of one delivery.
pub fn sign_webhook_payload(
    secret: &str,
    msg_id: &str,
    timestamp: i64,
    body: &str,
) -> AppResult<String> {
    let key = signing_key(secret)?;
    let mut mac =
        HmacSha256::new_from_slice(&key).map_err(|_| AppError::Internal("HMAC error".into()))?;
    mac.update(format!("{msg_id}.{timestamp}.{body}").as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

pub fn verify_webhook(
    headers: &WebhookHeaders,
    body: &str,
    secret: &SecretString,
    now: i64,
) -> AppResult<()> {
    let timestamp: i64 = headers
        .timestamp
        .parse()
        .map_err(|_| AppError::InvalidSignature)?;
    let outside_tolerance = now
        .checked_sub(timestamp)
        .map(i64::unsigned_abs)
        .is_none_or(|skew| skew > TIMESTAMP_TOLERANCE_SECS.unsigned_abs());
    if outside_tolerance {
        tracing::warn!(timestamp, now, "Webhook timestamp outside tolerance");
        return Err(AppError::InvalidSignature);
    }

    let expected = sign_webhook_payload(secret.expose_secret(), &headers.id, timestamp, body)?;

    let matched = headers
        .signature
        .split_whitespace()
        .filter_map(|sig| sig.strip_prefix("v1,"))
        .any(|sig| constant_time_compare(sig, &expected));

    if matched {
        Ok(())
    } else {
        Err(AppError::InvalidSignature)
    }
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
