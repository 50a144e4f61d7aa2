//! Supabase Storage REST client for generated images.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::object_storage::ObjectStoragePort,
    infra::http_client::build_client,
};

pub struct SupabaseStorage {
    client: Client,
    base_url: String,
    bucket: String,
    service_key: SecretString,
}

impl SupabaseStorage {
    pub fn new(base_url: &Url, bucket: impl Into<String>, service_key: SecretString) -> Self {
        Self {
            client: build_client(),
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            service_key,
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            self.bucket,
            path.trim_start_matches('/')
        )
    }
}

/// Public URL of an object in a public bucket.
pub fn build_public_url(base: &str, bucket: &str, path: &str) -> String {
    format!(
        "{}/storage/v1/object/public/{}/{}",
        base.trim_end_matches('/'),
        bucket,
        path.trim_start_matches('/')
    )
}

/// Storage reports an existing object as 409, or as 400 with a duplicate message.
fn is_duplicate(status: StatusCode, body: &str) -> bool {
    let lower = body.to_lowercase();
    status == StatusCode::CONFLICT
        || (status == StatusCode::BAD_REQUEST
            && (lower.contains("duplicate") || lower.contains("already exists")))
}

#[async_trait]
impl ObjectStoragePort for SupabaseStorage {
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> AppResult<()> {
        let response = self
            .client
            .post(self.object_url(path))
            .bearer_auth(self.service_key.expose_secret())
            .header("apikey", self.service_key.expose_secret())
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Storage upload failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(path = %path, bucket = %self.bucket, "Object stored");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        if is_duplicate(status, &body) {
            tracing::warn!(path = %path, "Object already exists");
            return Err(AppError::Conflict);
        }

        tracing::error!(status = %status, body = %body, "Storage upload error");
        Err(AppError::Provider(format!(
            "Storage upload error: {} - {}",
            status, body
        )))
    }

    fn public_url(&self, path: &str) -> AppResult<String> {
        Ok(build_public_url(&self.base_url, &self.bucket, path))
    }
}
