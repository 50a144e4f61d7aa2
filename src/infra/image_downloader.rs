use async_trait::async_trait;
use reqwest::Client;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::image_generation::ImageDownloaderPort,
    infra::http_client::build_client,
};

/// Downloads provider-hosted images. No retries: provider URLs are short-lived.
pub struct HttpImageDownloader {
    client: Client,
}

impl HttpImageDownloader {
    pub fn new() -> Self {
        Self {
            client: build_client(),
        }
    }
}

impl Default for HttpImageDownloader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageDownloaderPort for HttpImageDownloader {
    async fn download(&self, url: &str) -> AppResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Image download failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = %status, "Image download returned non-success status");
            return Err(AppError::Provider(format!(
                "Image download failed with status {}",
                status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to read image body: {}", e)))?;
        Ok(bytes.to_vec())
    }
}
