use async_trait::async_trait;
use thiserror::Error;

use crate::app_error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageGenerationOptions {
    pub prompt: String,
    pub model: String,
    pub size: String,
    pub quality: Option<String>,
}

/// Generated image payload: either a short-lived URL or inline bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePayload {
    Url(String),
    Inline { bytes: Vec<u8>, mime_type: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub payload: ImagePayload,
    /// Prompt as rewritten by the provider, when it reports one.
    pub revised_prompt: Option<String>,
}

/// Classified image provider failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImageProviderError {
    #[error("rejected by safety system: {0}")]
    SafetyRejected(String),

    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("{0}")]
    Other(String),
}

#[async_trait]
pub trait ImageGeneratorPort: Send + Sync {
    async fn generate(
        &self,
        options: &ImageGenerationOptions,
    ) -> Result<GeneratedImage, ImageProviderError>;
}

/// Fetches a generated image by URL. Non-2xx responses are errors.
#[async_trait]
pub trait ImageDownloaderPort: Send + Sync {
    async fn download(&self, url: &str) -> AppResult<Vec<u8>>;
}
