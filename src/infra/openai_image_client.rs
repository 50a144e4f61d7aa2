//! OpenAI Images API client.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{
    application::ports::image_generation::{
        GeneratedImage, ImageGenerationOptions, ImageGeneratorPort, ImagePayload,
        ImageProviderError,
    },
    infra::http_client::{IMAGE_GENERATION_TIMEOUT, build_client_with_timeout},
};

const SAFETY_CODES: &[&str] = &["content_policy_violation"];
const SAFETY_PHRASES: &[&str] = &["safety system", "content policy"];
const QUOTA_CODES: &[&str] = &["insufficient_quota", "billing_hard_limit_reached"];

pub struct OpenAiImageClient {
    client: Client,
    api_base: String,
    api_key: SecretString,
}

impl OpenAiImageClient {
    pub fn new(api_base: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            client: build_client_with_timeout(IMAGE_GENERATION_TIMEOUT),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl ImageGeneratorPort for OpenAiImageClient {
    async fn generate(
        &self,
        options: &ImageGenerationOptions,
    ) -> Result<GeneratedImage, ImageProviderError> {
        let request = ImagesRequest {
            model: &options.model,
            prompt: &options.prompt,
            size: &options.size,
            quality: options.quality.as_deref(),
            n: 1,
        };

        tracing::debug!(model = %options.model, size = %options.size, "Requesting image generation");

        let response = self
            .client
            .post(format!("{}/images/generations", self.api_base))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| ImageProviderError::Other(format!("OpenAI request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ImageProviderError::Other(format!("Failed to read OpenAI response: {}", e)))?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "OpenAI API error");
            let detail = serde_json::from_str::<OpenAiErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or_default();
            return Err(classify_error(status, &detail, &body));
        }

        let parsed: ImagesResponse = serde_json::from_str(&body).map_err(|e| {
            ImageProviderError::Other(format!("Failed to parse OpenAI response: {}", e))
        })?;
        image_from_response(parsed)
    }
}

/// Map an OpenAI error to the pipeline's failure classes.
pub fn classify_error(status: StatusCode, detail: &OpenAiError, body: &str) -> ImageProviderError {
    let message = detail
        .message
        .clone()
        .unwrap_or_else(|| format!("OpenAI API error: {} - {}", status, body));
    let lower = message.to_lowercase();
    let code = detail.code.as_deref().unwrap_or_default();
    let error_type = detail.error_type.as_deref().unwrap_or_default();

    if SAFETY_CODES.contains(&code) || SAFETY_PHRASES.iter().any(|p| lower.contains(p)) {
        return ImageProviderError::SafetyRejected(message);
    }
    if QUOTA_CODES.contains(&code) || QUOTA_CODES.contains(&error_type) || lower.contains("quota") {
        return ImageProviderError::QuotaExceeded(message);
    }
    ImageProviderError::Other(message)
}

fn image_from_response(response: ImagesResponse) -> Result<GeneratedImage, ImageProviderError> {
    let data = response
        .data
        .into_iter()
        .next()
        .ok_or_else(|| ImageProviderError::Other("OpenAI returned no image".into()))?;

    let payload = match (data.url, data.b64_json) {
        (Some(url), _) if !url.is_empty() => ImagePayload::Url(url),
        (_, Some(encoded)) => ImagePayload::Inline {
            bytes: STANDARD.decode(encoded.as_bytes()).map_err(|e| {
                ImageProviderError::Other(format!("Invalid base64 image data: {}", e))
            })?,
            mime_type: "image/png".to_string(),
        },
        _ => {
            return Err(ImageProviderError::Other(
                "OpenAI response has neither url nor b64_json".into(),
            ));
        }
    };

    Ok(GeneratedImage {
        payload,
        revised_prompt: data.revised_prompt.filter(|p| !p.is_empty()),
    })
}

// ============================================================================
// OpenAI Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ImagesRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    quality: Option<&'a str>,
    n: u8,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
    b64_json: Option<String>,
    revised_prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiError,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenAiError {
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub code: Option<String>,
}
