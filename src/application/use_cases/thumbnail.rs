use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    app_error::{AppResult, ErrorCode},
    application::helpers::prompt::{PromptSafety, check_prompt_safety, enhance_prompt},
    application::ports::{
        image_generation::{
            GeneratedImage, ImageDownloaderPort, ImageGenerationOptions, ImageGeneratorPort,
            ImagePayload, ImageProviderError,
        },
        object_storage::ObjectStoragePort,
    },
};

const STORED_CONTENT_TYPE: &str = "image/png";

// ============================================================================
// Profile Types
// ============================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub prompt: String,
    pub image_url: String,
    pub storage_path: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewThumbnail {
    pub user_id: Uuid,
    pub prompt: String,
    pub image_url: String,
    pub storage_path: String,
}

#[derive(Debug, Clone, Default)]
pub struct GenerateThumbnailInput {
    pub user_id: Uuid,
    pub prompt: String,
    pub size: Option<String>,
    pub model: Option<String>,
    /// Reference image attached by the user (data URL or link).
    pub reference_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedThumbnail {
    pub thumbnail_id: Uuid,
    pub image_url: String,
    pub storage_path: String,
}

/// Model and size used when a request does not override them.
#[derive(Debug, Clone)]
pub struct ImageDefaults {
    pub model: String,
    pub size: String,
}

impl Default for ImageDefaults {
    fn default() -> Self {
        Self {
            model: "dall-e-3".to_string(),
            size: "1024x1024".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Prompt is required")]
    EmptyPrompt,

    #[error("Prompt contains disallowed content. Please rephrase it.")]
    UnsafePrompt,

    #[error("The image provider rejected the prompt: {0}")]
    SafetyRejected(String),

    #[error("Image provider quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Image generation failed: {0}")]
    Provider(String),

    #[error("Failed to download generated image: {0}")]
    Download(String),

    #[error("Failed to store generated image: {0}")]
    Storage(String),

    #[error("Failed to save thumbnail: {0}")]
    Record(String),
}

impl GenerationError {
    /// Rejected for content reasons, locally or by the provider.
    pub fn is_safety(&self) -> bool {
        matches!(
            self,
            GenerationError::UnsafePrompt | GenerationError::SafetyRejected(_)
        )
    }

    pub fn is_quota(&self) -> bool {
        matches!(self, GenerationError::QuotaExceeded(_))
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            GenerationError::EmptyPrompt => ErrorCode::InvalidInput,
            GenerationError::UnsafePrompt | GenerationError::SafetyRejected(_) => {
                ErrorCode::SafetyRejected
            }
            GenerationError::QuotaExceeded(_) => ErrorCode::QuotaExceeded,
            _ => ErrorCode::GenerationFailed,
        }
    }
}

impl From<ImageProviderError> for GenerationError {
    fn from(err: ImageProviderError) -> Self {
        match err {
            ImageProviderError::SafetyRejected(msg) => GenerationError::SafetyRejected(msg),
            ImageProviderError::QuotaExceeded(msg) => GenerationError::QuotaExceeded(msg),
            ImageProviderError::Other(msg) => GenerationError::Provider(msg),
        }
    }
}

/// Steps of the single safety fallback: the enhanced prompt first, then the raw
/// prompt if the provider's safety system rejected the enhanced one.
enum GenerationAttempt {
    TryEnhanced,
    TryRaw,
    Done {
        image: GeneratedImage,
        sent_prompt: String,
    },
}

// ============================================================================
// Repository Trait
// ============================================================================

#[async_trait]
pub trait ThumbnailRepo: Send + Sync {
    async fn insert(&self, input: &NewThumbnail) -> AppResult<ThumbnailProfile>;

    /// Newest first.
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<ThumbnailProfile>>;
}

// ============================================================================
// Use Cases
// ============================================================================

pub struct ThumbnailUseCases {
    repo: Arc<dyn ThumbnailRepo>,
    generator: Arc<dyn ImageGeneratorPort>,
    downloader: Arc<dyn ImageDownloaderPort>,
    storage: Arc<dyn ObjectStoragePort>,
    defaults: ImageDefaults,
}

impl ThumbnailUseCases {
    pub fn new(
        repo: Arc<dyn ThumbnailRepo>,
        generator: Arc<dyn ImageGeneratorPort>,
        downloader: Arc<dyn ImageDownloaderPort>,
        storage: Arc<dyn ObjectStoragePort>,
        defaults: ImageDefaults,
    ) -> Self {
        Self {
            repo,
            generator,
            downloader,
            storage,
            defaults,
        }
    }

    /// Screen, enhance, generate, store and record one thumbnail.
    ///
    /// Nothing is recorded unless every step succeeds. The only retry is a
    /// single fallback to the raw prompt after a provider safety rejection.
    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn generate_thumbnail(
        &self,
        input: GenerateThumbnailInput,
    ) -> Result<GeneratedThumbnail, GenerationError> {
        let raw_prompt = input.prompt.trim();
        if raw_prompt.is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }

        if let PromptSafety::Blocked { term, category } = check_prompt_safety(raw_prompt) {
            warn!(user_id = %input.user_id, term, ?category, "Prompt rejected by local screening");
            return Err(GenerationError::UnsafePrompt);
        }

        let enhanced_prompt = enhance_prompt(raw_prompt, true, input.reference_image.is_some());
        let model = input.model.unwrap_or_else(|| self.defaults.model.clone());
        let size = input.size.unwrap_or_else(|| self.defaults.size.clone());

        let attempt = self
            .advance(GenerationAttempt::TryEnhanced, raw_prompt, &enhanced_prompt, &model, &size)
            .await?;
        let attempt = match attempt {
            GenerationAttempt::TryRaw => {
                self.advance(GenerationAttempt::TryRaw, raw_prompt, &enhanced_prompt, &model, &size)
                    .await?
            }
            done => done,
        };
        let GenerationAttempt::Done { image, sent_prompt } = attempt else {
            return Err(GenerationError::Provider(
                "generation finished without an image".into(),
            ));
        };

        let bytes = match image.payload {
            ImagePayload::Url(url) => self
                .downloader
                .download(&url)
                .await
                .map_err(|e| GenerationError::Download(e.to_string()))?,
            ImagePayload::Inline { bytes, .. } => bytes,
        };

        let storage_path = storage_path_for(input.user_id, Utc::now().timestamp_millis());
        self.storage
            .put(&storage_path, bytes, STORED_CONTENT_TYPE)
            .await
            .map_err(|e| GenerationError::Storage(e.to_string()))?;
        let image_url = self
            .storage
            .public_url(&storage_path)
            .map_err(|e| GenerationError::Storage(e.to_string()))?;
        if image_url.is_empty() {
            return Err(GenerationError::Storage("no public URL for stored image".into()));
        }

        let prompt = image
            .revised_prompt
            .filter(|p| !p.trim().is_empty())
            .or_else(|| Some(sent_prompt).filter(|p| !p.is_empty()))
            .unwrap_or_else(|| raw_prompt.to_string());

        let record = self
            .repo
            .insert(&NewThumbnail {
                user_id: input.user_id,
                prompt,
                image_url: image_url.clone(),
                storage_path: storage_path.clone(),
            })
            .await
            .map_err(|e| GenerationError::Record(e.to_string()))?;

        info!(user_id = %input.user_id, thumbnail_id = %record.id, "Thumbnail generated");

        Ok(GeneratedThumbnail {
            thumbnail_id: record.id,
            image_url,
            storage_path,
        })
    }

    pub async fn list_thumbnails(&self, user_id: Uuid) -> AppResult<Vec<ThumbnailProfile>> {
        self.repo.list_by_user(user_id).await
    }

    async fn advance(
        &self,
        attempt: GenerationAttempt,
        raw_prompt: &str,
        enhanced_prompt: &str,
        model: &str,
        size: &str,
    ) -> Result<GenerationAttempt, GenerationError> {
        let is_enhanced = matches!(attempt, GenerationAttempt::TryEnhanced);
        let prompt = match attempt {
            GenerationAttempt::TryEnhanced => enhanced_prompt,
            GenerationAttempt::TryRaw => raw_prompt,
            done @ GenerationAttempt::Done { .. } => return Ok(done),
        };

        let options = ImageGenerationOptions {
            prompt: prompt.to_string(),
            model: model.to_string(),
            size: size.to_string(),
            quality: quality_for(model),
        };

        match self.generator.generate(&options).await {
            Ok(image) => Ok(GenerationAttempt::Done {
                image,
                sent_prompt: prompt.to_string(),
            }),
            Err(ImageProviderError::SafetyRejected(msg))
                if is_enhanced && enhanced_prompt != raw_prompt =>
            {
                warn!(reason = %msg, "Enhanced prompt rejected by provider safety system, retrying with raw prompt");
                Ok(GenerationAttempt::TryRaw)
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn quality_for(model: &str) -> Option<String> {
    (model == "dall-e-3").then(|| "standard".to_string())
}

/// Object key for a new image: `{user_id}/{unix_millis}-{random}.png`.
fn storage_path_for(user_id: Uuid, unix_millis: i64) -> String {
    format!("{}/{}-{}.png", user_id, unix_millis, Uuid::new_v4().simple())
}
