//! In-memory doubles for the generation pipeline.

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::{
        image_generation::{
            GeneratedImage, ImageDownloaderPort, ImageGenerationOptions, ImageGeneratorPort,
            ImagePayload, ImageProviderError,
        },
        object_storage::ObjectStoragePort,
    },
    application::use_cases::thumbnail::{NewThumbnail, ThumbnailProfile, ThumbnailRepo},
};

// ============================================================================
// ScriptedImageGenerator
// ============================================================================

/// Replays queued responses in order, then succeeds with a URL image.
#[derive(Default)]
pub struct ScriptedImageGenerator {
    pub responses: Mutex<VecDeque<Result<GeneratedImage, ImageProviderError>>>,
    pub calls: Mutex<Vec<ImageGenerationOptions>>,
}

impl ScriptedImageGenerator {
    pub fn with_responses(responses: Vec<Result<GeneratedImage, ImageProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(vec![]),
        }
    }

    pub fn url_image(revised_prompt: Option<&str>) -> GeneratedImage {
        GeneratedImage {
            payload: ImagePayload::Url("https://images.test/generated.png".to_string()),
            revised_prompt: revised_prompt.map(str::to_string),
        }
    }

    /// Prompts sent so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.prompt.clone())
            .collect()
    }
}

#[async_trait]
impl ImageGeneratorPort for ScriptedImageGenerator {
    async fn generate(
        &self,
        options: &ImageGenerationOptions,
    ) -> Result<GeneratedImage, ImageProviderError> {
        self.calls.lock().unwrap().push(options.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Self::url_image(None)))
    }
}

// ============================================================================
// StaticImageDownloader
// ============================================================================

#[derive(Default)]
pub struct StaticImageDownloader {
    pub urls: Mutex<Vec<String>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl ImageDownloaderPort for StaticImageDownloader {
    async fn download(&self, url: &str) -> AppResult<Vec<u8>> {
        self.urls.lock().unwrap().push(url.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Provider("download failed with status 403".into()));
        }
        Ok(b"\x89PNG fake image".to_vec())
    }
}

// ============================================================================
// InMemoryObjectStorage
// ============================================================================

#[derive(Default)]
pub struct InMemoryObjectStorage {
    /// path -> (bytes, content type)
    pub objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    pub fail_puts: AtomicBool,
}

impl InMemoryObjectStorage {
    pub fn contains(&self, path: &str) -> bool {
        self.objects.lock().unwrap().contains_key(path)
    }

    pub fn bytes(&self, path: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(path)
            .map(|(bytes, _)| bytes.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl ObjectStoragePort for InMemoryObjectStorage {
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> AppResult<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(AppError::Provider("upload failed with status 500".into()));
        }
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(path) {
            return Err(AppError::Conflict);
        }
        objects.insert(path.to_string(), (bytes, content_type.to_string()));
        Ok(())
    }

    fn public_url(&self, path: &str) -> AppResult<String> {
        Ok(format!("https://storage.test/images/{path}"))
    }
}

// ============================================================================
// InMemoryThumbnailRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryThumbnailRepo {
    pub records: Mutex<Vec<ThumbnailProfile>>,
}

impl InMemoryThumbnailRepo {
    /// Seed a record with an explicit creation time (`YYYY-MM-DDTHH:MM:SS`).
    pub fn insert_at(&self, user_id: Uuid, prompt: &str, created_at: &str) {
        let created_at: NaiveDateTime = created_at.parse().unwrap();
        let id = Uuid::new_v4();
        self.records.lock().unwrap().push(ThumbnailProfile {
            id,
            user_id,
            prompt: prompt.to_string(),
            image_url: format!("https://storage.test/images/{user_id}/{id}.png"),
            storage_path: format!("{user_id}/{id}.png"),
            created_at,
        });
    }
}

#[async_trait]
impl ThumbnailRepo for InMemoryThumbnailRepo {
    async fn insert(&self, input: &NewThumbnail) -> AppResult<ThumbnailProfile> {
        let record = ThumbnailProfile {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            prompt: input.prompt.clone(),
            image_url: input.image_url.clone(),
            storage_path: input.storage_path.clone(),
            created_at: Utc::now().naive_utc(),
        };
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<ThumbnailProfile>> {
        let mut records: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}
