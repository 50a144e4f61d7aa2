use async_trait::async_trait;

use crate::app_error::AppResult;

/// Public object storage for generated artifacts.
///
/// # Errors
///
/// `put` must never overwrite: an existing object at `path` yields `AppError::Conflict`.
#[async_trait]
pub trait ObjectStoragePort: Send + Sync {
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> AppResult<()>;

    /// Durable public URL of an object.
    fn public_url(&self, path: &str) -> AppResult<String>;
}
