//! The upload operation the coordinator drives, one call per selected file.

use async_trait::async_trait;

use rentdesk_api_client::{ApiClient, ProgressCallback};
use rentdesk_core::ApiError;

use crate::item::MediaFile;

/// Uploads a single file and returns the remote URL it was stored under.
/// Progress is reported through `on_progress` as a percentage.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(&self, file: &MediaFile, on_progress: ProgressCallback) -> Result<String, ApiError>;
}

#[async_trait]
impl MediaUploader for ApiClient {
    async fn upload(&self, file: &MediaFile, on_progress: ProgressCallback) -> Result<String, ApiError> {
        self.upload_media(
            &file.name,
            file.content_type.as_deref(),
            file.data.clone(),
            on_progress,
        )
        .await
    }
}
