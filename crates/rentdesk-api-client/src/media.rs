//! Media upload transport.
//!
//! Files are posted as multipart field `file` to the upload endpoint. The
//! body is streamed in chunks of `upload_chunk_bytes` and a progress callback
//! is invoked as chunks are handed to the connection. Progress stays below
//! 100 until the API has answered with the stored URL.

use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::Body;

use rentdesk_core::constants::endpoints;
use rentdesk_core::models::{SaveMediaInput, UploadResponse};
use rentdesk_core::ApiError;

use crate::ApiClient;

/// Receives upload progress as a percentage.
pub type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;

/// Highest percentage reported while the body is still being sent.
pub const MAX_STREAMING_PROGRESS: u8 = 99;

pub(crate) fn streaming_percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = sent.saturating_mul(100) / total;
    pct.min(MAX_STREAMING_PROGRESS as u64) as u8
}

fn chunked(data: Bytes, chunk_size: usize) -> Vec<Bytes> {
    let chunk_size = chunk_size.max(1);
    (0..data.len())
        .step_by(chunk_size)
        .map(|start| data.slice(start..(start + chunk_size).min(data.len())))
        .collect()
}

impl ApiClient {
    /// Upload one file and return the URL the API stored it under.
    #[tracing::instrument(skip(self, data, on_progress), fields(size = data.len()))]
    pub async fn upload_media(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        data: Bytes,
        on_progress: ProgressCallback,
    ) -> Result<String, ApiError> {
        let total = data.len() as u64;
        let chunks = chunked(data, self.config().upload_chunk_bytes);

        let mut sent = 0u64;
        let progress = Arc::clone(&on_progress);
        let stream = futures::stream::iter(chunks).map(move |chunk| {
            sent += chunk.len() as u64;
            progress(streaming_percent(sent, total));
            Ok::<Bytes, std::io::Error>(chunk)
        });

        let mut part =
            Part::stream_with_length(Body::wrap_stream(stream), total).file_name(file_name.to_string());
        if let Some(mime) = content_type {
            part = part.mime_str(mime).map_err(|e| {
                ApiError::validation(format!("Invalid content type '{}': {}", mime, e))
            })?;
        }
        let form = Form::new().part("file", part);

        let response: UploadResponse = self.post_multipart(endpoints::MEDIA_UPLOAD, form).await?;
        on_progress(100);
        tracing::info!(file_name, url = %response.image_url, "Media uploaded");
        Ok(response.image_url)
    }

    /// Associate an uploaded URL with its owning entity.
    pub async fn save_media_url(&self, input: &SaveMediaInput) -> Result<serde_json::Value, ApiError> {
        self.post_json(endpoints::MEDIA_SAVE_URL, input).await
    }
}
