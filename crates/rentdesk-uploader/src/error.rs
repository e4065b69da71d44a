use rentdesk_core::{ErrorMetadata, LogLevel};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("No media item at index {index} (list has {len} items)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Upload coordinator has shut down")]
    Closed,
}

impl ErrorMetadata for UploadError {
    fn error_code(&self) -> &'static str {
        match self {
            UploadError::IndexOutOfRange { .. } => "INDEX_OUT_OF_RANGE",
            UploadError::Closed => "COORDINATOR_CLOSED",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, UploadError::IndexOutOfRange { .. })
    }

    fn log_level(&self) -> LogLevel {
        match self {
            UploadError::IndexOutOfRange { .. } => LogLevel::Warn,
            UploadError::Closed => LogLevel::Error,
        }
    }
}
