//! Error types module
//!
//! Every failure that crosses the transport boundary is surfaced as an
//! [`ApiError`]: a structured value carrying the failure kind, the HTTP status
//! (when there was a response) and a message. Callers branch on those fields
//! instead of inspecting the error text.

use std::fmt;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues and rejected credentials
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be reported.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "NETWORK_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (the caller may retry)
    fn is_recoverable(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Broad classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The request never produced a response (DNS, connect, TLS, ...)
    Network,
    /// No response within the configured timeout
    Timeout,
    /// Non-2xx response not covered by a more specific kind
    Status,
    /// 401: stored credentials were rejected and have been cleared
    Unauthorized,
    /// 403 or a "Not Authorized" body
    Forbidden,
    /// Response body could not be decoded into the expected shape
    Decode,
    /// Input failed client-side validation and was never sent
    Validation,
    /// The operation was cancelled before it completed
    Cancelled,
    /// Client misconfiguration (bad base URL, unreadable file, ...)
    Config,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApiErrorKind::Network => "network error",
            ApiErrorKind::Timeout => "timeout",
            ApiErrorKind::Status => "request failed",
            ApiErrorKind::Unauthorized => "unauthorized",
            ApiErrorKind::Forbidden => "forbidden",
            ApiErrorKind::Decode => "invalid response",
            ApiErrorKind::Validation => "validation failed",
            ApiErrorKind::Cancelled => "cancelled",
            ApiErrorKind::Config => "configuration error",
        };
        f.write_str(name)
    }
}

/// Structured failure returned by every transport call.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub status: Option<u16>,
    pub message: String,
    /// Decoded JSON body of the failed response, when it had one.
    pub body: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
            body: None,
        }
    }

    /// Build an error from a non-2xx response. The kind is derived from the
    /// status code and, for the "Not Authorized" case, from the body.
    pub fn from_response(status: u16, text: &str) -> Self {
        let body = serde_json::from_str::<serde_json::Value>(text).ok();
        let nested = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(|m| m.as_str())
            .map(str::to_string);

        let kind = match status {
            401 => ApiErrorKind::Unauthorized,
            403 => ApiErrorKind::Forbidden,
            _ if nested.as_deref() == Some(NOT_AUTHORIZED) => ApiErrorKind::Forbidden,
            _ => ApiErrorKind::Status,
        };

        let message = nested.unwrap_or_else(|| {
            if text.trim().is_empty() {
                format!("API request failed with status {}", status)
            } else {
                format!("API request failed with status {}: {}", status, text)
            }
        });

        Self {
            kind,
            status: Some(status),
            message,
            body,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Validation, message)
    }

    pub fn cancelled() -> Self {
        Self::new(ApiErrorKind::Cancelled, "operation cancelled")
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Decode, message)
    }

    /// The `message` field of the response body, if the server sent one.
    pub fn server_message(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(|m| m.as_str())
    }

    /// Message shown to an operator for a failed mutation.
    ///
    /// Status 500 yields `generic`; a nested server message is shown as-is;
    /// anything else falls back to `fallback`.
    pub fn notification_message(&self, generic: &str, fallback: &str) -> String {
        if self.status == Some(500) {
            return generic.to_string();
        }
        if let Some(message) = self.server_message() {
            return message.to_string();
        }
        fallback.to_string()
    }
}

/// Body message the backend uses for rejected sessions.
pub const NOT_AUTHORIZED: &str = "Not Authorized";

impl ErrorMetadata for ApiError {
    fn error_code(&self) -> &'static str {
        match self.kind {
            ApiErrorKind::Network => "NETWORK_ERROR",
            ApiErrorKind::Timeout => "TIMEOUT",
            ApiErrorKind::Status => "REQUEST_FAILED",
            ApiErrorKind::Unauthorized => "UNAUTHORIZED",
            ApiErrorKind::Forbidden => "FORBIDDEN",
            ApiErrorKind::Decode => "DECODE_ERROR",
            ApiErrorKind::Validation => "VALIDATION_ERROR",
            ApiErrorKind::Cancelled => "CANCELLED",
            ApiErrorKind::Config => "CONFIG_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self.kind {
            ApiErrorKind::Network | ApiErrorKind::Timeout => true,
            ApiErrorKind::Status => matches!(self.status, Some(s) if s >= 500),
            _ => false,
        }
    }

    fn log_level(&self) -> LogLevel {
        match self.kind {
            ApiErrorKind::Validation | ApiErrorKind::Cancelled => LogLevel::Debug,
            ApiErrorKind::Unauthorized | ApiErrorKind::Forbidden => LogLevel::Warn,
            ApiErrorKind::Status if matches!(self.status, Some(s) if s < 500) => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::validation(format!("Validation error: {}", err))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::decode(format!("JSON parsing error: {}", err))
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::new(ApiErrorKind::Config, format!("IO error: {}", err))
    }
}
