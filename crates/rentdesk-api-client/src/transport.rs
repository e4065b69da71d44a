//! The seam between resource accessors and the network.
//!
//! [`Transport`] is object-safe and speaks JSON values, so resource code can
//! run against the real [`crate::ApiClient`] or an in-memory fake.

use async_trait::async_trait;
use reqwest::Method;
use rentdesk_core::ApiError;

/// One JSON request against the API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base URL, starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Executes [`ApiRequest`]s. Any non-2xx response is returned as an
/// [`ApiError`] untouched; implementations never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return the decoded JSON body (`Null` for an empty body).
    async fn send(&self, request: ApiRequest) -> Result<serde_json::Value, ApiError>;
}
