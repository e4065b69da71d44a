//! HTTP client for the rentdesk listings API.
//!
//! Provides [`ApiClient`], a transport with bearer auth read from a
//! [`CredentialStore`] on every request, generic JSON helpers, the generic
//! [`Resource`] accessor used for every entity kind, the auth endpoints and
//! the media upload endpoint. The CLI and the media uploader use this client
//! directly.

pub mod api;
pub mod auth;
pub mod media;
pub mod resource;
pub mod transport;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use rentdesk_core::error::NOT_AUTHORIZED;
use rentdesk_core::{ApiError, ApiErrorKind, ClientConfig, CredentialStore, FileCredentialStore};

pub use api::{
    ApartmentResource, CityResource, NeighborhoodResource, StateResource, UnitResource,
};
pub use media::{ProgressCallback, MAX_STREAMING_PROGRESS};
pub use resource::{success_message, Operation, Resource};
pub use transport::{ApiRequest, Transport};

/// HTTP client for the rentdesk API.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
    config: ClientConfig,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ApiClient {
    pub fn new(config: ClientConfig, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            credentials,
            config,
        })
    }

    /// Create client from environment, persisting credentials to the
    /// configured credentials file.
    pub fn from_env() -> Result<Self> {
        let config = ClientConfig::from_env()?;
        let store = FileCredentialStore::new(config.credentials_path.clone());
        Self::new(config, Arc::new(store))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// This client as a shareable [`Transport`].
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::new(self.clone())
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self.credentials.token().unwrap_or_default();
        request.bearer_auth(token)
    }

    /// Execute a JSON request and return the decoded body.
    #[tracing::instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn execute(&self, request: ApiRequest) -> Result<serde_json::Value, ApiError> {
        let url = self.build_url(&request.path);
        let mut builder = self.client.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        self.dispatch(builder).await
    }

    /// Attach auth, send, and map the response.
    pub(crate) async fn dispatch(
        &self,
        builder: RequestBuilder,
    ) -> Result<serde_json::Value, ApiError> {
        let response = self
            .apply_auth(builder)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            let err = ApiError::from_response(status.as_u16(), &text);
            self.handle_rejection(&err);
            return Err(err);
        }

        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| ApiError::decode(format!("Failed to parse response as JSON: {}", e)))
    }

    /// 401 clears the stored credentials so the next run starts from login;
    /// 403 and "Not Authorized" bodies are only logged.
    fn handle_rejection(&self, err: &ApiError) {
        match err.kind {
            ApiErrorKind::Unauthorized => {
                tracing::warn!(
                    status = ?err.status,
                    "Session rejected by the API, clearing stored credentials"
                );
                if let Err(e) = self.credentials.clear() {
                    tracing::error!(error = %e, "Failed to clear stored credentials");
                }
            }
            ApiErrorKind::Forbidden => {
                tracing::warn!(
                    status = ?err.status,
                    not_authorized = err.server_message() == Some(NOT_AUTHORIZED),
                    "Request forbidden"
                );
            }
            _ => {
                tracing::debug!(status = ?err.status, error = %err, "API request failed");
            }
        }
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        let value = self
            .execute(ApiRequest::get(path).with_query(query))
            .await?;
        decode(value)
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let value = self
            .execute(ApiRequest::post(path, serde_json::to_value(body)?))
            .await?;
        decode(value)
    }

    /// PUT JSON body and deserialize response.
    pub async fn put_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let value = self
            .execute(ApiRequest::put(path, serde_json::to_value(body)?))
            .await?;
        decode(value)
    }

    /// DELETE request. Returns the decoded body.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let value = self.execute(ApiRequest::delete(path)).await?;
        decode(value)
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        let url = self.build_url(path);
        let builder = self.client.request(Method::POST, &url).multipart(form);
        let value = self.dispatch(builder).await?;
        decode(value)
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn send(&self, request: ApiRequest) -> Result<serde_json::Value, ApiError> {
        self.execute(request).await
    }
}

pub(crate) fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::decode(format!("Unexpected response shape: {}", e)))
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    let kind = if err.is_timeout() {
        ApiErrorKind::Timeout
    } else if err.is_builder() {
        ApiErrorKind::Config
    } else if err.is_decode() {
        ApiErrorKind::Decode
    } else {
        ApiErrorKind::Network
    };
    let mut api_error = ApiError::new(kind, err.to_string());
    api_error.status = err.status().map(|s| s.as_u16());
    api_error
}
