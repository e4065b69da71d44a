//! Generic REST accessor shared by every entity kind.
//!
//! A [`Resource`] is bound to one endpoint and three types: the entity it
//! returns, the list query it accepts and the input it creates/updates with.
//! All six operations go through the same [`Transport`].

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;

use rentdesk_core::models::{to_query_pairs, Entity, EntityInput, PaginatorInfo, ResourceQuery};
use rentdesk_core::ApiError;

use crate::decode;
use crate::transport::{ApiRequest, Transport};

pub struct Resource<T, Q, I> {
    endpoint: String,
    transport: Arc<dyn Transport>,
    _marker: PhantomData<fn() -> (T, Q, I)>,
}

impl<T, Q, I> Clone for Resource<T, Q, I> {
    fn clone(&self) -> Self {
        Self {
            endpoint: self.endpoint.clone(),
            transport: Arc::clone(&self.transport),
            _marker: PhantomData,
        }
    }
}

impl<T, Q, I> fmt::Debug for Resource<T, Q, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl<T, Q, I> Resource<T, Q, I>
where
    T: Entity,
    Q: ResourceQuery + Sync,
    I: EntityInput,
{
    pub fn new(endpoint: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport,
            _marker: PhantomData,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `GET <endpoint>?params`
    pub async fn all(&self, params: &Q) -> Result<Vec<T>, ApiError> {
        let request = ApiRequest::get(&self.endpoint).with_query(to_query_pairs(params)?);
        decode(self.transport.send(request).await?)
    }

    /// Same endpoint as [`Resource::all`], read as a paginator envelope.
    pub async fn paginated(&self, params: &Q) -> Result<PaginatorInfo<T>, ApiError> {
        let request = ApiRequest::get(&self.endpoint).with_query(to_query_pairs(params)?);
        decode(self.transport.send(request).await?)
    }

    /// `GET <endpoint>/<id>`
    pub async fn get(&self, id: &str) -> Result<T, ApiError> {
        let request = ApiRequest::get(self.item_path(id)?);
        decode(self.transport.send(request).await?)
    }

    /// `POST <endpoint>/create`. The input is validated first.
    pub async fn create(&self, input: &I) -> Result<T, ApiError> {
        input.validate()?;
        let body = body_without_id(input)?;
        let request = ApiRequest::post(format!("{}/create", self.endpoint), body);
        let created: T = decode(self.transport.send(request).await?)?;
        tracing::info!(kind = T::KIND, id = created.id(), name = created.name(), "Entity created");
        Ok(created)
    }

    /// `PUT <endpoint>/edit/<id>` with a full, validated input.
    pub async fn update(&self, id: &str, input: &I) -> Result<T, ApiError> {
        input.validate()?;
        self.patch(id, input).await
    }

    /// `PUT <endpoint>/edit/<id>` with any partial body. An `id` key in the
    /// body is removed; the identifier only travels in the URL.
    pub async fn patch<P: Serialize + ?Sized>(&self, id: &str, input: &P) -> Result<T, ApiError> {
        let path = format!("{}/edit/{}", self.endpoint, encode_id(id)?);
        let request = ApiRequest::put(path, body_without_id(input)?);
        let updated: T = decode(self.transport.send(request).await?)?;
        tracing::info!(kind = T::KIND, id, name = updated.name(), "Entity updated");
        Ok(updated)
    }

    /// `DELETE <endpoint>/<id>`
    pub async fn delete(&self, id: &str) -> Result<bool, ApiError> {
        let request = ApiRequest::delete(self.item_path(id)?);
        let value = self.transport.send(request).await?;
        let deleted = match value {
            serde_json::Value::Bool(flag) => flag,
            serde_json::Value::Object(ref map) => map
                .get("success")
                .and_then(|s| s.as_bool())
                .unwrap_or(true),
            _ => true,
        };
        tracing::info!(kind = T::KIND, id, deleted, "Entity deleted");
        Ok(deleted)
    }

    fn item_path(&self, id: &str) -> Result<String, ApiError> {
        Ok(format!("{}/{}", self.endpoint, encode_id(id)?))
    }
}

fn encode_id(id: &str) -> Result<String, ApiError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::validation("id is required"));
    }
    Ok(urlencoding::encode(id).into_owned())
}

fn body_without_id<P: Serialize + ?Sized>(input: &P) -> Result<serde_json::Value, ApiError> {
    let mut body = serde_json::to_value(input)?;
    if let serde_json::Value::Object(map) = &mut body {
        map.remove("id");
    }
    Ok(body)
}

/// Which mutation a notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Created,
    Updated,
    Deleted,
}

/// Notification text for a successful mutation, e.g. "City is created".
pub fn success_message(kind: &str, operation: Operation) -> String {
    let verb = match operation {
        Operation::Created => "created",
        Operation::Updated => "updated",
        Operation::Deleted => "deleted",
    };
    format!("{} is {}", kind, verb)
}
