use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ApiError;

/// GeoJSON point. Coordinates are stored as `[lat, lon]`, matching what the
/// backend persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [lat, lon],
        }
    }

    pub fn lat(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn lon(&self) -> f64 {
        self.coordinates[1]
    }
}

/// Nested `{ id, name }` reference to a parent entity, as embedded in list
/// and detail responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Anything that can be sent as list query parameters.
///
/// Every query carries a language tag and is validated before it is sent.
pub trait ResourceQuery: Serialize + Validate {
    fn language(&self) -> &str;
}

/// Filter and pagination options accepted by every list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    #[validate(length(min = 1, message = "language is required"))]
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sorted_by: Option<SortOrder>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl QueryOptions {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            name: None,
            search: None,
            page: None,
            limit: None,
            order_by: None,
            sorted_by: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, order: SortOrder) -> Self {
        self.order_by = Some(column.into());
        self.sorted_by = Some(order);
        self
    }
}

impl ResourceQuery for QueryOptions {
    fn language(&self) -> &str {
        &self.language
    }
}

/// Flatten a query value into URL query pairs.
///
/// The value must serialise to a JSON object of primitives; `null` entries are
/// dropped. A missing or empty language tag is rejected, as is any query
/// failing its own validation rules.
pub fn to_query_pairs<Q: ResourceQuery>(query: &Q) -> Result<Vec<(String, String)>, ApiError> {
    if query.language().trim().is_empty() {
        return Err(ApiError::validation("query is missing a language tag"));
    }
    query.validate()?;

    let value = serde_json::to_value(query)?;
    let map = match value {
        serde_json::Value::Object(map) => map,
        other => {
            return Err(ApiError::validation(format!(
                "query must serialise to an object, got {}",
                other
            )))
        }
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        let rendered = match value {
            serde_json::Value::Null => continue,
            serde_json::Value::String(s) => s,
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            other => {
                return Err(ApiError::validation(format!(
                    "query parameter '{}' must be a primitive, got {}",
                    key, other
                )))
            }
        };
        pairs.push((key, rendered));
    }
    Ok(pairs)
}

/// One entry of the paginator's navigation links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatorLink {
    pub url: Option<String>,
    pub label: String,
    #[serde(default)]
    pub active: bool,
}

/// Paginated list envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatorInfo<T> {
    pub current_page: u32,
    pub data: Vec<T>,
    pub first_page_url: String,
    #[serde(default)]
    pub from: Option<u64>,
    pub last_page: u32,
    pub last_page_url: String,
    #[serde(default)]
    pub links: Vec<PaginatorLink>,
    pub next_page_url: Option<String>,
    pub path: String,
    pub per_page: u32,
    pub prev_page_url: Option<String>,
    #[serde(default)]
    pub to: Option<u64>,
    pub total: u64,
}

impl<T> PaginatorInfo<T> {
    pub fn has_next_page(&self) -> bool {
        self.next_page_url.is_some() && self.current_page < self.last_page
    }

    pub fn has_prev_page(&self) -> bool {
        self.prev_page_url.is_some() && self.current_page > 1
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
