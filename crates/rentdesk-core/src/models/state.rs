use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::entity::{impl_entity, impl_entity_input};
use super::GeoPoint;
use crate::validation::{validate_coordinates, validate_media_urls};

/// Top level of the listings hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub media: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStateInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(custom(function = "validate_coordinates"))]
    pub location: GeoPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Invalid URL"))]
    pub url: Option<String>,
    #[validate(custom(function = "validate_media_urls"))]
    pub media: Vec<String>,
}

impl From<&State> for CreateStateInput {
    fn from(state: &State) -> Self {
        Self {
            name: state.name.clone(),
            description: state.description.clone(),
            location: state.location.clone().unwrap_or_else(|| GeoPoint::new(0.0, 0.0)),
            url: state.url.clone(),
            media: state.media.clone(),
        }
    }
}

impl_entity!(State, "State");
impl_entity_input!(CreateStateInput);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_deserializes_backend_shape() {
        let json = r#"{
            "id": "7d1f0d52-2d4b-4a57-a1a4-5f2f9e0f0a11",
            "name": "Texas",
            "description": "Lone star",
            "location": {"type": "Point", "coordinates": [31.0, -99.0]},
            "url": "https://www.texas.gov",
            "media": ["https://cdn.example.com/tx.jpg"],
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-02T10:00:00Z",
            "deletedAt": null
        }"#;
        let state: State = serde_json::from_str(json).unwrap();
        assert_eq!(state.name, "Texas");
        assert_eq!(state.location.unwrap().lat(), 31.0);
        assert!(state.created_at.is_some());
    }

    #[test]
    fn test_create_input_validation() {
        let mut input = CreateStateInput {
            name: "Texas".to_string(),
            description: "Lone star".to_string(),
            location: GeoPoint::new(31.0, -99.0),
            url: None,
            media: vec!["https://cdn.example.com/tx.jpg".to_string()],
        };
        assert!(input.validate().is_ok());

        input.media.clear();
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("media"));

        input.media.push("https://cdn.example.com/tx.jpg".to_string());
        input.name.clear();
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_create_input_has_no_id() {
        let input = CreateStateInput {
            name: "Ohio".to_string(),
            description: "Buckeye".to_string(),
            location: GeoPoint::new(40.0, -82.9),
            url: None,
            media: vec!["https://cdn.example.com/oh.jpg".to_string()],
        };
        let json = serde_json::to_value(&input).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("url").is_none());
    }
}
