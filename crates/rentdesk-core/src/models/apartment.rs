use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::entity::{impl_entity, impl_entity_input};
use super::{EntityRef, GeoPoint};
use crate::validation::{validate_coordinates, validate_media_urls, validate_required};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Apartment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: String,
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub url: Option<String>,
    pub neighborhood: Option<EntityRef>,
    #[serde(default)]
    pub media: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateApartmentInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(custom(function = "validate_coordinates"))]
    pub location: GeoPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Invalid URL"))]
    pub url: Option<String>,
    #[validate(custom(function = "validate_required", message = "Please select a neighborhood"))]
    pub neighborhood_id: String,
    #[validate(custom(function = "validate_media_urls"))]
    pub media: Vec<String>,
}

impl From<&Apartment> for CreateApartmentInput {
    fn from(apartment: &Apartment) -> Self {
        Self {
            name: apartment.name.clone(),
            address: apartment.address.clone(),
            description: apartment.description.clone(),
            location: apartment
                .location
                .clone()
                .unwrap_or_else(|| GeoPoint::new(0.0, 0.0)),
            url: apartment.url.clone(),
            neighborhood_id: apartment
                .neighborhood
                .as_ref()
                .map(|n| n.id.clone())
                .unwrap_or_default(),
            media: apartment.media.clone(),
        }
    }
}

impl_entity!(Apartment, "Apartment");
impl_entity_input!(CreateApartmentInput);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apartment_input_requires_address() {
        let input = CreateApartmentInput {
            name: "The Grove".to_string(),
            address: String::new(),
            description: "Garden apartments".to_string(),
            location: GeoPoint::new(30.3, -97.7),
            url: Some("https://thegrove.example.com".to_string()),
            neighborhood_id: "n1".to_string(),
            media: vec!["https://cdn.example.com/grove.jpg".to_string()],
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("address"));
    }

    #[test]
    fn test_apartment_input_wire_names() {
        let input = CreateApartmentInput {
            name: "The Grove".to_string(),
            address: "1 Main St".to_string(),
            description: "Garden apartments".to_string(),
            location: GeoPoint::new(30.3, -97.7),
            url: None,
            neighborhood_id: "n1".to_string(),
            media: vec!["https://cdn.example.com/grove.jpg".to_string()],
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["neighborhoodId"], "n1");
        assert_eq!(json["location"]["type"], "Point");
    }
}
