use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::entity::{impl_entity, impl_entity_input};
use super::{EntityRef, GeoPoint};
use crate::validation::{validate_coordinates, validate_media_urls, validate_required};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub location: Option<GeoPoint>,
    pub state: Option<EntityRef>,
    #[serde(default)]
    pub media: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCityInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(custom(function = "validate_coordinates"))]
    pub location: GeoPoint,
    #[validate(custom(function = "validate_required", message = "Please select a state"))]
    pub state_id: String,
    #[validate(custom(function = "validate_media_urls"))]
    pub media: Vec<String>,
}

impl From<&City> for CreateCityInput {
    fn from(city: &City) -> Self {
        Self {
            name: city.name.clone(),
            description: city.description.clone(),
            location: city.location.clone().unwrap_or_else(|| GeoPoint::new(0.0, 0.0)),
            state_id: city.state.as_ref().map(|s| s.id.clone()).unwrap_or_default(),
            media: city.media.clone(),
        }
    }
}

impl_entity!(City, "City");
impl_entity_input!(CreateCityInput);
