use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::entity::{impl_entity, impl_entity_input};
use super::{EntityRef, GeoPoint};
use crate::validation::{validate_coordinates, validate_media_urls, validate_required};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Neighborhood {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub location: Option<GeoPoint>,
    pub city: Option<EntityRef>,
    #[serde(default)]
    pub media: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateNeighborhoodInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(custom(function = "validate_coordinates"))]
    pub location: GeoPoint,
    #[validate(custom(function = "validate_required", message = "Please select a city"))]
    pub city_id: String,
    #[validate(custom(function = "validate_media_urls"))]
    pub media: Vec<String>,
}

impl From<&Neighborhood> for CreateNeighborhoodInput {
    fn from(neighborhood: &Neighborhood) -> Self {
        Self {
            name: neighborhood.name.clone(),
            description: neighborhood.description.clone(),
            location: neighborhood
                .location
                .clone()
                .unwrap_or_else(|| GeoPoint::new(0.0, 0.0)),
            city_id: neighborhood
                .city
                .as_ref()
                .map(|c| c.id.clone())
                .unwrap_or_default(),
            media: neighborhood.media.clone(),
        }
    }
}

impl_entity!(Neighborhood, "Neighborhood");
impl_entity_input!(CreateNeighborhoodInput);
