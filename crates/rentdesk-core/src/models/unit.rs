use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::entity::{impl_entity, impl_entity_input};
use super::EntityRef;
use crate::validation::{validate_amenities, validate_facilities, validate_media_urls};

/// A rentable unit inside an apartment building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub bedrooms: u32,
    pub bathrooms: f64,
    pub floor_area: f64,
    pub price: f64,
    #[serde(default)]
    pub min_lease_months: u32,
    #[serde(default)]
    pub min_rent_period: u32,
    #[serde(default)]
    pub contact: String,
    #[serde(default, with = "comma_list")]
    pub amenities: Vec<String>,
    #[serde(default, with = "comma_list")]
    pub facilities: Vec<String>,
    #[serde(default)]
    pub is_fully_furnished: bool,
    pub apartment: Option<EntityRef>,
    #[serde(default)]
    pub media: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUnitInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(range(min = 1, message = "Must be at least 1"))]
    pub bedrooms: u32,
    #[validate(range(exclusive_min = 0.0, message = "Must be at least 1"))]
    pub bathrooms: f64,
    #[validate(range(exclusive_min = 0.0, message = "Must be positive"))]
    pub floor_area: f64,
    #[validate(range(exclusive_min = 0.0, message = "Must be positive"))]
    pub price: f64,
    #[validate(range(min = 1))]
    pub min_lease_months: u32,
    #[validate(range(min = 1))]
    pub min_rent_period: u32,
    #[validate(length(min = 1, message = "Contact info required"))]
    pub contact: String,
    #[serde(with = "comma_list")]
    #[validate(
        length(min = 1, message = "At least one amenity required"),
        custom(function = "validate_amenities")
    )]
    pub amenities: Vec<String>,
    #[serde(with = "comma_list")]
    #[validate(
        length(min = 1, message = "At least one facility required"),
        custom(function = "validate_facilities")
    )]
    pub facilities: Vec<String>,
    pub is_fully_furnished: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub apartment_id: Uuid,
    #[validate(custom(function = "validate_media_urls"))]
    pub media: Vec<String>,
}

impl CreateUnitInput {
    /// Build an input from an existing unit. Fails when the unit has no
    /// apartment or the apartment id is not a UUID.
    pub fn try_from_unit(unit: &Unit) -> Result<Self, crate::error::ApiError> {
        let apartment_id = unit
            .apartment
            .as_ref()
            .ok_or_else(|| crate::error::ApiError::validation("unit has no apartment"))?
            .id
            .parse::<Uuid>()
            .map_err(|e| crate::error::ApiError::validation(format!("Invalid apartment ID: {}", e)))?;

        Ok(Self {
            name: unit.name.clone(),
            bedrooms: unit.bedrooms,
            bathrooms: unit.bathrooms,
            floor_area: unit.floor_area,
            price: unit.price,
            min_lease_months: unit.min_lease_months,
            min_rent_period: unit.min_rent_period,
            contact: unit.contact.clone(),
            amenities: unit.amenities.clone(),
            facilities: unit.facilities.clone(),
            is_fully_furnished: unit.is_fully_furnished,
            description: unit.description.clone(),
            apartment_id,
            media: unit.media.clone(),
        })
    }
}

impl_entity!(Unit, "Unit");
impl_entity_input!(CreateUnitInput);

/// Lists travel as a single comma-separated string (`"AC, Bed"`).
/// Deserialisation also accepts a JSON array.
pub(crate) mod comma_list {
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S: Serializer>(items: &Vec<String>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&items.join(", "))
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Joined(String),
        List(Vec<String>),
        Missing(()),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let items = match Raw::deserialize(deserializer)? {
            Raw::Joined(s) => s
                .split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect(),
            Raw::List(list) => list,
            Raw::Missing(()) => Vec::new(),
        };
        Ok(items)
    }
}
