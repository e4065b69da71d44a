//! Field validators used by the input schemas.

use std::borrow::Cow;

use validator::{ValidateUrl, ValidationError};

use crate::constants::{AMENITIES, FACILITIES};

/// A media field must hold at least one URL and every entry must be a valid URL.
#[allow(clippy::ptr_arg)]
pub fn validate_media_urls(value: &Vec<String>) -> Result<(), ValidationError> {
    if value.is_empty() {
        let mut error = ValidationError::new("media_required");
        error.message = Some(Cow::from("At least one media file is required"));
        return Err(error);
    }
    if let Some(bad) = value.iter().find(|url| !url.validate_url()) {
        let mut error = ValidationError::new("media_url");
        error.message = Some(Cow::from("Media URLs must be valid URLs"));
        error.add_param(Cow::from("value"), bad);
        return Err(error);
    }
    Ok(())
}

#[allow(clippy::ptr_arg)]
pub fn validate_required(value: &String) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("is_required");
        error.message = Some(Cow::from("This field is required"));
        Err(error)
    } else {
        Ok(())
    }
}

#[allow(clippy::ptr_arg)]
pub fn validate_amenities(value: &Vec<String>) -> Result<(), ValidationError> {
    check_catalogue(value, AMENITIES, "amenity")
}

#[allow(clippy::ptr_arg)]
pub fn validate_facilities(value: &Vec<String>) -> Result<(), ValidationError> {
    check_catalogue(value, FACILITIES, "facility")
}

/// Every entry must be one of the catalogue values, compared exactly.
fn check_catalogue(value: &[String], catalogue: &[&str], what: &str) -> Result<(), ValidationError> {
    match value.iter().find(|item| !catalogue.contains(&item.as_str())) {
        Some(unknown) => {
            let mut error = ValidationError::new("catalogue");
            error.message = Some(Cow::from(format!("Unknown {}: {}", what, unknown)));
            error.add_param(Cow::from("value"), unknown);
            Err(error)
        }
        None => Ok(()),
    }
}

/// Latitude must be in [-90, 90] and longitude in [-180, 180].
pub fn validate_coordinates(value: &crate::models::GeoPoint) -> Result<(), ValidationError> {
    let [lat, lon] = value.coordinates;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        let mut error = ValidationError::new("coordinates");
        error.message = Some(Cow::from("Coordinates are out of range"));
        return Err(error);
    }
    Ok(())
}
