use serde::{Deserialize, Serialize};

/// Response of the upload endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
}

/// Kind of entity a saved media URL belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaOwnerType {
    State,
    City,
    Neighborhood,
    Apartment,
    Unit,
}

/// Associates an uploaded URL with its owning entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveMediaInput {
    #[serde(rename = "type")]
    pub owner_type: MediaOwnerType,
    pub type_id: String,
    pub image_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_media_wire_format() {
        let input = SaveMediaInput {
            owner_type: MediaOwnerType::Apartment,
            type_id: "a1".to_string(),
            image_url: "https://cdn.example.com/a.jpg".to_string(),
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["type"], "apartment");
        assert_eq!(json["typeId"], "a1");
        assert_eq!(json["imageUrl"], "https://cdn.example.com/a.jpg");
    }
}
