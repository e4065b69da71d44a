use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

/// A backend-managed record type reachable through a resource endpoint.
pub trait Entity: DeserializeOwned + Send + 'static {
    /// Human-readable kind, used in logs and notifications ("State", "Unit", ...).
    const KIND: &'static str;

    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

/// Create/update payload of an [`Entity`]. Never carries the entity id.
pub trait EntityInput: Serialize + Validate + Send + Sync {
    fn media(&self) -> &[String];
    fn set_media(&mut self, media: Vec<String>);
}

macro_rules! impl_entity {
    ($ty:ty, $kind:literal) => {
        impl $crate::models::Entity for $ty {
            const KIND: &'static str = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn name(&self) -> &str {
                &self.name
            }
        }
    };
}

macro_rules! impl_entity_input {
    ($ty:ty) => {
        impl $crate::models::EntityInput for $ty {
            fn media(&self) -> &[String] {
                &self.media
            }

            fn set_media(&mut self, media: Vec<String>) {
                self.media = media;
            }
        }
    };
}

pub(crate) use impl_entity;
pub(crate) use impl_entity_input;
