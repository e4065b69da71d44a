//! Data models for the application
//!
//! Entities of the listings hierarchy (State → City → Neighborhood →
//! Apartment → Unit), their create/update inputs, list query options, the
//! paginator envelope and the authentication payloads.

mod apartment;
mod city;
mod common;
mod entity;
mod media;
mod neighborhood;
mod state;
mod unit;
mod user;

pub use apartment::*;
pub use city::*;
pub use common::*;
pub use entity::{Entity, EntityInput};
pub use media::*;
pub use neighborhood::*;
pub use state::*;
pub use unit::*;
pub use user::*;
