//! Typed models for the shutter and thermostat resources of the OpenMotics
//! cloud API, with a pure decode/encode boundary.
//!
//! Scope: types only. Fetching payloads (HTTP, auth, retries) is left to the caller.

pub mod models {
    pub mod location;
    pub mod shutter;
    pub mod thermostat;
}

pub mod config;
pub mod decode;
pub mod entity;
pub mod env_file;
pub mod utils;
pub mod services {
    pub mod inspect;
}

pub use decode::{decode, decode_collection, decode_str, encode, SchemaValidationError};
pub use entity::{Entity, EntityKind, FieldAlias};
