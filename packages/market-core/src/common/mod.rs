// Common types and utilities shared across the crate

pub mod auth;
pub mod entity_ids;
pub mod errors;
pub mod phone;

pub use auth::AuthContext;
pub use entity_ids::*;
pub use errors::{CoreError, CoreResult};
pub use phone::normalize_whatsapp;
