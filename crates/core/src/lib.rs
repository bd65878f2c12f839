//! `storefront-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::{Entity, position_of};
pub use error::{DomainError, DomainResult, FieldError};
pub use id::{CategoryId, ProductId, UserId, VersionId};
pub use value_object::ValueObject;
