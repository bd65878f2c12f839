//! Catalog domain module.
//!
//! This crate contains business rules for categories, products and product
//! versions, implemented purely as deterministic domain logic (no IO, no HTTP,
//! no storage).

pub mod category;
pub mod denylist;
pub mod ledger;
pub mod listing;
pub mod product;
pub mod version;

pub use category::{Category, CategoryForm};
pub use ledger::{NO_ACTIVE_VERSION, VersionLedger, active_version_name};
pub use listing::{DecoratedProduct, ProductFilter, decorate_for_listing, sort_for_listing};
pub use product::{ModeratorForm, Price, Product, ProductForm};
pub use version::{Version, VersionBatch, VersionDraft, VersionEntry};

/// Count characters, not bytes (names are frequently Cyrillic).
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}
