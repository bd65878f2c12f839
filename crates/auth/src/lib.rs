//! `storefront-auth` — actor model and catalog access policy.
//!
//! This crate is intentionally decoupled from HTTP and storage: authentication
//! produces an [`Actor`], and the policy functions decide what that actor may do.

pub mod actor;
pub mod authorize;
pub mod claims;
pub mod permissions;
pub mod roles;

pub use actor::Actor;
pub use authorize::{
    AuthzError, EditCapability, Owned, can_delete, can_unpublish, has_full_moderator_rights,
    has_partial_editor_insight, require_edit, resolve_edit_capability,
};
pub use claims::{Hs256JwtValidator, JwtClaims, JwtValidator, TokenValidationError, validate_claims};
pub use permissions::Permission;
pub use roles::Role;
