//! Catalog access policy.
//!
//! - No IO
//! - No panics
//! - Pure decisions over an [`Actor`] and the owner of the target entity

use serde::Serialize;
use thiserror::Error;

use storefront_core::{DomainError, UserId};

use crate::Actor;
use crate::permissions::catalog;

/// Anything with an (optional) owning user.
pub trait Owned {
    fn owner(&self) -> Option<UserId>;
}

/// What an actor may do to a product when editing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditCapability {
    /// Every product field plus the version sub-form.
    FullEdit,
    /// Description, category and publish status only.
    ModeratedEdit,
    Denied,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("authentication required")]
    Unauthenticated,
}

impl From<AuthzError> for DomainError {
    fn from(_: AuthzError) -> Self {
        DomainError::PermissionDenied
    }
}

/// All-of gate: unpublish + change description + change category.
///
/// Governs edit authorization.
pub fn has_full_moderator_rights(actor: &Actor) -> bool {
    actor.has_all_permissions(catalog::MODERATOR_SET.iter())
}

/// Any-of gate: change description OR change category.
///
/// Governs listing decoration only; deliberately weaker than
/// [`has_full_moderator_rights`].
pub fn has_partial_editor_insight(actor: &Actor) -> bool {
    actor.has_any_permission([catalog::CAN_CHANGE_DESCRIPTION, catalog::CAN_CHANGE_CATEGORY].iter())
}

pub fn can_unpublish(actor: &Actor) -> bool {
    actor.has_permission(&catalog::CAN_UNPUBLISH_PRODUCT)
}

/// Resolve the edit capability of `actor` over `target`.
pub fn resolve_edit_capability<T: Owned + ?Sized>(actor: &Actor, target: &T) -> EditCapability {
    if actor.owns(target.owner()) || actor.is_superuser() {
        EditCapability::FullEdit
    } else if has_full_moderator_rights(actor) {
        EditCapability::ModeratedEdit
    } else {
        EditCapability::Denied
    }
}

/// Resolve and fail on `Denied`.
///
/// Called at fetch time, before any form is bound.
pub fn require_edit<T: Owned + ?Sized>(actor: &Actor, target: &T) -> Result<EditCapability, AuthzError> {
    match resolve_edit_capability(actor, target) {
        EditCapability::Denied => {
            tracing::warn!(actor = %actor.id(), "edit denied");
            Err(AuthzError::PermissionDenied)
        }
        capability => Ok(capability),
    }
}

/// Deletion is reserved for the owner and superusers.
pub fn can_delete<T: Owned + ?Sized>(actor: &Actor, target: &T) -> bool {
    actor.owns(target.owner()) || actor.is_superuser()
}
