use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. "catalog.can_change_category").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catalog moderation permissions.
pub mod catalog {
    use super::Permission;

    pub const CAN_UNPUBLISH_PRODUCT: Permission =
        Permission::from_static("catalog.can_unpublish_product");
    pub const CAN_CHANGE_DESCRIPTION: Permission =
        Permission::from_static("catalog.can_change_description");
    pub const CAN_CHANGE_CATEGORY: Permission =
        Permission::from_static("catalog.can_change_category");

    /// The full moderator set; holding all three unlocks moderated edits.
    pub const MODERATOR_SET: [Permission; 3] =
        [CAN_UNPUBLISH_PRODUCT, CAN_CHANGE_DESCRIPTION, CAN_CHANGE_CATEGORY];
}
