use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::permissions::{Permission, catalog};

/// Role identifier used for RBAC (a named permission group).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// Catalog moderators: may unpublish and recategorise/redescribe any product.
    pub const MODERATOR: Role = Role(Cow::Borrowed("moderator"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Permissions granted by membership in this role.
    ///
    /// Unknown roles grant nothing.
    pub fn permissions(&self) -> Vec<Permission> {
        match self.as_str() {
            "moderator" => catalog::MODERATOR_SET.to_vec(),
            _ => Vec::new(),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
