use std::collections::HashSet;

use storefront_core::UserId;

use crate::{Permission, Role};

/// A fully resolved, authenticated actor.
///
/// Effective permissions are the union of explicit grants and the grants of
/// every role the actor belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    id: UserId,
    is_superuser: bool,
    roles: Vec<Role>,
    permissions: HashSet<Permission>,
}

impl Actor {
    pub fn new(id: UserId, is_superuser: bool, roles: Vec<Role>, permissions: Vec<Permission>) -> Self {
        let mut effective: HashSet<Permission> = permissions.into_iter().collect();
        for role in &roles {
            effective.extend(role.permissions());
        }
        Self {
            id,
            is_superuser,
            roles,
            permissions: effective,
        }
    }

    /// A plain authenticated user with no roles or grants.
    pub fn user(id: UserId) -> Self {
        Self::new(id, false, Vec::new(), Vec::new())
    }

    pub fn superuser(id: UserId) -> Self {
        Self::new(id, true, Vec::new(), Vec::new())
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn is_superuser(&self) -> bool {
        self.is_superuser
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
    }

    pub fn has_all_permissions<'a>(&self, permissions: impl IntoIterator<Item = &'a Permission>) -> bool {
        permissions.into_iter().all(|p| self.has_permission(p))
    }

    pub fn has_any_permission<'a>(&self, permissions: impl IntoIterator<Item = &'a Permission>) -> bool {
        permissions.into_iter().any(|p| self.has_permission(p))
    }

    /// Whether this actor owns an entity with the given owner reference.
    pub fn owns(&self, owner: Option<UserId>) -> bool {
        owner == Some(self.id)
    }

    /// Effective permissions, sorted for stable output.
    pub fn effective_permissions(&self) -> Vec<&str> {
        let mut perms: Vec<&str> = self.permissions.iter().map(|p| p.as_str()).collect();
        perms.sort_unstable();
        perms
    }
}
