use storefront_auth::{Actor, AuthzError};

/// Actor context for a request.
///
/// Inserted by the auth middleware on every route. Public routes accept an
/// anonymous context; mutating routes call [`ActorContext::require`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActorContext {
    actor: Option<Actor>,
}

impl ActorContext {
    pub fn anonymous() -> Self {
        Self { actor: None }
    }

    pub fn authenticated(actor: Actor) -> Self {
        Self { actor: Some(actor) }
    }

    pub fn actor(&self) -> Option<&Actor> {
        self.actor.as_ref()
    }

    pub fn require(&self) -> Result<&Actor, AuthzError> {
        self.actor.as_ref().ok_or(AuthzError::Unauthenticated)
    }
}
