//! Domain error model.

use serde::Serialize;
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// A validation failure attached to a single form field.
///
/// `field: None` marks a form-level (non-field) error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Option<String>,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn non_field(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }
}

impl core::fmt::Display for FieldError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{field}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, conflicts). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more form fields failed validation.
    #[error("validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A uniqueness constraint would be broken (e.g. duplicate version number).
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// A single submission marked more than one version as active.
    #[error("a product may not have more than one active version")]
    MultipleActiveVersions,

    /// The actor lacks the capability required for the operation.
    #[error("permission denied")]
    PermissionDenied,
}

impl DomainError {
    pub fn validation(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, msg)])
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::ConstraintViolation(msg.into())
    }

    /// Turn a collected list of field errors into a result.
    pub fn from_field_errors(errors: Vec<FieldError>) -> DomainResult<()> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self::Validation(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_lists_every_field() {
        let err = DomainError::Validation(vec![
            FieldError::new("name", "too long"),
            FieldError::non_field("bad form"),
        ]);
        assert_eq!(err.to_string(), "validation failed: name: too long; bad form");
    }

    #[test]
    fn empty_field_error_list_is_ok() {
        assert!(DomainError::from_field_errors(vec![]).is_ok());
        assert!(matches!(
            DomainError::from_field_errors(vec![FieldError::new("price", "negative")]),
            Err(DomainError::Validation(_))
        ));
    }
}
