use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, FieldError, ProductId, VersionId};

use crate::char_len;

pub const VERSION_NAME_MAX_LEN: usize = 50;

/// A recorded version of a product.
///
/// `product_id` becomes `None` when the product is deleted; the record itself
/// survives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub id: VersionId,
    pub product_id: Option<ProductId>,
    pub version_number: u32,
    pub version_name: Option<String>,
    pub is_current: bool,
}

impl Version {
    /// Default ordering: current first, then by version number ascending.
    pub fn default_order(a: &Version, b: &Version) -> Ordering {
        b.is_current
            .cmp(&a.is_current)
            .then(a.version_number.cmp(&b.version_number))
    }
}

impl Entity for Version {
    type Id = VersionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A version save request.
///
/// `id: None` inserts a new version; `version_number: None` (or `0`) asks the
/// ledger to number it. There is no `is_current` input: every save promotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDraft {
    #[serde(default)]
    pub id: Option<VersionId>,
    pub product_id: ProductId,
    #[serde(default)]
    pub version_number: Option<u32>,
    #[serde(default)]
    pub version_name: Option<String>,
}

impl VersionDraft {
    pub fn new(product_id: ProductId, version_name: impl Into<String>) -> Self {
        Self {
            id: None,
            product_id,
            version_number: None,
            version_name: Some(version_name.into()),
        }
    }

    pub fn numbered(mut self, version_number: u32) -> Self {
        self.version_number = Some(version_number);
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        DomainError::from_field_errors(self.field_errors("version_name"))
    }

    fn field_errors(&self, field: &str) -> Vec<FieldError> {
        match &self.version_name {
            Some(name) if char_len(name) > VERSION_NAME_MAX_LEN => vec![FieldError::new(
                field,
                format!("ensure this value has at most {VERSION_NAME_MAX_LEN} characters"),
            )],
            _ => Vec::new(),
        }
    }
}

/// One entry of the version sub-form submitted with a product edit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct VersionEntry {
    #[serde(default)]
    pub id: Option<VersionId>,
    #[serde(default)]
    pub version_number: Option<u32>,
    #[serde(default)]
    pub version_name: Option<String>,
    /// Whether the submitter marked this entry active.
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub delete: bool,
}

/// A validated version sub-form: removals first, then saves in order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionBatch {
    pub removals: Vec<VersionId>,
    pub saves: Vec<VersionDraft>,
}

impl VersionBatch {
    /// Validate a submitted sub-form for `product_id`.
    ///
    /// More than one entry marked active fails the whole submission with a
    /// single form-level error.
    pub fn from_entries(product_id: ProductId, entries: Vec<VersionEntry>) -> DomainResult<Self> {
        let active = entries.iter().filter(|e| !e.delete && e.is_current).count();
        if active > 1 {
            return Err(DomainError::MultipleActiveVersions);
        }

        let mut batch = VersionBatch::default();
        let mut errors = Vec::new();
        for (idx, entry) in entries.into_iter().enumerate() {
            if entry.delete {
                // Deleting a never-saved entry is a no-op.
                if let Some(id) = entry.id {
                    batch.removals.push(id);
                }
                continue;
            }
            let draft = VersionDraft {
                id: entry.id,
                product_id,
                version_number: entry.version_number,
                version_name: entry.version_name,
            };
            errors.extend(draft.field_errors(&format!("versions[{idx}].version_name")));
            batch.saves.push(draft);
        }

        DomainError::from_field_errors(errors)?;
        Ok(batch)
    }

    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.saves.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, is_current: bool) -> VersionEntry {
        VersionEntry {
            version_name: Some(name.to_string()),
            is_current,
            ..VersionEntry::default()
        }
    }

    #[test]
    fn two_active_entries_fail_with_single_form_error() {
        let err = VersionBatch::from_entries(
            ProductId::new(),
            vec![entry("1.0", true), entry("2.0", true)],
        )
        .unwrap_err();
        assert_eq!(err, DomainError::MultipleActiveVersions);
    }

    #[test]
    fn deleted_entries_do_not_count_as_active() {
        let id = VersionId::new();
        let mut removed = entry("old", true);
        removed.id = Some(id);
        removed.delete = true;
        let batch = VersionBatch::from_entries(ProductId::new(), vec![removed, entry("new", true)]).unwrap();
        assert_eq!(batch.removals, vec![id]);
        assert_eq!(batch.saves.len(), 1);
    }

    #[test]
    fn overlong_version_name_is_reported_by_index() {
        let err = VersionBatch::from_entries(
            ProductId::new(),
            vec![entry("ok", false), entry(&"v".repeat(51), false)],
        )
        .unwrap_err();
        match err {
            DomainError::Validation(errors) => {
                assert_eq!(errors[0].field.as_deref(), Some("versions[1].version_name"));
            }
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn default_order_is_current_first_then_number() {
        let product_id = Some(ProductId::new());
        let mk = |n, current| Version {
            id: VersionId::new(),
            product_id,
            version_number: n,
            version_name: None,
            is_current: current,
        };
        let mut versions = vec![mk(1, false), mk(3, true), mk(2, false)];
        versions.sort_by(Version::default_order);
        let numbers: Vec<u32> = versions.iter().map(|v| v.version_number).collect();
        assert_eq!(numbers, vec![3, 1, 2]);
    }
}
