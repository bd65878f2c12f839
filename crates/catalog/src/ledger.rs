//! Version ledger: the per-product version history and its promotion rules.
//!
//! Invariants upheld by every successful operation:
//! - at most one version of the product has `is_current = true`
//!   (exactly one right after a save)
//! - `version_number` is unique within the product
//! - an assigned `version_number` never changes
//!
//! The ledger is pure. Stores load a product's history into it inside their
//! per-product critical section, run operations, and write the result back.

use storefront_core::{DomainError, DomainResult, ProductId, VersionId, position_of};

use crate::version::{Version, VersionBatch, VersionDraft};

/// Display name used when a product has no current version.
pub const NO_ACTIVE_VERSION: &str = "Отсутствует";

pub fn active_version_name(active: Option<&Version>) -> String {
    active
        .and_then(|v| v.version_name.clone())
        .unwrap_or_else(|| NO_ACTIVE_VERSION.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionLedger {
    product_id: ProductId,
    versions: Vec<Version>,
}

impl VersionLedger {
    /// Build the ledger for `product_id`; records of other products are ignored.
    pub fn load(product_id: ProductId, versions: impl IntoIterator<Item = Version>) -> Self {
        let versions = versions
            .into_iter()
            .filter(|v| v.product_id == Some(product_id))
            .collect();
        Self { product_id, versions }
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// `max(version_number) + 1`, or `1` for an empty history.
    pub fn next_version_number(&self) -> u32 {
        self.versions
            .iter()
            .map(|v| v.version_number)
            .max()
            .map_or(1, |max| max.saturating_add(1))
    }

    pub fn active(&self) -> Option<&Version> {
        self.versions.iter().find(|v| v.is_current)
    }

    pub fn get(&self, id: VersionId) -> Option<&Version> {
        position_of(&self.versions, &id).map(|idx| &self.versions[idx])
    }

    /// History in default order (current first, then by number).
    pub fn versions(&self) -> Vec<Version> {
        let mut out = self.versions.clone();
        out.sort_by(Version::default_order);
        out
    }

    pub fn into_versions(mut self) -> Vec<Version> {
        self.versions.sort_by(Version::default_order);
        self.versions
    }

    /// Save a version and make it the current one.
    ///
    /// Numbering, uniqueness and immutability are checked before anything is
    /// touched, so a failed save leaves the ledger unchanged.
    pub fn save(&mut self, draft: VersionDraft) -> DomainResult<Version> {
        if draft.product_id != self.product_id {
            return Err(DomainError::invariant("version draft targets a different product"));
        }
        draft.validate()?;

        let existing = match draft.id {
            Some(id) => match self.get(id) {
                Some(v) => Some(v.clone()),
                None => {
                    return Err(DomainError::invariant(format!(
                        "version {} does not belong to product {}",
                        id, self.product_id
                    )));
                }
            },
            None => None,
        };
        let requested = draft.version_number.filter(|n| *n > 0);

        let version_number = match (&existing, requested) {
            (Some(e), Some(n)) if n != e.version_number => {
                return Err(DomainError::invariant(format!(
                    "version_number {} is already assigned and cannot change to {}",
                    e.version_number, n
                )));
            }
            (Some(e), _) => e.version_number,
            (None, Some(n)) => n,
            (None, None) => self.next_version_number(),
        };

        let id = draft.id.unwrap_or_else(VersionId::new);
        if self
            .versions
            .iter()
            .any(|v| v.id != id && v.version_number == version_number)
        {
            return Err(DomainError::constraint(format!(
                "version_number {} already exists for product {}",
                version_number, self.product_id
            )));
        }

        for v in self.versions.iter_mut().filter(|v| v.is_current) {
            v.is_current = false;
        }

        let saved = Version {
            id,
            product_id: Some(self.product_id),
            version_number,
            version_name: draft.version_name,
            is_current: true,
        };
        match position_of(&self.versions, &id) {
            Some(idx) => self.versions[idx] = saved.clone(),
            None => self.versions.push(saved.clone()),
        }

        tracing::info!(
            product_id = %self.product_id,
            version_number,
            "version promoted to current"
        );
        Ok(saved)
    }

    pub fn remove(&mut self, id: VersionId) -> DomainResult<Version> {
        let idx = position_of(&self.versions, &id).ok_or(DomainError::NotFound)?;
        Ok(self.versions.remove(idx))
    }

    /// Apply a validated sub-form all-or-nothing.
    ///
    /// Returns the saved versions in submission order.
    pub fn apply_batch(&mut self, batch: &VersionBatch) -> DomainResult<Vec<Version>> {
        let mut scratch = self.clone();
        for id in &batch.removals {
            scratch.remove(*id)?;
        }
        let mut saved = Vec::with_capacity(batch.saves.len());
        for draft in &batch.saves {
            saved.push(scratch.save(draft.clone())?);
        }
        *self = scratch;
        Ok(saved)
    }
}
