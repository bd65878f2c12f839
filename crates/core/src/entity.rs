//! Entity trait: records with a stable identity across edits.

/// A record identified by a strongly-typed id rather than by its fields.
pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    fn id(&self) -> &Self::Id;

    /// Same identity, regardless of current field values.
    fn same_entity(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

/// Index of the entity with `id` in `items`, if present.
pub fn position_of<E: Entity>(items: &[E], id: &E::Id) -> Option<usize> {
    items.iter().position(|e| e.id() == id)
}
