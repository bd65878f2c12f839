//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values
/// (a `Price` of `9.99` equals any other `Price` of `9.99`). To "modify" one,
/// construct a new value.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
