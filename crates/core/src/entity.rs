//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Every stored record has a primary identifier and a natural key (a
/// human-meaningful unique value such as a username). For some records the two
/// coincide.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Returns the natural key used for uniqueness and ordering.
    fn natural_key(&self) -> &str;
}
