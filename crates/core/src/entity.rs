//! Entity trait: identity assigned by the remote ledger.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + Ord + core::hash::Hash + core::fmt::Debug + Into<u64>;

    /// Human-readable entity name used in errors and logs (e.g. `"product"`).
    const NAME: &'static str;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
