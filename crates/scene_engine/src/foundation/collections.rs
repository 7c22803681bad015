//! Specialized collection types

pub use slotmap::{new_key_type, DefaultKey, SlotMap};

/// Handle-based map using slot map for stable references
pub type HandleMap<K, T> = SlotMap<K, T>;

/// Untyped handle for stable references into engine-owned registries
pub type Handle = DefaultKey;
