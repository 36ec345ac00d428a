//! Utility types.
//!
//! All maps and sets used by the generator iterate in insertion order, so
//! equal inputs always produce identical state numbering, tables, and
//! conflict logs.

type BuildHasher = std::hash::BuildHasherDefault<rustc_hash::FxHasher>;

pub type Map<K, V> = indexmap::IndexMap<K, V, BuildHasher>;
pub type Set<T> = indexmap::IndexSet<T, BuildHasher>;
