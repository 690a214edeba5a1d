//! Internal implementation details.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Type-erased shared value as stored and returned by the container
pub type AnyArc = Arc<dyn Any + Send + Sync>;

#[cfg(feature = "ahash")]
pub(crate) type HashBuilder = ahash::RandomState;
#[cfg(not(feature = "ahash"))]
pub(crate) type HashBuilder = std::collections::hash_map::RandomState;

/// HashMap used by the binding store and lookup tables
pub(crate) type Map<K, V> = HashMap<K, V, HashBuilder>;
pub(crate) type Set<K> = HashSet<K, HashBuilder>;

pub(crate) fn new_map<K, V>() -> Map<K, V> {
    Map::with_hasher(HashBuilder::default())
}

pub(crate) fn new_set<K>() -> Set<K> {
    Set::with_hasher(HashBuilder::default())
}
