//! Partition keys and the registry mapping them to dense partition indices.
use log::debug;
use std::collections::BTreeMap;

/// Identifies a partition of a buffer.
///
/// [`PartitionKey::Default`] is the default partition. It is a value of its own
/// and never collides with a caller-supplied id, `Id(0)` included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PartitionKey<K> {
    /// The default partition.
    Default,

    /// A partition identified by the caller, e.g., a worker id.
    Id(K),
}

impl<K> From<K> for PartitionKey<K> {
    fn from(id: K) -> Self {
        PartitionKey::Id(id)
    }
}

impl<K> std::default::Default for PartitionKey<K> {
    fn default() -> Self {
        PartitionKey::Default
    }
}

/// Assigns dense partition indices to keys in first-seen order.
///
/// An index, once assigned, is never reassigned or removed until [`TypeRegistry::clear`].
#[derive(Debug, Clone)]
pub struct TypeRegistry<K: Ord> {
    indices: BTreeMap<PartitionKey<K>, usize>,
    keys: Vec<PartitionKey<K>>,
}

impl<K: Ord + Clone> TypeRegistry<K> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            indices: BTreeMap::new(),
            keys: Vec::new(),
        }
    }

    /// Returns the index of `key`, assigning the next free index on first use.
    ///
    /// The second element is `true` if the partition was created by this call.
    pub fn resolve(&mut self, key: &PartitionKey<K>) -> (usize, bool) {
        if let Some(&ix) = self.indices.get(key) {
            return (ix, false);
        }
        let ix = self.keys.len();
        self.indices.insert(key.clone(), ix);
        self.keys.push(key.clone());
        debug!("Create partition {}", ix);
        (ix, true)
    }

    /// Returns the index of `key` without creating a partition.
    pub fn index_of(&self, key: &PartitionKey<K>) -> Option<usize> {
        self.indices.get(key).copied()
    }

    /// Keys in partition-creation order; `keys()[i]` is the key of partition `i`.
    pub fn keys(&self) -> &[PartitionKey<K>] {
        &self.keys
    }

    /// Number of registered partitions.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if no key has been registered.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Forgets every key.
    pub fn clear(&mut self) {
        self.indices.clear();
        self.keys.clear();
    }
}

impl<K: Ord + Clone> std::default::Default for TypeRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{PartitionKey, TypeRegistry};

    #[test]
    fn test_first_seen_order() {
        let mut reg = TypeRegistry::<u32>::new();
        assert_eq!(reg.resolve(&PartitionKey::Id(7)), (0, true));
        assert_eq!(reg.resolve(&PartitionKey::Default), (1, true));
        assert_eq!(reg.resolve(&PartitionKey::Id(0)), (2, true));
        assert_eq!(reg.resolve(&PartitionKey::Id(7)), (0, false));
        assert_eq!(reg.index_of(&PartitionKey::Id(3)), None);
        assert_eq!(reg.len(), 3);
        assert_eq!(
            reg.keys(),
            &[PartitionKey::Id(7), PartitionKey::Default, PartitionKey::Id(0)]
        );
    }

    #[test]
    fn test_default_is_not_zero() {
        assert_ne!(PartitionKey::Default, PartitionKey::Id(0u8));
        assert_eq!(PartitionKey::from(0u8), PartitionKey::Id(0));
        assert_eq!(PartitionKey::<u8>::default(), PartitionKey::Default);
    }

    #[test]
    fn test_clear() {
        let mut reg = TypeRegistry::<&str>::new();
        reg.resolve(&"a".into());
        reg.resolve(&"b".into());
        reg.clear();
        assert!(reg.is_empty());
        assert_eq!(reg.resolve(&"b".into()), (0, true));
    }
}
