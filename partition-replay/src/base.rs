//! Interface shared by the partitioned buffers.
//!
//! A buffer is split into partitions, each identified by a [`PartitionKey`] and holding
//! at most [`capacity`](PartitionedBufferBase::capacity) batches. Partitions are created
//! on the first `put` (or [`get_type`](PartitionedBufferBase::get_type)) with a new key and
//! live until [`clean`](PartitionedBufferBase::clean).
//!
//! The two implementations differ in how entries are ordered, evicted and sampled:
//!
//! * [`PartitionedBuffer`](crate::PartitionedBuffer) keeps insertion order, evicts the
//!   oldest entry and samples uniformly.
//! * [`PriorityBuffer`](crate::PriorityBuffer) keeps entries sorted by priority score,
//!   evicts the lowest score and samples proportionally to the score.
use crate::{error::Result, PartitionKey};

/// Interface of multi-partition experience buffers.
///
/// Query methods never create partitions. Asking for a key that has not been seen
/// behaves as asking for an empty partition.
pub trait PartitionedBufferBase {
    /// Caller-supplied partition identifier, e.g., a worker id.
    type Key: Ord + Clone;

    /// Opaque value stored by the buffer.
    type Batch;

    /// What [`put`](Self::put) consumes.
    type Item;

    /// What [`sample`](Self::sample) returns.
    type Sample<'a>
    where
        Self: 'a;

    /// Maximum number of batches per partition.
    fn capacity(&self) -> usize;

    /// Number of partitions created so far.
    fn num_partitions(&self) -> usize;

    /// Stores an item into the partition of `key`, evicting an entry if the partition is full.
    fn put(&mut self, item: Self::Item, key: PartitionKey<Self::Key>) -> Result<()>;

    /// Samples one stored batch without removing it.
    ///
    /// Fails with [`BufferError::EmptyBuffer`](crate::BufferError::EmptyBuffer) if
    /// no partition holds an entry.
    fn sample(&mut self) -> Result<Self::Sample<'_>>;

    /// Number of batches in the partition of `key`, or in all partitions if `None`.
    fn count(&self, key: Option<&PartitionKey<Self::Key>>) -> usize;

    /// Stored batches of one partition, or of all partitions in creation order if `None`.
    fn get_batches(&self, key: Option<&PartitionKey<Self::Key>>) -> Vec<&Self::Batch>;

    /// Returns the partition index of `key`, creating the partition on first use.
    fn get_type(&mut self, key: &PartitionKey<Self::Key>) -> usize;

    /// Removes every partition and forgets all keys.
    fn clean(&mut self);

    /// Stores an item into the default partition.
    fn put_default(&mut self, item: Self::Item) -> Result<()> {
        self.put(item, PartitionKey::Default)
    }

    /// Total number of stored batches.
    fn len(&self) -> usize {
        self.count(None)
    }

    /// Returns `true` if at least `n` batches are stored.
    fn has_at_least(&self, n: usize, key: Option<&PartitionKey<Self::Key>>) -> bool {
        self.count(key) >= n
    }

    /// Returns `true` if exactly `n` batches are stored.
    fn has_exactly(&self, n: usize, key: Option<&PartitionKey<Self::Key>>) -> bool {
        self.count(key) == n
    }

    /// Returns `true` if the partition is at capacity.
    ///
    /// With `None`, every partition must be at capacity. This holds trivially for a
    /// buffer without partitions.
    fn is_full(&self, key: Option<&PartitionKey<Self::Key>>) -> bool {
        match key {
            Some(_) => self.has_exactly(self.capacity(), key),
            None => self.has_exactly(self.capacity() * self.num_partitions(), None),
        }
    }

    /// Returns `true` if no batch is stored.
    fn is_empty(&self, key: Option<&PartitionKey<Self::Key>>) -> bool {
        !self.has_at_least(1, key)
    }
}
