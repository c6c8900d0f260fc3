//! Bounded multi-partition FIFO buffer with uniform sampling.
use crate::{
    error::{BufferError, Result},
    BufferConfig, PartitionKey, PartitionedBufferBase, TypeRegistry,
};
use log::{debug, trace};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use std::collections::VecDeque;

/// A buffer of independent FIFO partitions.
///
/// Each partition holds at most `size` batches in insertion order. Putting into a full
/// partition evicts its oldest batch. [`sample`](PartitionedBufferBase::sample) picks a
/// non-empty partition uniformly at random, then a batch of that partition uniformly
/// at random.
///
/// ```rust
/// use partition_replay::{PartitionKey, PartitionedBuffer, PartitionedBufferBase};
///
/// let mut buffer = PartitionedBuffer::<&str, u32>::new(2).unwrap();
/// let key = PartitionKey::Id(0);
/// for b in ["a", "b", "c"] {
///     buffer.put(b, key).unwrap();
/// }
/// assert_eq!(buffer.get_batches(Some(&key)), vec![&"b", &"c"]);
/// assert!(buffer.is_full(Some(&key)));
/// ```
pub struct PartitionedBuffer<B, K: Ord + Clone = u32> {
    size: usize,
    types: TypeRegistry<K>,
    batches: Vec<VecDeque<B>>,
    rng: StdRng,
}

impl<B, K: Ord + Clone> PartitionedBuffer<B, K> {
    /// Creates a buffer holding at most `size` batches per partition.
    ///
    /// The random generator is seeded from the OS; use [`build`](Self::build) for
    /// reproducible sampling.
    ///
    /// # Arguments
    ///
    /// * `size` - Maximum number of batches per partition
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidCapacity`] if `size` is zero
    pub fn new(size: usize) -> Result<Self> {
        Self::with_rng(size, StdRng::from_entropy())
    }

    /// Creates a buffer from a configuration.
    ///
    /// Sampling uses a random generator seeded with `config.seed`.
    ///
    /// # Arguments
    ///
    /// * `config` - Capacity per partition and random seed
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidCapacity`] if `config.size` is zero
    ///
    /// # Examples
    ///
    /// ```rust
    /// use partition_replay::{BufferConfig, PartitionedBuffer};
    ///
    /// let config = BufferConfig::default().size(100).seed(0);
    /// let buffer = PartitionedBuffer::<Vec<f32>, u32>::build(&config).unwrap();
    /// ```
    pub fn build(config: &BufferConfig) -> Result<Self> {
        Self::with_rng(config.size, StdRng::seed_from_u64(config.seed))
    }

    fn with_rng(size: usize, rng: StdRng) -> Result<Self> {
        if size == 0 {
            return Err(BufferError::InvalidCapacity(size));
        }
        Ok(Self {
            size,
            types: TypeRegistry::new(),
            batches: Vec::new(),
            rng,
        })
    }

    /// Keys in partition-creation order.
    pub fn keys(&self) -> &[PartitionKey<K>] {
        self.types.keys()
    }

    fn partition(&self, key: &PartitionKey<K>) -> Option<&VecDeque<B>> {
        self.types.index_of(key).map(|ix| &self.batches[ix])
    }
}

impl<B, K: Ord + Clone> PartitionedBufferBase for PartitionedBuffer<B, K> {
    type Key = K;
    type Batch = B;
    type Item = B;
    type Sample<'a> = &'a B where Self: 'a;

    fn capacity(&self) -> usize {
        self.size
    }

    fn num_partitions(&self) -> usize {
        self.batches.len()
    }

    fn put(&mut self, batch: B, key: PartitionKey<K>) -> Result<()> {
        let ix = self.get_type(&key);
        let partition = &mut self.batches[ix];
        if partition.len() >= self.size {
            partition.pop_front();
            trace!("Evict oldest batch from partition {}", ix);
        }
        partition.push_back(batch);
        Ok(())
    }

    fn sample(&mut self) -> Result<Self::Sample<'_>> {
        let non_empty = self
            .batches
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_empty())
            .map(|(ix, _)| ix)
            .collect::<Vec<_>>();
        let &ix = non_empty
            .choose(&mut self.rng)
            .ok_or(BufferError::EmptyBuffer)?;
        let partition = &self.batches[ix];
        let i = self.rng.gen_range(0..partition.len());
        Ok(&partition[i])
    }

    fn count(&self, key: Option<&PartitionKey<K>>) -> usize {
        match key {
            None => self.batches.iter().map(|p| p.len()).sum(),
            Some(key) => self.partition(key).map_or(0, |p| p.len()),
        }
    }

    fn get_batches(&self, key: Option<&PartitionKey<K>>) -> Vec<&B> {
        match key {
            None => self.batches.iter().flatten().collect(),
            Some(key) => self
                .partition(key)
                .map_or_else(Vec::new, |p| p.iter().collect()),
        }
    }

    fn get_type(&mut self, key: &PartitionKey<K>) -> usize {
        let (ix, created) = self.types.resolve(key);
        if created {
            self.batches.push(VecDeque::with_capacity(self.size));
        }
        ix
    }

    fn clean(&mut self) {
        debug!("Clean {} partitions", self.batches.len());
        self.types.clear();
        self.batches.clear();
    }
}
