//! Multi-partition buffer with priority-proportional sampling.
use super::{
    partition::{PriorityPartition, Token},
    score::priority_score,
};
use crate::{
    error::{BufferError, Result},
    BufferConfig, PartitionKey, PartitionedBufferBase, TypeRegistry,
};
use log::debug;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// A batch returned by [`PriorityBuffer`]'s `sample()`.
#[derive(Debug)]
pub struct Sampled<'a, B, K> {
    /// The stored batch.
    pub batch: &'a B,

    /// Handle of the sampled entry, used by [`PriorityBuffer::update_priority`].
    pub token: Token,

    /// Key of the partition the batch was sampled from.
    pub key: PartitionKey<K>,
}

/// A buffer of partitions sorted by priority score.
///
/// [`put`](PartitionedBufferBase::put) takes a batch together with its raw priority.
/// Putting into a full partition evicts its lowest-score entry before the new batch is
/// inserted, so the new batch is always stored. `sample()` returns the batch with a
/// [`Token`] which can be passed to [`update_priority`](Self::update_priority) once a new
/// priority of the batch is known.
///
/// ```rust
/// use partition_replay::{PartitionKey, PartitionedBufferBase, PriorityBuffer};
///
/// let mut buffer = PriorityBuffer::<&str, u32>::new(2).unwrap();
/// buffer.put_default(("a", 1.0)).unwrap();
/// buffer.put_default(("b", 5.0)).unwrap();
/// buffer.put_default(("c", 0.1)).unwrap();
/// assert_eq!(buffer.get_batches(None), vec![&"c", &"b"]);
///
/// let sampled = buffer.sample().unwrap();
/// let (token, key) = (sampled.token, sampled.key);
/// buffer.update_priority(token, 10.0, &key).unwrap();
/// ```
pub struct PriorityBuffer<B, K: Ord + Clone = u32> {
    size: usize,
    types: TypeRegistry<K>,
    partitions: Vec<PriorityPartition<B>>,
    seq: u64,
    rng: StdRng,
}

impl<B, K: Ord + Clone> PriorityBuffer<B, K> {
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
    /// use partition_replay::{BufferConfig, PriorityBuffer};
    ///
    /// let config = BufferConfig::default().size(100).seed(0);
    /// let buffer = PriorityBuffer::<Vec<f32>, u32>::build(&config).unwrap();
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
            partitions: Vec::new(),
            seq: 0,
            rng,
        })
    }

    /// Keys in partition-creation order.
    pub fn keys(&self) -> &[PartitionKey<K>] {
        self.types.keys()
    }

    fn next_token(&mut self, score: f64) -> Token {
        let token = Token::new(score, self.seq);
        self.seq += 1;
        token
    }

    fn partition(&self, key: &PartitionKey<K>) -> Option<&PriorityPartition<B>> {
        self.types.index_of(key).map(|ix| &self.partitions[ix])
    }

    /// Replaces the priority of a sampled entry and returns the entry's new token.
    ///
    /// The batch itself is left untouched. `token` is invalidated by this call.
    ///
    /// # Errors
    ///
    /// * [`BufferError::InvalidPriority`] if `priority` is not finite; the entry is kept
    ///   with its old priority.
    /// * [`BufferError::InvalidToken`] if `token` does not identify a live entry of the
    ///   partition of `key`.
    pub fn update_priority(
        &mut self,
        token: Token,
        priority: f64,
        key: &PartitionKey<K>,
    ) -> Result<Token> {
        let score = priority_score(priority)?;
        let ix = self.types.index_of(key).ok_or(BufferError::InvalidToken)?;
        let batch = self.partitions[ix]
            .remove(&token)
            .ok_or(BufferError::InvalidToken)?;
        let new_token = self.next_token(score);
        self.partitions[ix].insert(new_token, batch, self.size);
        Ok(new_token)
    }

    /// Returns `true` if `token` identifies a live entry of the partition of `key`.
    pub fn is_live(&self, token: &Token, key: &PartitionKey<K>) -> bool {
        self.partition(key).map_or(false, |p| p.contains(token))
    }

    /// Probability that a sample from the partition of `key` returns the entry of `token`.
    pub fn probability(&self, token: &Token, key: &PartitionKey<K>) -> Option<f64> {
        let partition = self.partition(key)?;
        if !partition.contains(token) {
            return None;
        }
        Some(token.score() / partition.total())
    }
}

impl<B, K: Ord + Clone> PartitionedBufferBase for PriorityBuffer<B, K> {
    type Key = K;
    type Batch = B;
    type Item = (B, f64);
    type Sample<'a> = Sampled<'a, B, K> where Self: 'a;

    fn capacity(&self) -> usize {
        self.size
    }

    fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// Stores a batch with its raw priority.
    ///
    /// Fails with [`BufferError::InvalidPriority`] if the priority is not finite.
    fn put(&mut self, (batch, priority): (B, f64), key: PartitionKey<K>) -> Result<()> {
        let score = priority_score(priority)?;
        let ix = self.get_type(&key);
        let token = self.next_token(score);
        self.partitions[ix].insert(token, batch, self.size);
        Ok(())
    }

    fn sample(&mut self) -> Result<Self::Sample<'_>> {
        let non_empty = self
            .partitions
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_empty())
            .map(|(ix, _)| ix)
            .collect::<Vec<_>>();
        let &ix = non_empty
            .choose(&mut self.rng)
            .ok_or(BufferError::EmptyBuffer)?;
        let key = self.types.keys()[ix].clone();
        let (token, batch) = self.partitions[ix]
            .sample(&mut self.rng)
            .ok_or(BufferError::EmptyBuffer)?;
        Ok(Sampled { batch, token, key })
    }

    fn count(&self, key: Option<&PartitionKey<K>>) -> usize {
        match key {
            None => self.partitions.iter().map(|p| p.len()).sum(),
            Some(key) => self.partition(key).map_or(0, |p| p.len()),
        }
    }

    /// Stored batches in ascending score order within each partition.
    fn get_batches(&self, key: Option<&PartitionKey<K>>) -> Vec<&B> {
        match key {
            None => self.partitions.iter().flat_map(|p| p.values()).collect(),
            Some(key) => self
                .partition(key)
                .map_or_else(Vec::new, |p| p.values().collect()),
        }
    }

    fn get_type(&mut self, key: &PartitionKey<K>) -> usize {
        let (ix, created) = self.types.resolve(key);
        if created {
            self.partitions.push(PriorityPartition::new());
        }
        ix
    }

    /// Removes every partition. The sequence counter keeps running, so tokens issued
    /// before this call never identify later entries.
    fn clean(&mut self) {
        debug!("Clean {} partitions", self.partitions.len());
        self.types.clear();
        self.partitions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(size: usize) -> PriorityBuffer<&'static str, u32> {
        PriorityBuffer::build(&BufferConfig::default().size(size)).unwrap()
    }

    #[test]
    fn test_evicts_minimum() {
        let mut buf = buffer(2);
        buf.put_default(("a", 1.0)).unwrap();
        buf.put_default(("b", 5.0)).unwrap();
        buf.put_default(("c", 0.1)).unwrap();
        // "a" is the minimum when "c" arrives; "c" is stored although it scores lower.
        assert_eq!(buf.get_batches(None), vec![&"c", &"b"]);

        buf.put_default(("d", 2.0)).unwrap();
        assert_eq!(buf.get_batches(None), vec![&"d", &"b"]);

        buf.put_default(("e", 0.01)).unwrap();
        assert_eq!(buf.get_batches(None), vec![&"e", &"b"]);
        assert_eq!(buf.count(Some(&PartitionKey::Default)), 2);
    }

    #[test]
    fn test_invalid_priority_is_not_stored() {
        let mut buf = buffer(2);
        assert_eq!(
            buf.put_default(("a", f64::INFINITY)),
            Err(BufferError::InvalidPriority(f64::INFINITY))
        );
        assert!(buf.is_empty(None));
    }

    #[test]
    fn test_update_keeps_batch() {
        let mut buf = buffer(4);
        let key = PartitionKey::Id(3);
        buf.put(("a", 2.0), key).unwrap();
        let token = buf.sample().unwrap().token;
        let new_token = buf.update_priority(token, 7.0, &key).unwrap();

        assert!(!buf.is_live(&token, &key));
        assert!(buf.is_live(&new_token, &key));
        assert_eq!(buf.count(None), 1);
        assert_eq!(buf.get_batches(Some(&key)), vec![&"a"]);
        assert_eq!(
            buf.update_priority(token, 1.0, &key),
            Err(BufferError::InvalidToken)
        );
    }

    #[test]
    fn test_update_with_invalid_priority_keeps_entry() {
        let mut buf = buffer(4);
        buf.put_default(("a", 2.0)).unwrap();
        let token = buf.sample().unwrap().token;
        assert_eq!(
            buf.update_priority(token, f64::NAN, &PartitionKey::Default)
                .map_err(|e| matches!(e, BufferError::InvalidPriority(_))),
            Err(true)
        );
        assert!(buf.is_live(&token, &PartitionKey::Default));
    }

    #[test]
    fn test_update_unknown_partition() {
        let mut buf = buffer(4);
        buf.put_default(("a", 2.0)).unwrap();
        let token = buf.sample().unwrap().token;
        assert_eq!(
            buf.update_priority(token, 1.0, &PartitionKey::Id(0)),
            Err(BufferError::InvalidToken)
        );
        assert_eq!(buf.num_partitions(), 1);
    }

    #[test]
    fn test_token_after_clean() {
        let mut buf = buffer(4);
        buf.put_default(("a", 2.0)).unwrap();
        let token = buf.sample().unwrap().token;
        buf.clean();
        buf.put_default(("a", 2.0)).unwrap();
        assert_eq!(
            buf.update_priority(token, 1.0, &PartitionKey::Default),
            Err(BufferError::InvalidToken)
        );
    }
}
