//! Priority-sorted storage of one partition.
use log::trace;
use ordered_float::OrderedFloat;
use rand::Rng;
use std::collections::BTreeMap;

/// Handle of a stored entry, returned by [`PriorityBuffer::sample`](crate::PriorityBuffer).
///
/// A token is the pair of the entry's priority score and a buffer-wide insertion sequence
/// number, which orders entries with equal scores and makes every entry distinct. It stays
/// valid while the entry is stored, regardless of other insertions and evictions, and
/// becomes invalid once the entry is evicted, re-prioritized or the buffer is cleaned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token {
    score: OrderedFloat<f64>,
    seq: u64,
}

impl Token {
    pub(super) fn new(score: f64, seq: u64) -> Self {
        Self {
            score: OrderedFloat(score),
            seq,
        }
    }

    /// Priority score of the entry.
    pub fn score(&self) -> f64 {
        self.score.into_inner()
    }
}

/// Prefix sums of the sorted scores and the tokens at each position.
struct SampleIndex {
    cumsum: Vec<f64>,
    tokens: Vec<Token>,
}

impl SampleIndex {
    fn build<B>(entries: &BTreeMap<Token, B>) -> Self {
        let mut acc = 0f64;
        let mut cumsum = Vec::with_capacity(entries.len());
        let mut tokens = Vec::with_capacity(entries.len());
        for token in entries.keys() {
            acc += token.score();
            cumsum.push(acc);
            tokens.push(*token);
        }
        Self { cumsum, tokens }
    }

    fn total(&self) -> f64 {
        self.cumsum.last().copied().unwrap_or(0.0)
    }

    /// Position of the leftmost entry whose cumulative score is at least `mass`.
    fn search(&self, mass: f64) -> usize {
        let ix = self.cumsum.partition_point(|&c| c < mass);
        ix.min(self.cumsum.len() - 1)
    }
}

/// Entries of one partition in ascending order of [`Token`].
pub(super) struct PriorityPartition<B> {
    entries: BTreeMap<Token, B>,
    index: Option<SampleIndex>,
}

impl<B> PriorityPartition<B> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            index: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts an entry, evicting the lowest-score entry first if `capacity` is reached.
    ///
    /// The inserted entry is always stored, even if its score is below every stored score.
    pub fn insert(&mut self, token: Token, batch: B, capacity: usize) {
        if self.entries.len() >= capacity {
            if let Some((evicted, _)) = self.entries.pop_first() {
                trace!("Evict entry with score {}", evicted.score());
            }
        }
        self.entries.insert(token, batch);
        self.index = None;
    }

    pub fn remove(&mut self, token: &Token) -> Option<B> {
        let batch = self.entries.remove(token)?;
        self.index = None;
        Some(batch)
    }

    pub fn contains(&self, token: &Token) -> bool {
        self.entries.contains_key(token)
    }

    /// Sum of the scores of all entries.
    pub fn total(&self) -> f64 {
        match &self.index {
            Some(index) => index.total(),
            None => self.entries.keys().map(Token::score).sum(),
        }
    }

    /// Samples an entry with probability proportional to its score.
    ///
    /// The prefix sums are rebuilt in `O(n)` if the partition changed since the last
    /// sample, otherwise the search is `O(log n)`.
    pub fn sample<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<(Token, &B)> {
        if self.entries.is_empty() {
            return None;
        }
        if self.index.is_none() {
            trace!("Rebuild prefix sums of {} entries", self.entries.len());
        }
        let entries = &self.entries;
        let index = self.index.get_or_insert_with(|| SampleIndex::build(entries));
        let mass = rng.gen::<f64>() * index.total();
        let token = index.tokens[index.search(mass)];
        entries.get(&token).map(|batch| (token, batch))
    }

    /// Batches in ascending score order.
    pub fn values(&self) -> impl Iterator<Item = &B> {
        self.entries.values()
    }

    #[cfg(test)]
    fn is_index_fresh(&self) -> bool {
        self.index.is_some()
    }
}
