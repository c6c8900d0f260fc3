//! Multi-partition buffer with priority-proportional sampling.
//!
//! Entries of a partition are sorted by priority score
//! $s = \epsilon + |p|^\alpha$ with $\epsilon = 10^{-6}$ and $\alpha = 0.6$, where $p$ is
//! the raw priority given by the caller (typically a TD error). A full partition evicts its
//! lowest score. Sampling picks a non-empty partition uniformly at random, then an entry
//! with probability $s_i / \sum_j s_j$ by a binary search over the prefix sums of the sorted
//! scores. The prefix sums are cached per partition and rebuilt lazily after a mutation.
mod base;
mod partition;
mod score;
pub use base::{PriorityBuffer, Sampled};
pub use partition::Token;
pub use score::{priority_score, ALPHA, EPS};
