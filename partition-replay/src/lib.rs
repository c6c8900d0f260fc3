#![warn(missing_docs)]
//! Multi-partition experience buffers for off-policy replay.
//!
//! A buffer is split into partitions, one per logical stream of batches (e.g., per
//! worker), each bounded by the same capacity. Two implementations share the
//! [`PartitionedBufferBase`] interface:
//!
//! * [`PartitionedBuffer`]: FIFO partitions with uniform sampling.
//! * [`PriorityBuffer`]: priority-sorted partitions with sampling proportional to the
//!   priority score and post-hoc priority updates through [`Token`]s.
//!
//! Buffers are single-owner structures. [`BufferProxy`] and [`absorb`] feed a buffer
//! owned by one thread from several producer threads.
pub mod error;
pub mod prioritized;

mod base;
mod config;
mod key;
mod partitioned;
mod proxy;
pub use base::PartitionedBufferBase;
pub use config::BufferConfig;
pub use error::{BufferError, Result};
pub use key::{PartitionKey, TypeRegistry};
pub use partitioned::PartitionedBuffer;
pub use prioritized::{PriorityBuffer, Sampled, Token};
pub use proxy::{absorb, BufferProxy, PushedItemMessage};
