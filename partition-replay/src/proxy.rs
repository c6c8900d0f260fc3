//! Producer-side proxy for feeding a single-owner buffer from several threads.
//!
//! Buffers are not synchronized. Each producer owns a [`BufferProxy`] bound to one
//! partition key; the proxy collects items and sends them in chunks over a
//! [`crossbeam_channel`] to the thread owning the buffer, which calls [`absorb`].
use crate::{
    error::{BufferError, Result},
    PartitionKey, PartitionedBufferBase,
};
use crossbeam_channel::{Receiver, Sender};
use log::trace;

/// Items pushed by one producer into one partition.
#[derive(Debug, Clone)]
pub struct PushedItemMessage<K, I> {
    /// Partition the items go to.
    pub key: PartitionKey<K>,

    /// Items in push order.
    pub items: Vec<I>,
}

/// Sends items to the owner of a buffer in chunks of `n_buffer`.
pub struct BufferProxy<K, I> {
    key: PartitionKey<K>,
    sender: Sender<PushedItemMessage<K, I>>,
    n_buffer: usize,
    buffer: Vec<I>,
}

impl<K: Clone, I> BufferProxy<K, I> {
    /// Creates a proxy putting into the partition of `key`.
    ///
    /// `n_buffer` of zero is treated as one, i.e., every push is sent immediately.
    pub fn new(
        key: PartitionKey<K>,
        n_buffer: usize,
        sender: Sender<PushedItemMessage<K, I>>,
    ) -> Self {
        let n_buffer = n_buffer.max(1);
        Self {
            key,
            sender,
            n_buffer,
            buffer: Vec::with_capacity(n_buffer),
        }
    }

    /// Partition key the proxy puts into.
    pub fn key(&self) -> &PartitionKey<K> {
        &self.key
    }

    /// Number of items waiting to be sent.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Queues an item, sending the chunk once `n_buffer` items are queued.
    pub fn push(&mut self, item: I) -> Result<()> {
        self.buffer.push(item);
        if self.buffer.len() >= self.n_buffer {
            self.flush()?;
        }
        Ok(())
    }

    /// Sends all queued items.
    pub fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let mut items = Vec::with_capacity(self.n_buffer);
        std::mem::swap(&mut self.buffer, &mut items);
        let msg = PushedItemMessage {
            key: self.key.clone(),
            items,
        };
        self.sender
            .send(msg)
            .map_err(|_| BufferError::Disconnected)
    }
}

/// Puts every pending message of `receiver` into `buffer` without blocking.
///
/// Returns the number of items put. The first error raised by `put` stops the drain;
/// items of the failing message that follow it are dropped.
pub fn absorb<R>(
    buffer: &mut R,
    receiver: &Receiver<PushedItemMessage<R::Key, R::Item>>,
) -> Result<usize>
where
    R: PartitionedBufferBase,
{
    let mut n = 0;
    for msg in receiver.try_iter() {
        trace!("Absorb {} items", msg.items.len());
        for item in msg.items {
            buffer.put(item, msg.key.clone())?;
            n += 1;
        }
    }
    Ok(n)
}
