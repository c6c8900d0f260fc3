//! Configuration of the buffers.
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`PartitionedBuffer`](crate::PartitionedBuffer) and
/// [`PriorityBuffer`](crate::PriorityBuffer).
///
/// ```rust
/// use partition_replay::BufferConfig;
///
/// let config = BufferConfig::default().size(1000).seed(7);
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct BufferConfig {
    /// Maximum number of batches per partition.
    pub size: usize,

    /// Random seed used for sampling.
    pub seed: u64,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            size: 10000,
            seed: 42,
        }
    }
}

impl BufferConfig {
    /// Sets the capacity per partition.
    ///
    /// # Arguments
    ///
    /// * `size` - Maximum number of batches held by each partition
    ///
    /// # Returns
    ///
    /// The modified configuration
    pub fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Sets the random seed for sampling.
    ///
    /// # Arguments
    ///
    /// * `seed` - The new random seed
    ///
    /// # Returns
    ///
    /// The modified configuration
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Loads the configuration from a YAML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        info!("Load buffer config from {:?}", path.as_ref());
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the configuration to a YAML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path where the configuration should be saved
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        info!("Save buffer config to {:?}", path.as_ref());
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
