use serde::{Deserialize, Serialize};

/// Configuration of the replay buffers in this module.
///
/// `capacity` counts episodes for [`EpisodicReplayBuffer`] and
/// transitions for [`TransitionReplayBuffer`].
///
/// [`EpisodicReplayBuffer`]: super::EpisodicReplayBuffer
/// [`TransitionReplayBuffer`]: super::TransitionReplayBuffer
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ReplayBufferConfig {
    pub capacity: usize,
    pub seed: u64,
}

impl Default for ReplayBufferConfig {
    fn default() -> Self {
        Self {
            capacity: 1_000_000,
            seed: 42,
        }
    }
}

impl ReplayBufferConfig {
    /// Sets the capacity of the buffer.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the seed of the sampler.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
