//! Replay buffer interfaces.
use anyhow::Result;

/// A buffer that stores experiences collected from an environment.
pub trait ExperienceBufferBase {
    /// The type of items stored in the buffer.
    type Item;

    /// Pushes an item into the buffer.
    fn push(&mut self, item: Self::Item) -> Result<()>;

    /// Returns the number of items in the buffer.
    fn len(&self) -> usize;

    /// Returns whether the buffer is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A replay buffer that produces training batches.
///
/// Independent of [`ExperienceBufferBase`]: pushing and batching are
/// separate concerns, and an agent only needs the latter.
pub trait ReplayBufferBase {
    /// Configuration of the buffer.
    type Config: Clone;

    /// The type of batches produced for training.
    type Batch;

    /// Builds a replay buffer from the given configuration.
    fn build(config: &Self::Config) -> Self;

    /// Samples a batch of experiences for training.
    fn batch(&mut self, size: usize) -> Result<Self::Batch>;
}
