//! Errors of this crate.
use thiserror::Error;

/// Errors raised by the training pipeline.
#[derive(Debug, Error)]
pub enum MyoError {
    /// A run mode that the pipeline does not implement.
    ///
    /// Only `train` and `test` are supported; perturbation modes of the
    /// original experiment depend on the external physics environment.
    #[error("unsupported run mode: {0}")]
    UnsupportedMode(String),

    /// Requested a batch from a buffer with too few episodes.
    #[error("replay buffer holds {len} items, batch size {batch_size} requested")]
    NotEnoughExperience {
        /// Number of items currently stored.
        len: usize,
        /// Requested batch size.
        batch_size: usize,
    },

    /// A record key was looked up with the wrong value type.
    #[error("record value type mismatch for key {0}")]
    RecordValueTypeError(String),

    /// A record key does not exist.
    #[error("no record entry for key {0}")]
    RecordKeyError(String),
}
