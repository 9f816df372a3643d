//! Recorder trait.
use super::Record;

/// Sink for [`Record`]s produced during training or evaluation.
pub trait Recorder {
    /// Writes a record.
    fn write(&mut self, record: Record);
}
