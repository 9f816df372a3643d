//! A recorder that keeps records in memory.
use super::{Record, Recorder};

/// Keeps all written records in memory, in write order.
///
/// Useful for tests and for exporting statistics after a run.
#[derive(Default)]
pub struct BufferedRecorder(Vec<Record>);

impl BufferedRecorder {
    /// Constructs an empty buffered recorder.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Iterates over the buffered records.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.0.iter()
    }

    /// Number of buffered records.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no records were written.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Recorder for BufferedRecorder {
    fn write(&mut self, record: Record) {
        self.0.push(record);
    }
}
