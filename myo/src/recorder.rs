use anyhow::Result;
use log::warn;
use myo_core::record::{Record, Recorder};
use std::{fs::File, path::Path};

const COLUMNS: [&str; 4] = ["episode", "episode_reward", "episode_steps", "success"];

/// Writes per-episode training statistics to a CSV file.
///
/// Expects the records produced by the training loop (`episode`,
/// `episode_reward`, `episode_steps`, `success`); records missing any of
/// the columns are skipped with a warning.
pub struct CsvRecorder {
    writer: csv::Writer<File>,
}

impl CsvRecorder {
    /// Creates the file and writes the header row.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&COLUMNS)?;
        writer.flush()?;
        Ok(Self { writer })
    }
}

impl Recorder for CsvRecorder {
    fn write(&mut self, record: Record) {
        let mut row = Vec::with_capacity(COLUMNS.len());
        for column in COLUMNS.iter() {
            match record.get_scalar(column) {
                Ok(v) => row.push(v.to_string()),
                Err(e) => {
                    warn!("dropping record: {}", e);
                    return;
                }
            }
        }
        if let Err(e) = self.writer.write_record(&row) {
            warn!("failed to write record: {}", e);
        }
        if let Err(e) = self.writer.flush() {
            warn!("failed to flush records: {}", e);
        }
    }
}
