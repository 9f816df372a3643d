//! Configuration of [`Simulator`](super::Simulator).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Simulator`](super::Simulator).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct SimulatorConfig {
    /// Number of episodes per training batch.
    pub batch_size: usize,

    /// Number of update rounds per triggered update.
    pub batch_iters: usize,

    /// Episode cadence of update triggers.
    pub experience_sampling: usize,

    /// Total number of training episodes.
    pub total_episodes: usize,

    /// Episode cadence of checkpoint saves; `0` disables saving.
    pub save_iter: usize,

    /// Directory for agent checkpoints.
    pub checkpoint_dir: Option<String>,

    /// Scalar appended to every observation; also gates the speed
    /// penalty (binary activation).
    pub speed_token: f32,

    /// Whether to render the environment at every step.
    pub visualize: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            batch_size: 8,
            batch_iters: 30,
            experience_sampling: 5,
            total_episodes: 1_000_000,
            save_iter: 0,
            checkpoint_dir: None,
            speed_token: 0.0,
            visualize: false,
        }
    }
}

impl SimulatorConfig {
    /// Sets the batch size in episodes.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the number of update rounds per trigger.
    pub fn batch_iters(mut self, v: usize) -> Self {
        self.batch_iters = v;
        self
    }

    /// Sets the episode cadence of update triggers.
    pub fn experience_sampling(mut self, v: usize) -> Self {
        self.experience_sampling = v;
        self
    }

    /// Sets the total number of training episodes.
    pub fn total_episodes(mut self, v: usize) -> Self {
        self.total_episodes = v;
        self
    }

    /// Sets the checkpoint cadence in episodes.
    pub fn save_iter(mut self, v: usize) -> Self {
        self.save_iter = v;
        self
    }

    /// Sets the checkpoint directory.
    pub fn checkpoint_dir(mut self, v: impl Into<String>) -> Self {
        self.checkpoint_dir = Some(v.into());
        self
    }

    /// Sets the speed token.
    pub fn speed_token(mut self, v: f32) -> Self {
        self.speed_token = v;
        self
    }

    /// Sets whether to render at every step.
    pub fn visualize(mut self, v: bool) -> Self {
        self.visualize = v;
        self
    }

    /// Constructs [`SimulatorConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let config = serde_yaml::from_reader(rdr)?;
        Ok(config)
    }

    /// Saves [`SimulatorConfig`] as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SimulatorConfig;
    use tempdir::TempDir;

    #[test]
    fn yaml_roundtrip() {
        let config = SimulatorConfig::default()
            .batch_size(16)
            .batch_iters(50)
            .speed_token(1.0)
            .checkpoint_dir("checkpoints");

        let dir = TempDir::new("simulator_config").unwrap();
        let path = dir.path().join("config.yaml");
        config.save(&path).unwrap();
        let loaded = SimulatorConfig::load(&path).unwrap();
        assert_eq!(config, loaded);
    }
}
