//! Configuration of [`Model`](super::Model).
use crate::opt::OptimizerConfig;
use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of a [`Model`](super::Model): the inner network
/// configuration plus the optimizer.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ModelConfig<C> {
    pub(crate) net_config: Option<C>,
    pub(crate) opt_config: OptimizerConfig,
}

impl<C> Default for ModelConfig<C> {
    fn default() -> Self {
        Self {
            net_config: None,
            opt_config: OptimizerConfig::Adam { lr: 0.0 },
        }
    }
}

impl<C> ModelConfig<C>
where
    C: DeserializeOwned + Serialize,
{
    /// Sets the configuration of the inner network.
    pub fn net_config(mut self, v: C) -> Self {
        self.net_config = Some(v);
        self
    }

    /// Sets the optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Constructs [`ModelConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let config = serde_yaml::from_reader(rdr)?;
        Ok(config)
    }

    /// Saves [`ModelConfig`] as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
