//! A network bundled with its variable store and optimizer.
use super::{Buildable, ModelBase, ModelConfig};
use crate::opt::{Optimizer, OptimizerConfig};
use anyhow::{Context, Result};
use log::{info, trace};
use std::path::Path;
use tch::{nn, Device, Tensor};

/// Bundles a network with a [`VarStore`] and an optimizer.
///
/// Target networks are created with [`Clone`], which builds the inner
/// network on a fresh store and copies the variables over.
///
/// [`VarStore`]: https://docs.rs/tch/0.16.0/tch/nn/struct.VarStore.html
pub struct Model<M: Buildable> {
    device: Device,
    var_store: nn::VarStore,
    inner: M,
    opt_config: OptimizerConfig,
    opt: Optimizer,
}

impl<M: Buildable> Model<M> {
    /// Constructs a [`Model`] on the given device.
    pub fn build(config: ModelConfig<M::Config>, device: Device) -> Result<Self> {
        let net_config = config.net_config.context("net_config is not set")?;
        let opt_config = config.opt_config;
        let var_store = nn::VarStore::new(device);
        let inner = M::build(&var_store, net_config);

        Self::_build(device, opt_config, inner, var_store, None)
    }

    fn _build(
        device: Device,
        opt_config: OptimizerConfig,
        inner: M,
        mut var_store: nn::VarStore,
        var_store_src: Option<&nn::VarStore>,
    ) -> Result<Self> {
        let opt = opt_config.build(&var_store)?;

        if let Some(src) = var_store_src {
            var_store.copy(src)?;
        }

        Ok(Self {
            device,
            var_store,
            inner,
            opt_config,
            opt,
        })
    }

    /// Returns the inner network.
    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Returns the device the model lives on.
    pub fn device(&self) -> Device {
        self.device
    }
}

impl<M: Buildable> Clone for Model<M> {
    fn clone(&self) -> Self {
        let var_store = nn::VarStore::new(self.device);
        let inner = self.inner.clone_with_var_store(&var_store);

        Self::_build(
            self.device,
            self.opt_config.clone(),
            inner,
            var_store,
            Some(&self.var_store),
        )
        .expect("failed to clone model")
    }
}

impl<M: Buildable> ModelBase for Model<M> {
    fn backward_step(&mut self, loss: &Tensor) {
        self.opt.backward_step(loss);
    }

    fn get_var_store_mut(&mut self) -> &mut nn::VarStore {
        &mut self.var_store
    }

    fn get_var_store(&self) -> &nn::VarStore {
        &self.var_store
    }

    fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.var_store.save(&path)?;
        info!("Save model to {:?}", path.as_ref());
        for (name, _) in self.var_store.variables().iter() {
            trace!("Save variable {}", name);
        }
        Ok(())
    }

    fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.var_store.load(&path)?;
        info!("Load model from {:?}", path.as_ref());
        Ok(())
    }
}
