//! Entropy coefficient of SAC.
use crate::opt::{Optimizer, OptimizerConfig};
use anyhow::Result;
use log::trace;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tch::{nn, nn::Init, Device, Kind, Tensor};

/// How the entropy coefficient `alpha` is handled.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum EntCoefMode {
    /// `alpha` is constant.
    Fix(f64),
    /// `alpha` is learned to keep the policy entropy near a target.
    /// The tuple is `(target_entropy, learning_rate)`.
    Auto(f64, f64),
}

/// The entropy coefficient of SAC, possibly trainable.
///
/// `log(alpha)` lives in its own variable store so it is saved and
/// loaded next to the networks in both modes.
pub struct EntCoef {
    var_store: nn::VarStore,
    log_alpha: Tensor,
    target_entropy: Option<f64>,
    opt: Option<Optimizer>,
}

impl EntCoef {
    /// Constructs an entropy coefficient on the given device.
    pub fn new(mode: EntCoefMode, device: Device) -> Result<Self> {
        let var_store = nn::VarStore::new(device);
        let path = &var_store.root();
        let (log_alpha, target_entropy, opt) = match mode {
            EntCoefMode::Fix(alpha) => {
                let init = Init::Const(alpha.ln());
                (path.var("log_alpha", &[1], init), None, None)
            }
            EntCoefMode::Auto(target_entropy, lr) => {
                let log_alpha = path.var("log_alpha", &[1], Init::Const(0.0));
                let opt = OptimizerConfig::Adam { lr }.build(&var_store)?;
                (log_alpha, Some(target_entropy), Some(opt))
            }
        };

        Ok(Self {
            var_store,
            log_alpha,
            target_entropy,
            opt,
        })
    }

    /// Returns `alpha`, detached from the graph.
    pub fn alpha(&self) -> Tensor {
        self.log_alpha.detach().exp()
    }

    /// Takes a gradient step on `log(alpha)` given the log probabilities
    /// of the current policy. A no-op in [`EntCoefMode::Fix`].
    pub fn update(&mut self, log_prob: &Tensor) {
        if let (Some(target_entropy), Some(opt)) = (self.target_entropy, &mut self.opt) {
            let loss = -(&self.log_alpha * (log_prob + target_entropy).detach())
                .mean(Kind::Float);
            opt.backward_step(&loss);
            trace!("alpha = {}", self.alpha().double_value(&[]));
        }
    }

    /// Saves `log(alpha)`.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.var_store.save(path)?;
        Ok(())
    }

    /// Loads `log(alpha)`.
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.var_store.load(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_mode_keeps_alpha() {
        let mut ent_coef = EntCoef::new(EntCoefMode::Fix(0.2), Device::Cpu).unwrap();
        let log_prob = Tensor::from_slice(&[-3.0f32, -1.0]).reshape([2, 1]);
        ent_coef.update(&log_prob);
        let alpha = ent_coef.alpha().double_value(&[]);
        assert!((alpha - 0.2).abs() < 1e-6);
    }

    #[test]
    fn auto_mode_moves_alpha() {
        let mut ent_coef = EntCoef::new(EntCoefMode::Auto(-2.0, 1e-2), Device::Cpu).unwrap();
        let before = ent_coef.alpha().double_value(&[]);
        // entropy above target pushes alpha down
        let log_prob = Tensor::from_slice(&[-10.0f32]).reshape([1, 1]);
        for _ in 0..10 {
            ent_coef.update(&log_prob);
        }
        let after = ent_coef.alpha().double_value(&[]);
        assert!(after < before);
    }
}
