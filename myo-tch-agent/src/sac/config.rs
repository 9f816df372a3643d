use super::EntCoefMode;
use crate::{
    model::{Buildable, ModelConfig},
    util::CriticLoss,
};
use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Sac`](super::Sac) and [`SeqSac`](super::SeqSac).
///
/// `Q` is the critic network and `P` the policy network. Actions are
/// squashed to `[bias - scale, bias + scale]`; the defaults map onto
/// `[0, 1]`, the range of muscle activations.
#[derive(Debug, Deserialize, Serialize)]
#[serde(bound = "Q::Config: DeserializeOwned + Serialize, P::Config: DeserializeOwned + Serialize")]
pub struct SacConfig<Q, P>
where
    Q: Buildable,
    P: Buildable,
{
    pub(super) actor_config: ModelConfig<P::Config>,
    pub(super) critic_config: ModelConfig<Q::Config>,
    pub(super) gamma: f64,
    pub(super) tau: f64,
    pub(super) ent_coef_mode: EntCoefMode,
    pub(super) epsilon: f64,
    pub(super) min_lstd: f64,
    pub(super) max_lstd: f64,
    pub(super) action_scale: f64,
    pub(super) action_bias: f64,
    pub(super) critic_loss: CriticLoss,
}

impl<Q, P> Clone for SacConfig<Q, P>
where
    Q: Buildable,
    P: Buildable,
{
    fn clone(&self) -> Self {
        Self {
            actor_config: self.actor_config.clone(),
            critic_config: self.critic_config.clone(),
            gamma: self.gamma,
            tau: self.tau,
            ent_coef_mode: self.ent_coef_mode.clone(),
            epsilon: self.epsilon,
            min_lstd: self.min_lstd,
            max_lstd: self.max_lstd,
            action_scale: self.action_scale,
            action_bias: self.action_bias,
            critic_loss: self.critic_loss.clone(),
        }
    }
}

impl<Q, P> Default for SacConfig<Q, P>
where
    Q: Buildable,
    P: Buildable,
{
    fn default() -> Self {
        Self {
            actor_config: Default::default(),
            critic_config: Default::default(),
            gamma: 0.99,
            tau: 0.005,
            ent_coef_mode: EntCoefMode::Fix(0.2),
            epsilon: 1e-6,
            min_lstd: -20.0,
            max_lstd: 2.0,
            action_scale: 0.5,
            action_bias: 0.5,
            critic_loss: CriticLoss::Mse,
        }
    }
}

impl<Q, P> SacConfig<Q, P>
where
    Q: Buildable,
    P: Buildable,
    Q::Config: DeserializeOwned + Serialize,
    P::Config: DeserializeOwned + Serialize,
{
    /// Sets the configuration of the policy network and its optimizer.
    pub fn actor_config(mut self, actor_config: ModelConfig<P::Config>) -> Self {
        self.actor_config = actor_config;
        self
    }

    /// Sets the configuration of the critic networks and their optimizer.
    pub fn critic_config(mut self, critic_config: ModelConfig<Q::Config>) -> Self {
        self.critic_config = critic_config;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Sets the soft update coefficient of the target networks.
    pub fn tau(mut self, tau: f64) -> Self {
        self.tau = tau;
        self
    }

    /// Sets how the entropy coefficient is handled.
    pub fn ent_coef_mode(mut self, mode: EntCoefMode) -> Self {
        self.ent_coef_mode = mode;
        self
    }

    /// Sets the critic loss function.
    pub fn critic_loss(mut self, critic_loss: CriticLoss) -> Self {
        self.critic_loss = critic_loss;
        self
    }

    /// Sets the range actions are squashed to,
    /// `[bias - scale, bias + scale]`.
    pub fn action_bounds(mut self, scale: f64, bias: f64) -> Self {
        self.action_scale = scale;
        self.action_bias = bias;
        self
    }

    /// Constructs [`SacConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let config = serde_yaml::from_reader(rdr)?;
        Ok(config)
    }

    /// Saves [`SacConfig`] as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mlp::{Mlp, Mlp2, MlpConfig};
    use crate::opt::OptimizerConfig;
    use tempdir::TempDir;

    #[test]
    fn yaml_roundtrip() {
        let dir = TempDir::new("sac_config").unwrap();
        let path = dir.path().join("sac.yaml");

        let config = SacConfig::<Mlp, Mlp2>::default()
            .gamma(0.98)
            .ent_coef_mode(EntCoefMode::Auto(-2.0, 3e-4))
            .actor_config(
                ModelConfig::default()
                    .net_config(MlpConfig::new(7, vec![64, 64], 2))
                    .opt_config(OptimizerConfig::Adam { lr: 3e-4 }),
            )
            .critic_config(
                ModelConfig::default()
                    .net_config(MlpConfig::new(9, vec![64, 64], 1))
                    .opt_config(OptimizerConfig::Adam { lr: 3e-4 }),
            );
        config.save(&path).unwrap();

        let loaded = SacConfig::<Mlp, Mlp2>::load(&path).unwrap();
        assert_eq!(loaded.gamma, 0.98);
        assert_eq!(loaded.ent_coef_mode, EntCoefMode::Auto(-2.0, 3e-4));
        assert_eq!(loaded.actor_config, config.actor_config);
        assert_eq!(loaded.critic_config, config.critic_config);
    }
}
