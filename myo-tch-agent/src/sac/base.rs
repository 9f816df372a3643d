use super::{squash_gaussian, EntCoef, SacConfig};
use crate::{
    model::{Model, ModelBase, SubModel, SubModel2},
    replay::TransitionBatch,
    util::{track, CriticLoss},
};
use anyhow::Result;
use log::info;
use myo_core::{Agent, Env, Policy, ReplayBufferBase, UpdateStats};
use std::{convert::TryFrom, fs, path::Path};
use tch::{no_grad, Device, Kind, Reduction, Tensor};

/// Soft actor-critic with feedforward networks.
///
/// Holds twin critics with soft-updated target copies and a squashed
/// Gaussian policy. Trains on batches of independent transitions.
pub struct Sac<Q, P>
where
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    P: SubModel<Input = Tensor, Output = (Tensor, Tensor)>,
{
    pi: Model<P>,
    qnet_1: Model<Q>,
    qnet_2: Model<Q>,
    qnet_tgt_1: Model<Q>,
    qnet_tgt_2: Model<Q>,
    ent_coef: EntCoef,
    gamma: f64,
    tau: f64,
    epsilon: f64,
    min_lstd: f64,
    max_lstd: f64,
    action_scale: f64,
    action_bias: f64,
    critic_loss: CriticLoss,
    n_updates: usize,
    train: bool,
    device: Device,
}

impl<Q, P> Sac<Q, P>
where
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    P: SubModel<Input = Tensor, Output = (Tensor, Tensor)>,
{
    /// Constructs the agent on the given device.
    pub fn build(config: SacConfig<Q, P>, device: Device) -> Result<Self> {
        let pi = Model::build(config.actor_config, device)?;
        let qnet_1 = Model::build(config.critic_config.clone(), device)?;
        let qnet_2 = Model::build(config.critic_config, device)?;
        let qnet_tgt_1 = qnet_1.clone();
        let qnet_tgt_2 = qnet_2.clone();
        let ent_coef = EntCoef::new(config.ent_coef_mode, device)?;

        Ok(Self {
            pi,
            qnet_1,
            qnet_2,
            qnet_tgt_1,
            qnet_tgt_2,
            ent_coef,
            gamma: config.gamma,
            tau: config.tau,
            epsilon: config.epsilon,
            min_lstd: config.min_lstd,
            max_lstd: config.max_lstd,
            action_scale: config.action_scale,
            action_bias: config.action_bias,
            critic_loss: config.critic_loss,
            n_updates: 0,
            train: true,
            device,
        })
    }

    /// Number of update rounds taken so far.
    pub fn n_updates(&self) -> usize {
        self.n_updates
    }

    fn sample(&self, obs: &Tensor) -> (Tensor, Tensor, Tensor) {
        let (mean, lstd) = self.pi.inner().forward(obs);
        let lstd = lstd.clamp(self.min_lstd, self.max_lstd);
        squash_gaussian(
            &mean,
            &lstd,
            self.action_scale,
            self.action_bias,
            self.epsilon,
        )
    }

    fn loss(&self, pred: &Tensor, tgt: &Tensor) -> Tensor {
        match self.critic_loss {
            CriticLoss::Mse => pred.mse_loss(tgt, Reduction::Mean),
            CriticLoss::SmoothL1 => pred.smooth_l1_loss(tgt, Reduction::Mean, 1.0),
        }
    }

    fn update_critic(&mut self, batch: &TransitionBatch) -> (f32, f32) {
        let obs = batch.obs.to(self.device);
        let act = batch.act.to(self.device);

        let tgt = no_grad(|| {
            let next_obs = batch.next_obs.to(self.device);
            let (next_act, next_log_p, _) = self.sample(&next_obs);
            let q1 = self.qnet_tgt_1.inner().forward(&next_obs, &next_act);
            let q2 = self.qnet_tgt_2.inner().forward(&next_obs, &next_act);
            let q = q1.minimum(&q2) - self.ent_coef.alpha() * next_log_p;
            batch.reward.to(self.device) + batch.not_done.to(self.device) * self.gamma * q
        });

        let loss_1 = self.loss(&self.qnet_1.inner().forward(&obs, &act), &tgt);
        self.qnet_1.backward_step(&loss_1);
        let loss_2 = self.loss(&self.qnet_2.inner().forward(&obs, &act), &tgt);
        self.qnet_2.backward_step(&loss_2);

        (
            loss_1.double_value(&[]) as f32,
            loss_2.double_value(&[]) as f32,
        )
    }

    fn update_actor(&mut self, batch: &TransitionBatch) -> f32 {
        let obs = batch.obs.to(self.device);
        let (act, log_p, _) = self.sample(&obs);
        let q1 = self.qnet_1.inner().forward(&obs, &act);
        let q2 = self.qnet_2.inner().forward(&obs, &act);
        let loss = (self.ent_coef.alpha() * &log_p - q1.minimum(&q2)).mean(Kind::Float);
        self.pi.backward_step(&loss);
        self.ent_coef.update(&log_p.detach());

        loss.double_value(&[]) as f32
    }
}

impl<E, Q, P> Policy<E> for Sac<Q, P>
where
    E: Env,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    P: SubModel<Input = Tensor, Output = (Tensor, Tensor)>,
{
    type State = ();

    fn init_state(&self) -> Self::State {}

    fn select_action(&mut self, obs: &[f32], _state: &mut Self::State, evaluate: bool) -> Vec<f32> {
        no_grad(|| {
            let obs = Tensor::from_slice(obs).unsqueeze(0).to(self.device);
            let (act, _, mean_act) = self.sample(&obs);
            let act = if evaluate { mean_act } else { act };
            Vec::<f32>::try_from(act.squeeze_dim(0).to(Device::Cpu)).unwrap()
        })
    }
}

impl<E, R, Q, P> Agent<E, R> for Sac<Q, P>
where
    E: Env,
    R: ReplayBufferBase<Batch = TransitionBatch>,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    P: SubModel<Input = Tensor, Output = (Tensor, Tensor)>,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn update_parameters(&mut self, buffer: &mut R, batch_size: usize) -> Result<UpdateStats> {
        let batch = buffer.batch(batch_size)?;
        let (critic_1_loss, critic_2_loss) = self.update_critic(&batch);
        let policy_loss = self.update_actor(&batch);
        track(&mut self.qnet_tgt_1, &mut self.qnet_1, self.tau);
        track(&mut self.qnet_tgt_2, &mut self.qnet_2, self.tau);
        self.n_updates += 1;

        Ok(UpdateStats {
            critic_1_loss,
            critic_2_loss,
            policy_loss,
        })
    }

    fn save_params<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        let path = path.as_ref();
        fs::create_dir_all(path)?;
        self.pi.save(path.join("pi.pt.tch"))?;
        self.qnet_1.save(path.join("qnet_1.pt.tch"))?;
        self.qnet_2.save(path.join("qnet_2.pt.tch"))?;
        self.qnet_tgt_1.save(path.join("qnet_tgt_1.pt.tch"))?;
        self.qnet_tgt_2.save(path.join("qnet_tgt_2.pt.tch"))?;
        self.ent_coef.save(path.join("ent_coef.pt.tch"))?;
        info!("Save agent parameters in {:?}", path);
        Ok(())
    }

    fn load_params<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        let path = path.as_ref();
        self.pi.load(path.join("pi.pt.tch"))?;
        self.qnet_1.load(path.join("qnet_1.pt.tch"))?;
        self.qnet_2.load(path.join("qnet_2.pt.tch"))?;
        self.qnet_tgt_1.load(path.join("qnet_tgt_1.pt.tch"))?;
        self.qnet_tgt_2.load(path.join("qnet_tgt_2.pt.tch"))?;
        self.ent_coef.load(path.join("ent_coef.pt.tch"))?;
        info!("Load agent parameters from {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mlp::{Mlp, Mlp2, MlpConfig},
        model::ModelConfig,
        opt::OptimizerConfig,
        replay::{ReplayBufferConfig, TransitionReplayBuffer},
    };
    use myo_core::{EpisodeTrajectory, ExperienceBufferBase, Step, Transition};
    use tempdir::TempDir;

    const OBS_DIM: i64 = 3;
    const ACT_DIM: i64 = 2;

    struct TestEnv;

    impl Env for TestEnv {
        type Config = ();

        fn build(_config: &Self::Config, _seed: i64) -> Result<Self> {
            Ok(Self)
        }

        fn reset(&mut self) -> Result<Vec<f32>> {
            Ok(vec![0.0; OBS_DIM as usize])
        }

        fn step(&mut self, _act: &[f32]) -> Step {
            Step::new(vec![0.0; OBS_DIM as usize], 0.0, false)
        }

        fn max_episode_steps(&self) -> usize {
            10
        }
    }

    fn agent() -> Sac<Mlp, Mlp2> {
        let config = SacConfig::default()
            .actor_config(
                ModelConfig::default()
                    .net_config(MlpConfig::new(OBS_DIM, vec![16], ACT_DIM))
                    .opt_config(OptimizerConfig::Adam { lr: 3e-4 }),
            )
            .critic_config(
                ModelConfig::default()
                    .net_config(MlpConfig::new(OBS_DIM + ACT_DIM, vec![16], 1))
                    .opt_config(OptimizerConfig::Adam { lr: 3e-4 }),
            );
        Sac::build(config, Device::Cpu).unwrap()
    }

    fn episode(len: usize) -> EpisodeTrajectory {
        let mut episode = EpisodeTrajectory::with_capacity(len);
        for i in 0..len {
            episode.push(Transition {
                state: vec![i as f32; OBS_DIM as usize],
                action: vec![0.5; ACT_DIM as usize],
                reward: 1.0,
                next_state: vec![i as f32 + 1.0; OBS_DIM as usize],
                mask: if i + 1 == len { 0.0 } else { 1.0 },
            });
        }
        episode
    }

    #[test]
    fn actions_are_muscle_activations() {
        let mut sac = agent();
        let obs = vec![0.1; OBS_DIM as usize];
        let act = Policy::<TestEnv>::select_action(&mut sac, &obs, &mut (), false);
        assert_eq!(act.len(), ACT_DIM as usize);
        assert!(act.iter().all(|a| (0.0..=1.0).contains(a)));

        // the greedy action is deterministic
        let a1 = Policy::<TestEnv>::select_action(&mut sac, &obs, &mut (), true);
        let a2 = Policy::<TestEnv>::select_action(&mut sac, &obs, &mut (), true);
        assert_eq!(a1, a2);
    }

    #[test]
    fn update_returns_finite_losses() {
        let mut sac = agent();
        let mut buffer = TransitionReplayBuffer::build(&ReplayBufferConfig::default());
        buffer.push(episode(8)).unwrap();

        let stats =
            Agent::<TestEnv, _>::update_parameters(&mut sac, &mut buffer, 4).unwrap();
        assert!(stats.critic_1_loss.is_finite());
        assert!(stats.critic_2_loss.is_finite());
        assert!(stats.policy_loss.is_finite());
        assert_eq!(sac.n_updates(), 1);
    }

    #[test]
    fn params_roundtrip_through_directory() {
        let dir = TempDir::new("sac_params").unwrap();
        let sac = agent();
        Agent::<TestEnv, TransitionReplayBuffer>::save_params(&sac, dir.path()).unwrap();

        let mut other = agent();
        Agent::<TestEnv, TransitionReplayBuffer>::load_params(&mut other, dir.path()).unwrap();

        let obs = vec![0.3; OBS_DIM as usize];
        let a = Policy::<TestEnv>::select_action(&mut other, &obs, &mut (), true);
        let mut sac = sac;
        let b = Policy::<TestEnv>::select_action(&mut sac, &obs, &mut (), true);
        assert_eq!(a, b);
    }
}
