use super::{squash_gaussian, EntCoef, SacConfig};
use crate::{
    model::{Model, ModelBase, StatefulModel, StatefulModel2},
    replay::PaddedSeqBatch,
    util::{track, CriticLoss},
};
use anyhow::Result;
use log::info;
use myo_core::{Agent, Env, Policy, ReplayBufferBase, UpdateStats};
use std::{convert::TryFrom, fs, mem, path::Path};
use tch::{no_grad, Device, Kind, Reduction, Tensor};

/// Soft actor-critic with stateful (recurrent or spiking) networks.
///
/// Acts step by step, carrying the policy state across the episode.
/// Trains on batches of whole front-padded episodes: every sequence is
/// replayed from `t = 0`, which reconstructs the hidden state exactly,
/// and the losses select on the padding mask so padded steps contribute
/// nothing.
pub struct SeqSac<Q, P>
where
    Q: StatefulModel2<Output = Tensor>,
    P: StatefulModel<Output = (Tensor, Tensor)>,
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

impl<Q, P> SeqSac<Q, P>
where
    Q: StatefulModel2<Output = Tensor>,
    P: StatefulModel<Output = (Tensor, Tensor)>,
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

    fn sample_seq(&self, obs: &Tensor) -> (Tensor, Tensor, Tensor) {
        let (mean, lstd) = self.pi.inner().seq(obs);
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

    fn update_critic(&mut self, batch: &PaddedSeqBatch, valid: &Tensor) -> (f32, f32) {
        let obs = batch.obs.to(self.device);
        let act = batch.act.to(self.device);

        let tgt = no_grad(|| {
            let next_obs = batch.next_obs.to(self.device);
            let (next_act, next_log_p, _) = self.sample_seq(&next_obs);
            let q1 = self.qnet_tgt_1.inner().seq(&next_obs, &next_act);
            let q2 = self.qnet_tgt_2.inner().seq(&next_obs, &next_act);
            let q = q1.minimum(&q2) - self.ent_coef.alpha() * next_log_p;
            batch.reward.to(self.device) + batch.not_done.to(self.device) * self.gamma * q
        })
        .masked_select(valid);

        let pred_1 = self.qnet_1.inner().seq(&obs, &act).masked_select(valid);
        let loss_1 = self.loss(&pred_1, &tgt);
        self.qnet_1.backward_step(&loss_1);
        let pred_2 = self.qnet_2.inner().seq(&obs, &act).masked_select(valid);
        let loss_2 = self.loss(&pred_2, &tgt);
        self.qnet_2.backward_step(&loss_2);

        (
            loss_1.double_value(&[]) as f32,
            loss_2.double_value(&[]) as f32,
        )
    }

    fn update_actor(&mut self, batch: &PaddedSeqBatch, valid: &Tensor) -> f32 {
        let obs = batch.obs.to(self.device);
        let (act, log_p, _) = self.sample_seq(&obs);
        let q1 = self.qnet_1.inner().seq(&obs, &act);
        let q2 = self.qnet_2.inner().seq(&obs, &act);
        let loss = (self.ent_coef.alpha() * &log_p - q1.minimum(&q2))
            .masked_select(valid)
            .mean(Kind::Float);
        self.pi.backward_step(&loss);
        self.ent_coef.update(&log_p.masked_select(valid).detach());

        loss.double_value(&[]) as f32
    }
}

impl<E, Q, P> Policy<E> for SeqSac<Q, P>
where
    E: Env,
    Q: StatefulModel2<Output = Tensor>,
    P: StatefulModel<Output = (Tensor, Tensor)>,
{
    type State = P::State;

    fn init_state(&self) -> Self::State {
        self.pi.inner().zero_state(1)
    }

    fn select_action(&mut self, obs: &[f32], state: &mut Self::State, evaluate: bool) -> Vec<f32> {
        let prev = mem::replace(state, self.pi.inner().zero_state(1));
        let (act, next) = no_grad(|| {
            let obs = Tensor::from_slice(obs).unsqueeze(0).to(self.device);
            let ((mean, lstd), next) = self.pi.inner().step(&obs, prev);
            let lstd = lstd.clamp(self.min_lstd, self.max_lstd);
            let (act, _, mean_act) = squash_gaussian(
                &mean,
                &lstd,
                self.action_scale,
                self.action_bias,
                self.epsilon,
            );
            (if evaluate { mean_act } else { act }, next)
        });
        *state = next;
        Vec::<f32>::try_from(act.squeeze_dim(0).to(Device::Cpu)).unwrap()
    }
}

impl<E, R, Q, P> Agent<E, R> for SeqSac<Q, P>
where
    E: Env,
    R: ReplayBufferBase<Batch = PaddedSeqBatch>,
    Q: StatefulModel2<Output = Tensor>,
    P: StatefulModel<Output = (Tensor, Tensor)>,
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
        let valid = batch.mask.to(self.device).gt(0.5);
        let (critic_1_loss, critic_2_loss) = self.update_critic(&batch, &valid);
        let policy_loss = self.update_actor(&batch, &valid);
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
        lstm::{LstmConfig, LstmPolicy, LstmQnet},
        model::ModelConfig,
        opt::OptimizerConfig,
        replay::{EpisodicReplayBuffer, ReplayBufferConfig},
        snn::{Leaky, SnnConfig, SpikingPolicy, SpikingQnet},
    };
    use anyhow::Result;
    use myo_core::{EpisodeTrajectory, ExperienceBufferBase, Step, Transition};

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

    fn lstm_agent() -> SeqSac<LstmQnet, LstmPolicy> {
        let config = SacConfig::default()
            .actor_config(
                ModelConfig::default()
                    .net_config(LstmConfig::new(OBS_DIM, 8, ACT_DIM))
                    .opt_config(OptimizerConfig::Adam { lr: 3e-4 }),
            )
            .critic_config(
                ModelConfig::default()
                    .net_config(LstmConfig::new(OBS_DIM + ACT_DIM, 8, 1))
                    .opt_config(OptimizerConfig::Adam { lr: 3e-4 }),
            );
        SeqSac::build(config, Device::Cpu).unwrap()
    }

    fn snn_agent() -> SeqSac<SpikingQnet<Leaky>, SpikingPolicy<Leaky>> {
        let config = SacConfig::default()
            .actor_config(
                ModelConfig::default()
                    .net_config(SnnConfig::new(OBS_DIM, 8, ACT_DIM))
                    .opt_config(OptimizerConfig::Adam { lr: 3e-4 }),
            )
            .critic_config(
                ModelConfig::default()
                    .net_config(SnnConfig::new(OBS_DIM + ACT_DIM, 8, 1))
                    .opt_config(OptimizerConfig::Adam { lr: 3e-4 }),
            );
        SeqSac::build(config, Device::Cpu).unwrap()
    }

    #[test]
    fn recurrent_actions_stay_in_bounds() {
        let mut sac = lstm_agent();
        let mut state = Policy::<TestEnv>::init_state(&sac);
        let obs = vec![0.1; OBS_DIM as usize];
        for _ in 0..5 {
            let act = Policy::<TestEnv>::select_action(&mut sac, &obs, &mut state, false);
            assert_eq!(act.len(), ACT_DIM as usize);
            assert!(act.iter().all(|a| (0.0..=1.0).contains(a)));
        }
    }

    #[test]
    fn update_handles_unequal_episode_lengths() {
        let mut sac = lstm_agent();
        let mut buffer = EpisodicReplayBuffer::build(&ReplayBufferConfig::default());
        buffer.push(episode(3)).unwrap();
        buffer.push(episode(7)).unwrap();

        let stats = Agent::<TestEnv, _>::update_parameters(&mut sac, &mut buffer, 2).unwrap();
        assert!(stats.critic_1_loss.is_finite());
        assert!(stats.critic_2_loss.is_finite());
        assert!(stats.policy_loss.is_finite());
    }

    #[test]
    fn spiking_agent_updates() {
        let mut sac = snn_agent();
        let mut buffer = EpisodicReplayBuffer::build(&ReplayBufferConfig::default());
        buffer.push(episode(4)).unwrap();
        buffer.push(episode(6)).unwrap();

        let stats = Agent::<TestEnv, _>::update_parameters(&mut sac, &mut buffer, 2).unwrap();
        assert!(stats.policy_loss.is_finite());
        assert_eq!(sac.n_updates(), 1);
    }
}
