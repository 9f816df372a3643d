use super::{sample_indices, ReplayBufferConfig};
use anyhow::Result;
use myo_core::{
    error::MyoError, EpisodeTrajectory, ExperienceBufferBase, ReplayBufferBase,
};
use tch::{Kind, Tensor};

/// A minibatch of episodes, padded at the front to a common length.
///
/// Shorter episodes are shifted to the end of the time axis with zeros
/// before them, so every sequence finishes at `t = max_len`. `mask` is
/// `1.0` on real steps and `0.0` on padding; losses select on it.
pub struct PaddedSeqBatch {
    /// Observations, `[batch, max_len, obs_dim]`.
    pub obs: Tensor,
    /// Actions, `[batch, max_len, act_dim]`.
    pub act: Tensor,
    /// Rewards, `[batch, max_len, 1]`.
    pub reward: Tensor,
    /// Next observations, `[batch, max_len, obs_dim]`.
    pub next_obs: Tensor,
    /// `0.0` where the episode terminated, `1.0` elsewhere,
    /// `[batch, max_len, 1]`.
    pub not_done: Tensor,
    /// `1.0` on real steps, `0.0` on padding, `[batch, max_len, 1]`.
    pub mask: Tensor,
}

/// Replay buffer over whole episodes.
///
/// A circular store: once `capacity` episodes are held, pushing
/// overwrites the oldest. Batches are episodes sampled without
/// replacement, tensorized as [`PaddedSeqBatch`].
pub struct EpisodicReplayBuffer {
    episodes: Vec<EpisodeTrajectory>,
    capacity: usize,
    position: usize,
    rng: fastrand::Rng,
}

impl EpisodicReplayBuffer {
    fn tensorize(&self, indices: &[usize]) -> PaddedSeqBatch {
        let max_len = indices
            .iter()
            .map(|&i| self.episodes[i].len())
            .max()
            .unwrap_or(0) as i64;
        let first = &self.episodes[indices[0]].transitions[0];
        let obs_dim = first.state.len() as i64;
        let act_dim = first.action.len() as i64;
        let batch_size = indices.len() as i64;

        let obs = Tensor::zeros([batch_size, max_len, obs_dim], (Kind::Float, tch::Device::Cpu));
        let act = Tensor::zeros([batch_size, max_len, act_dim], (Kind::Float, tch::Device::Cpu));
        let reward = Tensor::zeros([batch_size, max_len, 1], (Kind::Float, tch::Device::Cpu));
        let next_obs = obs.zeros_like();
        let not_done = reward.zeros_like();
        let mask = reward.zeros_like();

        for (b, &i) in indices.iter().enumerate() {
            let episode = &self.episodes[i];
            let len = episode.len() as i64;
            let offset = max_len - len;
            let steps = &episode.transitions;

            let copy = |dst: &Tensor, src: Vec<f32>, dim: i64| {
                let src = Tensor::from_slice(&src).reshape([len, dim]);
                let mut view = dst.get(b as i64).narrow(0, offset, len);
                view.copy_(&src);
            };

            copy(&obs, steps.iter().flat_map(|t| t.state.clone()).collect(), obs_dim);
            copy(&act, steps.iter().flat_map(|t| t.action.clone()).collect(), act_dim);
            copy(&next_obs, steps.iter().flat_map(|t| t.next_state.clone()).collect(), obs_dim);
            copy(&reward, steps.iter().map(|t| t.reward).collect(), 1);
            copy(&not_done, steps.iter().map(|t| t.mask).collect(), 1);
            copy(&mask, vec![1.0; len as usize], 1);
        }

        PaddedSeqBatch {
            obs,
            act,
            reward,
            next_obs,
            not_done,
            mask,
        }
    }
}

impl ExperienceBufferBase for EpisodicReplayBuffer {
    type Item = EpisodeTrajectory;

    fn push(&mut self, item: Self::Item) -> Result<()> {
        if item.is_empty() || self.capacity == 0 {
            return Ok(());
        }
        if self.episodes.len() < self.capacity {
            self.episodes.push(item);
        } else {
            self.episodes[self.position] = item;
        }
        self.position = (self.position + 1) % self.capacity;
        Ok(())
    }

    fn len(&self) -> usize {
        self.episodes.len()
    }
}

impl ReplayBufferBase for EpisodicReplayBuffer {
    type Config = ReplayBufferConfig;
    type Batch = PaddedSeqBatch;

    fn build(config: &Self::Config) -> Self {
        Self {
            episodes: Vec::with_capacity(config.capacity),
            capacity: config.capacity,
            position: 0,
            rng: fastrand::Rng::with_seed(config.seed),
        }
    }

    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        if size == 0 || size > self.episodes.len() {
            return Err(MyoError::NotEnoughExperience {
                len: self.episodes.len(),
                batch_size: size,
            }
            .into());
        }
        let indices = sample_indices(&mut self.rng, self.episodes.len(), size);
        Ok(self.tensorize(&indices))
    }
}
