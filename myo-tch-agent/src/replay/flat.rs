use super::{sample_indices, ReplayBufferConfig};
use anyhow::Result;
use myo_core::{
    error::MyoError, EpisodeTrajectory, ExperienceBufferBase, ReplayBufferBase, Transition,
};
use tch::Tensor;

/// A minibatch of independent transitions.
pub struct TransitionBatch {
    /// Observations, `[batch, obs_dim]`.
    pub obs: Tensor,
    /// Actions, `[batch, act_dim]`.
    pub act: Tensor,
    /// Rewards, `[batch, 1]`.
    pub reward: Tensor,
    /// Next observations, `[batch, obs_dim]`.
    pub next_obs: Tensor,
    /// `0.0` where the episode terminated, `1.0` elsewhere, `[batch, 1]`.
    pub not_done: Tensor,
}

/// Replay buffer over flattened transitions.
///
/// Episodes are split into their steps on push; the feedforward agent
/// samples steps independently of episode boundaries. The store is
/// circular with `capacity` counting transitions.
pub struct TransitionReplayBuffer {
    transitions: Vec<Transition>,
    capacity: usize,
    position: usize,
    rng: fastrand::Rng,
}

impl TransitionReplayBuffer {
    fn push_step(&mut self, transition: Transition) {
        if self.capacity == 0 {
            return;
        }
        if self.transitions.len() < self.capacity {
            self.transitions.push(transition);
        } else {
            self.transitions[self.position] = transition;
        }
        self.position = (self.position + 1) % self.capacity;
    }

    fn tensorize(&self, indices: &[usize]) -> TransitionBatch {
        let batch_size = indices.len() as i64;
        let first = &self.transitions[indices[0]];
        let obs_dim = first.state.len() as i64;
        let act_dim = first.action.len() as i64;

        let mut obs = Vec::with_capacity((batch_size * obs_dim) as usize);
        let mut act = Vec::with_capacity((batch_size * act_dim) as usize);
        let mut reward = Vec::with_capacity(batch_size as usize);
        let mut next_obs = Vec::with_capacity((batch_size * obs_dim) as usize);
        let mut not_done = Vec::with_capacity(batch_size as usize);

        for &i in indices {
            let t = &self.transitions[i];
            obs.extend_from_slice(&t.state);
            act.extend_from_slice(&t.action);
            reward.push(t.reward);
            next_obs.extend_from_slice(&t.next_state);
            not_done.push(t.mask);
        }

        TransitionBatch {
            obs: Tensor::from_slice(&obs).reshape([batch_size, obs_dim]),
            act: Tensor::from_slice(&act).reshape([batch_size, act_dim]),
            reward: Tensor::from_slice(&reward).reshape([batch_size, 1]),
            next_obs: Tensor::from_slice(&next_obs).reshape([batch_size, obs_dim]),
            not_done: Tensor::from_slice(&not_done).reshape([batch_size, 1]),
        }
    }
}

impl ExperienceBufferBase for TransitionReplayBuffer {
    type Item = EpisodeTrajectory;

    fn push(&mut self, item: Self::Item) -> Result<()> {
        for transition in item.transitions {
            self.push_step(transition);
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.transitions.len()
    }
}

impl ReplayBufferBase for TransitionReplayBuffer {
    type Config = ReplayBufferConfig;
    type Batch = TransitionBatch;

    fn build(config: &Self::Config) -> Self {
        Self {
            transitions: Vec::new(),
            capacity: config.capacity,
            position: 0,
            rng: fastrand::Rng::with_seed(config.seed),
        }
    }

    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        if size == 0 || size > self.transitions.len() {
            return Err(MyoError::NotEnoughExperience {
                len: self.transitions.len(),
                batch_size: size,
            }
            .into());
        }
        let indices = sample_indices(&mut self.rng, self.transitions.len(), size);
        Ok(self.tensorize(&indices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(len: usize, fill: f32) -> EpisodeTrajectory {
        let mut episode = EpisodeTrajectory::with_capacity(len);
        for i in 0..len {
            let done = i + 1 == len;
            episode.push(Transition {
                state: vec![fill, i as f32],
                action: vec![fill],
                reward: 1.0,
                next_state: vec![fill, i as f32 + 1.0],
                mask: if done { 0.0 } else { 1.0 },
            });
        }
        episode
    }

    #[test]
    fn episodes_flatten_to_steps() {
        let config = ReplayBufferConfig::default();
        let mut buffer = TransitionReplayBuffer::build(&config);
        buffer.push(episode(3, 0.0)).unwrap();
        buffer.push(episode(5, 1.0)).unwrap();
        assert_eq!(buffer.len(), 8);
    }

    #[test]
    fn capacity_bounds_transitions() {
        let config = ReplayBufferConfig::default().capacity(4);
        let mut buffer = TransitionReplayBuffer::build(&config);
        buffer.push(episode(3, 0.0)).unwrap();
        buffer.push(episode(3, 1.0)).unwrap();

        assert_eq!(buffer.len(), 4);
        // the two oldest steps were overwritten in place
        let fills: Vec<f32> = buffer.transitions.iter().map(|t| t.state[0]).collect();
        assert_eq!(fills, vec![1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn degenerate_sizes_are_rejected() {
        let config = ReplayBufferConfig::default();
        let mut buffer = TransitionReplayBuffer::build(&config);
        buffer.push(episode(3, 0.0)).unwrap();
        assert!(buffer.batch(0).is_err());

        let mut empty = TransitionReplayBuffer::build(&ReplayBufferConfig::default().capacity(0));
        empty.push(episode(3, 0.0)).unwrap();
        assert_eq!(empty.len(), 0);
    }

    #[test]
    fn batch_has_flat_shapes() {
        let config = ReplayBufferConfig::default();
        let mut buffer = TransitionReplayBuffer::build(&config);
        buffer.push(episode(6, 0.0)).unwrap();

        let batch = buffer.batch(4).unwrap();
        assert_eq!(batch.obs.size(), vec![4, 2]);
        assert_eq!(batch.act.size(), vec![4, 1]);
        assert_eq!(batch.reward.size(), vec![4, 1]);
        assert_eq!(batch.not_done.size(), vec![4, 1]);

        assert!(buffer.batch(7).is_err());
    }
}
