//! This module is used for tests.
use crate::{
    Agent, Env, EpisodeTrajectory, ExperienceBufferBase, Policy, ReplayBufferBase, Step,
    UpdateStats,
};
use anyhow::Result;
use std::path::Path;

/// Deterministic environment paying 1.0 per step.
///
/// Observation is `[t]`; terminates at a fixed timestep if configured.
pub struct DummyEnv {
    max_steps: usize,
    done_at: Option<usize>,
    t: usize,
}

impl DummyEnv {
    pub fn new(max_steps: usize, done_at: Option<usize>) -> Self {
        Self {
            max_steps,
            done_at,
            t: 0,
        }
    }
}

impl Env for DummyEnv {
    type Config = (usize, Option<usize>);

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self::new(config.0, config.1))
    }

    fn reset(&mut self) -> Result<Vec<f32>> {
        self.t = 0;
        Ok(vec![0.0])
    }

    fn step(&mut self, _act: &[f32]) -> Step {
        let is_done = self.done_at == Some(self.t);
        self.t += 1;
        Step::new(vec![self.t as f32], 1.0, is_done)
    }

    fn max_episode_steps(&self) -> usize {
        self.max_steps
    }
}

/// Scripted agent with a constant action; counts update rounds.
#[derive(Default)]
pub struct DummyAgent {
    pub training: bool,
    pub n_updates: usize,
}

impl Policy<DummyEnv> for DummyAgent {
    type State = ();

    fn init_state(&self) -> Self::State {}

    fn select_action(&mut self, _obs: &[f32], _state: &mut (), _evaluate: bool) -> Vec<f32> {
        vec![0.5]
    }
}

impl<R> Agent<DummyEnv, R> for DummyAgent
where
    R: ExperienceBufferBase<Item = EpisodeTrajectory> + ReplayBufferBase,
{
    fn train(&mut self) {
        self.training = true;
    }

    fn eval(&mut self) {
        self.training = false;
    }

    fn is_train(&self) -> bool {
        self.training
    }

    fn update_parameters(&mut self, _buffer: &mut R, _batch_size: usize) -> Result<UpdateStats> {
        self.n_updates += 1;
        Ok(UpdateStats {
            critic_1_loss: 0.0,
            critic_2_loss: 0.0,
            policy_loss: 0.0,
        })
    }

    fn save_params<T: AsRef<Path>>(&self, _path: T) -> Result<()> {
        Ok(())
    }

    fn load_params<T: AsRef<Path>>(&mut self, _path: T) -> Result<()> {
        Ok(())
    }
}

/// Unbounded episode store for driver tests.
#[derive(Default)]
pub struct VecEpisodeBuffer {
    pub episodes: Vec<EpisodeTrajectory>,
}

impl ExperienceBufferBase for VecEpisodeBuffer {
    type Item = EpisodeTrajectory;

    fn push(&mut self, item: Self::Item) -> Result<()> {
        self.episodes.push(item);
        Ok(())
    }

    fn len(&self) -> usize {
        self.episodes.len()
    }
}

impl ReplayBufferBase for VecEpisodeBuffer {
    type Config = ();
    type Batch = ();

    fn build(_config: &Self::Config) -> Self {
        Self::default()
    }

    fn batch(&mut self, _size: usize) -> Result<Self::Batch> {
        Ok(())
    }
}
