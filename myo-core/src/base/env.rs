//! Environment.
use super::Step;
use anyhow::Result;

/// A simulated environment, typically an MDP with continuous observations
/// and actions.
///
/// This is the contract of the external musculoskeletal physics: the
/// pipeline only needs `reset`/`step`/`render` and a step limit. The
/// observation is a flat vector; the action is a vector of muscle
/// activations in `[0, 1]`.
pub trait Env {
    /// Configuration of the environment.
    type Config: Clone;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Vec<f32>>;

    /// Performs an environment step.
    fn step(&mut self, act: &[f32]) -> Step;

    /// Renders the current state. The default implementation does nothing.
    fn render(&mut self) {}

    /// Upper bound on the number of steps per episode.
    fn max_episode_steps(&self) -> usize;
}
