//! Agent.
use super::{Env, Policy, ReplayBufferBase};
use anyhow::Result;
use std::path::Path;

/// Losses of one off-policy update round.
#[derive(Clone, Copy, Debug)]
pub struct UpdateStats {
    /// Loss of the first Q-network.
    pub critic_1_loss: f32,

    /// Loss of the second Q-network.
    pub critic_2_loss: f32,

    /// Policy loss.
    pub policy_loss: f32,
}

/// A trainable policy on an environment.
pub trait Agent<E: Env, R: ReplayBufferBase>: Policy<E> {
    /// Sets the agent to training mode.
    fn train(&mut self);

    /// Sets the agent to evaluation mode.
    fn eval(&mut self);

    /// Returns whether the agent is in training mode.
    fn is_train(&self) -> bool;

    /// Performs one off-policy update round with a batch sampled from
    /// `buffer` and returns the resulting losses.
    fn update_parameters(&mut self, buffer: &mut R, batch_size: usize) -> Result<UpdateStats>;

    /// Saves the parameters of the agent into the given directory.
    fn save_params<T: AsRef<Path>>(&self, path: T) -> Result<()>;

    /// Loads the parameters of the agent from the given directory.
    fn load_params<T: AsRef<Path>>(&mut self, path: T) -> Result<()>;
}
