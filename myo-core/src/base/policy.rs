//! Policy.
use super::Env;

/// A policy on an environment, possibly carrying recurrent state.
///
/// The mapping from observation to action may depend on state that is
/// re-initialized at the start of every episode and carried step-to-step
/// within the episode only: LSTM hidden/cell tensors, or per-layer
/// spiking membrane potentials and adaptive thresholds. Feedforward
/// policies use `State = ()`.
pub trait Policy<E: Env> {
    /// Recurrent state carried across steps of one episode.
    type State;

    /// Returns the state for the start of a fresh episode.
    fn init_state(&self) -> Self::State;

    /// Samples an action given an observation, advancing `state` by one
    /// step. With `evaluate` set, returns the deterministic action
    /// (the squashed distribution mean) instead of a sample.
    ///
    /// No gradients are tracked through this call.
    fn select_action(&mut self, obs: &[f32], state: &mut Self::State, evaluate: bool) -> Vec<f32>;
}
