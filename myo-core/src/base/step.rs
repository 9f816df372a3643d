//! Environment step.

/// The result of a single environment step: the next observation, the
/// reward for the transition and the termination flag.
#[derive(Clone, Debug)]
pub struct Step {
    /// Observation after the step.
    pub obs: Vec<f32>,

    /// Reward of the transition.
    pub reward: f32,

    /// Whether the episode terminated at this step.
    pub is_done: bool,
}

impl Step {
    /// Constructs a [`Step`].
    pub fn new(obs: Vec<f32>, reward: f32, is_done: bool) -> Self {
        Self {
            obs,
            reward,
            is_done,
        }
    }
}
