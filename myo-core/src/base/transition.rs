//! Transitions and episode trajectories.

/// A single transition `(s_t, a_t, r_t, s_t+1, mask_t)`.
///
/// `mask` is `0.0` if the episode terminated at this step, else `1.0`;
/// it multiplies the bootstrap term of the critic target.
#[derive(Clone, Debug)]
pub struct Transition {
    /// Observation at time `t`, including the appended speed token.
    pub state: Vec<f32>,

    /// Action applied at time `t`.
    pub action: Vec<f32>,

    /// Reward received for the step, speed penalty already applied.
    pub reward: f32,

    /// Observation at time `t + 1`, including the appended speed token.
    pub next_state: Vec<f32>,

    /// `0.0` on termination, `1.0` otherwise.
    pub mask: f32,
}

/// The ordered sequence of transitions of one rollout.
///
/// Trajectories are variable-length, bounded by the environment's step
/// limit. Recurrent and membrane state is not stored here; training
/// replays episodes from `t = 0`, which reconstructs it exactly.
#[derive(Clone, Debug, Default)]
pub struct EpisodeTrajectory {
    /// Transitions in step order.
    pub transitions: Vec<Transition>,
}

impl EpisodeTrajectory {
    /// Creates an empty trajectory with room for `capacity` steps.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            transitions: Vec::with_capacity(capacity),
        }
    }

    /// Appends a transition.
    pub fn push(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    /// Number of steps in the episode.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Whether the trajectory holds no transitions.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
