//! Core traits and data types.
mod agent;
mod env;
mod policy;
mod replay_buffer;
mod step;
mod transition;

pub use agent::{Agent, UpdateStats};
pub use env::Env;
pub use policy::Policy;
pub use replay_buffer::{ExperienceBufferBase, ReplayBufferBase};
pub use step::Step;
pub use transition::{EpisodeTrajectory, Transition};
