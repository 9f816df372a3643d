#![warn(missing_docs)]
//! Core abstractions for training musculoskeletal control policies.
//!
//! This crate is backend-free: it defines the contracts between the
//! simulated environment, the trainable agent and the replay memory, and
//! drives the episode/update loop. Concrete neural networks and replay
//! buffers built on `tch` live in `myo-tch-agent`.
pub mod error;
pub mod record;

mod base;
pub use base::{
    Agent, Env, EpisodeTrajectory, ExperienceBufferBase, Policy, ReplayBufferBase, Step,
    Transition, UpdateStats,
};

mod simulator;
pub use simulator::{speed_cost, EpisodeStats, Simulator, SimulatorConfig};

mod evaluator;
pub use evaluator::Evaluator;

#[cfg(test)]
pub(crate) mod dummy;
