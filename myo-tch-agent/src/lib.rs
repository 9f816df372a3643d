//! SAC agents and network variants implemented with [tch](https://crates.io/crates/tch).
//!
//! The policy and critic networks come in four interchangeable
//! architectures (feedforward MLP, LSTM-recurrent, leaky
//! integrate-and-fire spiking and adaptive-threshold spiking) sharing
//! one external contract: a tanh-squashed Gaussian action distribution
//! with bounded actions, and twin Q-networks over state-action input.
pub mod model;
pub mod opt;
pub mod util;

pub mod lstm;
pub mod mlp;
pub mod replay;
pub mod sac;
pub mod snn;
