//! LSTM-recurrent policy and critic networks.
//!
//! Both nets run a plain fc branch and an LSTM branch in parallel over
//! the input and concatenate them before the output heads, so the
//! network sees the raw observation at each step next to the recurrent
//! summary of the episode so far.
mod config;
mod policy;
mod qnet;

pub use config::LstmConfig;
pub use policy::LstmPolicy;
pub use qnet::LstmQnet;
