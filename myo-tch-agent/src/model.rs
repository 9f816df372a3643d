//! Interfaces and wrappers for neural networks.
mod base;
mod config;
mod wrapper;

pub use base::{Buildable, ModelBase, StatefulModel, StatefulModel2, SubModel, SubModel2};
pub use config::ModelConfig;
pub use wrapper::Model;
