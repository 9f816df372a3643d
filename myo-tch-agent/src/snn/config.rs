use crate::util::OutDim;
use serde::{Deserialize, Serialize};

/// Parameters shared by all neurons of a spiking network.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct NeuronConfig {
    /// Membrane decay per step.
    pub beta: f64,
    /// Firing threshold (the base threshold for adaptive neurons).
    pub threshold: f64,
    /// Decay of the adaptive threshold trace.
    pub rho: f64,
    /// Scale of the adaptive threshold on top of the base.
    pub adapt_scale: f64,
    /// Slope of the sigmoid surrogate gradient.
    pub surrogate_slope: f64,
}

impl Default for NeuronConfig {
    fn default() -> Self {
        Self {
            beta: 0.95,
            threshold: 1.0,
            rho: 0.9,
            adapt_scale: 1.8,
            surrogate_slope: 25.0,
        }
    }
}

/// Configuration of [`SpikingPolicy`](super::SpikingPolicy) and
/// [`SpikingQnet`](super::SpikingQnet).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct SnnConfig {
    pub(super) in_dim: i64,
    pub(super) hidden_dim: i64,
    pub(super) out_dim: i64,
    pub(super) neuron: NeuronConfig,
}

impl SnnConfig {
    /// Constructs a spiking network configuration with default neurons.
    pub fn new(in_dim: i64, hidden_dim: i64, out_dim: i64) -> Self {
        Self {
            in_dim,
            hidden_dim,
            out_dim,
            neuron: NeuronConfig::default(),
        }
    }

    /// Overrides the neuron parameters.
    pub fn neuron(mut self, neuron: NeuronConfig) -> Self {
        self.neuron = neuron;
        self
    }
}

impl OutDim for SnnConfig {
    fn get_out_dim(&self) -> i64 {
        self.out_dim
    }

    fn set_out_dim(&mut self, out_dim: i64) {
        self.out_dim = out_dim;
    }
}
