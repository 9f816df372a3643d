//! Spiking policy and critic networks.
//!
//! Layers of leaky integrate-and-fire neurons sit between the linear
//! maps. The forward spike is a hard threshold; the backward pass sees
//! a scaled sigmoid through a straight-through estimator, so the nets
//! train with ordinary backprop.
mod adaptive;
mod config;
mod leaky;
mod policy;
mod qnet;

pub use adaptive::{AdaptiveLeaky, AdaptiveLeakyState};
pub use config::{NeuronConfig, SnnConfig};
pub use leaky::Leaky;
pub use policy::{SpikingPolicy, SpikingPolicyState};
pub use qnet::SpikingQnet;

use tch::{nn, Device, Kind, Tensor};

/// A layer of spiking neurons.
///
/// The layer maps an input current to a spike tensor of the same shape,
/// carrying membrane state across steps of one sequence.
pub trait Neuron {
    /// Per-sequence state (membrane potentials and the like).
    type State;

    /// Builds the layer for `features` neurons.
    fn build(p: &nn::Path, features: i64, config: &NeuronConfig) -> Self;

    /// Returns the state for the start of a fresh sequence.
    fn zero_state(&self, batch_size: i64, features: i64, device: Device) -> Self::State;

    /// Integrates one step of input current, returning the spikes.
    fn step(&self, cur: &Tensor, state: Self::State) -> (Tensor, Self::State);
}

/// Heaviside spike with a sigmoid surrogate gradient.
///
/// `v` is the membrane potential minus the threshold.
pub(crate) fn spike(v: &Tensor, slope: f64) -> Tensor {
    let soft = (v * slope).sigmoid();
    let hard = v.gt(0.0).to_kind(Kind::Float);
    &soft + (hard - &soft).detach()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    #[test]
    fn spike_is_binary_in_forward() {
        let v = Tensor::from_slice(&[-0.5f32, 0.1, 2.0]);
        let spk = spike(&v, 25.0);
        let expect = Tensor::from_slice(&[0.0f32, 1.0, 1.0]);
        assert_eq!(Vec::<f32>::try_from(&spk).unwrap(), Vec::<f32>::try_from(&expect).unwrap());
    }

    #[test]
    fn spike_has_gradient() {
        let v = Tensor::from_slice(&[0.1f32]).set_requires_grad(true);
        let spk = spike(&v, 25.0);
        spk.sum(Kind::Float).backward();
        let g = v.grad().sum(Kind::Float).double_value(&[]);
        assert!(g > 0.0);
    }
}
