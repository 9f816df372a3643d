use super::{spike, Neuron, NeuronConfig};
use tch::{nn, Device, Kind, Tensor};

/// State of an [`AdaptiveLeaky`] layer.
pub struct AdaptiveLeakyState {
    /// Spikes emitted on the previous step.
    pub spk: Tensor,
    /// Membrane potential.
    pub mem: Tensor,
    /// Threshold adaptation trace.
    pub b: Tensor,
}

/// Leaky integrate-and-fire neuron layer with an adaptive threshold and
/// recurrent spike feedback.
///
/// Each spike raises the neuron's own threshold, which then decays back
/// with rate `rho`, and the previous step's spikes are fed back into the
/// membrane through a learned linear map.
pub struct AdaptiveLeaky {
    beta: f64,
    base_threshold: f64,
    rho: f64,
    adapt_scale: f64,
    slope: f64,
    recurrent: nn::Linear,
}

impl Neuron for AdaptiveLeaky {
    type State = AdaptiveLeakyState;

    fn build(p: &nn::Path, features: i64, config: &NeuronConfig) -> Self {
        let recurrent = nn::linear(p / "rec", features, features, Default::default());

        Self {
            beta: config.beta,
            base_threshold: config.threshold,
            rho: config.rho,
            adapt_scale: config.adapt_scale,
            slope: config.surrogate_slope,
            recurrent,
        }
    }

    fn zero_state(&self, batch_size: i64, features: i64, device: Device) -> Self::State {
        let zeros = || Tensor::zeros([batch_size, features], (Kind::Float, device));
        AdaptiveLeakyState {
            spk: zeros(),
            mem: zeros(),
            b: zeros(),
        }
    }

    fn step(&self, cur: &Tensor, state: Self::State) -> (Tensor, Self::State) {
        let mem = state.mem * self.beta + cur + state.spk.apply(&self.recurrent);
        let threshold = &state.b * self.adapt_scale + self.base_threshold;
        let spk = spike(&(&mem - &threshold), self.slope);
        let b = state.b * self.rho + &spk * (1.0 - self.rho);
        let mem = mem - (&spk * &threshold).detach();
        let state = AdaptiveLeakyState {
            spk: spk.shallow_clone(),
            mem,
            b,
        };
        (spk, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    #[test]
    fn threshold_rises_after_spike() {
        let vs = nn::VarStore::new(Device::Cpu);
        let config = NeuronConfig::default();
        let lif = AdaptiveLeaky::build(&vs.root(), 2, &config);
        let state = lif.zero_state(1, 2, Device::Cpu);
        let cur = Tensor::from_slice(&[2.0f32, 0.0]).reshape([1, 2]);

        let (spk, state) = lif.step(&cur, state);
        assert_eq!(spk.sum(Kind::Float).double_value(&[]), 1.0);
        // the trace of the spiking neuron moved toward 1
        let b: Vec<f32> = Vec::<f32>::try_from(state.b.reshape([-1])).unwrap();
        assert!(b[0] > 0.0);
        assert_eq!(b[1], 0.0);
    }
}
