use super::{spike, Neuron, NeuronConfig};
use tch::{nn, Device, Kind, Tensor};

/// Leaky integrate-and-fire neuron layer.
///
/// The membrane decays by `beta` per step and integrates the input
/// current; crossing the threshold emits a spike and subtracts the
/// threshold from the membrane. The reset is detached so gradients flow
/// through the surrogate only.
pub struct Leaky {
    beta: f64,
    threshold: f64,
    slope: f64,
}

impl Neuron for Leaky {
    type State = Tensor;

    fn build(_p: &nn::Path, _features: i64, config: &NeuronConfig) -> Self {
        Self {
            beta: config.beta,
            threshold: config.threshold,
            slope: config.surrogate_slope,
        }
    }

    fn zero_state(&self, batch_size: i64, features: i64, device: Device) -> Self::State {
        Tensor::zeros([batch_size, features], (Kind::Float, device))
    }

    fn step(&self, cur: &Tensor, mem: Self::State) -> (Tensor, Self::State) {
        let mem = mem * self.beta + cur;
        let spk = spike(&(&mem - self.threshold), self.slope);
        let mem = mem - (&spk * self.threshold).detach();
        (spk, mem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membrane_integrates_and_resets() {
        let vs = nn::VarStore::new(Device::Cpu);
        let config = NeuronConfig::default();
        let lif = Leaky::build(&vs.root(), 1, &config);
        let mut mem = lif.zero_state(1, 1, Device::Cpu);
        let cur = Tensor::from_slice(&[0.6f32]).reshape([1, 1]);

        // first step stays below threshold, second crosses it
        let (spk, m) = lif.step(&cur, mem);
        mem = m;
        assert_eq!(spk.sum(Kind::Float).double_value(&[]), 0.0);
        let (spk, m) = lif.step(&cur, mem);
        mem = m;
        assert_eq!(spk.sum(Kind::Float).double_value(&[]), 1.0);
        // reset by subtraction leaves the residual membrane
        let v = mem.sum(Kind::Float).double_value(&[]);
        assert!(v < config.threshold && v > 0.0);
    }
}
