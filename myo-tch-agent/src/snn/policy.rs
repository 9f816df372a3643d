use super::{Neuron, SnnConfig};
use crate::model::{Buildable, StatefulModel};
use tch::{nn, Device, Tensor};

/// State of a [`SpikingPolicy`], one entry per neuron layer.
pub struct SpikingPolicyState<N: Neuron> {
    lif1: N::State,
    lif2: N::State,
    mean_lif: N::State,
    lstd_lif: N::State,
}

/// Spiking Gaussian policy network.
///
/// Two spiking layers encode the observation; separate spiking heads
/// for the mean and the log-std are decoded back to real values by
/// plain linear readouts.
pub struct SpikingPolicy<N: Neuron> {
    config: SnnConfig,
    device: Device,
    fc1: nn::Linear,
    lif1: N,
    fc2: nn::Linear,
    lif2: N,
    mean_fc: nn::Linear,
    mean_lif: N,
    mean_dec: nn::Linear,
    lstd_fc: nn::Linear,
    lstd_lif: N,
    lstd_dec: nn::Linear,
}

impl<N: Neuron> Buildable for SpikingPolicy<N> {
    type Config = SnnConfig;

    fn build(var_store: &nn::VarStore, config: Self::Config) -> Self {
        let p = &var_store.root();
        let (in_dim, hidden_dim, out_dim) = (config.in_dim, config.hidden_dim, config.out_dim);
        let neuron = &config.neuron;

        Self {
            device: var_store.device(),
            fc1: nn::linear(p / "fc1", in_dim, hidden_dim, Default::default()),
            lif1: N::build(&(p / "lif1"), hidden_dim, neuron),
            fc2: nn::linear(p / "fc2", hidden_dim, hidden_dim, Default::default()),
            lif2: N::build(&(p / "lif2"), hidden_dim, neuron),
            mean_fc: nn::linear(p / "mean_fc", hidden_dim, hidden_dim, Default::default()),
            mean_lif: N::build(&(p / "mean_lif"), hidden_dim, neuron),
            mean_dec: nn::linear(p / "mean_dec", hidden_dim, out_dim, Default::default()),
            lstd_fc: nn::linear(p / "lstd_fc", hidden_dim, hidden_dim, Default::default()),
            lstd_lif: N::build(&(p / "lstd_lif"), hidden_dim, neuron),
            lstd_dec: nn::linear(p / "lstd_dec", hidden_dim, out_dim, Default::default()),
            config,
        }
    }

    fn clone_with_var_store(&self, var_store: &nn::VarStore) -> Self {
        Self::build(var_store, self.config.clone())
    }
}

impl<N: Neuron> StatefulModel for SpikingPolicy<N> {
    type State = SpikingPolicyState<N>;
    type Output = (Tensor, Tensor);

    fn zero_state(&self, batch_size: i64) -> Self::State {
        let h = self.config.hidden_dim;
        SpikingPolicyState {
            lif1: self.lif1.zero_state(batch_size, h, self.device),
            lif2: self.lif2.zero_state(batch_size, h, self.device),
            mean_lif: self.mean_lif.zero_state(batch_size, h, self.device),
            lstd_lif: self.lstd_lif.zero_state(batch_size, h, self.device),
        }
    }

    fn step(&self, input: &Tensor, state: Self::State) -> (Self::Output, Self::State) {
        let (spk1, lif1) = self.lif1.step(&input.to(self.device).apply(&self.fc1), state.lif1);
        let (spk2, lif2) = self.lif2.step(&spk1.apply(&self.fc2), state.lif2);
        let (mean_spk, mean_lif) = self
            .mean_lif
            .step(&spk2.apply(&self.mean_fc), state.mean_lif);
        let (lstd_spk, lstd_lif) = self
            .lstd_lif
            .step(&spk2.apply(&self.lstd_fc), state.lstd_lif);
        let mean = mean_spk.apply(&self.mean_dec);
        let lstd = lstd_spk.apply(&self.lstd_dec);
        let state = SpikingPolicyState {
            lif1,
            lif2,
            mean_lif,
            lstd_lif,
        };
        ((mean, lstd), state)
    }

    fn seq(&self, input: &Tensor) -> Self::Output {
        let input = input.to(self.device);
        let len = input.size()[1];
        let mut state = self.zero_state(input.size()[0]);
        let mut means = Vec::with_capacity(len as usize);
        let mut lstds = Vec::with_capacity(len as usize);

        for t in 0..len {
            let ((mean, lstd), next) = self.step(&input.select(1, t), state);
            state = next;
            means.push(mean);
            lstds.push(lstd);
        }

        (Tensor::stack(&means, 1), Tensor::stack(&lstds, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snn::Leaky;
    use tch::Kind;

    #[test]
    fn seq_keeps_time_axis() {
        let vs = nn::VarStore::new(Device::Cpu);
        let pi = SpikingPolicy::<Leaky>::build(&vs, SnnConfig::new(4, 8, 2));
        let x = Tensor::zeros([3, 5, 4], (Kind::Float, Device::Cpu));
        let (mean, lstd) = pi.seq(&x);
        assert_eq!(mean.size(), vec![3, 5, 2]);
        assert_eq!(lstd.size(), vec![3, 5, 2]);
    }

    #[test]
    fn step_matches_head_dims() {
        let vs = nn::VarStore::new(Device::Cpu);
        let pi = SpikingPolicy::<Leaky>::build(&vs, SnnConfig::new(4, 8, 2));
        let state = pi.zero_state(1);
        let x = Tensor::zeros([1, 4], (Kind::Float, Device::Cpu));
        let ((mean, lstd), _) = pi.step(&x, state);
        assert_eq!(mean.size(), vec![1, 2]);
        assert_eq!(lstd.size(), vec![1, 2]);
    }
}
