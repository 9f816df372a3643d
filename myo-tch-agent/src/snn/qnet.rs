use super::{Neuron, SnnConfig};
use crate::model::{Buildable, StatefulModel2};
use tch::{nn, Device, Tensor};

/// Spiking action-value network.
///
/// Two spiking layers encode the state-action pair; a linear readout
/// decodes the second layer's spikes to the value. `in_dim` of the
/// configuration is the observation size plus the action size and
/// `out_dim` is 1.
pub struct SpikingQnet<N: Neuron> {
    config: SnnConfig,
    device: Device,
    fc1: nn::Linear,
    lif1: N,
    fc2: nn::Linear,
    lif2: N,
    head: nn::Linear,
}

impl<N: Neuron> Buildable for SpikingQnet<N> {
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
            head: nn::linear(p / "head", hidden_dim, out_dim, Default::default()),
            config,
        }
    }

    fn clone_with_var_store(&self, var_store: &nn::VarStore) -> Self {
        Self::build(var_store, self.config.clone())
    }
}

impl<N: Neuron> StatefulModel2 for SpikingQnet<N> {
    type Output = Tensor;

    fn seq(&self, input1: &Tensor, input2: &Tensor) -> Self::Output {
        let input1: Tensor = input1.to(self.device);
        let input2: Tensor = input2.to(self.device);
        let xu = Tensor::cat(&[input1, input2], -1);
        let (batch_size, len) = (xu.size()[0], xu.size()[1]);
        let h = self.config.hidden_dim;
        let mut lif1 = self.lif1.zero_state(batch_size, h, self.device);
        let mut lif2 = self.lif2.zero_state(batch_size, h, self.device);
        let mut qs = Vec::with_capacity(len as usize);

        for t in 0..len {
            let cur1 = xu.select(1, t).apply(&self.fc1);
            let (spk1, s1) = self.lif1.step(&cur1, lif1);
            let (spk2, s2) = self.lif2.step(&spk1.apply(&self.fc2), lif2);
            lif1 = s1;
            lif2 = s2;
            qs.push(spk2.apply(&self.head));
        }

        Tensor::stack(&qs, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snn::AdaptiveLeaky;
    use tch::Kind;

    #[test]
    fn seq_outputs_one_value_per_step() {
        let vs = nn::VarStore::new(Device::Cpu);
        let qnet = SpikingQnet::<AdaptiveLeaky>::build(&vs, SnnConfig::new(6, 8, 1));
        let obs = Tensor::zeros([3, 5, 4], (Kind::Float, Device::Cpu));
        let act = Tensor::zeros([3, 5, 2], (Kind::Float, Device::Cpu));
        assert_eq!(qnet.seq(&obs, &act).size(), vec![3, 5, 1]);
    }
}
