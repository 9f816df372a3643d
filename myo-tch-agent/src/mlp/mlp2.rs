use super::{mlp, MlpConfig};
use crate::model::{Buildable, SubModel};
use tch::{nn, nn::Module, Device, Tensor};

/// Multilayer perceptron with two output heads of the same size.
///
/// Used as the feedforward policy: the heads are the mean and the
/// (unclamped) log standard deviation of the action distribution.
pub struct Mlp2 {
    config: MlpConfig,
    device: Device,
    head1: nn::Linear,
    head2: nn::Linear,
    seq: nn::Sequential,
}

impl Buildable for Mlp2 {
    type Config = MlpConfig;

    fn build(var_store: &nn::VarStore, config: Self::Config) -> Self {
        let seq = mlp("al", var_store, &config);
        let out_dim = config.out_dim;
        let in_dim = *config.units.last().unwrap_or(&config.in_dim);
        let p = &var_store.root();

        let head1 = nn::linear(p / "ml", in_dim, out_dim, Default::default());
        let head2 = nn::linear(p / "sl", in_dim, out_dim, Default::default());

        Self {
            config,
            device: var_store.device(),
            head1,
            head2,
            seq,
        }
    }

    fn clone_with_var_store(&self, var_store: &nn::VarStore) -> Self {
        Self::build(var_store, self.config.clone())
    }
}

impl SubModel for Mlp2 {
    type Input = Tensor;
    type Output = (Tensor, Tensor);

    fn forward(&self, input: &Self::Input) -> Self::Output {
        let x = self.seq.forward(&input.to(self.device));
        let mean = x.apply(&self.head1);
        let lstd = x.apply(&self.head2);
        (mean, lstd)
    }
}
