use super::LstmConfig;
use crate::model::{Buildable, StatefulModel2};
use tch::{nn, nn::RNN, Device, Tensor};

/// Recurrent action-value network.
///
/// The state-action pair feeds a fc branch and a projected LSTM branch;
/// the concatenation is reduced to a scalar value per step. `in_dim` of
/// the configuration is the observation size plus the action size and
/// `out_dim` is 1.
pub struct LstmQnet {
    config: LstmConfig,
    device: Device,
    fc: nn::Linear,
    lstm_in: nn::Linear,
    lstm: nn::LSTM,
    merge: nn::Linear,
    head: nn::Linear,
}

impl Buildable for LstmQnet {
    type Config = LstmConfig;

    fn build(var_store: &nn::VarStore, config: Self::Config) -> Self {
        let p = &var_store.root();
        let (in_dim, hidden_dim, out_dim) = (config.in_dim, config.hidden_dim, config.out_dim);
        let fc = nn::linear(p / "fc", in_dim, hidden_dim, Default::default());
        let lstm_in = nn::linear(p / "lstm_in", in_dim, hidden_dim, Default::default());
        let lstm = nn::lstm(p / "lstm", hidden_dim, hidden_dim, Default::default());
        let merge = nn::linear(p / "merge", 2 * hidden_dim, hidden_dim, Default::default());
        let head = nn::linear(p / "head", hidden_dim, out_dim, Default::default());

        Self {
            config,
            device: var_store.device(),
            fc,
            lstm_in,
            lstm,
            merge,
            head,
        }
    }

    fn clone_with_var_store(&self, var_store: &nn::VarStore) -> Self {
        Self::build(var_store, self.config.clone())
    }
}

impl StatefulModel2 for LstmQnet {
    type Output = Tensor;

    fn seq(&self, input1: &Tensor, input2: &Tensor) -> Self::Output {
        let input1: Tensor = input1.to(self.device);
        let input2: Tensor = input2.to(self.device);
        let xu = Tensor::cat(&[input1, input2], -1);
        let fc_out = xu.apply(&self.fc).relu();
        let (lstm_out, _) = self.lstm.seq(&xu.apply(&self.lstm_in).relu());
        Tensor::cat(&[fc_out, lstm_out], -1)
            .apply(&self.merge)
            .relu()
            .apply(&self.head)
    }
}
