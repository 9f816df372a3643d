use super::LstmConfig;
use crate::model::{Buildable, StatefulModel};
use tch::{nn, nn::RNN, Device, Tensor};

/// Recurrent Gaussian policy network.
///
/// The observation feeds a fc branch and an LSTM branch; their outputs
/// are concatenated and projected before the mean and log-std heads.
pub struct LstmPolicy {
    config: LstmConfig,
    device: Device,
    fc: nn::Linear,
    lstm: nn::LSTM,
    merge: nn::Linear,
    mean_head: nn::Linear,
    lstd_head: nn::Linear,
}

impl Buildable for LstmPolicy {
    type Config = LstmConfig;

    fn build(var_store: &nn::VarStore, config: Self::Config) -> Self {
        let p = &var_store.root();
        let (in_dim, hidden_dim, out_dim) = (config.in_dim, config.hidden_dim, config.out_dim);
        let fc = nn::linear(p / "fc", in_dim, hidden_dim, Default::default());
        let lstm = nn::lstm(p / "lstm", in_dim, hidden_dim, Default::default());
        let merge = nn::linear(p / "merge", 2 * hidden_dim, hidden_dim, Default::default());
        let mean_head = nn::linear(p / "ml", hidden_dim, out_dim, Default::default());
        let lstd_head = nn::linear(p / "sl", hidden_dim, out_dim, Default::default());

        Self {
            config,
            device: var_store.device(),
            fc,
            lstm,
            merge,
            mean_head,
            lstd_head,
        }
    }

    fn clone_with_var_store(&self, var_store: &nn::VarStore) -> Self {
        Self::build(var_store, self.config.clone())
    }
}

impl LstmPolicy {
    fn heads(&self, fc_out: &Tensor, lstm_out: &Tensor) -> (Tensor, Tensor) {
        let x = Tensor::cat(&[fc_out, lstm_out], -1)
            .apply(&self.merge)
            .relu();
        (x.apply(&self.mean_head), x.apply(&self.lstd_head))
    }
}

impl StatefulModel for LstmPolicy {
    type State = nn::LSTMState;
    type Output = (Tensor, Tensor);

    fn zero_state(&self, batch_size: i64) -> Self::State {
        self.lstm.zero_state(batch_size)
    }

    fn step(&self, input: &Tensor, state: Self::State) -> (Self::Output, Self::State) {
        let input = input.to(self.device);
        let fc_out = input.apply(&self.fc).relu();
        let state = self.lstm.step(&input, &state);
        // h is [layers, batch, hidden] with a single layer
        let lstm_out = state.h().squeeze_dim(0);
        (self.heads(&fc_out, &lstm_out), state)
    }

    fn seq(&self, input: &Tensor) -> Self::Output {
        let input = input.to(self.device);
        let fc_out = input.apply(&self.fc).relu();
        let (lstm_out, _) = self.lstm.seq(&input);
        self.heads(&fc_out, &lstm_out)
    }
}
