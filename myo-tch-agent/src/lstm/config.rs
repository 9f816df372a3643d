use crate::util::OutDim;
use serde::{Deserialize, Serialize};

/// Configuration of [`LstmPolicy`](super::LstmPolicy) and
/// [`LstmQnet`](super::LstmQnet).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct LstmConfig {
    pub(super) in_dim: i64,
    pub(super) hidden_dim: i64,
    pub(super) out_dim: i64,
}

impl LstmConfig {
    /// Constructs an LSTM network configuration.
    pub fn new(in_dim: i64, hidden_dim: i64, out_dim: i64) -> Self {
        Self {
            in_dim,
            hidden_dim,
            out_dim,
        }
    }
}

impl OutDim for LstmConfig {
    fn get_out_dim(&self) -> i64 {
        self.out_dim
    }

    fn set_out_dim(&mut self, out_dim: i64) {
        self.out_dim = out_dim;
    }
}
