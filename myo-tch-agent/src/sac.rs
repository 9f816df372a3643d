//! Soft actor-critic agents.
//!
//! [`Sac`] is the feedforward variant trained on independent
//! transitions; [`SeqSac`] trains recurrent or spiking networks on
//! whole padded episodes, replaying each sequence from `t = 0`.
mod base;
mod config;
mod ent_coef;
mod seq;

pub use base::Sac;
pub use config::SacConfig;
pub use ent_coef::{EntCoef, EntCoefMode};
pub use seq::SeqSac;

use tch::{Kind, Tensor};

/// Reparameterized sample from a tanh-squashed Gaussian.
///
/// `mean` and `lstd` carry the action dimension last; the returned log
/// probability is summed over it with the axis kept. The squash
/// correction uses `log(scale * (1 - tanh(x)^2) + epsilon)` for
/// numerical stability at the tails.
pub(crate) fn squash_gaussian(
    mean: &Tensor,
    lstd: &Tensor,
    scale: f64,
    bias: f64,
    epsilon: f64,
) -> (Tensor, Tensor, Tensor) {
    let std = lstd.exp();
    let noise = Tensor::randn(mean.size().as_slice(), (Kind::Float, mean.device()));
    let x = mean + &std * noise;
    let y = x.tanh();
    let action = &y * scale + bias;

    let normal_log_prob: Tensor = -0.5
        * (((&x - mean) / &std).pow_tensor_scalar(2)
            + 2.0 * lstd
            + (2.0 * std::f64::consts::PI).ln());
    let correction = ((1.0f64 - y.pow_tensor_scalar(2)) * scale + epsilon).log();
    let log_prob = (normal_log_prob - correction).sum_dim_intlist(
        Some([-1i64].as_slice()),
        true,
        Kind::Float,
    );

    let mean_action = mean.tanh() * scale + bias;
    (action, log_prob, mean_action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::Device;

    #[test]
    fn squashed_actions_stay_in_unit_interval() {
        let mean = Tensor::randn([16, 4], (Kind::Float, Device::Cpu)) * 5.0;
        let lstd = Tensor::zeros([16, 4], (Kind::Float, Device::Cpu));
        let (action, log_prob, mean_action) = squash_gaussian(&mean, &lstd, 0.5, 0.5, 1e-6);

        assert_eq!(action.size(), vec![16, 4]);
        assert_eq!(log_prob.size(), vec![16, 1]);
        let max = action.max().double_value(&[]);
        let min = action.min().double_value(&[]);
        assert!(max <= 1.0 && min >= 0.0);
        let max = mean_action.max().double_value(&[]);
        let min = mean_action.min().double_value(&[]);
        assert!(max <= 1.0 && min >= 0.0);
    }

    #[test]
    fn log_prob_keeps_time_axis_on_sequences() {
        let mean = Tensor::zeros([2, 7, 3], (Kind::Float, Device::Cpu));
        let lstd = Tensor::zeros([2, 7, 3], (Kind::Float, Device::Cpu));
        let (_, log_prob, _) = squash_gaussian(&mean, &lstd, 0.5, 0.5, 1e-6);
        assert_eq!(log_prob.size(), vec![2, 7, 1]);
    }
}
