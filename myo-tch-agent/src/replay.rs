//! Replay buffers over episode trajectories.
//!
//! Both buffers ingest whole [`EpisodeTrajectory`]s and overwrite the
//! oldest entries once full. [`EpisodicReplayBuffer`] keeps episodes
//! intact and batches them as front-padded sequences for the recurrent
//! and spiking agents; [`TransitionReplayBuffer`] flattens episodes into
//! independent transitions for the feedforward agent.
//!
//! [`EpisodeTrajectory`]: myo_core::EpisodeTrajectory
mod config;
mod episodic;
mod flat;

pub use config::ReplayBufferConfig;
pub use episodic::{EpisodicReplayBuffer, PaddedSeqBatch};
pub use flat::{TransitionBatch, TransitionReplayBuffer};

/// Draws `n` distinct indices from `0..len` by a partial shuffle.
pub(crate) fn sample_indices(rng: &mut fastrand::Rng, len: usize, n: usize) -> Vec<usize> {
    debug_assert!(n <= len);
    let mut indices: Vec<usize> = (0..len).collect();
    for i in 0..n {
        let j = rng.usize(i..len);
        indices.swap(i, j);
    }
    indices.truncate(n);
    indices
}

#[cfg(test)]
mod tests {
    use super::sample_indices;

    #[test]
    fn sampled_indices_are_distinct() {
        let mut rng = fastrand::Rng::with_seed(42);
        for _ in 0..10 {
            let mut indices = sample_indices(&mut rng, 10, 7);
            indices.sort_unstable();
            indices.dedup();
            assert_eq!(indices.len(), 7);
            assert!(indices.iter().all(|&i| i < 10));
        }
    }
}
