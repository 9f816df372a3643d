use anyhow::Result;
use myo_core::{Env, Step};
use serde::{Deserialize, Serialize};

const DT: f32 = 0.05;
const DAMPING: f32 = 0.9;

/// Configuration of [`ReachEnv`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ReachEnvConfig {
    /// Step limit per episode.
    pub max_episode_steps: usize,
    /// Distance to the target below which the episode succeeds.
    pub goal_radius: f32,
}

impl Default for ReachEnvConfig {
    fn default() -> Self {
        Self {
            max_episode_steps: 500,
            goal_radius: 0.05,
        }
    }
}

/// Planar point-reach task.
///
/// A point mass driven by two antagonistic activations in `[0, 1]` (one
/// per axis, centered at 0.5) has to reach a target sampled on the unit
/// square. The observation is `[px, py, vx, vy, tx, ty]`, the reward is
/// the negative distance to the target and the episode terminates when
/// the mass enters the goal radius. Fully deterministic given the seed;
/// a stand-in for the external musculoskeletal simulation.
pub struct ReachEnv {
    config: ReachEnvConfig,
    rng: fastrand::Rng,
    pos: [f32; 2],
    vel: [f32; 2],
    target: [f32; 2],
}

impl ReachEnv {
    fn distance(&self) -> f32 {
        let dx = self.pos[0] - self.target[0];
        let dy = self.pos[1] - self.target[1];
        (dx * dx + dy * dy).sqrt()
    }

    fn observe(&self) -> Vec<f32> {
        vec![
            self.pos[0],
            self.pos[1],
            self.vel[0],
            self.vel[1],
            self.target[0],
            self.target[1],
        ]
    }
}

impl Env for ReachEnv {
    type Config = ReachEnvConfig;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            rng: fastrand::Rng::with_seed(seed as u64),
            pos: [0.0; 2],
            vel: [0.0; 2],
            target: [0.0; 2],
        })
    }

    fn reset(&mut self) -> Result<Vec<f32>> {
        self.pos = [0.0; 2];
        self.vel = [0.0; 2];
        self.target = [
            self.rng.f32() * 2.0 - 1.0,
            self.rng.f32() * 2.0 - 1.0,
        ];
        Ok(self.observe())
    }

    fn step(&mut self, act: &[f32]) -> Step {
        for i in 0..2 {
            let force = (act.get(i).copied().unwrap_or(0.5) - 0.5) * 2.0;
            self.vel[i] = self.vel[i] * DAMPING + force * DT;
            self.pos[i] += self.vel[i] * DT;
        }

        let distance = self.distance();
        let is_done = distance < self.config.goal_radius;
        Step::new(self.observe(), -distance, is_done)
    }

    fn render(&mut self) {
        log::debug!(
            "pos ({:.3}, {:.3}) target ({:.3}, {:.3})",
            self.pos[0],
            self.pos[1],
            self.target[0],
            self.target[1]
        );
    }

    fn max_episode_steps(&self) -> usize {
        self.config.max_episode_steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_gives_same_rollout() {
        let config = ReachEnvConfig::default();
        let mut a = ReachEnv::build(&config, 7).unwrap();
        let mut b = ReachEnv::build(&config, 7).unwrap();
        assert_eq!(a.reset().unwrap(), b.reset().unwrap());
        for _ in 0..20 {
            let sa = a.step(&[0.8, 0.3]);
            let sb = b.step(&[0.8, 0.3]);
            assert_eq!(sa.obs, sb.obs);
            assert_eq!(sa.reward, sb.reward);
        }
    }

    #[test]
    fn moving_toward_target_terminates() {
        let config = ReachEnvConfig {
            max_episode_steps: 2000,
            goal_radius: 0.05,
        };
        let mut env = ReachEnv::build(&config, 1).unwrap();
        env.reset().unwrap();

        // steer straight at the target with saturated activations
        let mut done = false;
        for _ in 0..config.max_episode_steps {
            let obs = env.observe();
            let act = [
                if obs[4] > obs[0] { 1.0 } else { 0.0 },
                if obs[5] > obs[1] { 1.0 } else { 0.0 },
            ];
            let step = env.step(&act);
            if step.is_done {
                done = true;
                break;
            }
        }
        assert!(done);
    }

    #[test]
    fn reward_is_negative_distance() {
        let config = ReachEnvConfig::default();
        let mut env = ReachEnv::build(&config, 3).unwrap();
        env.reset().unwrap();
        let step = env.step(&[0.5, 0.5]);
        assert!(step.reward <= 0.0);
        assert!(!step.is_done || -step.reward < config.goal_radius);
    }
}
