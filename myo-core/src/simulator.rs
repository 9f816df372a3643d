//! Drives episodes and off-policy updates.
mod config;

use crate::{
    record::{Record, RecordValue::Scalar, Recorder},
    Agent, Env, EpisodeTrajectory, ExperienceBufferBase, ReplayBufferBase, Transition,
};
use anyhow::Result;
use log::info;
pub use config::SimulatorConfig;

/// Per-timestep cost of keeping the speed token active.
///
/// `0.1 * exp(t / 60 - 3)`: negligible early in the episode, growing
/// exponentially so that slow rollouts are penalized.
pub fn speed_cost(timestep: usize) -> f32 {
    let timestep_scale = 60.0;
    let exp_scale = 0.1;
    let shift = 3.0;
    exp_scale * (timestep as f32 / timestep_scale - shift).exp()
}

/// Result of a training episode.
#[derive(Clone, Copy, Debug)]
pub struct EpisodeStats {
    /// Cumulative reward, speed penalty included.
    pub reward: f32,

    /// Number of environment steps taken.
    pub steps: usize,

    /// Whether the environment reported termination; episodes truncated
    /// by the step limit without terminating do not count.
    pub success: bool,
}

/// Runs environment episodes, collects trajectories and triggers
/// off-policy update rounds on a fixed episode cadence.
///
/// The loop is single-threaded and synchronous: an episode is rolled out
/// to completion, updates run if due, then the trajectory is pushed to
/// the replay memory.
pub struct Simulator<E: Env> {
    env: E,
    config: SimulatorConfig,
    policy_loss_tracker: Vec<f32>,
    critic_1_loss_tracker: Vec<f32>,
    critic_2_loss_tracker: Vec<f32>,
}

impl<E: Env> Simulator<E> {
    /// Constructs a simulator over the given environment.
    pub fn new(env: E, config: SimulatorConfig) -> Self {
        Self {
            env,
            config,
            policy_loss_tracker: Vec::new(),
            critic_1_loss_tracker: Vec::new(),
            critic_2_loss_tracker: Vec::new(),
        }
    }

    /// Returns the simulator configuration.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    fn append_token(&self, mut obs: Vec<f32>) -> Vec<f32> {
        obs.push(self.config.speed_token);
        obs
    }

    /// Runs `batch_iters` update rounds if the episode cadence is due and
    /// the buffer holds more episodes than the batch size.
    fn check_update<A, R>(&mut self, agent: &mut A, buffer: &mut R, episode: usize) -> Result<()>
    where
        A: Agent<E, R>,
        R: ExperienceBufferBase<Item = EpisodeTrajectory> + ReplayBufferBase,
    {
        if episode % self.config.experience_sampling != 0 || buffer.len() <= self.config.batch_size
        {
            return Ok(());
        }

        for _ in 0..self.config.batch_iters {
            let stats = agent.update_parameters(buffer, self.config.batch_size)?;
            self.policy_loss_tracker.push(stats.policy_loss);
            self.critic_1_loss_tracker.push(stats.critic_1_loss);
            self.critic_2_loss_tracker.push(stats.critic_2_loss);
        }

        let mean = |v: &[f32]| v.iter().sum::<f32>() / v.len() as f32;
        info!(
            "mean policy loss: {} | mean critic 1 loss: {} | mean critic 2 loss: {}",
            mean(&self.policy_loss_tracker),
            mean(&self.critic_1_loss_tracker),
            mean(&self.critic_2_loss_tracker),
        );

        Ok(())
    }

    /// Rolls out one training episode, triggers updates if due, and
    /// pushes the trajectory to the replay memory.
    pub fn train_episode<A, R>(
        &mut self,
        agent: &mut A,
        buffer: &mut R,
        episode: usize,
    ) -> Result<EpisodeStats>
    where
        A: Agent<E, R>,
        R: ExperienceBufferBase<Item = EpisodeTrajectory> + ReplayBufferBase,
    {
        let mut episode_reward = 0.0;
        let mut episode_steps = 0;
        let mut success = false;

        let max_steps = self.env.max_episode_steps();
        let obs = self.env.reset()?;
        let mut state = self.append_token(obs);
        let mut trajectory = EpisodeTrajectory::with_capacity(max_steps);
        let mut policy_state = agent.init_state();

        for timestep in 0..max_steps {
            let action = agent.select_action(&state, &mut policy_state, false);

            let step = self.env.step(&action);
            let next_state = self.append_token(step.obs);
            let reward = step.reward - speed_cost(timestep) * self.config.speed_token;
            episode_reward += reward;
            episode_steps += 1;

            if self.config.visualize {
                self.env.render();
            }

            let mask = if step.is_done { 0.0 } else { 1.0 };
            trajectory.push(Transition {
                state,
                action,
                reward,
                next_state: next_state.clone(),
                mask,
            });
            state = next_state;

            if step.is_done {
                success = true;
                break;
            }
        }

        self.check_update(agent, buffer, episode)?;
        buffer.push(trajectory)?;

        Ok(EpisodeStats {
            reward: episode_reward,
            steps: episode_steps,
            success,
        })
    }

    /// Rolls out one greedy episode without buffering or updates.
    ///
    /// Returns the cumulative reward and whether the environment
    /// reported termination.
    pub fn test_episode<A, R>(&mut self, agent: &mut A) -> Result<(f32, bool)>
    where
        A: Agent<E, R>,
        R: ExperienceBufferBase<Item = EpisodeTrajectory> + ReplayBufferBase,
    {
        let mut episode_reward = 0.0;
        let mut success = false;

        let max_steps = self.env.max_episode_steps();
        let obs = self.env.reset()?;
        let mut state = self.append_token(obs);
        let mut policy_state = agent.init_state();

        for timestep in 0..max_steps {
            let action = agent.select_action(&state, &mut policy_state, true);

            let step = self.env.step(&action);
            episode_reward += step.reward - speed_cost(timestep) * self.config.speed_token;

            if self.config.visualize {
                self.env.render();
            }

            state = self.append_token(step.obs);

            if step.is_done {
                success = true;
                break;
            }
        }

        Ok((episode_reward, success))
    }

    /// Runs the full training loop for `total_episodes` episodes.
    ///
    /// Per episode, writes reward/steps/success to `recorder`; every
    /// `save_iter` episodes, saves the agent's parameters into the
    /// configured checkpoint directory.
    pub fn train<A, R>(
        &mut self,
        agent: &mut A,
        buffer: &mut R,
        recorder: &mut dyn Recorder,
    ) -> Result<()>
    where
        A: Agent<E, R>,
        R: ExperienceBufferBase<Item = EpisodeTrajectory> + ReplayBufferBase,
    {
        agent.train();

        for episode in 1..=self.config.total_episodes {
            let stats = self.train_episode(agent, buffer, episode)?;

            info!(
                "episode {}: reward {:.3}, steps {}, success {}",
                episode, stats.reward, stats.steps, stats.success
            );
            recorder.write(Record::from_slice(&[
                ("episode", Scalar(episode as f32)),
                ("episode_reward", Scalar(stats.reward)),
                ("episode_steps", Scalar(stats.steps as f32)),
                ("success", Scalar(if stats.success { 1.0 } else { 0.0 })),
            ]));

            if self.config.save_iter > 0 && episode % self.config.save_iter == 0 {
                if let Some(dir) = self.config.checkpoint_dir.as_ref() {
                    match agent.save_params(dir) {
                        Ok(()) => info!("saved agent parameters in {:?}", dir),
                        Err(e) => info!("failed to save agent parameters: {}", e),
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dummy::{DummyAgent, DummyEnv, VecEpisodeBuffer};
    use crate::record::BufferedRecorder;

    fn simulator(max_steps: usize, done_at: Option<usize>) -> Simulator<DummyEnv> {
        let env = DummyEnv::new(max_steps, done_at);
        let config = SimulatorConfig::default()
            .batch_size(2)
            .batch_iters(3)
            .experience_sampling(2)
            .speed_token(1.0)
            .total_episodes(5);
        Simulator::new(env, config)
    }

    #[test]
    fn speed_cost_grows_with_time() {
        assert!(speed_cost(0) < speed_cost(60));
        assert!(speed_cost(60) < speed_cost(180));
        // At the shift point the cost equals the base scale.
        assert!((speed_cost(180) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn episode_runs_to_step_limit_without_termination() {
        let mut sim = simulator(10, None);
        let mut agent = DummyAgent::default();
        let mut buffer = VecEpisodeBuffer::default();

        let stats = sim.train_episode(&mut agent, &mut buffer, 1).unwrap();
        assert_eq!(stats.steps, 10);
        assert!(!stats.success);
        assert_eq!(buffer.episodes.len(), 1);
        assert_eq!(buffer.episodes[0].len(), 10);
        // All masks are 1 when the limit truncates the episode.
        assert!(buffer.episodes[0].transitions.iter().all(|t| t.mask == 1.0));
    }

    #[test]
    fn early_termination_sets_success_and_mask() {
        let mut sim = simulator(10, Some(4));
        let mut agent = DummyAgent::default();
        let mut buffer = VecEpisodeBuffer::default();

        let stats = sim.train_episode(&mut agent, &mut buffer, 1).unwrap();
        assert_eq!(stats.steps, 5);
        assert!(stats.success);
        let trajectory = &buffer.episodes[0];
        assert_eq!(trajectory.len(), 5);
        assert_eq!(trajectory.transitions.last().unwrap().mask, 0.0);
    }

    #[test]
    fn termination_on_the_last_step_counts_as_success() {
        let mut sim = simulator(5, Some(4));
        let mut agent = DummyAgent::default();
        let mut buffer = VecEpisodeBuffer::default();

        let stats = sim.train_episode(&mut agent, &mut buffer, 1).unwrap();
        assert_eq!(stats.steps, 5);
        assert!(stats.success);
        assert_eq!(buffer.episodes[0].transitions.last().unwrap().mask, 0.0);

        let (_, success) = sim
            .test_episode::<_, VecEpisodeBuffer>(&mut agent)
            .unwrap();
        assert!(success);
    }

    #[test]
    fn speed_token_is_appended_to_states() {
        let mut sim = simulator(3, None);
        let mut agent = DummyAgent::default();
        let mut buffer = VecEpisodeBuffer::default();

        sim.train_episode(&mut agent, &mut buffer, 1).unwrap();
        for t in &buffer.episodes[0].transitions {
            assert_eq!(*t.state.last().unwrap(), 1.0);
            assert_eq!(*t.next_state.last().unwrap(), 1.0);
        }
    }

    #[test]
    fn updates_follow_episode_cadence_and_warmup() {
        let mut sim = simulator(5, None);
        let mut agent = DummyAgent::default();
        let mut buffer = VecEpisodeBuffer::default();

        // Episode 2 is on cadence but the buffer holds only 1 episode
        // (<= batch_size), so no update is run.
        sim.train_episode(&mut agent, &mut buffer, 1).unwrap();
        sim.train_episode(&mut agent, &mut buffer, 2).unwrap();
        assert_eq!(agent.n_updates, 0);

        // Episode 4: 3 episodes buffered > batch_size 2, cadence hit.
        sim.train_episode(&mut agent, &mut buffer, 3).unwrap();
        sim.train_episode(&mut agent, &mut buffer, 4).unwrap();
        assert_eq!(agent.n_updates, 3);
    }

    #[test]
    fn train_writes_one_record_per_episode() {
        let mut sim = simulator(3, None);
        let mut agent = DummyAgent::default();
        let mut buffer = VecEpisodeBuffer::default();
        let mut recorder = BufferedRecorder::new();

        sim.train(&mut agent, &mut buffer, &mut recorder).unwrap();
        assert_eq!(recorder.len(), 5);
        let first = recorder.iter().next().unwrap();
        assert_eq!(first.get_scalar("episode_steps").unwrap(), 3.0);
    }
}
