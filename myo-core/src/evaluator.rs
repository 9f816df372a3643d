//! Evaluate a trained agent.
use crate::{
    record::Record,
    simulator::{speed_cost, SimulatorConfig},
    Agent, Env, EpisodeTrajectory, ExperienceBufferBase, ReplayBufferBase,
};
use anyhow::Result;

/// Runs greedy test episodes and reports the mean return and success
/// rate.
///
/// The rollout matches the training loop (speed token appended to every
/// observation, speed penalty subtracted per step) but takes the
/// deterministic action and never touches the replay memory.
pub struct Evaluator<E: Env> {
    env: E,
    speed_token: f32,
    n_episodes: usize,
}

impl<E: Env> Evaluator<E> {
    /// Constructs an evaluator over a freshly built environment.
    pub fn new(config: &E::Config, seed: i64, n_episodes: usize) -> Result<Self> {
        Ok(Self {
            env: E::build(config, seed)?,
            speed_token: 0.0,
            n_episodes,
        })
    }

    /// Constructs an evaluator matching a simulator configuration.
    pub fn from_simulator_config(
        env_config: &E::Config,
        seed: i64,
        n_episodes: usize,
        config: &SimulatorConfig,
    ) -> Result<Self> {
        let mut evaluator = Self::new(env_config, seed, n_episodes)?;
        evaluator.speed_token = config.speed_token;
        Ok(evaluator)
    }

    /// Evaluates the agent, restoring its train/eval mode afterwards.
    pub fn evaluate<A, R>(&mut self, agent: &mut A) -> Result<Record>
    where
        A: Agent<E, R>,
        R: ExperienceBufferBase<Item = EpisodeTrajectory> + ReplayBufferBase,
    {
        let was_training = agent.is_train();
        agent.eval();

        let mut total_reward = 0.0;
        let mut n_success = 0usize;

        for _ in 0..self.n_episodes {
            let max_steps = self.env.max_episode_steps();
            let mut state = self.env.reset()?;
            state.push(self.speed_token);
            let mut policy_state = agent.init_state();

            for timestep in 0..max_steps {
                let action = agent.select_action(&state, &mut policy_state, true);
                let step = self.env.step(&action);
                total_reward += step.reward - speed_cost(timestep) * self.speed_token;

                state = step.obs;
                state.push(self.speed_token);

                if step.is_done {
                    n_success += 1;
                    break;
                }
            }
        }

        if was_training {
            agent.train();
        }

        Ok(Record::from_slice(&[
            (
                "eval_reward",
                crate::record::RecordValue::Scalar(total_reward / self.n_episodes as f32),
            ),
            (
                "success_rate",
                crate::record::RecordValue::Scalar(n_success as f32 / self.n_episodes as f32),
            ),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dummy::{DummyAgent, DummyEnv, VecEpisodeBuffer};

    #[test]
    fn evaluation_reports_mean_return_and_success() {
        let mut evaluator: Evaluator<DummyEnv> = Evaluator::new(&(5, Some(2)), 0, 4).unwrap();
        let mut agent = DummyAgent::default();

        let record = evaluator
            .evaluate::<_, VecEpisodeBuffer>(&mut agent)
            .unwrap();
        assert_eq!(record.get_scalar("success_rate").unwrap(), 1.0);
        // DummyEnv pays 1.0 per step, 3 steps per episode, no token.
        assert!((record.get_scalar("eval_reward").unwrap() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn termination_on_the_last_step_counts_as_success() {
        let mut evaluator: Evaluator<DummyEnv> = Evaluator::new(&(3, Some(2)), 0, 2).unwrap();
        let mut agent = DummyAgent::default();

        let record = evaluator
            .evaluate::<_, VecEpisodeBuffer>(&mut agent)
            .unwrap();
        assert_eq!(record.get_scalar("success_rate").unwrap(), 1.0);
    }

    #[test]
    fn evaluation_restores_training_mode() {
        let mut evaluator: Evaluator<DummyEnv> = Evaluator::new(&(3, None), 0, 1).unwrap();
        let mut agent = DummyAgent::default();
        agent.training = true;
        evaluator
            .evaluate::<_, VecEpisodeBuffer>(&mut agent)
            .unwrap();
        assert!(agent.training);
    }
}
