//! Trains or evaluates a muscle-control policy on the reach task.
use anyhow::{bail, Result};
use clap::Parser;
use log::info;
use myo::{CsvRecorder, ReachEnv, ReachEnvConfig};
use myo_core::{
    error::MyoError, Agent, Env, EpisodeTrajectory, Evaluator, ExperienceBufferBase,
    ReplayBufferBase, Simulator, SimulatorConfig,
};
use myo_tch_agent::{
    lstm::{LstmConfig, LstmPolicy, LstmQnet},
    mlp::{Mlp, Mlp2, MlpConfig},
    model::{Buildable, ModelConfig, StatefulModel, StatefulModel2},
    opt::OptimizerConfig,
    replay::{EpisodicReplayBuffer, ReplayBufferConfig, TransitionReplayBuffer},
    sac::{EntCoefMode, Sac, SacConfig, SeqSac},
    snn::{AdaptiveLeaky, Leaky, SnnConfig, SpikingPolicy, SpikingQnet},
};
use serde::{de::DeserializeOwned, Serialize};
use tch::{Device, Tensor};

// Reach task observation (6) plus the appended speed token.
const OBS_DIM: i64 = 7;
const ACT_DIM: i64 = 2;

#[derive(Debug, Parser)]
#[command(name = "train", about = "SAC training on the planar reach task")]
struct Args {
    /// Network variant: mlp, lstm, snn or lsnn
    #[arg(long, default_value = "snn")]
    model: String,

    /// Run mode: train or test
    #[arg(long, default_value = "train")]
    mode: String,

    /// Discount factor
    #[arg(long, default_value_t = 0.99)]
    gamma: f64,

    /// Soft update coefficient of the target networks
    #[arg(long, default_value_t = 0.005)]
    tau: f64,

    /// Learning rate of all optimizers
    #[arg(long, default_value_t = 3e-4)]
    lr: f64,

    /// Entropy coefficient (ignored with --automatic-entropy-tuning)
    #[arg(long, default_value_t = 0.2)]
    alpha: f64,

    /// Tune the entropy coefficient toward -|A|
    #[arg(long)]
    automatic_entropy_tuning: bool,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: i64,

    /// Width of the hidden layers
    #[arg(long, default_value_t = 256)]
    hidden_size: i64,

    /// Episodes (or transitions, for mlp) per training batch
    #[arg(long, default_value_t = 8)]
    batch_size: usize,

    /// Replay capacity, in episodes (or transitions, for mlp)
    #[arg(long, default_value_t = 1_000_000)]
    replay_size: usize,

    /// Update rounds per triggered update
    #[arg(long, default_value_t = 30)]
    batch_iters: usize,

    /// Episode cadence of update triggers
    #[arg(long, default_value_t = 5)]
    experience_sampling: usize,

    /// Total training episodes
    #[arg(long, default_value_t = 100_000)]
    num_episodes: usize,

    /// Episode cadence of checkpoint saves
    #[arg(long, default_value_t = 100)]
    save_iter: usize,

    /// Directory for agent checkpoints
    #[arg(long, default_value = "checkpoints")]
    checkpoint_dir: String,

    /// Speed token appended to observations (also gates the speed penalty)
    #[arg(long, default_value_t = 0.0)]
    speed_token: f32,

    /// Render the environment at every step
    #[arg(long)]
    visualize: bool,

    /// CSV file for per-episode statistics
    #[arg(long, default_value = "stats.csv")]
    stats_path: String,

    /// Number of greedy episodes in test mode
    #[arg(long, default_value_t = 10)]
    eval_episodes: usize,
}

fn sac_config<Q, P>(args: &Args, critic_net: Q::Config, actor_net: P::Config) -> SacConfig<Q, P>
where
    Q: Buildable,
    P: Buildable,
    Q::Config: DeserializeOwned + Serialize,
    P::Config: DeserializeOwned + Serialize,
{
    let ent_coef_mode = if args.automatic_entropy_tuning {
        EntCoefMode::Auto(-(ACT_DIM as f64), args.lr)
    } else {
        EntCoefMode::Fix(args.alpha)
    };

    SacConfig::default()
        .gamma(args.gamma)
        .tau(args.tau)
        .ent_coef_mode(ent_coef_mode)
        .actor_config(
            ModelConfig::default()
                .net_config(actor_net)
                .opt_config(OptimizerConfig::Adam { lr: args.lr }),
        )
        .critic_config(
            ModelConfig::default()
                .net_config(critic_net)
                .opt_config(OptimizerConfig::Adam { lr: args.lr }),
        )
}

fn replay_config(args: &Args) -> ReplayBufferConfig {
    ReplayBufferConfig::default()
        .capacity(args.replay_size)
        .seed(args.seed as u64)
}

fn simulator_config(args: &Args) -> SimulatorConfig {
    SimulatorConfig::default()
        .batch_size(args.batch_size)
        .batch_iters(args.batch_iters)
        .experience_sampling(args.experience_sampling)
        .total_episodes(args.num_episodes)
        .save_iter(args.save_iter)
        .checkpoint_dir(&args.checkpoint_dir)
        .speed_token(args.speed_token)
        .visualize(args.visualize)
}

/// Runs the selected mode with a fully wired agent and replay memory.
fn dispatch<A, R>(args: &Args, mut agent: A, mut buffer: R) -> Result<()>
where
    A: Agent<ReachEnv, R>,
    R: ExperienceBufferBase<Item = EpisodeTrajectory> + ReplayBufferBase,
{
    let env_config = ReachEnvConfig::default();
    let config = simulator_config(args);

    match args.mode.as_str() {
        "train" => {
            let env = ReachEnv::build(&env_config, args.seed)?;
            let mut simulator = Simulator::new(env, config);
            let mut recorder = CsvRecorder::new(&args.stats_path)?;
            simulator.train(&mut agent, &mut buffer, &mut recorder)
        }
        "test" => {
            agent.load_params(&args.checkpoint_dir)?;
            let mut evaluator = Evaluator::<ReachEnv>::from_simulator_config(
                &env_config,
                args.seed + 1,
                args.eval_episodes,
                &config,
            )?;
            let record = evaluator.evaluate::<_, R>(&mut agent)?;
            info!(
                "eval reward {:.3}, success rate {:.2}",
                record.get_scalar("eval_reward")?,
                record.get_scalar("success_rate")?
            );
            Ok(())
        }
        mode => Err(MyoError::UnsupportedMode(mode.to_string()).into()),
    }
}

fn run_seq<Q, P>(args: &Args, device: Device, critic_net: Q::Config, actor_net: P::Config) -> Result<()>
where
    Q: StatefulModel2<Output = Tensor>,
    P: StatefulModel<Output = (Tensor, Tensor)>,
    Q::Config: DeserializeOwned + Serialize,
    P::Config: DeserializeOwned + Serialize,
{
    let agent = SeqSac::<Q, P>::build(sac_config(args, critic_net, actor_net), device)?;
    let buffer = EpisodicReplayBuffer::build(&replay_config(args));
    dispatch(args, agent, buffer)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    tch::manual_seed(args.seed);

    let device = Device::cuda_if_available();
    info!("model {}, mode {}, device {:?}", args.model, args.mode, device);

    let hidden = args.hidden_size;
    match args.model.as_str() {
        "mlp" => {
            let actor = MlpConfig::new(OBS_DIM, vec![hidden, hidden], ACT_DIM);
            let critic = MlpConfig::new(OBS_DIM + ACT_DIM, vec![hidden, hidden], 1);
            let agent = Sac::<Mlp, Mlp2>::build(sac_config(&args, critic, actor), device)?;
            let buffer = TransitionReplayBuffer::build(&replay_config(&args));
            dispatch(&args, agent, buffer)
        }
        "lstm" => run_seq::<LstmQnet, LstmPolicy>(
            &args,
            device,
            LstmConfig::new(OBS_DIM + ACT_DIM, hidden, 1),
            LstmConfig::new(OBS_DIM, hidden, ACT_DIM),
        ),
        "snn" => run_seq::<SpikingQnet<Leaky>, SpikingPolicy<Leaky>>(
            &args,
            device,
            SnnConfig::new(OBS_DIM + ACT_DIM, hidden, 1),
            SnnConfig::new(OBS_DIM, hidden, ACT_DIM),
        ),
        "lsnn" => run_seq::<SpikingQnet<AdaptiveLeaky>, SpikingPolicy<AdaptiveLeaky>>(
            &args,
            device,
            SnnConfig::new(OBS_DIM + ACT_DIM, hidden, 1),
            SnnConfig::new(OBS_DIM, hidden, ACT_DIM),
        ),
        model => bail!("unknown model variant: {}", model),
    }
}
