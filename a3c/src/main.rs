//! Trains an agent with asynchronous advantage actor-critic, or evaluates a checkpoint.
//!
//! ```bash
//! a3c --game Catch-v0 --num-concurrent 4 --tmax 1000000 --checkpoint-interval 100000
//! a3c --game Catch-v0 --testing --checkpoint-path /tmp/checkpoints/Catch-v0.ckpt-1000000.safetensors
//! ```
use a3c_async_trainer::{A3cConfig, Coordinator, EvalConfig, Mode, Outcome, ProgressLogger};
use a3c_candle_agent::{A3cModel, A3cModelConfig};
use a3c_core::{
    record::{NullRecorder, Recorder},
    A3cError,
};
use a3c_game_env::{Catch, CatchConfig, GameEnvConfig, GameRegistry, CATCH};
use a3c_tensorboard::TensorboardRecorder;
use anyhow::Result;
use clap::Parser;
use log::{error, info};
use std::{path::PathBuf, sync::Arc};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Name of the game to play
    #[arg(long, default_value = CATCH)]
    game: String,

    /// Number of concurrent actor-learner threads [default: 8]
    #[arg(long)]
    num_concurrent: Option<usize>,

    /// Number of training timesteps [default: 80000000]
    #[arg(long)]
    tmax: Option<usize>,

    /// Maximum number of steps of a rollout segment [default: 5]
    #[arg(long)]
    rollout_len: Option<usize>,

    /// Scale screen to this width
    #[arg(long, default_value_t = 84)]
    width: u32,

    /// Scale screen to this height
    #[arg(long, default_value_t = 84)]
    height: u32,

    /// Use this number of recent screens as the state
    #[arg(long, default_value_t = 4)]
    history_length: usize,

    /// Learning rate [default: 0.0001]
    #[arg(long)]
    learning_rate: Option<f64>,

    /// Reward discount rate [default: 0.99]
    #[arg(long)]
    gamma: Option<f32>,

    /// Coefficient of entropy regularization [default: 0.01]
    #[arg(long)]
    beta: Option<f64>,

    /// Directory for storing checkpoints [default: /tmp/checkpoints]
    #[arg(long)]
    checkpoint_dir: Option<PathBuf>,

    /// Save the parameters every n steps [default: 6000000]
    #[arg(long)]
    checkpoint_interval: Option<usize>,

    /// Run evaluation instead of training
    #[arg(long, default_value_t = false)]
    testing: bool,

    /// Checkpoint used for evaluation
    #[arg(long, default_value = "path/to/recent.safetensors")]
    checkpoint_path: PathBuf,

    /// Number of episodes of evaluation
    #[arg(long, default_value_t = 100)]
    num_eval_episodes: usize,

    /// Trainer configuration in YAML, overridden by the options above
    #[arg(long)]
    config: Option<PathBuf>,

    /// Model configuration in YAML
    #[arg(long)]
    model_config: Option<PathBuf>,

    /// Write episode records for TensorBoard into this directory
    #[arg(long)]
    tensorboard: Option<PathBuf>,

    /// Show the configuration and exit
    #[arg(long, default_value_t = false)]
    show_config: bool,
}

fn trainer_config(args: &Args) -> Result<A3cConfig> {
    let mut config = match &args.config {
        Some(path) => A3cConfig::load(path)?,
        None => A3cConfig::default(),
    };
    if let Some(v) = args.num_concurrent {
        config = config.n_actor_learners(v);
    }
    if let Some(v) = args.tmax {
        config = config.max_steps(v);
    }
    if let Some(v) = args.rollout_len {
        config = config.t_max(v);
    }
    if let Some(v) = args.gamma {
        config = config.discount_factor(v);
    }
    if let Some(v) = &args.checkpoint_dir {
        config = config.checkpoint_dir(v);
    }
    if let Some(v) = args.checkpoint_interval {
        config = config.checkpoint_interval(v);
    }
    Ok(config)
}

fn env_config(args: &Args, registry: &GameRegistry) -> Result<GameEnvConfig<CatchConfig>> {
    // Fails on unknown games.
    registry.action_table(&args.game)?;
    if args.game != CATCH {
        return Err(A3cError::Configuration(format!(
            "no simulator of {} is bundled, available: {}",
            args.game, CATCH
        ))
        .into());
    }

    Ok(GameEnvConfig::default()
        .game(args.game.as_str())
        .frame_size(args.width, args.height)
        .history_length(args.history_length))
}

fn model_config(args: &Args, registry: &GameRegistry) -> Result<A3cModelConfig> {
    let config = match &args.model_config {
        Some(path) => A3cModelConfig::load(path)?,
        None => A3cModelConfig::default(),
    };
    let n_actions = registry.action_table(&args.game)?.len();
    let mut config = config
        .state_shape(
            args.history_length,
            args.height as usize,
            args.width as usize,
        )
        .n_actions(n_actions);
    if let Some(lr) = args.learning_rate {
        let opt = config.opt.clone().learning_rate(lr);
        config = config.opt(opt);
    }
    if let Some(v) = args.beta {
        config = config.entropy_beta(v);
    }
    Ok(config)
}

fn show_config(
    config: &A3cConfig,
    env_config: &GameEnvConfig<CatchConfig>,
    model_config: &A3cModelConfig,
) -> Result<()> {
    println!("### trainer_config");
    println!("{}", serde_yaml::to_string(config)?);
    println!("### env_config");
    println!("{}", serde_yaml::to_string(env_config)?);
    println!("### model_config");
    println!("{}", serde_yaml::to_string(model_config)?);
    Ok(())
}

fn run(args: &Args) -> Result<Outcome> {
    let registry = GameRegistry::builtin();
    let config = trainer_config(args)?;
    let env_config = env_config(args, &registry)?;
    let model_config = model_config(args, &registry)?;

    let model = Arc::new(A3cModel::build(model_config)?);
    let coordinator = Coordinator::<_, Catch>::build(config, env_config, registry, model)?;
    let mode = match args.testing {
        true => Mode::Eval(
            EvalConfig::default()
                .checkpoint_path(&args.checkpoint_path)
                .n_episodes(args.num_eval_episodes),
        ),
        false => Mode::Train,
    };
    let mut recorder: Box<dyn Recorder> = match &args.tensorboard {
        Some(dir) => Box::new(TensorboardRecorder::new(dir)),
        None => Box::new(NullRecorder::new()),
    };

    coordinator.run(&mode, &mut recorder, &mut ProgressLogger::default())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.show_config {
        let registry = GameRegistry::builtin();
        return show_config(
            &trainer_config(&args)?,
            &env_config(&args, &registry)?,
            &model_config(&args, &registry)?,
        );
    }

    match run(&args)? {
        Outcome::Train(stat) if stat.is_degraded() => {
            error!(
                "Training finished with {} failed actor-learners",
                stat.failures.len()
            );
            std::process::exit(1);
        }
        Outcome::Train(stat) => info!("Training finished at global step {}", stat.global_steps),
        Outcome::Eval(stat) => info!("Evaluation finished, average score {}", stat.mean()),
    }

    Ok(())
}
