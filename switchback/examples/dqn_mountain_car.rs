use anyhow::Result;
use candle_core::Device;
use clap::Parser;
use log::info;
use std::path::Path;
use switchback::mountain_car::{Evaluator, MountainCarDqn, ReplayBuffer, StepProc};
use switchback_candle_agent::{
    dqn::{DqnConfig, DqnExplorer, EpsilonGreedy, QModelConfig},
    mlp::MlpConfig,
    opt::OptimizerConfig,
};
use switchback_core::{
    generic_replay_buffer::{GenericReplayBufferConfig, GenericStepProcessorConfig},
    record::BufferedRecorder,
    Agent, Evaluator as _, NullRenderer, Trainer, TrainerConfig,
};
use switchback_mountain_car::{MountainCarEnv, MountainCarEnvConfig};

const DIM_OBS: usize = 2;
const DIM_ACT: usize = 3;
const LR_CRITIC: f64 = 0.001;
const DISCOUNT_FACTOR: f64 = 0.95;
const BATCH_SIZE: usize = 64;
const N_ITERATIONS: usize = 50;
const EPISODES_PER_ITERATION: usize = 20;
const MAX_STEPS_PER_EPISODE: usize = 1000;
const EPS_MIN: f64 = 0.01;
const EPS_MAX: f64 = 0.2;
const EPS_DECAY_RATE: f64 = 0.01;
const N_EPISODES_PER_EVAL: usize = 5;
const MODEL_DIR: &str = "./switchback/examples/model/dqn_mountain_car";

mod config {
    use super::*;

    pub struct DqnMountainCarConfig {
        pub env_config: MountainCarEnvConfig,
        pub agent_config: DqnConfig,
        pub trainer_config: TrainerConfig,
        pub replay_buffer_config: GenericReplayBufferConfig,
    }

    impl DqnMountainCarConfig {
        pub fn new(
            n_iterations: usize,
            episodes_per_iteration: usize,
            max_steps_per_episode: usize,
            model_dir: &str,
        ) -> Self {
            let env_config = create_env_config();
            let agent_config = create_agent_config();
            let trainer_config = TrainerConfig::default()
                .n_iterations(n_iterations)
                .episodes_per_iteration(episodes_per_iteration)
                .max_steps_per_episode(max_steps_per_episode)
                .model_dir(model_dir)
                .progress_key("position");
            // One episode of transitions at most, as the memory is cleared
            // nowhere and overwrites its oldest rows instead.
            let replay_buffer_config =
                GenericReplayBufferConfig::default().capacity(max_steps_per_episode);
            Self {
                env_config,
                agent_config,
                trainer_config,
                replay_buffer_config,
            }
        }
    }

    pub fn create_env_config() -> MountainCarEnvConfig {
        MountainCarEnvConfig::default()
    }

    pub fn create_agent_config() -> DqnConfig {
        let device = Device::cuda_if_available(0).unwrap();
        let opt_config = OptimizerConfig::default().learning_rate(LR_CRITIC);
        let mlp_config = MlpConfig::new(DIM_OBS, vec![128, 128], DIM_ACT);
        let model_config = QModelConfig::default()
            .mlp_config(mlp_config)
            .opt_config(opt_config);
        let explorer = DqnExplorer::EpsilonGreedy(
            EpsilonGreedy::new()
                .eps_min(EPS_MIN)
                .eps_max(EPS_MAX)
                .decay_rate(EPS_DECAY_RATE),
        );
        DqnConfig::default()
            .batch_size(BATCH_SIZE)
            .discount_factor(DISCOUNT_FACTOR)
            .explorer(explorer)
            .model_config(model_config)
            .device(device)
    }
}

use config::{create_agent_config, create_env_config, DqnMountainCarConfig};

/// Train/eval DQN agent in the mountain-car environment
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Train DQN agent, not evaluate
    #[arg(short, long, default_value_t = false)]
    train: bool,

    /// Evaluate DQN agent, not train
    #[arg(short, long, default_value_t = false)]
    eval: bool,

    /// Directory where model parameters are saved and loaded from
    #[arg(long, default_value_t = MODEL_DIR.to_string())]
    model_dir: String,

    /// Number of training iterations
    #[arg(long, default_value_t = N_ITERATIONS)]
    iterations: usize,
}

fn train(
    n_iterations: usize,
    episodes_per_iteration: usize,
    max_steps_per_episode: usize,
    model_dir: &str,
) -> Result<()> {
    let config = DqnMountainCarConfig::new(
        n_iterations,
        episodes_per_iteration,
        max_steps_per_episode,
        model_dir,
    );
    let mut trainer: Trainer<MountainCarEnv, StepProc, ReplayBuffer> = Trainer::build(
        config.trainer_config,
        config.env_config,
        GenericStepProcessorConfig {},
        config.replay_buffer_config,
    )?;
    let mut agent = MountainCarDqn::build(config.agent_config)?;
    // Resume from a previous run when saved parameters exist.
    if Path::new(model_dir).join("qnet.safetensors").exists() {
        agent.load_params(Path::new(model_dir))?;
        info!("Resuming from parameters found in {}", model_dir);
    }
    let mut recorder = BufferedRecorder::new();
    let mut renderer = NullRenderer;

    trainer.train(&mut agent, &mut recorder, &mut renderer)?;

    Ok(())
}

fn eval(model_dir: &str, n_episodes: usize, max_steps_per_episode: usize) -> Result<()> {
    let mut agent = {
        let mut agent = MountainCarDqn::build(create_agent_config())?;
        agent.load_params(Path::new(model_dir))?;
        agent.eval();
        agent
    };

    let record = Evaluator::new(&create_env_config(), 0, n_episodes, max_steps_per_episode)?
        .evaluate(&mut agent)?;
    info!(
        "eval: mean return = {}, mean steps = {}",
        record.get_scalar("eval_episode_return")?,
        record.get_scalar("eval_episode_steps")?,
    );

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.train {
        train(
            args.iterations,
            EPISODES_PER_ITERATION,
            MAX_STEPS_PER_EPISODE,
            &args.model_dir,
        )?;
    } else if args.eval {
        eval(&args.model_dir, N_EPISODES_PER_EVAL, MAX_STEPS_PER_EPISODE)?;
    } else {
        train(
            args.iterations,
            EPISODES_PER_ITERATION,
            MAX_STEPS_PER_EPISODE,
            &args.model_dir,
        )?;
        eval(&args.model_dir, N_EPISODES_PER_EVAL, MAX_STEPS_PER_EPISODE)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{eval, train};
    use anyhow::Result;
    use tempdir::TempDir;

    #[test]
    fn test_dqn_mountain_car() -> Result<()> {
        let tmp_dir = TempDir::new("dqn_mountain_car")?;
        let model_dir = match tmp_dir.as_ref().to_str() {
            Some(s) => s,
            None => panic!("Failed to get string of temporary directory"),
        };
        train(2, 2, 30, model_dir)?;
        eval(model_dir, 2, 30)?;
        Ok(())
    }
}
