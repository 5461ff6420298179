//! Train [`Agent`].
mod config;

use crate::{
    error::SwitchbackError,
    record::{Record, Recorder, RecordValue::Scalar},
    Agent, Env, ExperienceBufferBase, ReplayBufferBase, Renderer, StepProcessor,
};
use anyhow::Result;
pub use config::TrainerConfig;
use log::{info, trace, warn};
use std::path::Path;

/// Accumulators of one episode, reset at every episode start.
struct EpisodeStats {
    /// Sum of rewards over the episode.
    ret: f32,

    /// Maximum of the tracked progress scalar, if tracking is enabled.
    peak: Option<f32>,

    /// Number of environment steps taken.
    n_steps: usize,

    /// True if the episode reached a terminal state.
    terminated: bool,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Drives episodic training of an agent.
///
/// # Training loop
///
/// Training runs a fixed number of *iterations*, each consisting of a fixed
/// number of *episodes*. One episode moves through the states
///
/// `INIT -> STEPPING -> (TERMINATED | TRUNCATED) -> REPLAY`
///
/// 1. INIT: reset the environment and the episode statistics; hand the
///    initial observation to the [`StepProcessor`].
/// 2. STEPPING: repeat { render hook, sample an action from the agent, step
///    the environment, accumulate the return and the tracked progress
///    scalar, push the processed transition into the replay buffer } until
///    the environment reports a terminal state (TERMINATED) or the step
///    budget runs out (TRUNCATED). The environment never truncates itself;
///    the trainer owns the budget and marks the flag on the final step.
/// 3. On exit, append `(return, peak progress)` to the training histories.
/// 4. REPLAY: exactly one [`Agent::opt`] call, which samples a batch from
///    the buffer and performs a single synchronous parameter update.
///
/// Between episodes the trainer polls [`Renderer::stop_requested`]; a
/// requested stop ends the run at that episode boundary, never mid-episode.
/// At the end of each iteration the model is saved into
/// [`TrainerConfig::model_dir`] and the buffered records are flushed.
///
/// # Interaction of objects
///
/// ```mermaid
/// graph LR
///     A[Agent]-->|Env::Act|B[Env]
///     B -->|Env::Obs|A
///     B -->|"Step&lt;E: Env&gt;"|C[StepProcessor]
///     C -->|ExperienceBufferBase::Item|D[ReplayBufferBase]
///     D -->|TransitionBatch|A
///     B -->|&E|E[Renderer]
/// ```
///
/// All calls are serialized on the caller's thread: no two agent
/// prediction or optimization calls are ever in flight at once.
pub struct Trainer<E, P, R>
where
    E: Env,
    P: StepProcessor<E>,
    R: ExperienceBufferBase<Item = P::Output> + ReplayBufferBase,
{
    /// Configuration of the environment.
    env_config: E::Config,

    /// Configuration of the step processor.
    step_proc_config: P::Config,

    /// Configuration of the replay buffer.
    replay_buffer_config: R::Config,

    /// Number of training iterations.
    n_iterations: usize,

    /// Number of episodes in one iteration.
    episodes_per_iteration: usize,

    /// Step budget of one episode.
    max_steps_per_episode: usize,

    /// Where to save the model at iteration boundaries.
    model_dir: Option<String>,

    /// Key of the progress scalar in the environment's step records.
    progress_key: Option<String>,

    /// Random seed for the environment.
    seed: i64,

    /// Return of every finished episode, in order.
    episode_returns: Vec<f32>,

    /// Peak progress of every finished episode, in order. Empty when
    /// progress tracking is disabled.
    peak_progress: Vec<f32>,
}

impl<E, P, R> Trainer<E, P, R>
where
    E: Env,
    P: StepProcessor<E>,
    R: ExperienceBufferBase<Item = P::Output> + ReplayBufferBase,
{
    /// Constructs a trainer.
    ///
    /// # Errors
    ///
    /// Rejects a zero iteration count, episode count or step budget.
    pub fn build(
        config: TrainerConfig,
        env_config: E::Config,
        step_proc_config: P::Config,
        replay_buffer_config: R::Config,
    ) -> Result<Self> {
        if config.n_iterations == 0 {
            return Err(SwitchbackError::invalid_config("n_iterations", "must be positive").into());
        }
        if config.episodes_per_iteration == 0 {
            return Err(SwitchbackError::invalid_config(
                "episodes_per_iteration",
                "must be positive",
            )
            .into());
        }
        if config.max_steps_per_episode == 0 {
            return Err(SwitchbackError::invalid_config(
                "max_steps_per_episode",
                "must be positive",
            )
            .into());
        }

        Ok(Self {
            env_config,
            step_proc_config,
            replay_buffer_config,
            n_iterations: config.n_iterations,
            episodes_per_iteration: config.episodes_per_iteration,
            max_steps_per_episode: config.max_steps_per_episode,
            model_dir: config.model_dir,
            progress_key: config.progress_key,
            seed: config.seed,
            episode_returns: Vec::new(),
            peak_progress: Vec::new(),
        })
    }

    /// Returns of all finished episodes, in order.
    pub fn episode_returns(&self) -> &[f32] {
        &self.episode_returns
    }

    /// Peak progress values of all finished episodes, in order.
    pub fn peak_progress(&self) -> &[f32] {
        &self.peak_progress
    }

    fn save_model<A: Agent<E, R>>(agent: &A, model_dir: &str) {
        match agent.save_params(Path::new(model_dir)) {
            Ok(()) => info!("Saved the model in {:?}.", model_dir),
            Err(e) => warn!("Failed to save model in {:?}: {}", model_dir, e),
        }
    }

    /// Runs one episode and returns its statistics.
    fn run_episode<A, V>(
        &self,
        env: &mut E,
        step_proc: &mut P,
        buffer: &mut R,
        agent: &mut A,
        renderer: &mut V,
    ) -> Result<EpisodeStats>
    where
        A: Agent<E, R>,
        V: Renderer<E>,
    {
        let mut obs = env.reset()?;
        step_proc.reset(obs.clone());
        let mut ret = 0f32;
        let mut peak: Option<f32> = None;
        let mut n_steps = 0;

        loop {
            renderer.render(env)?;
            let act = agent.sample(&obs);
            let (mut step, record) = env.step(&act);
            n_steps += 1;
            if n_steps >= self.max_steps_per_episode && !step.is_terminated {
                step.is_truncated = true;
            }

            ret += step.reward;
            if let Some(key) = &self.progress_key {
                if let Ok(v) = record.get_scalar(key) {
                    peak = Some(peak.map_or(v, |p| p.max(v)));
                }
            }

            let done = step.is_done();
            let terminated = step.is_terminated;
            obs = step.obs.clone();
            buffer.push(step_proc.process(step))?;

            if done {
                return Ok(EpisodeStats {
                    ret,
                    peak,
                    n_steps,
                    terminated,
                });
            }
        }
    }

    /// Trains the agent.
    ///
    /// Builds the environment, step processor and replay buffer from the
    /// stored configurations, switches the agent to training mode and runs
    /// the iteration/episode loop described on [`Trainer`].
    pub fn train<A, S, V>(&mut self, agent: &mut A, recorder: &mut S, renderer: &mut V) -> Result<()>
    where
        A: Agent<E, R>,
        S: Recorder,
        V: Renderer<E>,
    {
        let mut env = E::build(&self.env_config, self.seed)?;
        let mut step_proc = P::build(&self.step_proc_config);
        let mut buffer = R::build(&self.replay_buffer_config)?;
        agent.train();
        info!(
            "Starts training: {} iterations of {} episodes",
            self.n_iterations, self.episodes_per_iteration
        );

        let mut stop = false;
        for iteration in 0..self.n_iterations {
            let offset = self.episode_returns.len();
            let mut n_goals = 0;

            for _ in 0..self.episodes_per_iteration {
                if renderer.stop_requested() {
                    stop = true;
                    break;
                }

                let stats =
                    self.run_episode(&mut env, &mut step_proc, &mut buffer, agent, renderer)?;
                let agent_record = agent.opt(&mut buffer)?;

                trace!(
                    "episode finished: return {}, {} steps, terminated {}",
                    stats.ret,
                    stats.n_steps,
                    stats.terminated
                );
                if stats.terminated {
                    n_goals += 1;
                }

                let mut record = Record::from_scalar("episode_return", stats.ret);
                record.insert("episode_steps", Scalar(stats.n_steps as f32));
                record.insert(
                    "goal_reached",
                    Scalar(if stats.terminated { 1.0 } else { 0.0 }),
                );
                if let (Some(key), Some(peak)) = (&self.progress_key, stats.peak) {
                    record.insert(format!("max_{}", key), Scalar(peak));
                }
                recorder.store(record.merge(agent_record));

                self.episode_returns.push(stats.ret);
                if let Some(peak) = stats.peak {
                    self.peak_progress.push(peak);
                }
            }

            if !stop {
                if let Some(model_dir) = &self.model_dir {
                    Self::save_model(agent, model_dir);
                }
            }
            recorder.flush((iteration + 1) as i64);

            let returns = &self.episode_returns[offset..];
            if !returns.is_empty() {
                let mean_return = returns.iter().sum::<f32>() / returns.len() as f32;
                info!(
                    "Iteration {}/{}: mean return {:.2}, goals reached {}/{}",
                    iteration + 1,
                    self.n_iterations,
                    mean_return,
                    n_goals,
                    returns.len()
                );
            }

            if stop {
                info!(
                    "Training stopped on request after {} episodes",
                    self.episode_returns.len()
                );
                break;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generic_replay_buffer::{
        GenericReplayBuffer, GenericReplayBufferConfig, GenericStepProcessor,
        GenericStepProcessorConfig, VecBatch,
    };
    use crate::record::BufferedRecorder;
    use crate::{NullRenderer, Policy, Step};

    #[derive(Clone)]
    struct TestEnvConfig {
        steps_to_goal: usize,
    }

    /// Walks right one unit per step; terminates at `steps_to_goal`.
    struct TestEnv {
        pos: f32,
        steps_to_goal: usize,
    }

    impl Env for TestEnv {
        type Config = TestEnvConfig;
        type Obs = f32;
        type Act = i64;
        type Info = ();

        fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
            Ok(Self {
                pos: 0.0,
                steps_to_goal: config.steps_to_goal,
            })
        }

        fn reset(&mut self) -> Result<Self::Obs> {
            self.pos = 0.0;
            Ok(self.pos)
        }

        fn step(&mut self, a: &Self::Act) -> (Step<Self>, Record) {
            self.pos += 1.0;
            let terminated = self.pos >= self.steps_to_goal as f32;
            let step = Step::new(self.pos, *a, 1.0, terminated, ());
            let record = Record::from_scalar("position", self.pos);
            (step, record)
        }
    }

    struct TestAgent {
        train_mode: bool,
        n_opts: usize,
        last_buffer_len: usize,
    }

    impl TestAgent {
        fn new() -> Self {
            Self {
                train_mode: false,
                n_opts: 0,
                last_buffer_len: 0,
            }
        }
    }

    impl Policy<TestEnv> for TestAgent {
        fn sample(&mut self, _obs: &f32) -> i64 {
            1
        }
    }

    impl Agent<TestEnv, Buffer> for TestAgent {
        fn train(&mut self) {
            self.train_mode = true;
        }

        fn eval(&mut self) {
            self.train_mode = false;
        }

        fn is_train(&self) -> bool {
            self.train_mode
        }

        fn opt(&mut self, buffer: &mut Buffer) -> Result<Record> {
            self.n_opts += 1;
            self.last_buffer_len = buffer.len();
            Ok(Record::from_scalar("loss", 0.0))
        }

        fn save_params(&self, _path: &Path) -> Result<()> {
            Ok(())
        }

        fn load_params(&mut self, _path: &Path) -> Result<()> {
            Ok(())
        }
    }

    /// Requests a stop once `stop_after` render calls have happened.
    struct CountingRenderer {
        n_renders: usize,
        stop_after: usize,
    }

    impl Renderer<TestEnv> for CountingRenderer {
        fn render(&mut self, _env: &TestEnv) -> Result<()> {
            self.n_renders += 1;
            Ok(())
        }

        fn stop_requested(&self) -> bool {
            self.n_renders >= self.stop_after
        }
    }

    type Proc = GenericStepProcessor<TestEnv, VecBatch<f32>, VecBatch<i64>>;
    type Buffer = GenericReplayBuffer<VecBatch<f32>, VecBatch<i64>>;

    fn build_trainer(
        config: TrainerConfig,
        steps_to_goal: usize,
    ) -> Result<Trainer<TestEnv, Proc, Buffer>> {
        Trainer::build(
            config,
            TestEnvConfig { steps_to_goal },
            GenericStepProcessorConfig::default(),
            GenericReplayBufferConfig::default().capacity(100),
        )
    }

    #[test]
    fn truncated_episode_records_budget_transitions_and_one_opt() {
        let config = TrainerConfig::default()
            .n_iterations(1)
            .episodes_per_iteration(1)
            .max_steps_per_episode(5)
            .progress_key("position");
        let mut trainer = build_trainer(config, 1000).unwrap();
        let mut agent = TestAgent::new();
        let mut recorder = BufferedRecorder::new();

        trainer
            .train(&mut agent, &mut recorder, &mut NullRenderer)
            .unwrap();

        assert_eq!(agent.n_opts, 1);
        assert_eq!(agent.last_buffer_len, 5);
        assert_eq!(trainer.episode_returns(), &[5.0]);
        assert_eq!(trainer.peak_progress(), &[5.0]);
    }

    #[test]
    fn terminated_episode_stops_before_budget() {
        let config = TrainerConfig::default()
            .n_iterations(1)
            .episodes_per_iteration(1)
            .max_steps_per_episode(5);
        let mut trainer = build_trainer(config, 3).unwrap();
        let mut agent = TestAgent::new();
        let mut recorder = BufferedRecorder::new();

        trainer
            .train(&mut agent, &mut recorder, &mut NullRenderer)
            .unwrap();

        assert_eq!(agent.n_opts, 1);
        assert_eq!(agent.last_buffer_len, 3);
        assert_eq!(trainer.episode_returns(), &[3.0]);
    }

    #[test]
    fn runs_every_episode_of_every_iteration() {
        let config = TrainerConfig::default()
            .n_iterations(2)
            .episodes_per_iteration(3)
            .max_steps_per_episode(4);
        let mut trainer = build_trainer(config, 1000).unwrap();
        let mut agent = TestAgent::new();
        let mut recorder = BufferedRecorder::new();

        trainer
            .train(&mut agent, &mut recorder, &mut NullRenderer)
            .unwrap();

        assert_eq!(agent.n_opts, 6);
        assert_eq!(trainer.episode_returns().len(), 6);
        // One flushed summary per iteration.
        assert_eq!(recorder.len(), 2);
        let first = recorder.iter().next().unwrap();
        assert_eq!(first.get_scalar("episode_return_mean").unwrap(), 4.0);
    }

    #[test]
    fn stop_request_is_honored_between_episodes() {
        let config = TrainerConfig::default()
            .n_iterations(1)
            .episodes_per_iteration(3)
            .max_steps_per_episode(5);
        let mut trainer = build_trainer(config, 1000).unwrap();
        let mut agent = TestAgent::new();
        let mut recorder = BufferedRecorder::new();
        // The stop flag goes up during the first episode.
        let mut renderer = CountingRenderer {
            n_renders: 0,
            stop_after: 5,
        };

        trainer
            .train(&mut agent, &mut recorder, &mut renderer)
            .unwrap();

        // The first episode runs to its end; the second never starts.
        assert_eq!(agent.n_opts, 1);
        assert_eq!(trainer.episode_returns().len(), 1);
        assert_eq!(renderer.n_renders, 5);
    }

    #[test]
    fn rejects_zero_valued_budgets() {
        for config in [
            TrainerConfig::default().n_iterations(0),
            TrainerConfig::default().episodes_per_iteration(0),
            TrainerConfig::default().max_steps_per_episode(0),
        ] {
            assert!(build_trainer(config, 10).is_err());
        }
    }
}
