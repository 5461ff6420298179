//! Default implementation of the [`Evaluator`] trait.
//!
//! This module provides a simple evaluator that runs a fixed number of
//! episodes and calculates the average return across all episodes.

use super::Evaluator;
use crate::{error::SwitchbackError, record::Record, record::RecordValue::Scalar, Env, Policy};
use anyhow::Result;

/// A default implementation of the [`Evaluator`] trait.
///
/// This evaluator runs a specified number of episodes and calculates the
/// average return (cumulative reward) and the average episode length across
/// all episodes. Episodes are cut off after a step budget, so evaluation
/// finishes even when the policy never reaches a terminal state.
///
/// # Examples
///
/// ```ignore
/// let config = EnvConfig::default();
/// let mut evaluator = DefaultEvaluator::new(&config, 42, 10, 500)?;
///
/// let record = evaluator.evaluate(&mut agent)?;
/// println!("Average return: {}", record.get_scalar("eval_episode_return")?);
/// ```
pub struct DefaultEvaluator<E: Env> {
    /// The number of episodes to run during evaluation.
    n_episodes: usize,

    /// Step budget of a single evaluation episode.
    max_steps: usize,

    /// The environment instance used for evaluation.
    env: E,
}

impl<E: Env> Evaluator<E> for DefaultEvaluator<E> {
    /// Evaluates a policy by running multiple episodes.
    ///
    /// # Returns
    ///
    /// A [`Record`] with the average return (`"eval_episode_return"`) and
    /// the average number of steps (`"eval_episode_steps"`) per episode.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment fails to reset or to step.
    fn evaluate<P: Policy<E>>(&mut self, policy: &mut P) -> Result<Record> {
        let mut r_total = 0f32;
        let mut steps_total = 0;

        for _ in 0..self.n_episodes {
            let mut prev_obs = self.env.reset()?;

            for _ in 0..self.max_steps {
                let act = policy.sample(&prev_obs);
                let (step, _) = self.env.step(&act);
                r_total += step.reward;
                steps_total += 1;
                if step.is_done() {
                    break;
                }
                prev_obs = step.obs;
            }
        }

        let mut record =
            Record::from_scalar("eval_episode_return", r_total / self.n_episodes as f32);
        record.insert(
            "eval_episode_steps",
            Scalar(steps_total as f32 / self.n_episodes as f32),
        );
        Ok(record)
    }
}

impl<E: Env> DefaultEvaluator<E> {
    /// Constructs a new [`DefaultEvaluator`].
    ///
    /// # Arguments
    ///
    /// * `config` - Configuration for the environment
    /// * `seed` - Random seed for environment initialization
    /// * `n_episodes` - Number of episodes to run during evaluation
    /// * `max_steps` - Step budget of a single episode
    ///
    /// # Errors
    ///
    /// Rejects a zero episode count or step budget.
    pub fn new(config: &E::Config, seed: i64, n_episodes: usize, max_steps: usize) -> Result<Self> {
        if n_episodes == 0 {
            return Err(SwitchbackError::invalid_config("n_episodes", "must be positive").into());
        }
        if max_steps == 0 {
            return Err(SwitchbackError::invalid_config("max_steps", "must be positive").into());
        }

        Ok(Self {
            n_episodes,
            max_steps,
            env: E::build(config, seed)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Step;

    #[derive(Clone)]
    struct Endless;

    /// Never terminates; pays one unit of reward per step.
    struct EndlessEnv;

    impl Env for EndlessEnv {
        type Config = Endless;
        type Obs = f32;
        type Act = i64;
        type Info = ();

        fn build(_config: &Self::Config, _seed: i64) -> Result<Self> {
            Ok(Self)
        }

        fn reset(&mut self) -> Result<Self::Obs> {
            Ok(0.0)
        }

        fn step(&mut self, a: &Self::Act) -> (Step<Self>, Record) {
            (Step::new(0.0, *a, 1.0, false, ()), Record::empty())
        }
    }

    struct Noop;

    impl Policy<EndlessEnv> for Noop {
        fn sample(&mut self, _obs: &f32) -> i64 {
            0
        }
    }

    #[test]
    fn step_budget_cuts_off_endless_episodes() {
        let mut evaluator = DefaultEvaluator::<EndlessEnv>::new(&Endless, 0, 3, 7).unwrap();
        let record = evaluator.evaluate(&mut Noop).unwrap();
        assert_eq!(record.get_scalar("eval_episode_return").unwrap(), 7.0);
        assert_eq!(record.get_scalar("eval_episode_steps").unwrap(), 7.0);
    }

    #[test]
    fn rejects_zero_episodes() {
        assert!(DefaultEvaluator::<EndlessEnv>::new(&Endless, 0, 0, 7).is_err());
    }
}
