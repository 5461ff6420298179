//! Converts environment steps into transitions.

use super::{BatchBase, GenericTransitionBatch};
use crate::{Env, Step, StepProcessor};
use serde::{Deserialize, Serialize};
use std::{default::Default, marker::PhantomData};

/// Configuration of [`GenericStepProcessor`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GenericStepProcessorConfig {}

/// A generic implementation of [`StepProcessor`].
///
/// Keeps the observation preceding each step and pairs it with the step's
/// resulting observation to form a single-row [`GenericTransitionBatch`]
/// `(o_t, a_t, o_t+1, r_t, flags)`. The caller resets the processor with the
/// initial observation at every episode start.
pub struct GenericStepProcessor<E, O, A> {
    /// The previous observation, which becomes `o_t` of the next transition.
    prev_obs: Option<O>,
    phantom: PhantomData<(E, A)>,
}

impl<E, O, A> StepProcessor<E> for GenericStepProcessor<E, O, A>
where
    E: Env,
    O: BatchBase + From<E::Obs>,
    A: BatchBase + From<E::Act>,
{
    type Config = GenericStepProcessorConfig;
    type Output = GenericTransitionBatch<O, A>;

    fn build(_config: &Self::Config) -> Self {
        Self {
            prev_obs: None,
            phantom: PhantomData,
        }
    }

    fn reset(&mut self, init_obs: E::Obs) {
        self.prev_obs = Some(init_obs.into());
    }

    /// Processes a [`Step`] object into a single-row transition batch.
    ///
    /// # Panics
    ///
    /// Panics if [`Self::reset`] has not been called since construction.
    fn process(&mut self, step: Step<E>) -> Self::Output {
        let next_obs = step.obs.clone().into();
        let obs = self
            .prev_obs
            .replace(step.obs.into())
            .expect("prev_obs is not set. Forgot to call reset()?");
        let act = step.act.into();

        GenericTransitionBatch {
            obs,
            act,
            next_obs,
            reward: vec![step.reward],
            is_terminated: vec![step.is_terminated as i8],
            is_truncated: vec![step.is_truncated as i8],
        }
    }
}
