//! Environment step.
use super::Env;

/// Additional information to observations and actions.
pub trait Info {}

impl Info for () {}

/// Represents an action, observation and reward tuple `(a_t, o_t+1, r_t)`
/// with some additional information.
///
/// An environment emits a [`Step`] object at every interaction step.
/// This object is used to create transitions `(o_t, a_t, o_t+1, r_t)`.
///
/// The environment only reports termination (the goal condition of the task);
/// truncation is owned by the caller, which marks the flag when its step
/// budget runs out.
pub struct Step<E: Env> {
    /// Action.
    pub act: E::Act,

    /// Observation after the step, `o_t+1`.
    pub obs: E::Obs,

    /// Reward, `r_t`.
    pub reward: f32,

    /// True if the episode reached a terminal state on this step.
    pub is_terminated: bool,

    /// True if the episode was cut by a step budget on this step.
    pub is_truncated: bool,

    /// Information defined by the environment.
    pub info: E::Info,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(
        obs: E::Obs,
        act: E::Act,
        reward: f32,
        is_terminated: bool,
        info: E::Info,
    ) -> Self {
        Step {
            act,
            obs,
            reward,
            is_terminated,
            is_truncated: false,
            info,
        }
    }

    /// Terminated or truncated.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }
}

/// Processes [`Step`] objects into items for a replay buffer.
///
/// A [`Step`] only carries the observation *after* the step, so the processor
/// keeps the previous observation and pairs the two into an item of type
/// [`Self::Output`], which is pushed into a buffer implementing
/// [`ExperienceBufferBase`](crate::ExperienceBufferBase).
/// [`Self::Output`] should be the same type as
/// [`ExperienceBufferBase::Item`](crate::ExperienceBufferBase::Item).
pub trait StepProcessor<E: Env> {
    /// Configuration.
    type Config: Clone;

    /// The type of transitions produced by this processor.
    type Output;

    /// Builds a processor.
    fn build(config: &Self::Config) -> Self;

    /// Resets the processor with the initial observation of an episode.
    ///
    /// Must be called before the first [`Self::process`] of every episode.
    fn reset(&mut self, init_obs: E::Obs);

    /// Processes a [`Step`] object into a transition.
    fn process(&mut self, step: Step<E>) -> Self::Output;
}
