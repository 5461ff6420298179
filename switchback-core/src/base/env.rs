//! Environment.
use super::{Info, Step};
use crate::record::Record;
use anyhow::Result;
use std::fmt::Debug;

/// Represents an environment, typically an MDP.
///
/// The crate drives a single environment instance at a time, so observations
/// and actions are plain values rather than vectorized containers.
pub trait Env {
    /// Configuration of the environment.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Clone + Debug;

    /// Action of the environment.
    type Act: Clone + Debug;

    /// Information attached to each [`Step`] object.
    type Info: Info;

    /// Builds an environment with a given random seed.
    ///
    /// Fails when the configuration is invalid.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Performs an environment step.
    ///
    /// The [`Record`] carries environment metrics for the step, like the
    /// quantity named by the trainer's progress key.
    fn step(&mut self, a: &Self::Act) -> (Step<Self>, Record)
    where
        Self: Sized;
}
