//! Native mountain-car environment.
//!
//! The classic control problem: an under-powered car in a sinusoidal valley
//! must rock back and forth to build up enough momentum to reach the flag on
//! the right hill. This crate provides the pure physics simulator
//! ([`MountainCar`]), the position-based reward shaping ([`RewardTable`])
//! and the [`Env`](switchback_core::Env) implementation gluing them
//! together, plus tensor conversions for neural-network agents.
mod act;
mod car;
mod env;
mod obs;
mod reward;
mod tensor;

pub use act::MountainCarAct;
pub use car::{
    MountainCar, FORCE, GOAL_POSITION, GOAL_VELOCITY, GRAVITY, MAX_POSITION, MAX_SPEED,
    MIN_POSITION,
};
pub use env::{MountainCarEnv, MountainCarEnvConfig};
pub use obs::MountainCarObs;
pub use reward::RewardTable;
