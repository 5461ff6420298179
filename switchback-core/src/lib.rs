#![warn(missing_docs)]
//! Backend-agnostic building blocks for episodic reinforcement learning.
//!
//! This crate defines the interfaces between an environment, a trainable
//! policy and a replay buffer, and drives them with an episode-oriented
//! [`Trainer`]. Concrete environments and agents live in their own crates;
//! everything here is generic over the [`Env`], [`Agent`] and
//! [`ReplayBufferBase`] traits.
pub mod error;
pub mod evaluator;
pub mod generic_replay_buffer;
pub mod record;

mod base;
pub use base::{
    Agent, Env, ExperienceBufferBase, Info, Policy, ReplayBufferBase, Step, StepProcessor,
    TransitionBatch,
};

mod renderer;
pub use renderer::{NullRenderer, Renderer};

mod trainer;
pub use trainer::{Trainer, TrainerConfig};

pub use evaluator::{DefaultEvaluator, Evaluator};
