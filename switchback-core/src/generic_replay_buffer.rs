//! Generic implementation of replay buffers.
//!
//! This module provides a replay buffer over arbitrary observation and action
//! batch types:
//!
//! - [`GenericReplayBuffer`]: a fixed-capacity ring buffer with uniform
//!   without-replacement sampling
//! - [`GenericTransitionBatch`]: a columnar batch of transitions
//! - [`GenericStepProcessor`]: converts environment steps into transitions
//! - [`VecBatch`]: a plain vector column, for scalar observations or tests
//!
//! Storage is columnar: one [`BatchBase`] per field, preallocated at build
//! time. Eviction is an overwrite of the oldest slot, so a full buffer never
//! allocates during training.

mod base;
mod batch;
mod config;
mod step_proc;
pub use base::GenericReplayBuffer;
pub use batch::{BatchBase, GenericTransitionBatch, VecBatch};
pub use config::GenericReplayBufferConfig;
pub use step_proc::{GenericStepProcessor, GenericStepProcessorConfig};
