//! Replay buffer interfaces.
//!
//! Replay buffers store experiences (transitions) gathered from an
//! environment and hand out randomly sampled batches for training. The two
//! traits here separate the storing side from the sampling side: a process
//! that only collects experiences needs [`ExperienceBufferBase`], while an
//! agent updating its parameters needs [`ReplayBufferBase`].

use anyhow::Result;

/// Interface for buffers that store experiences from environments.
pub trait ExperienceBufferBase {
    /// The type of items stored in the buffer.
    type Item;

    /// Pushes a new experience into the buffer.
    fn push(&mut self, tr: Self::Item) -> Result<()>;

    /// Returns the current number of experiences in the buffer.
    fn len(&self) -> usize;

    /// Returns true if the buffer holds no experiences.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Interface for replay buffers that generate batches for training.
pub trait ReplayBufferBase {
    /// Configuration parameters of the buffer.
    type Config: Clone;

    /// The type of batches generated for training.
    type Batch;

    /// Builds a replay buffer from the given configuration.
    ///
    /// # Errors
    ///
    /// Fails when the configuration is invalid, e.g. a zero capacity.
    fn build(config: &Self::Config) -> Result<Self>
    where
        Self: Sized;

    /// Samples a batch of experiences for training.
    ///
    /// Implementations document how a `size` larger than the current buffer
    /// length is handled (clamping or failure).
    fn batch(&mut self, size: usize) -> Result<Self::Batch>;
}
