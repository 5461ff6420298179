//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum SwitchbackError {
    /// An invalid value was given for a configuration parameter.
    ///
    /// Configurations are checked when the owning component is built,
    /// before any episode runs.
    #[error("invalid config for {name}: {reason}")]
    InvalidConfig {
        /// Name of the offending parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A batch was requested from a replay buffer holding no transitions.
    #[error("replay buffer is empty")]
    EmptyReplayBuffer,

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}

impl SwitchbackError {
    /// Shorthand for an [`SwitchbackError::InvalidConfig`] value.
    pub fn invalid_config(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            name,
            reason: reason.into(),
        }
    }
}
