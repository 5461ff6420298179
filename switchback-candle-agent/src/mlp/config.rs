use serde::{Deserialize, Serialize};
use switchback_core::error::SwitchbackError;

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Mlp`](super::Mlp).
pub struct MlpConfig {
    pub(super) in_dim: usize,
    pub(super) units: Vec<usize>,
    pub(super) out_dim: usize,
}

impl MlpConfig {
    /// Creates configuration of MLP.
    ///
    /// Hidden layers apply ReLU, the output layer is linear.
    pub fn new(in_dim: usize, units: Vec<usize>, out_dim: usize) -> Self {
        Self {
            in_dim,
            units,
            out_dim,
        }
    }

    /// Output dimension, i.e., the number of discrete actions for a Q-network.
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    pub(crate) fn validate(&self) -> anyhow::Result<()> {
        if self.in_dim == 0 || self.out_dim == 0 {
            return Err(
                SwitchbackError::invalid_config("mlp", "in_dim and out_dim must be positive")
                    .into(),
            );
        }
        if self.units.is_empty() || self.units.iter().any(|&u| u == 0) {
            return Err(SwitchbackError::invalid_config(
                "mlp",
                "units must contain at least one positive layer width",
            )
            .into());
        }
        Ok(())
    }
}
