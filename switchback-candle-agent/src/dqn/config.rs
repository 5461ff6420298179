//! Configuration of DQN agent.
use super::{
    explorer::{DqnExplorer, EpsilonGreedy},
    model::QModelConfig,
};
use crate::Device;
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Cadence and strength of target network updates.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TargetSync {
    /// Optimization steps between updates of the target network.
    pub interval: usize,

    /// Soft update coefficient. 1 replaces the target wholesale.
    pub tau: f64,
}

impl Default for TargetSync {
    fn default() -> Self {
        Self {
            interval: 100,
            tau: 1.0,
        }
    }
}

#[allow(clippy::upper_case_acronyms)]
/// Constructs [`Dqn`](super::Dqn).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DqnConfig {
    pub(super) model_config: QModelConfig,
    pub(super) batch_size: usize,
    pub(super) discount_factor: f64,
    pub(super) explorer: DqnExplorer,
    /// When `None`, bootstrap targets come from the online network itself.
    #[serde(default)]
    pub(super) target: Option<TargetSync>,
    pub(super) seed: u64,
    pub device: Option<Device>,
}

impl Default for DqnConfig {
    /// Constructs DQN builder with default parameters.
    fn default() -> Self {
        Self {
            model_config: Default::default(),
            batch_size: 32,
            discount_factor: 0.95,
            explorer: DqnExplorer::EpsilonGreedy(EpsilonGreedy::new()),
            target: None,
            seed: 42,
            device: None,
        }
    }
}

impl DqnConfig {
    /// Sets the configuration of the model.
    pub fn model_config(mut self, v: QModelConfig) -> Self {
        self.model_config = v;
        self
    }

    /// Batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Discount factor.
    pub fn discount_factor(mut self, v: f64) -> Self {
        self.discount_factor = v;
        self
    }

    /// Explorer.
    pub fn explorer(mut self, v: DqnExplorer) -> Self {
        self.explorer = v;
        self
    }

    /// Enables a target network with the given update schedule.
    pub fn target(mut self, v: TargetSync) -> Self {
        self.target = Some(v);
        self
    }

    /// Seed of the exploration RNG.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Device.
    pub fn device(mut self, device: candle_core::Device) -> Self {
        self.device = Some(device.into());
        self
    }

    /// Loads [`DqnConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of DQN agent from {}", path_.to_str().unwrap());
        Ok(b)
    }

    /// Saves [`DqnConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of DQN agent into {}", path_.to_str().unwrap());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mlp::MlpConfig, opt::OptimizerConfig};
    use tempdir::TempDir;

    #[test]
    fn yaml_round_trip_keeps_the_configuration() -> Result<()> {
        let tmp_dir = TempDir::new("dqn_config")?;
        let path = tmp_dir.path().join("dqn_config.yaml");

        let config = DqnConfig::default()
            .model_config(
                QModelConfig::default()
                    .mlp_config(MlpConfig::new(2, vec![64, 32], 3))
                    .opt_config(OptimizerConfig::Adam { lr: 1e-3 }),
            )
            .batch_size(64)
            .discount_factor(0.97)
            .explorer(DqnExplorer::EpsilonGreedy(
                EpsilonGreedy::new().eps_min(0.05).decay_rate(0.002),
            ))
            .target(TargetSync {
                interval: 50,
                tau: 0.5,
            })
            .seed(7);
        config.save(&path)?;

        let config_ = DqnConfig::load(&path)?;
        assert_eq!(config_, config);
        Ok(())
    }
}
