//! Configuration of [`MountainCarEnv`](super::MountainCarEnv).
use crate::RewardTable;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`MountainCarEnv`](super::MountainCarEnv).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MountainCarEnvConfig {
    /// Reward shaping applied to the position reached by every step.
    pub reward_table: RewardTable,
}

impl Default for MountainCarEnvConfig {
    fn default() -> Self {
        Self {
            reward_table: RewardTable::default(),
        }
    }
}

impl MountainCarEnvConfig {
    /// Sets the reward shaping table.
    pub fn reward_table(mut self, v: RewardTable) -> Self {
        self.reward_table = v;
        self
    }

    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn yaml_round_trip() {
        let dir = TempDir::new("mountain_car_config").unwrap();
        let path = dir.path().join("env.yaml");

        let config = MountainCarEnvConfig::default()
            .reward_table(RewardTable::new(vec![(0.5, 10.0), (0.0, 1.0)]).unwrap());
        config.save(&path).unwrap();

        let loaded = MountainCarEnvConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
