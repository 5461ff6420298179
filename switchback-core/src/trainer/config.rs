//! Configuration of [`Trainer`](super::Trainer).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// Number of training iterations. Each iteration runs
    /// [`Self::episodes_per_iteration`] episodes and ends with a model
    /// checkpoint. Must be positive.
    pub n_iterations: usize,

    /// Number of episodes per iteration. Must be positive.
    pub episodes_per_iteration: usize,

    /// Step budget of one episode. An episode that has not reached a
    /// terminal state after this many steps is truncated. Must be positive.
    pub max_steps_per_episode: usize,

    /// Where to save the model at the end of each iteration. `None` disables
    /// saving.
    pub model_dir: Option<String>,

    /// Key of a scalar in the environment's step records whose per-episode
    /// maximum is tracked, e.g. `"position"`. `None` disables tracking.
    pub progress_key: Option<String>,

    /// Random seed passed to the environment.
    pub seed: i64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            n_iterations: 50,
            episodes_per_iteration: 20,
            max_steps_per_episode: 1000,
            model_dir: None,
            progress_key: None,
            seed: 42,
        }
    }
}

impl TrainerConfig {
    /// Sets the number of training iterations.
    pub fn n_iterations(mut self, v: usize) -> Self {
        self.n_iterations = v;
        self
    }

    /// Sets the number of episodes per iteration.
    pub fn episodes_per_iteration(mut self, v: usize) -> Self {
        self.episodes_per_iteration = v;
        self
    }

    /// Sets the step budget of one episode.
    pub fn max_steps_per_episode(mut self, v: usize) -> Self {
        self.max_steps_per_episode = v;
        self
    }

    /// Sets the directory where models are saved.
    pub fn model_dir(mut self, model_dir: impl Into<String>) -> Self {
        self.model_dir = Some(model_dir.into());
        self
    }

    /// Sets the key of the tracked progress scalar.
    pub fn progress_key(mut self, key: impl Into<String>) -> Self {
        self.progress_key = Some(key.into());
        self
    }

    /// Sets the random seed passed to the environment.
    pub fn seed(mut self, seed: i64) -> Self {
        self.seed = seed;
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
        let dir = TempDir::new("trainer_config").unwrap();
        let path = dir.path().join("trainer.yaml");

        let config = TrainerConfig::default()
            .n_iterations(3)
            .episodes_per_iteration(7)
            .max_steps_per_episode(100)
            .model_dir("model/dqn")
            .progress_key("position")
            .seed(7);
        config.save(&path).unwrap();

        let loaded = TrainerConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
