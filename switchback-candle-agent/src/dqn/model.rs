use crate::{
    mlp::{Mlp, MlpConfig},
    opt::{Optimizer, OptimizerConfig},
};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{Module, VarBuilder, VarMap};
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use switchback_core::error::SwitchbackError;

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`QModel`].
pub struct QModelConfig {
    pub(super) mlp_config: Option<MlpConfig>,
    pub(super) opt_config: OptimizerConfig,
}

impl Default for QModelConfig {
    fn default() -> Self {
        Self {
            mlp_config: None,
            opt_config: OptimizerConfig::default(),
        }
    }
}

impl QModelConfig {
    /// Sets the network layout of the action-value function.
    pub fn mlp_config(mut self, v: MlpConfig) -> Self {
        self.mlp_config = Some(v);
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Constructs [`QModelConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`QModelConfig`] to as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Action-value function with its parameters and their optimizer.
pub struct QModel {
    varmap: VarMap,

    // Dimension of the output vector (equal to the number of actions).
    pub(super) out_dim: usize,

    // Action-value function
    q: Mlp,

    // Optimizer
    opt: Optimizer,
}

impl QModel {
    /// Constructs [`QModel`] on the given device.
    ///
    /// Rejects a missing or degenerate network layout and a non-positive
    /// learning rate.
    pub fn build(config: QModelConfig, device: Device) -> Result<Self> {
        let mlp_config = config.mlp_config.context("mlp_config is not set.")?;
        mlp_config.validate()?;
        if config.opt_config.lr() <= 0.0 {
            return Err(SwitchbackError::invalid_config(
                "optimizer",
                "learning rate must be positive",
            )
            .into());
        }
        let out_dim = mlp_config.out_dim();
        let varmap = VarMap::new();
        let q = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            Mlp::build(vb, &mlp_config)?
        };
        let opt = config.opt_config.build(varmap.all_vars())?;

        Ok(Self {
            varmap,
            out_dim,
            q,
            opt,
        })
    }

    /// Outputs the action-values given observation(s), `[n, obs] -> [n, act]`.
    pub fn forward(&self, obs: &Tensor) -> Result<Tensor> {
        Ok(self.q.forward(obs)?)
    }

    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        self.opt.backward_step(loss)
    }

    pub fn get_varmap(&self) -> &VarMap {
        &self.varmap
    }

    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.varmap.save(&path)?;
        info!("Save qmodel to {:?}", path.as_ref());
        Ok(())
    }

    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.varmap.load(&path)?;
        info!("Load qmodel from {:?}", path.as_ref());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn config() -> QModelConfig {
        QModelConfig::default().mlp_config(MlpConfig::new(2, vec![16], 3))
    }

    #[test]
    fn build_rejects_a_missing_network_layout() {
        assert!(QModel::build(QModelConfig::default(), Device::Cpu).is_err());
    }

    #[test]
    fn build_rejects_a_non_positive_learning_rate() {
        let config = config().opt_config(OptimizerConfig::default().learning_rate(0.0));
        assert!(QModel::build(config, Device::Cpu).is_err());
    }

    #[test]
    fn parameters_round_trip_through_a_file() -> Result<()> {
        let tmp_dir = TempDir::new("qmodel")?;
        let path = tmp_dir.path().join("qnet.safetensors");
        let obs = Tensor::from_slice(&[0.1f32, -0.3], (1, 2), &Device::Cpu)?;

        let src = QModel::build(config(), Device::Cpu)?;
        let q_src = src.forward(&obs)?.to_vec2::<f32>()?;
        src.save(&path)?;

        let mut dest = QModel::build(config(), Device::Cpu)?;
        dest.load(&path)?;
        let q_dest = dest.forward(&obs)?.to_vec2::<f32>()?;

        assert_eq!(q_src, q_dest);
        Ok(())
    }
}
