use super::{mlp_forward, MlpConfig};
use anyhow::Result;
use candle_core::{Device, Tensor};
use candle_nn::{linear, Linear, Module, VarBuilder};

/// Returns vector of linear modules from [`MlpConfig`].
fn create_linear_layers(prefix: &str, vs: VarBuilder, config: &MlpConfig) -> Result<Vec<Linear>> {
    let mut in_out_pairs: Vec<(usize, usize)> = (0..config.units.len() - 1)
        .map(|i| (config.units[i], config.units[i + 1]))
        .collect();
    in_out_pairs.insert(0, (config.in_dim, config.units[0]));
    in_out_pairs.push((*config.units.last().unwrap(), config.out_dim));
    let vs = vs.pp(prefix);

    in_out_pairs
        .iter()
        .enumerate()
        .map(|(i, &(in_dim, out_dim))| Ok(linear(in_dim, out_dim, vs.pp(format!("ln{}", i)))?))
        .collect()
}

/// Multilayer perceptron with ReLU activation functions and a linear output layer.
pub struct Mlp {
    device: Device,
    layers: Vec<Linear>,
}

impl Mlp {
    /// Builds the network on the device of `vs`.
    ///
    /// Variables are named `mlp.ln{i}.weight` and `mlp.ln{i}.bias`, where `i`
    /// indexes layers from the input side.
    pub fn build(vs: VarBuilder, config: &MlpConfig) -> Result<Self> {
        let device = vs.device().clone();
        let layers = create_linear_layers("mlp", vs, config)?;

        Ok(Self { device, layers })
    }
}

impl Module for Mlp {
    fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let xs = xs.to_device(&self.device)?;
        mlp_forward(xs, &self.layers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::DType;
    use candle_nn::VarMap;

    #[test]
    fn forward_maps_batches_to_action_value_rows() -> Result<()> {
        let varmap = VarMap::new();
        let vs = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let config = MlpConfig::new(2, vec![8, 8], 3);
        let mlp = Mlp::build(vs, &config)?;

        let xs = Tensor::zeros((4, 2), DType::F32, &Device::Cpu)?;
        let ys = mlp.forward(&xs)?;

        assert_eq!(ys.dims(), [4, 3]);
        Ok(())
    }

    #[test]
    fn config_rejects_degenerate_layer_widths() {
        assert!(MlpConfig::new(0, vec![8], 3).validate().is_err());
        assert!(MlpConfig::new(2, vec![], 3).validate().is_err());
        assert!(MlpConfig::new(2, vec![8, 0], 3).validate().is_err());
        assert!(MlpConfig::new(2, vec![8], 0).validate().is_err());
        assert!(MlpConfig::new(2, vec![8], 3).validate().is_ok());
    }
}
