//! Conversions between environment types and candle tensors.
//!
//! Observations become `[1, 2]` f32 tensors, actions travel as `i64` value
//! indices. The conversions run on the CPU; agents move tensors to their own
//! device.
use crate::{MountainCarAct, MountainCarObs};
use candle_core::{Device, Tensor};

impl From<MountainCarObs> for Tensor {
    fn from(obs: MountainCarObs) -> Tensor {
        Tensor::from_slice(&obs.to_array(), (1, MountainCarObs::DIM), &Device::Cpu).unwrap()
    }
}

impl From<MountainCarAct> for Tensor {
    fn from(act: MountainCarAct) -> Tensor {
        // The leading dimension is the batch dimension, which is 1 for a
        // single action.
        Tensor::from_slice(&[act.index()], (1, 1), &Device::Cpu).unwrap()
    }
}

impl From<Tensor> for MountainCarAct {
    /// Reads an action from a tensor holding a single value index.
    fn from(t: Tensor) -> Self {
        let ix = t.flatten_all().unwrap().to_vec1::<i64>().unwrap()[0];
        match MountainCarAct::from_index(ix) {
            Some(act) => act,
            None => panic!("invalid action index: {}", ix),
        }
    }
}
