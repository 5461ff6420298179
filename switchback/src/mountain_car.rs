//! Types wiring the mountain-car environment to the DQN agent.
//!
//! Observations and actions cross the boundary between the environment and
//! the agent as tensors. The batch newtypes below store them as rows of a
//! [`TensorBatch`] so that a sampled batch converts into a model input
//! without copying rows one by one.
use candle_core::Tensor;
use switchback_candle_agent::{dqn::Dqn, TensorBatch};
use switchback_core::{
    generic_replay_buffer::{BatchBase, GenericReplayBuffer, GenericStepProcessor},
    DefaultEvaluator,
};
use switchback_mountain_car::{MountainCarAct, MountainCarEnv, MountainCarObs};

/// A column of observations, stored as rows of an f32 tensor.
pub struct ObsBatch(TensorBatch);

impl BatchBase for ObsBatch {
    fn new(capacity: usize) -> Self {
        Self(TensorBatch::new(capacity))
    }

    fn push(&mut self, i: usize, data: Self) {
        self.0.push(i, data.0)
    }

    fn sample(&self, ixs: &Vec<usize>) -> Self {
        let buf = self.0.sample(ixs);
        Self(buf)
    }
}

impl From<MountainCarObs> for ObsBatch {
    fn from(obs: MountainCarObs) -> Self {
        let tensor = obs.into();
        Self(TensorBatch::from_tensor(tensor))
    }
}

impl From<ObsBatch> for Tensor {
    fn from(b: ObsBatch) -> Self {
        b.0.into()
    }
}

/// A column of actions, stored as rows of an i64 tensor.
pub struct ActBatch(TensorBatch);

impl BatchBase for ActBatch {
    fn new(capacity: usize) -> Self {
        Self(TensorBatch::new(capacity))
    }

    fn push(&mut self, i: usize, data: Self) {
        self.0.push(i, data.0)
    }

    fn sample(&self, ixs: &Vec<usize>) -> Self {
        let buf = self.0.sample(ixs);
        Self(buf)
    }
}

impl From<MountainCarAct> for ActBatch {
    fn from(act: MountainCarAct) -> Self {
        let tensor = act.into();
        Self(TensorBatch::from_tensor(tensor))
    }
}

impl From<ActBatch> for Tensor {
    fn from(act: ActBatch) -> Self {
        act.0.into()
    }
}

/// Turns steps of the environment into single-row transitions.
pub type StepProc = GenericStepProcessor<MountainCarEnv, ObsBatch, ActBatch>;

/// Replay buffer of tensor-backed transitions.
pub type ReplayBuffer = GenericReplayBuffer<ObsBatch, ActBatch>;

/// DQN agent wired to the mountain-car environment.
pub type MountainCarDqn = Dqn<MountainCarEnv, ReplayBuffer>;

/// Greedy evaluation runs on a fresh environment.
pub type Evaluator = DefaultEvaluator<MountainCarEnv>;
