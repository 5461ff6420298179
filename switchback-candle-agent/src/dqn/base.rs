//! DQN agent implemented with candle.
use super::{
    config::{DqnConfig, TargetSync},
    explorer::DqnExplorer,
    model::QModel,
};
use crate::util::{track, vec_to_tensor};
use anyhow::Result;
use candle_core::{shape::D, DType, Device, Tensor};
use candle_nn::{encoding::one_hot, loss::mse};
use log::warn;
use rand::{rngs::SmallRng, SeedableRng};
use std::{fs, marker::PhantomData, path::Path};
use switchback_core::{
    error::SwitchbackError,
    record::{Record, RecordValue},
    Agent, Env, Policy, ReplayBufferBase, TransitionBatch,
};

/// Returns the training target matrix for a batch of transitions.
///
/// The result equals the detached predictions `q` except at the taken
/// actions, whose entries hold the one-step TD target
/// `reward + is_not_terminated * discount_factor * max_a q_next`. The caller
/// detaches `q_next`.
fn target_matrix(
    q: &Tensor,
    q_next: &Tensor,
    act: &Tensor,
    reward: &Tensor,
    is_not_terminated: &Tensor,
    discount_factor: f64,
    out_dim: usize,
) -> Result<Tensor> {
    let max_next = q_next.max(D::Minus1)?;
    let td = (reward + (is_not_terminated * (max_next * discount_factor)?)?)?;
    let taken = one_hot(act.squeeze(D::Minus1)?, out_dim, 1f32, 0f32)?;
    Ok(((q.detach() * taken.affine(-1.0, 1.0)?)?
        + taken.broadcast_mul(&td.unsqueeze(D::Minus1)?)?)?)
}

#[allow(clippy::upper_case_acronyms)]
/// DQN agent implemented with candle.
///
/// Optimization minimizes the squared error between the action-values of a
/// batch of observations and a target matrix. The target matrix equals the
/// detached action-values everywhere except at the taken actions, whose
/// entries hold the one-step TD target
///
/// r + (1 - is_terminated) * gamma * max_a Q(o', a)
///
/// so the loss only pushes on the taken actions. Truncated transitions keep
/// their bootstrap term, terminated ones reduce to the reward.
///
/// By default the bootstrap values come from the online network itself. A
/// periodically synchronized frozen copy can be enabled with
/// [`DqnConfig::target`].
pub struct Dqn<E, R>
where
    E: Env,
    R: ReplayBufferBase,
    E::Obs: Into<Tensor>,
    E::Act: From<Tensor>,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Tensor>,
    <R::Batch as TransitionBatch>::ActBatch: Into<Tensor>,
{
    qnet: QModel,
    qnet_tgt: Option<QModel>,
    target_sync: Option<TargetSync>,
    sync_counter: usize,
    batch_size: usize,
    discount_factor: f64,
    explorer: DqnExplorer,
    train: bool,
    device: Device,
    n_opts: usize,
    rng: SmallRng,
    phantom: PhantomData<(E, R)>,
}

impl<E, R> Dqn<E, R>
where
    E: Env,
    R: ReplayBufferBase,
    E::Obs: Into<Tensor>,
    E::Act: From<Tensor>,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Tensor>,
    <R::Batch as TransitionBatch>::ActBatch: Into<Tensor>,
{
    /// Constructs DQN agent in evaluation mode.
    ///
    /// Rejects hyperparameters outside their domain: a zero batch size, a
    /// discount factor outside `(0, 1)`, inverted exploration rates and a
    /// degenerate target sync schedule.
    pub fn build(config: DqnConfig) -> Result<Self> {
        if config.batch_size == 0 {
            return Err(
                SwitchbackError::invalid_config("batch_size", "must be positive").into(),
            );
        }
        if !(config.discount_factor > 0.0 && config.discount_factor < 1.0) {
            return Err(SwitchbackError::invalid_config(
                "discount_factor",
                "must lie in (0, 1)",
            )
            .into());
        }
        config.explorer.validate()?;
        if let Some(target) = &config.target {
            if target.interval == 0 {
                return Err(SwitchbackError::invalid_config(
                    "target.interval",
                    "must be positive",
                )
                .into());
            }
            if !(target.tau > 0.0 && target.tau <= 1.0) {
                return Err(SwitchbackError::invalid_config(
                    "target.tau",
                    "must lie in (0, 1]",
                )
                .into());
            }
        }

        let device: Device = config
            .device
            .ok_or_else(|| SwitchbackError::invalid_config("device", "is not set"))?
            .into();
        let qnet = QModel::build(config.model_config.clone(), device.clone())?;
        let qnet_tgt = match &config.target {
            Some(_) => {
                let qnet_tgt = QModel::build(config.model_config, device.clone())?;
                track(qnet_tgt.get_varmap(), qnet.get_varmap(), 1.0)?;
                Some(qnet_tgt)
            }
            None => None,
        };

        Ok(Dqn {
            qnet,
            qnet_tgt,
            target_sync: config.target,
            sync_counter: 0,
            batch_size: config.batch_size,
            discount_factor: config.discount_factor,
            explorer: config.explorer,
            train: false,
            device,
            n_opts: 0,
            rng: SmallRng::seed_from_u64(config.seed),
            phantom: PhantomData,
        })
    }

    fn update_critic(&mut self, buffer: &mut R) -> Result<f32> {
        let batch = buffer.batch(self.batch_size)?;
        let (obs, act, next_obs, reward, is_terminated, _is_truncated) = batch.unpack();
        let obs = obs.into().to_device(&self.device)?;
        let act = act.into().to_device(&self.device)?;
        let next_obs = next_obs.into().to_device(&self.device)?;
        let reward = vec_to_tensor::<_, f32>(reward, false)?.to_device(&self.device)?;
        let is_not_terminated = {
            let v = is_terminated.into_iter().map(|v| 1 - v).collect::<Vec<_>>();
            vec_to_tensor::<_, f32>(v, false)?.to_device(&self.device)?
        };

        let q_next = match &self.qnet_tgt {
            Some(qnet_tgt) => qnet_tgt.forward(&next_obs)?,
            None => self.qnet.forward(&next_obs)?,
        }
        .detach();
        let q = self.qnet.forward(&obs)?;
        let tgt = target_matrix(
            &q,
            &q_next,
            &act,
            &reward,
            &is_not_terminated,
            self.discount_factor,
            self.qnet.out_dim,
        )?;
        let loss = mse(&q, &tgt)?;

        self.qnet.backward_step(&loss)?;

        let loss = loss.to_scalar::<f32>()?;
        if !loss.is_finite() {
            warn!("critic loss is not finite ({})", loss);
        }
        Ok(loss)
    }

    fn opt_(&mut self, buffer: &mut R) -> Result<Record> {
        let loss_critic = self.update_critic(buffer)?;

        if let Some(target_sync) = &self.target_sync {
            self.sync_counter += 1;
            if self.sync_counter == target_sync.interval {
                self.sync_counter = 0;
                if let Some(qnet_tgt) = &self.qnet_tgt {
                    track(qnet_tgt.get_varmap(), self.qnet.get_varmap(), target_sync.tau)?;
                }
            }
        }

        self.n_opts += 1;

        let mut record = Record::from_slice(&[("loss", RecordValue::Scalar(loss_critic))]);
        if let DqnExplorer::EpsilonGreedy(egreedy) = &self.explorer {
            record.insert("eps", RecordValue::Scalar(egreedy.eps() as f32));
        }
        Ok(record)
    }
}

impl<E, R> Policy<E> for Dqn<E, R>
where
    E: Env,
    R: ReplayBufferBase,
    E::Obs: Into<Tensor>,
    E::Act: From<Tensor>,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Tensor>,
    <R::Batch as TransitionBatch>::ActBatch: Into<Tensor>,
{
    /// In evaluation mode, takes the greedy action.
    fn sample(&mut self, obs: &E::Obs) -> E::Act {
        let a = self.qnet.forward(&obs.clone().into()).unwrap();
        let a = if self.train {
            match &mut self.explorer {
                DqnExplorer::Softmax(softmax) => softmax.action(&a, &mut self.rng),
                DqnExplorer::EpsilonGreedy(egreedy) => egreedy.action(&a, &mut self.rng),
            }
        } else {
            a.argmax(D::Minus1).unwrap().to_dtype(DType::I64).unwrap()
        };
        a.into()
    }
}

impl<E, R> Agent<E, R> for Dqn<E, R>
where
    E: Env,
    R: ReplayBufferBase,
    E::Obs: Into<Tensor>,
    E::Act: From<Tensor>,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Tensor>,
    <R::Batch as TransitionBatch>::ActBatch: Into<Tensor>,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn opt(&mut self, buffer: &mut R) -> Result<Record> {
        self.opt_(buffer)
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        self.qnet.save(path.join("qnet.safetensors"))?;
        if let Some(qnet_tgt) = &self.qnet_tgt {
            qnet_tgt.save(path.join("qnet_tgt.safetensors"))?;
        }
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.qnet.load(path.join("qnet.safetensors"))?;
        if let Some(qnet_tgt) = &mut self.qnet_tgt {
            qnet_tgt.load(path.join("qnet_tgt.safetensors"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dqn::{EpsilonGreedy, QModelConfig},
        mlp::MlpConfig,
        opt::OptimizerConfig,
        TensorBatch,
    };
    use switchback_core::{
        generic_replay_buffer::{
            GenericReplayBuffer, GenericReplayBufferConfig, GenericTransitionBatch,
        },
        ExperienceBufferBase, Step,
    };
    use tempdir::TempDir;

    #[derive(Clone, Debug)]
    struct TestObs([f32; 2]);

    impl From<TestObs> for Tensor {
        fn from(obs: TestObs) -> Tensor {
            Tensor::from_slice(&obs.0, (1, 2), &Device::Cpu).unwrap()
        }
    }

    #[derive(Clone, Debug)]
    struct TestAct(i64);

    impl From<Tensor> for TestAct {
        fn from(t: Tensor) -> TestAct {
            TestAct(t.flatten_all().unwrap().to_vec1::<i64>().unwrap()[0])
        }
    }

    struct TestEnv;

    impl Env for TestEnv {
        type Config = ();
        type Obs = TestObs;
        type Act = TestAct;
        type Info = ();

        fn build(_config: &Self::Config, _seed: i64) -> Result<Self> {
            Ok(Self)
        }

        fn reset(&mut self) -> Result<Self::Obs> {
            Ok(TestObs([0.0, 0.0]))
        }

        fn step(&mut self, _a: &Self::Act) -> (Step<Self>, Record) {
            unimplemented!();
        }
    }

    type Buffer = GenericReplayBuffer<TensorBatch, TensorBatch>;
    type Item = GenericTransitionBatch<TensorBatch, TensorBatch>;
    type TestDqn = Dqn<TestEnv, Buffer>;

    fn row(data: [f32; 2]) -> TensorBatch {
        TensorBatch::from_tensor(Tensor::from_slice(&data, (1, 2), &Device::Cpu).unwrap())
    }

    fn transition(obs: [f32; 2], act: i64, next_obs: [f32; 2], reward: f32, terminated: i8) -> Item {
        Item {
            obs: row(obs),
            act: TensorBatch::from_tensor(
                Tensor::from_slice(&[act], (1, 1), &Device::Cpu).unwrap(),
            ),
            next_obs: row(next_obs),
            reward: vec![reward],
            is_terminated: vec![terminated],
            is_truncated: vec![0],
        }
    }

    fn config(lr: f64) -> DqnConfig {
        DqnConfig::default()
            .model_config(
                QModelConfig::default()
                    .mlp_config(MlpConfig::new(2, vec![8], 3))
                    .opt_config(OptimizerConfig::Adam { lr }),
            )
            .batch_size(4)
            .discount_factor(0.9)
            .device(Device::Cpu)
    }

    fn q_values(qnet: &QModel, obs: [f32; 2]) -> Vec<f32> {
        let obs = Tensor::from_slice(&obs, (1, 2), &Device::Cpu).unwrap();
        qnet.forward(&obs).unwrap().to_vec2::<f32>().unwrap()[0].clone()
    }

    #[test]
    fn target_matrix_moves_only_the_taken_actions() -> Result<()> {
        let device = &Device::Cpu;
        let q = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], (2, 3), device)?;
        let q_next = Tensor::from_slice(&[0.5f32, 1.5, 1.0, 2.0, 0.0, 1.0], (2, 3), device)?;
        let act = Tensor::from_slice(&[1i64, 0], (2, 1), device)?;
        let reward = Tensor::from_slice(&[7.0f32, 3.0], (2,), device)?;
        // The first transition is terminal, the second is not.
        let is_not_terminated = Tensor::from_slice(&[0.0f32, 1.0], (2,), device)?;

        let tgt = target_matrix(&q, &q_next, &act, &reward, &is_not_terminated, 0.5, 3)?;
        let tgt = tgt.to_vec2::<f32>()?;

        // A terminal transition's entry equals its reward exactly.
        assert_eq!(tgt[0], vec![1.0, 7.0, 3.0]);
        // A non-terminal entry holds reward + 0.5 * max(q_next) = 3 + 0.5 * 2.
        assert_eq!(tgt[1], vec![4.0, 5.0, 6.0]);
        Ok(())
    }

    #[test]
    fn build_rejects_hyperparameters_outside_their_domain() {
        let bad = vec![
            config(1e-3).batch_size(0),
            config(1e-3).discount_factor(0.0),
            config(1e-3).discount_factor(1.0),
            config(1e-3).explorer(DqnExplorer::EpsilonGreedy(
                EpsilonGreedy::new().eps_min(0.5).eps_max(0.2),
            )),
            config(1e-3).target(TargetSync {
                interval: 0,
                tau: 1.0,
            }),
            config(1e-3).target(TargetSync {
                interval: 10,
                tau: 1.5,
            }),
        ];
        for config in bad.into_iter() {
            assert!(TestDqn::build(config).is_err());
        }

        let mut no_device = config(1e-3);
        no_device.device = None;
        assert!(TestDqn::build(no_device).is_err());

        assert!(TestDqn::build(config(1e-3)).is_ok());
    }

    #[test]
    fn evaluation_actions_are_greedy_and_deterministic() {
        let mut agent = TestDqn::build(config(1e-3)).unwrap();
        assert!(!agent.is_train());

        let obs = TestObs([0.2, -0.4]);
        let a1 = agent.sample(&obs).0;
        let a2 = agent.sample(&obs).0;
        assert_eq!(a1, a2);
        assert!((0..3).contains(&a1));
    }

    #[test]
    fn optimization_fits_terminal_targets_to_the_reward() {
        let mut agent = TestDqn::build(config(1e-2)).unwrap();
        let mut buffer = Buffer::build(&GenericReplayBufferConfig::default().capacity(8)).unwrap();
        for _ in 0..4 {
            buffer.push(transition([0.3, 0.0], 1, [0.0, 0.0], 5.0, 1)).unwrap();
        }

        agent.train();
        for _ in 0..1000 {
            agent.opt(&mut buffer).unwrap();
        }

        let q = q_values(&agent.qnet, [0.3, 0.0]);
        assert!((q[1] - 5.0).abs() < 0.5, "q = {:?}", q);
    }

    #[test]
    fn target_network_follows_the_sync_interval() {
        let config = config(1e-2).target(TargetSync {
            interval: 2,
            tau: 1.0,
        });
        let mut agent = TestDqn::build(config).unwrap();
        let mut buffer = Buffer::build(&GenericReplayBufferConfig::default().capacity(8)).unwrap();
        for _ in 0..4 {
            buffer.push(transition([0.1, 0.2], 0, [0.2, 0.1], 1.0, 0)).unwrap();
        }
        let q_tgt = |agent: &TestDqn| q_values(agent.qnet_tgt.as_ref().unwrap(), [0.1, 0.2]);

        // The target starts as a copy of the online network.
        assert_eq!(q_values(&agent.qnet, [0.1, 0.2]), q_tgt(&agent));

        agent.train();
        agent.opt(&mut buffer).unwrap();
        assert_ne!(q_values(&agent.qnet, [0.1, 0.2]), q_tgt(&agent));

        agent.opt(&mut buffer).unwrap();
        assert_eq!(q_values(&agent.qnet, [0.1, 0.2]), q_tgt(&agent));
    }

    #[test]
    fn optimization_records_loss_and_exploration_rate() {
        let mut agent = TestDqn::build(config(1e-3)).unwrap();
        let mut buffer = Buffer::build(&GenericReplayBufferConfig::default().capacity(8)).unwrap();
        buffer.push(transition([0.0, 0.0], 2, [0.1, 0.0], 0.0, 0)).unwrap();

        agent.train();
        let record = agent.opt(&mut buffer).unwrap();

        let loss = record.get_scalar("loss").unwrap();
        assert!(loss.is_finite() && loss >= 0.0);
        assert_eq!(record.get_scalar("eps").unwrap(), 0.2);
    }

    #[test]
    fn parameters_round_trip_through_a_directory() -> Result<()> {
        let tmp_dir = TempDir::new("dqn")?;
        let agent = TestDqn::build(config(1e-3))?;
        agent.save_params(tmp_dir.path())?;

        let mut agent_ = TestDqn::build(config(1e-3))?;
        agent_.load_params(tmp_dir.path())?;

        assert_eq!(
            q_values(&agent.qnet, [0.4, -0.2]),
            q_values(&agent_.qnet, [0.4, -0.2])
        );
        Ok(())
    }
}
