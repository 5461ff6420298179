//! Exploration strategies of DQN.
use anyhow::Result;
use candle_core::{shape::D, DType, Tensor};
use candle_nn::ops::softmax;
use rand::{distributions::WeightedIndex, Rng};
use serde::{Deserialize, Serialize};
use switchback_core::error::SwitchbackError;

/// Explorers for DQN.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum DqnExplorer {
    /// Softmax action selection.
    Softmax(Softmax),

    /// Epsilon-greedy action selection.
    EpsilonGreedy(EpsilonGreedy),
}

impl DqnExplorer {
    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Self::Softmax(_) => Ok(()),
            Self::EpsilonGreedy(eg) => eg.validate(),
        }
    }
}

/// Softmax explorer for DQN.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct Softmax {}

#[allow(clippy::new_without_default)]
impl Softmax {
    /// Constructs softmax explorer.
    pub fn new() -> Self {
        Self {}
    }

    /// Takes an action based on action values, returns i64 tensor.
    ///
    /// * `a` - action values.
    pub fn action(&mut self, a: &Tensor, rng: &mut impl Rng) -> Tensor {
        let device = a.device();
        let probs = softmax(a, 1).unwrap().to_vec2::<f32>().unwrap();
        let n_samples = probs.len();
        let data = probs
            .into_iter()
            .map(|p| rng.sample(WeightedIndex::new(&p).unwrap()) as i64)
            .collect::<Vec<_>>();
        Tensor::from_vec(data, &[n_samples], device).unwrap()
    }
}

/// Epsilon-greedy explorer for DQN.
///
/// The exploration rate decays exponentially in the number of actions taken
/// in training mode:
///
/// eps = eps_min + (eps_max - eps_min) * exp(-decay_rate * n_steps)
///
/// `n_steps` counts every sampled action and is never reset, so the schedule
/// runs across episode and iteration boundaries. The rate is evaluated before
/// the counter is advanced and the very first action is taken at `eps_max`.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedy {
    pub n_steps: usize,
    pub eps_min: f64,
    pub eps_max: f64,
    pub decay_rate: f64,
}

#[allow(clippy::new_without_default)]
impl EpsilonGreedy {
    /// Constructs epsilon-greedy explorer.
    pub fn new() -> Self {
        Self {
            n_steps: 0,
            eps_min: 0.01,
            eps_max: 0.2,
            decay_rate: 0.01,
        }
    }

    /// Current exploration rate.
    pub fn eps(&self) -> f64 {
        self.eps_min + (self.eps_max - self.eps_min) * (-self.decay_rate * self.n_steps as f64).exp()
    }

    /// Takes an action based on action values, returns i64 tensor.
    ///
    /// * `a` - action values.
    pub fn action(&mut self, a: &Tensor, rng: &mut impl Rng) -> Tensor {
        let eps = self.eps();
        let r = rng.gen::<f32>();
        let is_random = r < eps as f32;
        self.n_steps += 1;

        if is_random {
            let n_samples = a.dims()[0];
            let n_actions = a.dims()[1] as u64;
            Tensor::from_slice(
                (0..n_samples)
                    .map(|_| (rng.gen::<u64>() % n_actions) as i64)
                    .collect::<Vec<_>>()
                    .as_slice(),
                &[n_samples],
                a.device(),
            )
            .unwrap()
        } else {
            a.argmax(D::Minus1).unwrap().to_dtype(DType::I64).unwrap()
        }
    }

    /// Set the minimal exploration rate.
    pub fn eps_min(self, v: f64) -> Self {
        let mut s = self;
        s.eps_min = v;
        s
    }

    /// Set the initial exploration rate.
    pub fn eps_max(self, v: f64) -> Self {
        let mut s = self;
        s.eps_max = v;
        s
    }

    /// Set the decay rate of the exploration schedule.
    pub fn decay_rate(self, v: f64) -> Self {
        let mut s = self;
        s.decay_rate = v;
        s
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !(0.0 <= self.eps_min && self.eps_min <= self.eps_max && self.eps_max <= 1.0) {
            return Err(SwitchbackError::invalid_config(
                "explorer",
                "exploration rates must satisfy 0 <= eps_min <= eps_max <= 1",
            )
            .into());
        }
        if self.decay_rate <= 0.0 {
            return Err(
                SwitchbackError::invalid_config("explorer", "decay_rate must be positive").into(),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn schedule_starts_at_eps_max_and_decays_to_eps_min() {
        let mut eg = EpsilonGreedy::new();
        assert_eq!(eg.eps(), 0.2);

        let mut prev = eg.eps();
        for n_steps in [10, 100, 1000] {
            eg.n_steps = n_steps;
            assert!(eg.eps() < prev);
            prev = eg.eps();
        }
        assert!(eg.eps() > 0.01);
        assert!(eg.eps() < 0.011);
    }

    #[test]
    fn greedy_branch_takes_the_argmax() {
        let mut eg = EpsilonGreedy::new().eps_min(0.0).eps_max(0.0);
        let mut rng = SmallRng::seed_from_u64(0);
        let q = Tensor::from_slice(&[0.1f32, 0.9, 0.3], (1, 3), &Device::Cpu).unwrap();

        let a = eg.action(&q, &mut rng);
        assert_eq!(a.to_vec1::<i64>().unwrap(), vec![1]);
        assert_eq!(eg.n_steps, 1);
    }

    #[test]
    fn random_branch_stays_in_the_action_set() {
        let mut eg = EpsilonGreedy::new().eps_min(1.0).eps_max(1.0);
        let mut rng = SmallRng::seed_from_u64(0);
        let q = Tensor::from_slice(&[9.0f32, 0.0, 0.0], (1, 3), &Device::Cpu).unwrap();

        for _ in 0..100 {
            let a = eg.action(&q, &mut rng).to_vec1::<i64>().unwrap();
            assert!((0..3).contains(&a[0]));
        }
    }

    #[test]
    fn rejects_inverted_rates() {
        assert!(EpsilonGreedy::new().eps_min(0.5).eps_max(0.1).validate().is_err());
        assert!(EpsilonGreedy::new().decay_rate(0.0).validate().is_err());
        assert!(EpsilonGreedy::new().validate().is_ok());
    }
}
