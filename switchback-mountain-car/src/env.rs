//! Mountain-car implementation of the [`Env`] interface.
mod config;
use crate::{MountainCar, MountainCarAct, MountainCarObs, RewardTable};
use anyhow::Result;
pub use config::MountainCarEnvConfig;
use rand::{rngs::StdRng, SeedableRng};
use switchback_core::{record::Record, Env, Step};

/// Mountain-car environment.
///
/// Wraps the physics simulator with the reward table. Each step applies the
/// action's force, computes the reward from the position the car ends up at
/// and reports termination when the goal condition holds. The environment
/// never truncates an episode; step budgets are owned by the caller.
///
/// Every step record carries the scalar `"position"`, which the trainer can
/// track as the episode's progress measure.
pub struct MountainCarEnv {
    car: MountainCar,
    reward_table: RewardTable,
    rng: StdRng,
}

impl Env for MountainCarEnv {
    type Config = MountainCarEnvConfig;
    type Obs = MountainCarObs;
    type Act = MountainCarAct;
    type Info = ();

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        config.reward_table.validate()?;
        let mut rng = StdRng::seed_from_u64(seed as u64);
        let car = MountainCar::new(&mut rng);

        Ok(Self {
            car,
            reward_table: config.reward_table.clone(),
            rng,
        })
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.car.reset(&mut self.rng);
        Ok(self.car.obs())
    }

    fn step(&mut self, a: &Self::Act) -> (Step<Self>, Record) {
        let is_terminated = self.car.update(a.force_sign());
        let obs = self.car.obs();
        let reward = self.reward_table.reward(obs.position);
        let record = Record::from_scalar("position", obs.position);

        (Step::new(obs, *a, reward, is_terminated, ()), record)
    }
}
