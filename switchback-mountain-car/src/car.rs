//! Physics of the mountain-car system.
use crate::MountainCarObs;
use rand::Rng;

/// Leftmost reachable position.
pub const MIN_POSITION: f32 = -1.2;

/// Rightmost reachable position.
pub const MAX_POSITION: f32 = 0.6;

/// Speed limit in both directions.
pub const MAX_SPEED: f32 = 0.07;

/// Position of the goal flag.
pub const GOAL_POSITION: f32 = 0.5;

/// Minimum velocity required at the goal.
pub const GOAL_VELOCITY: f32 = 0.0;

/// Downhill pull per step.
pub const GRAVITY: f32 = 0.0025;

/// Magnitude of the applied force.
pub const FORCE: f32 = 0.0013;

/// Mountain-car system simulator.
///
/// There are two state variables:
///
/// - `position`: the x-coordinate of the car.
/// - `velocity`: the velocity of the car.
///
/// The valley floor follows `sin(3x)`, so the gravity term depends on the
/// position. The engine is too weak to climb the right hill directly; the
/// car has to swing between the slopes to gain momentum. All updates clamp
/// their results, so every operation is total.
#[derive(Clone, Debug)]
pub struct MountainCar {
    position: f32,
    velocity: f32,
}

impl MountainCar {
    /// Creates the simulator in a freshly reset state.
    pub fn new(rng: &mut impl Rng) -> Self {
        let mut car = Self {
            position: 0.0,
            velocity: 0.0,
        };
        car.reset(rng);
        car
    }

    /// Puts the car at a random start position in `[-0.6, -0.4)` with zero
    /// velocity.
    pub fn reset(&mut self, rng: &mut impl Rng) {
        self.position = rng.gen::<f32>() / 5.0 - 0.6;
        self.velocity = 0.0;
    }

    /// Advances the system by one step.
    ///
    /// # Arguments
    ///
    /// * `force_sign` - Direction of the applied force: `1.0` pushes the car
    ///   rightward, `-1.0` leftward and `0.0` applies no force.
    ///
    /// # Returns
    ///
    /// Whether the goal condition holds after the update.
    pub fn update(&mut self, force_sign: f32) -> bool {
        self.velocity += force_sign * FORCE - (3.0 * self.position).cos() * GRAVITY;
        self.velocity = self.velocity.clamp(-MAX_SPEED, MAX_SPEED);

        self.position += self.velocity;
        self.position = self.position.clamp(MIN_POSITION, MAX_POSITION);

        // Inelastic collision with the left wall.
        if self.position == MIN_POSITION && self.velocity < 0.0 {
            self.velocity = 0.0;
        }

        self.is_done()
    }

    /// True when the car is at or beyond the goal flag and not moving
    /// backwards.
    pub fn is_done(&self) -> bool {
        self.position >= GOAL_POSITION && self.velocity >= GOAL_VELOCITY
    }

    /// Current state.
    pub fn obs(&self) -> MountainCarObs {
        MountainCarObs::new(self.position, self.velocity)
    }

    /// Horizontal position of the car.
    pub fn position(&self) -> f32 {
        self.position
    }

    /// Velocity of the car.
    pub fn velocity(&self) -> f32 {
        self.velocity
    }
}
