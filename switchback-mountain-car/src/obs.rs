//! Observation of the mountain-car environment.

/// Observation of [`MountainCarEnv`](crate::MountainCarEnv).
///
/// The system is fully observed: the car's horizontal position and its
/// velocity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MountainCarObs {
    /// Horizontal position of the car.
    pub position: f32,

    /// Velocity of the car.
    pub velocity: f32,
}

impl MountainCarObs {
    /// Number of state variables.
    pub const DIM: usize = 2;

    /// Creates an observation.
    pub fn new(position: f32, velocity: f32) -> Self {
        Self { position, velocity }
    }

    /// The observation as an array, ordered `[position, velocity]`.
    pub fn to_array(self) -> [f32; 2] {
        [self.position, self.velocity]
    }
}
