//! Action of the mountain-car environment.

/// Action of [`MountainCarEnv`](crate::MountainCarEnv).
///
/// The car is driven by a fixed-magnitude force. Physics reads an action
/// through [`force_sign`], value vectors address it through [`index`]; no
/// raw integer crosses that boundary.
///
/// [`force_sign`]: Self::force_sign
/// [`index`]: Self::index
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MountainCarAct {
    /// Push leftward.
    Left,

    /// Apply no force.
    Coast,

    /// Push rightward.
    Right,
}

impl MountainCarAct {
    /// Number of distinct actions.
    pub const N: usize = 3;

    /// Direction of the applied force: `-1.0`, `0.0` or `1.0`.
    pub fn force_sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Coast => 0.0,
            Self::Right => 1.0,
        }
    }

    /// Position of this action in a value vector: `0`, `1` or `2`.
    pub fn index(self) -> i64 {
        match self {
            Self::Left => 0,
            Self::Coast => 1,
            Self::Right => 2,
        }
    }

    /// Inverse of [`index`](Self::index).
    pub fn from_index(ix: i64) -> Option<Self> {
        match ix {
            0 => Some(Self::Left),
            1 => Some(Self::Coast),
            2 => Some(Self::Right),
            _ => None,
        }
    }
}
