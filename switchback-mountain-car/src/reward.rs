//! Position-based reward shaping.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use switchback_core::error::SwitchbackError;

/// Reward shaping over the car's position.
///
/// The table holds `(threshold, value)` pairs with strictly descending
/// thresholds. A position is rewarded with the value of the first threshold
/// it reaches, scanning from the highest; positions below every threshold
/// earn 0. The reward is applied once per step, never cumulatively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardTable {
    thresholds: Vec<(f32, f32)>,
}

impl Default for RewardTable {
    /// The canonical shaping: 100 at the goal, then 20, 10 and 5 on the way
    /// up the right slope.
    fn default() -> Self {
        Self {
            thresholds: vec![(0.5, 100.0), (0.25, 20.0), (0.1, 10.0), (0.0, 5.0)],
        }
    }
}

impl RewardTable {
    /// Creates a table from `(threshold, value)` pairs.
    ///
    /// # Errors
    ///
    /// Rejects a table whose thresholds are not strictly descending.
    pub fn new(thresholds: Vec<(f32, f32)>) -> Result<Self> {
        let table = Self { thresholds };
        table.validate()?;
        Ok(table)
    }

    /// Checks that the thresholds are strictly descending.
    ///
    /// Deserialized tables bypass [`new`](Self::new), so environment
    /// construction calls this again.
    pub fn validate(&self) -> Result<()> {
        if self.thresholds.windows(2).any(|w| w[0].0 <= w[1].0) {
            return Err(SwitchbackError::invalid_config(
                "reward_table",
                "thresholds must be strictly descending",
            )
            .into());
        }
        Ok(())
    }

    /// Reward of a position.
    pub fn reward(&self, position: f32) -> f32 {
        for &(threshold, value) in &self.thresholds {
            if position >= threshold {
                return value;
            }
        }
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::RewardTable;

    #[test]
    fn default_table_literals() {
        let table = RewardTable::default();
        assert_eq!(table.reward(-0.3), 0.0);
        assert_eq!(table.reward(0.05), 5.0);
        assert_eq!(table.reward(0.1), 10.0);
        assert_eq!(table.reward(0.3), 20.0);
        assert_eq!(table.reward(0.55), 100.0);
    }

    #[test]
    fn thresholds_are_inclusive() {
        let table = RewardTable::default();
        assert_eq!(table.reward(0.0), 5.0);
        assert_eq!(table.reward(0.25), 20.0);
        assert_eq!(table.reward(0.5), 100.0);
    }

    #[test]
    fn rejects_non_descending_thresholds() {
        assert!(RewardTable::new(vec![(0.0, 5.0), (0.1, 10.0)]).is_err());
        assert!(RewardTable::new(vec![(0.1, 5.0), (0.1, 10.0)]).is_err());
        assert!(RewardTable::new(vec![(0.5, 100.0), (0.0, 5.0)]).is_ok());
    }
}
