//! Battle configuration.
//!
//! The rules constants of a battle live in one serializable struct so a
//! snapshot carries the exact rules it was played under. Defaults match the
//! standard game: four characters per player per lane, seven-card hands,
//! three-card opening hands, and a final turn of nine.
//!
//! ```
//! use lane_battle::core::BattleConfig;
//!
//! let config = BattleConfig::default().with_final_turn(5);
//! assert_eq!(config.final_turn, 5);
//! assert_eq!(config.max_characters_per_lane, 4);
//! ```

use serde::{Deserialize, Serialize};

/// Number of lanes on the board.
pub const LANE_COUNT: usize = 3;

/// Rules constants for a battle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleConfig {
    /// Maximum characters one player may hold in a single lane.
    pub max_characters_per_lane: usize,

    /// Hand size cap; draws past it are skipped.
    pub max_hand_size: usize,

    /// Cards dealt to each player before the first turn.
    pub initial_hand_size: usize,

    /// Turn on which the winner is decided.
    pub final_turn: u32,

    /// How far "this lane fights first" moves a lane up the combat order.
    pub lane_fights_first_priority: i32,

    /// Upper bound on single attacks per combat pass in one lane.
    pub combat_step_limit: usize,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            max_characters_per_lane: 4,
            max_hand_size: 7,
            initial_hand_size: 3,
            final_turn: 9,
            lane_fights_first_priority: 3,
            combat_step_limit: 512,
        }
    }
}

impl BattleConfig {
    #[must_use]
    pub fn with_max_characters_per_lane(mut self, max: usize) -> Self {
        self.max_characters_per_lane = max;
        self
    }

    #[must_use]
    pub fn with_max_hand_size(mut self, max: usize) -> Self {
        self.max_hand_size = max;
        self
    }

    #[must_use]
    pub fn with_initial_hand_size(mut self, size: usize) -> Self {
        self.initial_hand_size = size;
        self
    }

    #[must_use]
    pub fn with_final_turn(mut self, turn: u32) -> Self {
        self.final_turn = turn;
        self
    }

    #[must_use]
    pub fn with_combat_step_limit(mut self, limit: usize) -> Self {
        self.combat_step_limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BattleConfig::default();
        assert_eq!(config.max_characters_per_lane, 4);
        assert_eq!(config.max_hand_size, 7);
        assert_eq!(config.initial_hand_size, 3);
        assert_eq!(config.final_turn, 9);
        assert_eq!(config.lane_fights_first_priority, 3);
    }

    #[test]
    fn test_builders_chain() {
        let config = BattleConfig::default()
            .with_max_hand_size(5)
            .with_initial_hand_size(2)
            .with_combat_step_limit(16);

        assert_eq!(config.max_hand_size, 5);
        assert_eq!(config.initial_hand_size, 2);
        assert_eq!(config.combat_step_limit, 16);
    }

    #[test]
    fn test_serialization() {
        let config = BattleConfig::default().with_final_turn(3);
        let json = serde_json::to_string(&config).unwrap();
        let restored: BattleConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, restored);
    }
}
