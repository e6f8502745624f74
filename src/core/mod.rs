//! Core engine types: entities, players, RNG, configuration, errors.
//!
//! Nothing in here knows about cards or lanes; the battle layer builds on
//! these building blocks.

pub mod entity;
pub mod player;
pub mod rng;
pub mod config;
pub mod error;

pub use entity::{EntityId, IdAllocator};
pub use player::{PlayerId, PlayerMap};
pub use rng::{GameRng, GameRngState};
pub use config::{BattleConfig, LANE_COUNT};
pub use error::SnapshotError;
