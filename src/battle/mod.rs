//! Battle rules: characters, lanes, combat, reveals, and the turn loop.
//!
//! ## Key Types
//!
//! - `GameTurnState`: the whole board and the per-turn phase sequence
//! - `BattleBuilder`: sets up a fresh battle from decks and lane rewards
//! - `Lane`: two rosters, two towers, an optional reward
//! - `Character`: a card in play
//! - `BattleEvent`: one animation step, optionally with a board snapshot
//! - `GameSnapshot`: serializable copy of a `GameTurnState`
//!
//! Every rule is a method on `GameTurnState` addressing characters by
//! `EntityId`, split by concern across `lane`, `combat` and `reveal`.

pub mod character;
pub mod reward;
pub mod events;
pub mod lane;
pub mod state;
pub mod combat;
pub mod reveal;
pub mod snapshot;

pub use character::Character;
pub use reward::{LaneReward, RewardEffect};
pub use events::{BattleEvent, EventData, EventKind, EventLog};
pub use lane::{Lane, Roster};
pub use state::{BattleBuilder, GameTurnState, Location};
pub use combat::{AttackOptions, FightOptions, Strike};
pub use snapshot::GameSnapshot;
