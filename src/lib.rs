//! # lane-battle
//!
//! Battle resolution engine for a two-player, three-lane card game.
//!
//! Each turn both players stage card plays into three lanes, then a single
//! roll resolves everything: new characters reveal, lanes fight in priority
//! order, end-of-turn effects run and both players draw. After the final
//! turn the player ahead in more lanes wins.
//!
//! ## Design Principles
//!
//! 1. **Typed Abilities**: Every capability is an `AbilityKind` variant with
//!    O(1) lookup. Rules code never compares ability names as strings.
//!
//! 2. **Ids, Not References**: Characters are owned by their lane and
//!    addressed by `EntityId`; a character's lane is a plain index.
//!
//! 3. **Deterministic by Seed**: All randomness flows through one `GameRng`,
//!    so a seed plus a sequence of plays replays a whole game.
//!
//! 4. **Bad Input Is Not an Error**: Illegal plays are skipped and logged.
//!    Only snapshot decoding and restoring return errors.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: hands and piles are `im` vectors so
//!   `clone_state()` stays cheap for search-based players.
//!
//! - **Snapshots Everywhere**: every animation event can carry a full
//!   `GameSnapshot`, and snapshots round-trip through bincode.
//!
//! ## Modules
//!
//! - `core`: Entity IDs, players, RNG, configuration, errors
//! - `cards`: Abilities, templates, cards, and the catalog
//! - `battle`: Characters, lanes, combat, reveals, rewards, the turn loop
//! - `session`: Named games, staged moves, turn recording
//!
//! ## Example
//!
//! ```
//! use lane_battle::{BattleBuilder, Deck, PlayerId};
//!
//! let deck = Deck::new("starter", ["Sokka", "Suki", "Momo", "Zuko", "Katara", "Appa"]);
//! let mut state = BattleBuilder::new()
//!     .deck(PlayerId::new(0), deck.clone())
//!     .deck(PlayerId::new(1), deck)
//!     .random_lane_rewards()
//!     .build(7);
//!
//! state.start_game();
//! while !state.is_over() {
//!     for player in PlayerId::ALL {
//!         if let Some(card) = state.hand(player).front().map(|c| c.id) {
//!             if let Some(lane) = state.random_lane_with_room(player) {
//!                 state.play_card(player, card, lane);
//!             }
//!         }
//!     }
//!     state.roll_turn();
//! }
//! assert_eq!(state.turn(), 9);
//! ```

pub mod core;
pub mod cards;
pub mod battle;
pub mod session;

// Re-export commonly used types
pub use crate::core::{
    EntityId, IdAllocator, PlayerId, PlayerMap,
    GameRng, GameRngState,
    BattleConfig, LANE_COUNT,
    SnapshotError,
};

pub use crate::cards::{
    Ability, AbilityKind, AbilitySet,
    Card, CardCatalog, CardTemplate, Deck, Element, Rarity,
};

pub use crate::battle::{
    AttackOptions, BattleBuilder, BattleEvent, Character, EventData, EventKind,
    GameSnapshot, GameTurnState, Lane, LaneReward, Location, RewardEffect,
};

pub use crate::session::{Game, MemoryRecorder, PlayerMove, TurnRecord, TurnRecorder};
