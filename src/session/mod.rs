//! Session layer: a named two-player game around a `GameTurnState`.
//!
//! - `Game`: usernames, staged moves, recorded rolls, last roll's events
//! - `TurnRecord` / `TurnRecorder`: the pre-roll state and its sink

pub mod game;
pub mod record;

pub use game::{Game, PlayerMove};
pub use record::{MemoryRecorder, TurnRecord, TurnRecorder};
