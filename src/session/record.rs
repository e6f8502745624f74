//! Turn records and where they go.
//!
//! Before every roll the session hands a `TurnRecord` to a `TurnRecorder`.
//! Persistence is the recorder's business: the engine only builds the
//! record and stops the roll if recording fails.

use std::convert::Infallible;

use serde::{Deserialize, Serialize};

use crate::battle::GameSnapshot;
use crate::core::{PlayerMap, SnapshotError};

/// The state of a game just before a turn was rolled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub game_id: String,
    /// Turn number before the roll.
    pub turn: u32,
    pub usernames: PlayerMap<String>,
    pub snapshot: GameSnapshot,
}

impl TurnRecord {
    #[must_use]
    pub fn new(game_id: impl Into<String>, turn: u32, usernames: PlayerMap<String>, snapshot: GameSnapshot) -> Self {
        Self {
            game_id: game_id.into(),
            turn,
            usernames,
            snapshot,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// Sink for turn records.
pub trait TurnRecorder {
    type Error;

    fn record(&mut self, record: TurnRecord) -> Result<(), Self::Error>;
}

/// Keeps every record in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryRecorder {
    records: Vec<TurnRecord>,
}

impl MemoryRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> &[TurnRecord] {
        &self.records
    }

    #[must_use]
    pub fn last(&self) -> Option<&TurnRecord> {
        self.records.last()
    }
}

impl TurnRecorder for MemoryRecorder {
    type Error = Infallible;

    fn record(&mut self, record: TurnRecord) -> Result<(), Self::Error> {
        self.records.push(record);
        Ok(())
    }
}
