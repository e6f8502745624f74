//! Animation event stream.
//!
//! Every visible sub-step of a turn appends a `BattleEvent` so a
//! presentation layer can replay the turn. Each event optionally carries a
//! full snapshot of the board as it stood right after the step.

use serde::{Deserialize, Serialize};

use super::snapshot::GameSnapshot;
use crate::core::PlayerId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    StartOfRoll,
    EndOfRoll,
    /// A character's ability resolved; highlights that character.
    OnReveal,
    /// A lane-wide effect resolved; highlights the lane.
    LaneAnimation,
    CharacterAttack,
    /// Two characters on the same side fought each other.
    FriendlyAttack,
    TowerDamage,
    CharacterShackle,
    CharacterSilence,
    CharacterHeal,
    CharacterSwitchLanes,
    ShieldBreak,
    SwitchSides,
}

/// Positional payload. Indices refer to the acting player's roster for
/// `from_index` and to the target's roster for `to_index`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventData {
    pub lane: Option<usize>,
    pub acting_player: Option<PlayerId>,
    pub from_index: Option<usize>,
    pub to_index: Option<usize>,
    pub to_lane: Option<usize>,
}

impl EventData {
    #[must_use]
    pub fn lane(lane: usize) -> Self {
        Self {
            lane: Some(lane),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn actor(lane: usize, player: PlayerId, from_index: Option<usize>) -> Self {
        Self {
            lane: Some(lane),
            acting_player: Some(player),
            from_index,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn targeted(lane: usize, player: PlayerId, from_index: Option<usize>, to_index: Option<usize>) -> Self {
        Self {
            to_index,
            ..Self::actor(lane, player, from_index)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleEvent {
    pub kind: EventKind,
    pub data: EventData,
    pub snapshot: Option<Box<GameSnapshot>>,
}

/// Buffer of events for the turn in progress.
#[derive(Clone, Debug)]
pub struct EventLog {
    events: Vec<BattleEvent>,
    recording: bool,
    capture_snapshots: bool,
}

impl Default for EventLog {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            recording: true,
            capture_snapshots: true,
        }
    }
}

impl EventLog {
    /// A log that drops everything. Used by cloned states.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            events: Vec::new(),
            recording: false,
            capture_snapshots: false,
        }
    }

    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    #[must_use]
    pub fn captures_snapshots(&self) -> bool {
        self.recording && self.capture_snapshots
    }

    pub fn set_capture_snapshots(&mut self, capture: bool) {
        self.capture_snapshots = capture;
    }

    pub fn push(&mut self, event: BattleEvent) {
        if self.recording {
            self.events.push(event);
        }
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    #[must_use]
    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    /// Drain the buffer.
    pub fn take(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }
}
