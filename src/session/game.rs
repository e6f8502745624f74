//! A game between two named players.
//!
//! `Game` is the thin wrapper a server talks to: it maps usernames to
//! seats, applies each player's staged moves, records the pre-roll state
//! and keeps the animation events of the last roll.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::record::{TurnRecord, TurnRecorder};
use crate::battle::{BattleEvent, GameTurnState};
use crate::core::{EntityId, PlayerId, PlayerMap};

/// One card play staged by a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMove {
    pub card_id: EntityId,
    pub lane: usize,
}

impl PlayerMove {
    #[must_use]
    pub const fn new(card_id: EntityId, lane: usize) -> Self {
        Self { card_id, lane }
    }
}

pub struct Game {
    id: String,
    usernames: PlayerMap<String>,
    state: GameTurnState,
    events: Vec<BattleEvent>,
}

impl Game {
    #[must_use]
    pub fn new(id: impl Into<String>, usernames: PlayerMap<String>, state: GameTurnState) -> Self {
        Self {
            id: id.into(),
            usernames,
            state,
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn username(&self, player: PlayerId) -> &str {
        &self.usernames[player]
    }

    #[must_use]
    pub fn usernames(&self) -> &PlayerMap<String> {
        &self.usernames
    }

    /// Seat of a username, if they are playing.
    #[must_use]
    pub fn username_to_player_num(&self, username: &str) -> Option<PlayerId> {
        self.usernames
            .iter()
            .find(|(_, name)| name.as_str() == username)
            .map(|(player, _)| player)
    }

    #[must_use]
    pub fn state(&self) -> &GameTurnState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameTurnState {
        &mut self.state
    }

    /// Events produced by the most recent roll.
    #[must_use]
    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    /// Run the opening roll and each lane's start-of-game rules.
    pub fn start(&mut self) {
        info!("starting game {}", self.id);
        self.state.start_game();
        self.events = self.state.take_events();
    }

    /// Apply a player's staged plays for this turn.
    ///
    /// Illegal plays are skipped without disturbing the rest. Marks the
    /// player as having moved and returns how many plays went through.
    pub fn submit_moves(&mut self, player: PlayerId, moves: &[PlayerMove]) -> usize {
        if self.state.has_moved(player) {
            debug!("{} already moved this turn in game {}", player, self.id);
            return 0;
        }
        let mut applied = 0;
        for m in moves {
            if self.state.play_card(player, m.card_id, m.lane).is_some() {
                applied += 1;
            } else {
                debug!("skipping illegal move {:?} by {}", m, player);
            }
        }
        self.state.set_has_moved(player);
        applied
    }

    #[must_use]
    pub fn ready_to_roll(&self) -> bool {
        self.state.all_players_have_moved()
    }

    /// Record the current state, then roll the turn.
    ///
    /// If the recorder fails the turn is not rolled.
    pub fn roll_turn<R: TurnRecorder>(&mut self, recorder: &mut R) -> Result<(), R::Error> {
        let record = TurnRecord::new(
            self.id.clone(),
            self.state.turn(),
            self.usernames.clone(),
            self.state.snapshot(),
        );
        recorder.record(record)?;

        self.state.roll_turn();
        self.events = self.state.take_events();
        Ok(())
    }
}
