//! Serializable game snapshots.
//!
//! A `GameSnapshot` is everything needed to resume a battle: board, hands,
//! piles, mana, per-turn flags, RNG position and the id counter. Snapshots
//! travel with animation events and are what turn records persist.
//!
//! Encoding is bincode. Restoring validates the lane layout and character
//! ownership, restores each character's lane back-reference, and relinks
//! templates to the supplied catalog when they match.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::events::EventLog;
use super::lane::Lane;
use super::state::GameTurnState;
use crate::cards::{Card, CardCatalog, CardTemplate};
use crate::core::{BattleConfig, GameRng, GameRngState, IdAllocator, PlayerId, PlayerMap, SnapshotError, LANE_COUNT};

/// Plain-data copy of a `GameTurnState`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub turn: u32,
    pub lanes: Vec<Lane>,
    pub hands: PlayerMap<Vec<Card>>,
    pub draw_piles: PlayerMap<Vec<Card>>,
    pub mana: PlayerMap<i32>,
    pub has_moved: PlayerMap<bool>,
    pub has_mulliganed: PlayerMap<bool>,
    pub done_with_animations: PlayerMap<bool>,
    pub winner: Option<PlayerId>,
    pub rng: GameRngState,
    pub next_entity_id: u32,
    pub config: BattleConfig,
}

impl GameSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

impl GameTurnState {
    /// Capture the current state.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        let cards = |cards: &im::Vector<Card>| cards.iter().cloned().collect::<Vec<_>>();
        GameSnapshot {
            turn: self.turn,
            lanes: self.lanes.to_vec(),
            hands: self.hands.map(cards),
            draw_piles: self.draw_piles.map(cards),
            mana: self.mana.clone(),
            has_moved: self.has_moved.clone(),
            has_mulliganed: self.has_mulliganed.clone(),
            done_with_animations: self.done_with_animations.clone(),
            winner: self.winner,
            rng: self.rng.state(),
            next_entity_id: self.ids.peek(),
            config: self.config.clone(),
        }
    }

    /// Rebuild a state from a snapshot.
    pub fn from_snapshot(snapshot: GameSnapshot, catalog: Arc<CardCatalog>) -> Result<Self, SnapshotError> {
        let found = snapshot.lanes.len();
        let mut lanes: [Lane; LANE_COUNT] = snapshot
            .lanes
            .try_into()
            .map_err(|_| SnapshotError::LaneCount { found })?;

        for (position, lane) in lanes.iter_mut().enumerate() {
            if lane.number != position {
                return Err(SnapshotError::LaneNumber {
                    position,
                    number: lane.number,
                });
            }
            for player in PlayerId::ALL {
                for c in lane.characters[player].iter_mut() {
                    if c.owner != player {
                        return Err(SnapshotError::OwnerMismatch {
                            lane: position,
                            character: c.id.raw(),
                            listed: player.0,
                            owner: c.owner.0,
                        });
                    }
                    c.lane = position;
                    relink(&catalog, &mut c.template);
                }
            }
        }

        let cards = |cards: Vec<Card>| -> im::Vector<Card> {
            cards
                .into_iter()
                .map(|mut card| {
                    relink(&catalog, &mut card.template);
                    card
                })
                .collect()
        };
        let [hand0, hand1] = snapshot.hands.into_array();
        let [pile0, pile1] = snapshot.draw_piles.into_array();

        Ok(Self {
            config: snapshot.config,
            rng: GameRng::from_state(&snapshot.rng),
            ids: IdAllocator::starting_at(snapshot.next_entity_id),
            turn: snapshot.turn,
            lanes,
            hands: PlayerMap::from_pair(cards(hand0), cards(hand1)),
            draw_piles: PlayerMap::from_pair(cards(pile0), cards(pile1)),
            mana: snapshot.mana,
            has_moved: snapshot.has_moved,
            has_mulliganed: snapshot.has_mulliganed,
            done_with_animations: snapshot.done_with_animations,
            winner: snapshot.winner,
            events: EventLog::default(),
            catalog,
        })
    }
}

/// Share the catalog's template when the snapshot's copy is identical.
fn relink(catalog: &CardCatalog, template: &mut Arc<CardTemplate>) {
    if let Some(known) = catalog.get(&template.name) {
        if *known == **template {
            *template = known;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::BattleBuilder;
    use crate::cards::Deck;

    fn started(seed: u64) -> GameTurnState {
        let deck = Deck::new("snap", ["Sokka", "Suki", "Momo", "Zuko", "Katara", "Appa"]);
        let mut s = BattleBuilder::new()
            .deck(PlayerId::new(0), deck.clone())
            .deck(PlayerId::new(1), deck)
            .lane_rewards(["Omashu", "Boiling Rock", "Spirit Oasis"])
            .capture_snapshots(false)
            .build(seed);
        s.start_game();
        for player in PlayerId::ALL {
            let card = s.hand(player)[0].id;
            s.play_card(player, card, 1);
        }
        s
    }

    #[test]
    fn test_restored_state_continues_identically() {
        let mut original = started(8);
        let bytes = original.snapshot().to_bytes().unwrap();
        let snapshot = GameSnapshot::from_bytes(&bytes).unwrap();
        let mut restored = GameTurnState::from_snapshot(snapshot, Arc::clone(original.catalog())).unwrap();

        original.roll_turn();
        restored.roll_turn();

        assert_eq!(original.snapshot(), restored.snapshot());
    }

    #[test]
    fn test_restore_sets_lane_back_references() {
        let original = started(3);
        let snapshot = GameSnapshot::from_bytes(&original.snapshot().to_bytes().unwrap()).unwrap();
        let restored = GameTurnState::from_snapshot(snapshot, Arc::clone(original.catalog())).unwrap();

        for (n, lane) in restored.lanes().iter().enumerate() {
            for player in PlayerId::ALL {
                assert!(lane.roster(player).iter().all(|c| c.lane == n));
            }
        }
        assert_eq!(restored.character_ids(PlayerId::new(0)).len(), 1);
    }

    #[test]
    fn test_restore_rejects_wrong_lane_count() {
        let mut snapshot = started(1).snapshot();
        snapshot.lanes.pop();

        let err = GameTurnState::from_snapshot(snapshot, Arc::new(CardCatalog::standard())).unwrap_err();
        assert!(matches!(err, SnapshotError::LaneCount { found: 2 }));
    }

    #[test]
    fn test_restore_rejects_owner_mismatch() {
        let mut snapshot = started(1).snapshot();
        let c = &mut snapshot.lanes[1].characters[PlayerId::new(0)][0];
        c.owner = PlayerId::new(1);

        let err = GameTurnState::from_snapshot(snapshot, Arc::new(CardCatalog::standard())).unwrap_err();
        assert!(matches!(err, SnapshotError::OwnerMismatch { lane: 1, listed: 0, owner: 1, .. }));
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let err = GameSnapshot::from_bytes(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, SnapshotError::Encode(_)));
    }
}
