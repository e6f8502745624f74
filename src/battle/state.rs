//! Game turn state: the whole board plus hands, piles, and mana.
//!
//! `GameTurnState` owns every character through its lanes and orchestrates
//! the per-turn phase sequence:
//!
//! 1. turn counter advances, both players' mana is set to the turn number
//! 2. every lane runs start-of-turn (flag resets, on-reveal phases)
//! 3. lanes fight in order of `lane number + additional combat priority`,
//!    each lane's characters aging (no longer new, shackles tick down) right
//!    after its own combat
//! 4. every lane runs end-of-turn
//! 5. each player draws a card and per-turn player flags reset
//! 6. on the final turn the winner is decided
//!
//! Invalid input (unknown card, full lane, bad lane number) is ignored and
//! logged at `debug`, never returned as an error: an opponent's staged
//! moves must not be disturbed by a bad request.

use std::sync::Arc;

use log::{debug, info};

use super::character::Character;
use super::events::{BattleEvent, EventData, EventKind, EventLog};
use super::lane::Lane;
use super::reward::LaneReward;
use crate::cards::{AbilityKind, Card, CardCatalog, Deck};
use crate::core::{BattleConfig, EntityId, GameRng, IdAllocator, PlayerId, PlayerMap, LANE_COUNT};

/// Where a character currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Location {
    pub lane: usize,
    pub owner: PlayerId,
    pub index: usize,
}

/// Full mutable state of one battle.
#[derive(Clone, Debug)]
pub struct GameTurnState {
    pub(crate) config: BattleConfig,
    pub(crate) catalog: Arc<CardCatalog>,
    pub(crate) rng: GameRng,
    pub(crate) ids: IdAllocator,
    pub(crate) turn: u32,
    pub(crate) lanes: [Lane; LANE_COUNT],
    pub(crate) hands: PlayerMap<im::Vector<Card>>,
    pub(crate) draw_piles: PlayerMap<im::Vector<Card>>,
    pub(crate) mana: PlayerMap<i32>,
    pub(crate) has_moved: PlayerMap<bool>,
    pub(crate) has_mulliganed: PlayerMap<bool>,
    pub(crate) done_with_animations: PlayerMap<bool>,
    pub(crate) winner: Option<PlayerId>,
    pub(crate) events: EventLog,
}

/// Builder for a fresh battle.
///
/// ```
/// use lane_battle::battle::BattleBuilder;
/// use lane_battle::cards::Deck;
/// use lane_battle::core::PlayerId;
///
/// let deck = Deck::new("basic", ["Sokka", "Suki", "Momo", "Zuko"]);
/// let state = BattleBuilder::new()
///     .deck(PlayerId::new(0), deck.clone())
///     .deck(PlayerId::new(1), deck)
///     .lane_rewards(["Fire Nation", "Omashu", "Full Moon Bay"])
///     .build(42);
///
/// assert_eq!(state.turn(), 0);
/// assert_eq!(state.hand(PlayerId::new(0)).len(), 3);
/// assert_eq!(state.draw_pile(PlayerId::new(0)).len(), 1);
/// ```
pub struct BattleBuilder {
    decks: PlayerMap<Deck>,
    rewards: [Option<LaneReward>; LANE_COUNT],
    random_rewards: bool,
    config: BattleConfig,
    catalog: Option<Arc<CardCatalog>>,
    capture_snapshots: bool,
}

impl Default for BattleBuilder {
    fn default() -> Self {
        Self {
            decks: PlayerMap::default(),
            rewards: [None, None, None],
            random_rewards: false,
            config: BattleConfig::default(),
            catalog: None,
            capture_snapshots: true,
        }
    }
}

impl BattleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deck(mut self, player: PlayerId, deck: Deck) -> Self {
        self.decks[player] = deck;
        self
    }

    /// Set one lane's reward. `None` leaves the lane without a reward.
    pub fn lane_reward(mut self, lane: usize, reward: Option<LaneReward>) -> Self {
        assert!(lane < LANE_COUNT, "Lane must be 0-2");
        self.rewards[lane] = reward;
        self.random_rewards = false;
        self
    }

    /// Set all three rewards by catalog name. Unknown names leave the lane
    /// without a reward.
    pub fn lane_rewards(mut self, names: [&str; LANE_COUNT]) -> Self {
        for (lane, name) in names.into_iter().enumerate() {
            let reward = LaneReward::named(name);
            if reward.is_none() {
                log::warn!("unknown lane reward {:?} for lane {}", name, lane);
            }
            self.rewards[lane] = reward;
        }
        self.random_rewards = false;
        self
    }

    /// Draw three distinct rewards from the catalog at build time.
    pub fn random_lane_rewards(mut self) -> Self {
        self.random_rewards = true;
        self
    }

    pub fn config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catalog(mut self, catalog: Arc<CardCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Attach a board snapshot to every event (on by default).
    pub fn capture_snapshots(mut self, capture: bool) -> Self {
        self.capture_snapshots = capture;
        self
    }

    /// Build the state at turn 0 with opening hands dealt.
    pub fn build(self, seed: u64) -> GameTurnState {
        let catalog = self.catalog.unwrap_or_else(|| Arc::new(CardCatalog::standard()));
        let mut rng = GameRng::new(seed);
        let mut ids = IdAllocator::default();

        let mut rewards = self.rewards;
        if self.random_rewards {
            let mut all = LaneReward::catalog();
            rng.shuffle(&mut all);
            for (slot, reward) in rewards.iter_mut().zip(all) {
                *slot = Some(reward);
            }
        }
        let lanes = std::array::from_fn(|n| Lane::new(n, rewards[n].take()));

        let mut hands = PlayerMap::default();
        let mut draw_piles = PlayerMap::default();
        for player in PlayerId::ALL {
            let mut cards = self.decks[player].to_cards(&catalog, &mut ids);
            rng.shuffle(&mut cards);
            let mut pile: im::Vector<Card> = cards.into_iter().collect();
            let hand = pile.slice(..self.config.initial_hand_size.min(pile.len()));
            hands[player] = hand;
            draw_piles[player] = pile;
        }

        let mut events = EventLog::default();
        events.set_capture_snapshots(self.capture_snapshots);

        GameTurnState {
            config: self.config,
            catalog,
            rng,
            ids,
            turn: 0,
            lanes,
            hands,
            draw_piles,
            mana: PlayerMap::with_value(0),
            has_moved: PlayerMap::with_value(false),
            has_mulliganed: PlayerMap::with_value(false),
            done_with_animations: PlayerMap::with_value(false),
            winner: None,
            events,
        }
    }
}

// Accessors
impl GameTurnState {
    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    #[must_use]
    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<CardCatalog> {
        &self.catalog
    }

    #[must_use]
    pub fn lanes(&self) -> &[Lane; LANE_COUNT] {
        &self.lanes
    }

    #[must_use]
    pub fn lane(&self, lane: usize) -> Option<&Lane> {
        self.lanes.get(lane)
    }

    /// Direct lane access for playout code and test setup.
    pub fn lane_mut(&mut self, lane: usize) -> Option<&mut Lane> {
        self.lanes.get_mut(lane)
    }

    #[must_use]
    pub fn hand(&self, player: PlayerId) -> &im::Vector<Card> {
        &self.hands[player]
    }

    #[must_use]
    pub fn draw_pile(&self, player: PlayerId) -> &im::Vector<Card> {
        &self.draw_piles[player]
    }

    #[must_use]
    pub fn mana(&self, player: PlayerId) -> i32 {
        self.mana[player]
    }

    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    /// True once the final turn has been rolled.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.turn >= self.config.final_turn
    }

    #[must_use]
    pub fn has_moved(&self, player: PlayerId) -> bool {
        self.has_moved[player]
    }

    pub fn set_has_moved(&mut self, player: PlayerId) {
        self.has_moved[player] = true;
    }

    #[must_use]
    pub fn all_players_have_moved(&self) -> bool {
        PlayerId::ALL.iter().all(|&p| self.has_moved[p])
    }

    #[must_use]
    pub fn has_mulliganed(&self, player: PlayerId) -> bool {
        self.has_mulliganed[player]
    }

    #[must_use]
    pub fn done_with_animations(&self, player: PlayerId) -> bool {
        self.done_with_animations[player]
    }

    pub fn set_done_with_animations(&mut self, player: PlayerId) {
        self.done_with_animations[player] = true;
    }

    /// Events recorded since the last roll began.
    #[must_use]
    pub fn events(&self) -> &[BattleEvent] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<BattleEvent> {
        self.events.take()
    }

    /// Find a character anywhere on the board.
    #[must_use]
    pub fn locate(&self, id: EntityId) -> Option<Location> {
        self.lanes.iter().find_map(|lane| {
            lane.find(id).map(|(owner, index)| Location {
                lane: lane.number,
                owner,
                index,
            })
        })
    }

    #[must_use]
    pub fn character(&self, id: EntityId) -> Option<&Character> {
        let at = self.locate(id)?;
        Some(&self.lanes[at.lane].characters[at.owner][at.index])
    }

    pub fn character_mut(&mut self, id: EntityId) -> Option<&mut Character> {
        let at = self.locate(id)?;
        Some(&mut self.lanes[at.lane].characters[at.owner][at.index])
    }

    /// Still on the board (possibly at zero health awaiting the death pass).
    #[must_use]
    pub fn exists(&self, id: EntityId) -> bool {
        self.locate(id).is_some()
    }

    /// Every character owned by `player`, lane 0 first.
    #[must_use]
    pub fn character_ids(&self, player: PlayerId) -> Vec<EntityId> {
        self.lanes.iter().flat_map(|lane| lane.ids(player)).collect()
    }
}

// Shared helpers for the rules modules
impl GameTurnState {
    pub(crate) fn has(&self, id: EntityId, kind: AbilityKind) -> bool {
        self.character(id).is_some_and(|c| c.has_ability(kind))
    }

    pub(crate) fn pump_character(&mut self, id: EntityId, attack: i32, health: i32) {
        if let Some(c) = self.character_mut(id) {
            c.pump(attack, health);
        }
    }

    /// Attacker capability, printed or granted by the lane.
    #[must_use]
    pub fn is_attacker(&self, id: EntityId) -> bool {
        let Some(c) = self.character(id) else {
            return false;
        };
        c.has_ability(AbilityKind::Attacker) || self.lanes[c.lane].grants_attacker()
    }

    pub(crate) fn emit(&mut self, kind: EventKind, data: EventData) {
        if !self.events.is_recording() {
            return;
        }
        let snapshot = self.events.captures_snapshots().then(|| Box::new(self.snapshot()));
        self.events.push(BattleEvent { kind, data, snapshot });
    }

    /// Highlight a character whose ability just resolved.
    pub(crate) fn emit_reveal(&mut self, id: EntityId) {
        if let Some(at) = self.locate(id) {
            self.emit(EventKind::OnReveal, EventData::actor(at.lane, at.owner, Some(at.index)));
        }
    }

    /// Pick one of the two other lanes, weighted by free slots for `player`.
    pub(crate) fn random_other_lane_with_room(&mut self, not_lane: usize, player: PlayerId) -> Option<usize> {
        let cap = self.config.max_characters_per_lane;
        let candidates: Vec<usize> = (0..LANE_COUNT).filter(|&n| n != not_lane).collect();
        let weights: Vec<usize> = candidates
            .iter()
            .map(|&n| cap.saturating_sub(self.lanes[n].characters[player].len()))
            .collect();
        self.rng.choose_weighted(&weights).map(|i| candidates[i])
    }

    /// Any lane where `player` still has room, chosen uniformly.
    pub fn random_lane_with_room(&mut self, player: PlayerId) -> Option<usize> {
        let cap = self.config.max_characters_per_lane;
        let open: Vec<usize> = (0..LANE_COUNT)
            .filter(|&n| self.lanes[n].characters[player].len() < cap)
            .collect();
        self.rng.choose(&open).copied()
    }

    /// A random living character of `player` in `lane` not rejected by `exclude`.
    pub(crate) fn random_character(
        &mut self,
        lane: usize,
        player: PlayerId,
        exclude: impl Fn(&Character) -> bool,
    ) -> Option<EntityId> {
        let candidates: Vec<EntityId> = self.lanes[lane].characters[player]
            .iter()
            .filter(|c| c.can_fight() && !exclude(c))
            .map(|c| c.id)
            .collect();
        self.rng.choose(&candidates).copied()
    }

    /// Put a new character from a catalog template into a lane. Does not run
    /// its reveal. `None` if the template is unknown or the lane is full.
    pub(crate) fn spawn(&mut self, template: &str, lane: usize, owner: PlayerId) -> Option<EntityId> {
        let Some(template) = self.catalog.get(template) else {
            debug!("cannot spawn unknown template {:?}", template);
            return None;
        };
        if self.lanes[lane].characters[owner].len() >= self.config.max_characters_per_lane {
            return None;
        }
        let id = self.ids.allocate();
        debug!("{} spawns {} in lane {}", owner, template.name, lane);
        self.lanes[lane].characters[owner].push(Character::new(id, template, owner, lane));
        Some(id)
    }
}

// Player operations
impl GameTurnState {
    /// Move a card from hand onto a lane as a new character.
    ///
    /// Silently ignored if the lane number is invalid, the lane already
    /// holds the maximum for this player, or the card is not in hand.
    pub fn play_card(&mut self, player: PlayerId, card_id: EntityId, lane: usize) -> Option<EntityId> {
        if lane >= LANE_COUNT {
            debug!("{} tried to play into lane {}", player, lane);
            return None;
        }
        if self.lanes[lane].characters[player].len() >= self.config.max_characters_per_lane {
            debug!("{} tried to play into full lane {}", player, lane);
            return None;
        }
        let Some(position) = self.hands[player].iter().position(|c| c.id == card_id) else {
            debug!("{} tried to play {} which is not in hand", player, card_id);
            return None;
        };
        let card = self.hands[player].remove(position);
        debug!("{} played {} in lane {}", player, card.template.name, lane);
        self.lanes[lane].characters[player].push(Character::from_card(card, player, lane));
        Some(card_id)
    }

    /// Place a character straight from the catalog, bypassing the hand.
    /// Used by simulated playouts.
    pub fn play_card_from_template(&mut self, player: PlayerId, template: &str, lane: usize) -> Option<EntityId> {
        if lane >= LANE_COUNT {
            return None;
        }
        self.spawn(template, lane, player)
    }

    /// Put a card from hand at the bottom of the pile and draw.
    pub fn mulligan_card(&mut self, player: PlayerId, card_id: EntityId) {
        let Some(position) = self.hands[player].iter().position(|c| c.id == card_id) else {
            debug!("{} tried to mulligan {} which is not in hand", player, card_id);
            return;
        };
        let card = self.hands[player].remove(position);
        self.draw_piles[player].push_back(card);
        self.draw_card(player);
    }

    /// Mulligan the whole hand, once per turn.
    pub fn mulligan_all(&mut self, player: PlayerId) {
        if self.has_mulliganed[player] {
            return;
        }
        self.has_mulliganed[player] = true;
        let cards: Vec<EntityId> = self.hands[player].iter().map(|c| c.id).collect();
        for card_id in cards {
            self.mulligan_card(player, card_id);
        }
    }

    /// Mulligan a chosen set of cards in random order, once per turn.
    pub fn mulligan_cards(&mut self, player: PlayerId, card_ids: &[EntityId]) {
        if self.has_mulliganed[player] {
            return;
        }
        let mut cards = card_ids.to_vec();
        self.rng.shuffle(&mut cards);
        for card_id in cards {
            self.mulligan_card(player, card_id);
        }
        self.has_mulliganed[player] = true;
    }

    /// Draw the top card of the pile. No-op with a full hand or empty pile.
    pub fn draw_card(&mut self, player: PlayerId) {
        if self.hands[player].len() >= self.config.max_hand_size {
            debug!("{} has a full hand", player);
            return;
        }
        let Some(card) = self.draw_piles[player].pop_front() else {
            debug!("{} has no cards left in their deck", player);
            return;
        };
        self.hands[player].push_back(card);
        self.run_draw_triggers(player);
    }

    /// Add a random pool card to hand. No-op with a full hand.
    pub fn draw_random_card(&mut self, player: PlayerId) {
        if self.hands[player].len() >= self.config.max_hand_size {
            debug!("{} has a full hand", player);
            return;
        }
        let Some(template) = self.rng.choose(self.catalog.pool()).cloned() else {
            return;
        };
        let card = Card::new(self.ids.allocate(), template);
        self.hands[player].push_back(card);
        self.run_draw_triggers(player);
    }

    /// Remove a card from hand. Returns whether anything was discarded.
    pub fn discard_card(&mut self, player: PlayerId, card_id: EntityId) -> bool {
        let Some(position) = self.hands[player].iter().position(|c| c.id == card_id) else {
            return false;
        };
        self.hands[player].remove(position);
        self.run_discard_triggers(player);
        true
    }

    pub fn discard_all(&mut self, player: PlayerId) {
        let cards: Vec<EntityId> = self.hands[player].iter().map(|c| c.id).collect();
        for card_id in cards {
            self.discard_card(player, card_id);
        }
    }

    fn run_draw_triggers(&mut self, player: PlayerId) {
        self.pump_all_with(player, AbilityKind::OnDrawCardPump);
    }

    fn run_discard_triggers(&mut self, player: PlayerId) {
        self.pump_all_with(player, AbilityKind::OnDiscardPump);
    }

    fn pump_all_with(&mut self, player: PlayerId, kind: AbilityKind) {
        for lane in &mut self.lanes {
            for c in lane.characters[player].iter_mut() {
                if let Some((attack, health)) = c.active_pump(kind) {
                    c.pump(attack, health);
                }
            }
        }
    }
}

// Turn state machine
impl GameTurnState {
    /// First roll of the game, followed by each lane's start-of-game rules.
    pub fn start_game(&mut self) {
        self.roll_turn();
        for lane in 0..LANE_COUNT {
            self.lane_start_of_game(lane);
        }
    }

    /// Advance one full turn.
    pub fn roll_turn(&mut self) {
        if self.is_over() {
            debug!("roll_turn called after the final turn");
            return;
        }

        self.turn += 1;
        info!("rolling turn {}", self.turn);
        self.events.clear();
        self.emit(EventKind::StartOfRoll, EventData::default());

        for player in PlayerId::ALL {
            self.mana[player] = self.turn as i32;
        }

        for lane in 0..LANE_COUNT {
            self.lane_start_of_turn(lane);
        }

        let mut order: Vec<usize> = (0..LANE_COUNT).collect();
        order.sort_by_key(|&n| self.lanes[n].combat_order_key());
        for lane in order {
            self.resolve_combat(lane);
            self.lanes[lane].age_characters();
        }

        for lane in 0..LANE_COUNT {
            self.lane_end_of_turn(lane);
        }
        for lane in 0..LANE_COUNT {
            self.process_dying(lane);
        }

        self.emit(EventKind::EndOfRoll, EventData::default());

        for player in PlayerId::ALL {
            self.draw_card(player);
        }
        self.has_moved = PlayerMap::with_value(false);
        self.has_mulliganed = PlayerMap::with_value(false);
        self.done_with_animations = PlayerMap::with_value(false);

        if self.turn == self.config.final_turn {
            self.winner = self.compute_winner();
            match self.winner {
                Some(player) => info!("{} won the game", player),
                None => info!("game ended in a tie"),
            }
        }
    }

    /// Lanes won decide; ties fall back to total tower damage.
    #[must_use]
    pub fn compute_winner(&self) -> Option<PlayerId> {
        let mut lanes_won = PlayerMap::with_value(0u32);
        for lane in &self.lanes {
            if let Some(player) = lane.winner() {
                lanes_won[player] += 1;
            }
        }
        let [p0, p1] = PlayerId::ALL;
        if lanes_won[p0] != lanes_won[p1] {
            return Some(if lanes_won[p0] > lanes_won[p1] { p0 } else { p1 });
        }

        let total = |player: PlayerId| -> i32 { self.lanes.iter().map(|l| l.damage[player]).sum() };
        match total(p0).cmp(&total(p1)) {
            std::cmp::Ordering::Greater => Some(p0),
            std::cmp::Ordering::Less => Some(p1),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Estimated chance that `player` wins from the current tower damage.
    ///
    /// Each lane is scored with a logistic curve on the damage difference
    /// and the game is won by taking at least two lanes.
    #[must_use]
    pub fn win_probability(&self, player: PlayerId) -> f64 {
        const CHARACTERISTIC_TOWER_HEALTH: f64 = 20.0;

        let p: Vec<f64> = self
            .lanes
            .iter()
            .map(|lane| {
                let diff = f64::from(lane.damage[PlayerId::new(0)] - lane.damage[PlayerId::new(1)]);
                1.0 / (1.0 + (-diff / CHARACTERISTIC_TOWER_HEALTH).exp())
            })
            .collect();

        let first_wins = p[0] * p[1] * (1.0 - p[2])
            + p[0] * (1.0 - p[1]) * p[2]
            + (1.0 - p[0]) * p[1] * p[2]
            + p[0] * p[1] * p[2];

        if player == PlayerId::new(0) {
            first_wins
        } else {
            1.0 - first_wins
        }
    }

    /// Independent copy for search-based players.
    ///
    /// The copy gets a forked RNG and records no events.
    pub fn clone_state(&mut self) -> Self {
        let events = std::mem::take(&mut self.events);
        let mut copy = self.clone();
        self.events = events;
        copy.rng = self.rng.fork();
        copy.events = EventLog::disabled();
        copy
    }
}
