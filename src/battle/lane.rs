//! Lanes and the lane-level phases.
//!
//! A `Lane` is plain data: both rosters, both towers' accumulated damage,
//! the lane's reward and who has earned it. The lane phases (combat,
//! death processing, start and end of turn, reward grants) need the whole
//! board and are implemented on `GameTurnState`, addressed by lane number.
//!
//! ## Combat
//!
//! Combat runs twice per turn: a first-strike pass limited to early
//! fighters, then the main pass. In each pass the side with more eligible
//! characters swings first (ties are random), then sides alternate. A side
//! that cannot attack is marked done; once both are done the pass ends.
//! Every single attack is followed by a death pass over the lane.

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::character::Character;
use super::events::{EventData, EventKind};
use super::reward::{LaneReward, RewardEffect};
use super::state::GameTurnState;
use crate::cards::AbilityKind;
use crate::core::{EntityId, PlayerId, PlayerMap, LANE_COUNT};

/// One player's characters in a lane, in play order.
pub type Roster = SmallVec<[Character; 4]>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lane {
    pub number: usize,
    /// Damage each player has dealt to the opposing tower here.
    pub damage: PlayerMap<i32>,
    pub characters: PlayerMap<Roster>,
    /// Added to the lane number when ordering combat. Reset every turn.
    pub additional_combat_priority: i32,
    pub reward: Option<LaneReward>,
    pub earned_reward: PlayerMap<bool>,
}

impl Lane {
    #[must_use]
    pub fn new(number: usize, reward: Option<LaneReward>) -> Self {
        Self {
            number,
            damage: PlayerMap::with_value(0),
            characters: PlayerMap::new(|_| Roster::new()),
            additional_combat_priority: 0,
            reward,
            earned_reward: PlayerMap::with_value(false),
        }
    }

    #[must_use]
    pub fn roster(&self, player: PlayerId) -> &[Character] {
        &self.characters[player]
    }

    /// Owner and roster index of a character in this lane.
    #[must_use]
    pub fn find(&self, id: EntityId) -> Option<(PlayerId, usize)> {
        PlayerId::ALL.into_iter().find_map(|player| {
            self.characters[player]
                .iter()
                .position(|c| c.id == id)
                .map(|index| (player, index))
        })
    }

    #[must_use]
    pub fn ids(&self, player: PlayerId) -> Vec<EntityId> {
        self.characters[player].iter().map(|c| c.id).collect()
    }

    /// Ids of characters with positive health.
    #[must_use]
    pub fn living_ids(&self, player: PlayerId) -> Vec<EntityId> {
        self.characters[player]
            .iter()
            .filter(|c| c.can_fight())
            .map(|c| c.id)
            .collect()
    }

    /// Player 0's characters then player 1's.
    #[must_use]
    pub fn all_ids(&self) -> Vec<EntityId> {
        PlayerId::ALL.into_iter().flat_map(|p| self.ids(p)).collect()
    }

    /// Summed strength of a lane aura on one side.
    #[must_use]
    pub fn aura(&self, player: PlayerId, kind: AbilityKind) -> i32 {
        self.characters[player].iter().map(|c| c.aura_contribution(kind)).sum()
    }

    #[must_use]
    pub fn reward_effect(&self) -> Option<&RewardEffect> {
        self.reward.as_ref().map(|r| &r.effect)
    }

    /// Every character here counts as an Attacker.
    #[must_use]
    pub fn grants_attacker(&self) -> bool {
        matches!(self.reward_effect(), Some(RewardEffect::CharactersHereFightAsAttackers))
    }

    /// The player who has dealt more damage here, if any.
    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        let [p0, p1] = PlayerId::ALL;
        match self.damage[p0].cmp(&self.damage[p1]) {
            std::cmp::Ordering::Greater => Some(p0),
            std::cmp::Ordering::Less => Some(p1),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Lanes fight in ascending order of this key.
    #[must_use]
    pub fn combat_order_key(&self) -> i32 {
        self.number as i32 + self.additional_combat_priority
    }

    /// End-of-combat bookkeeping: nobody is new any more and shackles tick.
    pub(crate) fn age_characters(&mut self) {
        for player in PlayerId::ALL {
            for c in self.characters[player].iter_mut() {
                c.is_new = false;
                c.shackled_turns = c.shackled_turns.saturating_sub(1);
            }
        }
    }
}

// Combat
impl GameTurnState {
    /// Run both combat passes in a lane.
    pub fn resolve_combat(&mut self, lane: usize) {
        self.combat_pass(lane, true);
        self.combat_pass(lane, false);
    }

    fn combat_pass(&mut self, lane: usize, early_only: bool) {
        let eligible = |c: &Character| !early_only || c.has_ability(AbilityKind::EarlyFighter);
        let [p0, p1] = PlayerId::ALL;
        let count = |p: PlayerId| self.lanes[lane].characters[p].iter().filter(|c| eligible(c)).count();

        let mut side = match count(p0).cmp(&count(p1)) {
            std::cmp::Ordering::Greater => p0,
            std::cmp::Ordering::Less => p1,
            std::cmp::Ordering::Equal => {
                if self.rng.coin_flip() {
                    p1
                } else {
                    p0
                }
            }
        };

        let mut done = PlayerMap::with_value(false);
        for _ in 0..self.config.combat_step_limit {
            self.single_attack(lane, side, early_only, &mut done);
            if !done[side.opponent()] {
                side = side.opponent();
            } else if done[side] {
                return;
            }
        }
        warn!(
            "combat in lane {} hit the step limit of {}",
            lane, self.config.combat_step_limit
        );
    }

    /// One attack by the first ready character of `player`, late fighters last.
    fn single_attack(&mut self, lane: usize, player: PlayerId, early_only: bool, done: &mut PlayerMap<bool>) {
        let ready = |c: &&Character| c.can_attack() && (!early_only || c.has_ability(AbilityKind::EarlyFighter));
        let roster = &self.lanes[lane].characters[player];
        let attacker = roster
            .iter()
            .filter(ready)
            .find(|c| !c.has_ability(AbilityKind::LateFighter))
            .or_else(|| roster.iter().find(ready))
            .map(|c| c.id);

        match attacker {
            Some(id) => {
                trace!("{} attacks in lane {}", id, lane);
                self.attack(id, Default::default());
            }
            None => done[player] = true,
        }
        self.process_dying(lane);
    }
}

// Death processing
impl GameTurnState {
    /// Remove every character at zero health or below, unless rescued.
    ///
    /// A dying character is first offered to rescuers in the other two lanes
    /// (random order), then to its own once-per-turn escape. Anything not
    /// saved is removed.
    pub fn process_dying(&mut self, lane: usize) {
        let dying: Vec<EntityId> = PlayerId::ALL
            .into_iter()
            .flat_map(|p| self.lanes[lane].characters[p].iter())
            .filter(|c| !c.can_fight())
            .map(|c| c.id)
            .collect();

        let mut dead = Vec::new();
        for id in dying {
            let Some(c) = self.character(id) else {
                continue;
            };
            if c.can_fight() || c.lane != lane {
                continue;
            }
            let owner = c.owner;
            let can_escape = c.has_ability(AbilityKind::SwitchLanesInsteadOfDying) && !c.escaped_death;
            let death_move = c.active_number(AbilityKind::DeathMoveCharactersHereAndPumpThem);

            if self.try_rescue(id, lane, owner) {
                debug!("{} was rescued from lane {}", id, lane);
                continue;
            }
            if can_escape && self.switch_lanes(id, None, true) {
                debug!("{} escaped death", id);
                if let Some(c) = self.character_mut(id) {
                    c.escaped_death = true;
                }
                continue;
            }

            debug!("{} died in lane {}", id, lane);
            if let Some(&RewardEffect::OwnerGainsManaWhenCharacterDiesHere { amount }) = self.lanes[lane].reward_effect() {
                self.mana[owner] += amount;
            }
            dead.push((owner, death_move));
        }

        for player in PlayerId::ALL {
            self.lanes[lane].characters[player].retain(|c| c.can_fight());
        }

        for (owner, death_move) in dead {
            if let Some(amount) = death_move {
                self.pull_friendlies_into(lane, owner, amount);
            }
        }
    }

    fn try_rescue(&mut self, id: EntityId, lane: usize, owner: PlayerId) -> bool {
        let mut others: Vec<usize> = (0..LANE_COUNT).filter(|&n| n != lane).collect();
        self.rng.shuffle(&mut others);
        for other in others {
            let has_rescuer = self.lanes[other].characters[owner]
                .iter()
                .any(|c| c.can_fight() && c.has_ability(AbilityKind::OnFriendlyCharacterDeathHealFullyAndSwitchLanes));
            if has_rescuer && self.switch_lanes(id, Some(other), true) {
                return true;
            }
        }
        false
    }

    /// Move friendlies from other lanes here while there is room, pumping each.
    fn pull_friendlies_into(&mut self, lane: usize, owner: PlayerId, amount: i32) {
        let mut movers: Vec<EntityId> = (0..LANE_COUNT)
            .filter(|&n| n != lane)
            .flat_map(|n| self.lanes[n].living_ids(owner))
            .collect();
        self.rng.shuffle(&mut movers);

        for id in movers {
            if self.lanes[lane].characters[owner].len() >= self.config.max_characters_per_lane {
                break;
            }
            if self.switch_lanes(id, Some(lane), false) {
                self.pump_character(id, amount, amount);
            }
        }
    }
}

// Turn boundaries
impl GameTurnState {
    pub(crate) fn lane_start_of_turn(&mut self, lane: usize) {
        for player in PlayerId::ALL {
            for c in self.lanes[lane].characters[player].iter_mut() {
                c.escaped_death = false;
                c.did_end_of_turn = false;
            }
        }

        for id in self.lanes[lane].all_ids() {
            if self.has(id, AbilityKind::StartOfTurnFullHeal) {
                self.fully_heal(id);
            }
        }

        let mut revealing: Vec<EntityId> = PlayerId::ALL
            .into_iter()
            .flat_map(|p| self.lanes[lane].characters[p].iter())
            .filter(|c| !c.did_on_reveal)
            .map(|c| c.id)
            .collect();
        self.rng.shuffle(&mut revealing);
        self.reveal_batch(&revealing);

        self.process_dying(lane);
    }

    pub(crate) fn lane_end_of_turn(&mut self, lane: usize) {
        for id in self.lanes[lane].all_ids() {
            self.character_end_of_turn(id);
        }

        let animate = self.turn > 1;
        match self.lanes[lane].reward_effect().cloned() {
            Some(RewardEffect::HealAllCharactersHereAtEndOfTurn) => {
                for id in self.lanes[lane].all_ids() {
                    self.fully_heal(id);
                }
                if animate {
                    self.emit(EventKind::LaneAnimation, EventData::lane(lane));
                }
            }
            Some(RewardEffect::DealDamageToAllCharactersHereAtEndOfTurn { damage }) => {
                for id in self.lanes[lane].all_ids() {
                    self.sustain_damage(id, damage, false);
                }
                if animate {
                    self.emit(EventKind::LaneAnimation, EventData::lane(lane));
                }
                self.process_dying(lane);
            }
            Some(RewardEffect::FirstCharacterSwitchesLanesAtEndOfTurn) => {
                for player in PlayerId::ALL {
                    if let Some(first) = self.lanes[lane].characters[player].first().map(|c| c.id) {
                        self.switch_lanes(first, None, false);
                    }
                }
            }
            _ => {}
        }

        self.lanes[lane].additional_combat_priority = 0;
    }

    fn character_end_of_turn(&mut self, id: EntityId) {
        let Some(c) = self.character(id) else {
            return;
        };
        if c.did_end_of_turn {
            return;
        }
        let owner = c.owner;

        if self.has(id, AbilityKind::EndOfTurnFullHeal) {
            self.fully_heal(id);
            self.emit_reveal(id);
        }
        if self.has(id, AbilityKind::EndOfTurnFullHealForAllFriendlies) {
            if let Some(at) = self.locate(id) {
                for friend in self.lanes[at.lane].ids(owner) {
                    if friend != id {
                        self.fully_heal(friend);
                    }
                }
            }
            self.emit_reveal(id);
        }
        if self.has(id, AbilityKind::SwitchLanesAtEndOfTurn) {
            self.switch_lanes(id, None, false);
        }

        if let Some(c) = self.character_mut(id) {
            c.has_attacked = false;
            c.did_end_of_turn = true;
        }
    }

    /// Start-of-game spawns, then a start and end of turn for the lane.
    pub(crate) fn lane_start_of_game(&mut self, lane: usize) {
        if let Some(RewardEffect::SpawnAtStart { template, count }) = self.lanes[lane].reward_effect().cloned() {
            for player in PlayerId::ALL {
                for _ in 0..count {
                    self.spawn(&template, lane, player);
                }
            }
        }
        self.lane_start_of_turn(lane);
        self.lane_end_of_turn(lane);
    }
}

// Rewards
impl GameTurnState {
    /// Grant the lane's milestone reward if `player` has just reached it.
    pub(crate) fn maybe_grant_reward(&mut self, lane: usize, player: PlayerId) {
        let l = &self.lanes[lane];
        let Some(reward) = &l.reward else {
            return;
        };
        let Some(threshold) = reward.threshold else {
            return;
        };
        if l.earned_reward[player] || l.damage[player] < threshold {
            return;
        }

        let effect = reward.effect.clone();
        debug!("{} earned {} in lane {}", player, reward.name, lane);
        self.lanes[lane].earned_reward[player] = true;

        let animate_first = matches!(
            effect,
            RewardEffect::BonusAttackAllFriendlies
                | RewardEffect::PlayAllCardsInHandForFree
                | RewardEffect::HealAllFriendlies
                | RewardEffect::FriendlyCharactersInThisLaneSwitchLanes
        );
        if animate_first {
            self.emit(EventKind::LaneAnimation, EventData::lane(lane));
        }
        self.grant_reward(lane, player, &effect);
        if !animate_first {
            self.emit(EventKind::LaneAnimation, EventData::lane(lane));
        }
    }

    fn grant_reward(&mut self, lane: usize, player: PlayerId, effect: &RewardEffect) {
        match effect {
            RewardEffect::PumpAllFriendlies { attack, health } => {
                for id in self.character_ids(player) {
                    self.pump_character(id, *attack, *health);
                }
            }
            RewardEffect::Spawn { template } => {
                if let Some(to) = self.random_other_lane_with_room(lane, player) {
                    if let Some(id) = self.spawn(template, to, player) {
                        self.reveal_all(id);
                    }
                }
            }
            RewardEffect::DrawRandomCards { count } => {
                for _ in 0..*count {
                    self.draw_random_card(player);
                }
            }
            RewardEffect::BonusAttackAllFriendlies => {
                for id in self.character_ids(player) {
                    self.bonus_attack(id, false);
                }
            }
            RewardEffect::DiscardHand => self.discard_all(player),
            RewardEffect::GainMana { amount } => self.mana[player] += amount,
            RewardEffect::PlayAllCardsInHandForFree => {
                let cards: Vec<EntityId> = self.hands[player].iter().map(|c| c.id).collect();
                for card in cards {
                    let Some(to) = self.random_other_lane_with_room(lane, player) else {
                        break;
                    };
                    if let Some(id) = self.play_card(player, card, to) {
                        self.reveal_all(id);
                    }
                }
            }
            RewardEffect::PumpRandomCharacterInAnotherLane { attack, health } => {
                let candidates: Vec<EntityId> = (0..LANE_COUNT)
                    .filter(|&n| n != lane)
                    .flat_map(|n| self.lanes[n].ids(player))
                    .collect();
                if let Some(&id) = self.rng.choose(&candidates) {
                    self.pump_character(id, *attack, *health);
                }
            }
            RewardEffect::HealAllFriendlies => {
                for id in self.character_ids(player) {
                    self.fully_heal(id);
                }
            }
            RewardEffect::FriendlyCharactersInThisLaneSwitchLanes => {
                for id in self.lanes[lane].ids(player) {
                    self.switch_lanes(id, None, false);
                }
            }
            // Passive effects are read by the phases they modify.
            RewardEffect::SpawnAtStart { .. }
            | RewardEffect::HealAllCharactersHereAtEndOfTurn
            | RewardEffect::DealDamageToAllCharactersHereAtEndOfTurn { .. }
            | RewardEffect::FirstCharacterSwitchesLanesAtEndOfTurn
            | RewardEffect::CharactersHereFightAsAttackers
            | RewardEffect::PumpAllCharactersPlayedHere { .. }
            | RewardEffect::OwnerGainsManaWhenCharacterDiesHere { .. }
            | RewardEffect::ShacklesHereLastExtraTurn => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::BattleBuilder;
    use crate::cards::{Ability, CardCatalog, CardTemplate};
    use std::sync::Arc;

    fn catalog() -> Arc<CardCatalog> {
        let mut catalog = CardCatalog::standard();
        catalog.register(CardTemplate::new("Dummy", 1, 2, 3));
        catalog.register(CardTemplate::new("Early", 1, 1, 1).with_ability(AbilityKind::EarlyFighter));
        catalog.register(CardTemplate::new("Escape", 1, 1, 1).with_ability(AbilityKind::SwitchLanesInsteadOfDying));
        catalog.register(CardTemplate::new("Rescuer", 1, 0, 5).with_ability(AbilityKind::OnFriendlyCharacterDeathHealFullyAndSwitchLanes));
        catalog.register(
            CardTemplate::new("Martyr", 1, 1, 1).with(Ability::numbered(AbilityKind::DeathMoveCharactersHereAndPumpThem, 2)),
        );
        Arc::new(catalog)
    }

    fn state() -> GameTurnState {
        BattleBuilder::new().catalog(catalog()).build(11)
    }

    #[test]
    fn test_lane_winner() {
        let mut lane = Lane::new(0, None);
        assert_eq!(lane.winner(), None);
        lane.damage[PlayerId::new(1)] = 3;
        assert_eq!(lane.winner(), Some(PlayerId::new(1)));
    }

    #[test]
    fn test_combat_order_key() {
        let mut lane = Lane::new(2, None);
        lane.additional_combat_priority = -3;
        assert_eq!(lane.combat_order_key(), -1);
    }

    #[test]
    fn test_unopposed_character_hits_tower() {
        let mut s = state();
        let p0 = PlayerId::new(0);
        s.play_card_from_template(p0, "Dummy", 1).unwrap();

        s.resolve_combat(1);

        assert_eq!(s.lanes[1].damage[p0], 2);
        assert_eq!(s.lanes[1].damage[p0.opponent()], 0);
    }

    #[test]
    fn test_first_strike_pass_runs_before_main_pass() {
        let mut s = state();
        let [p0, p1] = PlayerId::ALL;
        let early = s.play_card_from_template(p0, "Early", 0).unwrap();
        let dummy = s.play_card_from_template(p1, "Dummy", 0).unwrap();

        s.resolve_combat(0);

        // The early fighter strikes and dies to the counterattack before the
        // dummy gets a main-pass swing at anything.
        assert!(!s.exists(early));
        assert_eq!(s.character(dummy).unwrap().current_health, 2);
        assert!(s.character(dummy).unwrap().has_attacked);
        assert_eq!(s.lanes[0].damage[p1], 2);
    }

    #[test]
    fn test_escape_once_per_turn() {
        let mut s = state();
        let p0 = PlayerId::new(0);
        let id = s.play_card_from_template(p0, "Escape", 0).unwrap();

        s.character_mut(id).unwrap().current_health = 0;
        s.process_dying(0);
        let at = s.locate(id).unwrap();
        assert_ne!(at.lane, 0);
        assert_eq!(s.character(id).unwrap().current_health, 1);
        assert!(s.character(id).unwrap().escaped_death);

        s.character_mut(id).unwrap().current_health = 0;
        s.process_dying(at.lane);
        assert!(!s.exists(id));
    }

    #[test]
    fn test_rescuer_in_other_lane_saves_friendly() {
        let mut s = state();
        let p0 = PlayerId::new(0);
        s.play_card_from_template(p0, "Rescuer", 2).unwrap();
        let id = s.play_card_from_template(p0, "Dummy", 0).unwrap();

        s.character_mut(id).unwrap().current_health = -4;
        s.process_dying(0);

        let at = s.locate(id).unwrap();
        assert_eq!(at.lane, 2);
        assert_eq!(s.character(id).unwrap().current_health, 3);
    }

    #[test]
    fn test_death_pulls_friendlies_and_pumps_them() {
        let mut s = state();
        let p0 = PlayerId::new(0);
        let martyr = s.play_card_from_template(p0, "Martyr", 0).unwrap();
        let friend = s.play_card_from_template(p0, "Dummy", 1).unwrap();

        s.character_mut(martyr).unwrap().current_health = 0;
        s.process_dying(0);

        assert!(!s.exists(martyr));
        assert_eq!(s.locate(friend).unwrap().lane, 0);
        let c = s.character(friend).unwrap();
        assert_eq!((c.current_attack, c.current_health), (4, 5));
    }

    #[test]
    fn test_crescent_island_gives_mana_on_death() {
        let mut s = BattleBuilder::new()
            .catalog(catalog())
            .lane_reward(1, LaneReward::named("Crescent Island"))
            .build(3);
        let p1 = PlayerId::new(1);
        let id = s.play_card_from_template(p1, "Dummy", 1).unwrap();

        s.character_mut(id).unwrap().current_health = 0;
        s.process_dying(1);

        assert_eq!(s.mana(p1), 1);
    }

    #[test]
    fn test_milestone_reward_fires_once() {
        let mut s = BattleBuilder::new()
            .catalog(catalog())
            .lane_reward(0, LaneReward::named("Omashu"))
            .build(5);
        let p0 = PlayerId::new(0);

        s.lanes[0].damage[p0] = 10;
        s.maybe_grant_reward(0, p0);
        assert_eq!(s.mana(p0), 3);
        assert!(s.lanes[0].earned_reward[p0]);

        s.lanes[0].damage[p0] = 20;
        s.maybe_grant_reward(0, p0);
        assert_eq!(s.mana(p0), 3);
    }

    #[test]
    fn test_ba_sing_se_spawns_recruits_at_start() {
        let mut s = BattleBuilder::new()
            .catalog(catalog())
            .lane_reward(2, LaneReward::named("Ba Sing Se"))
            .build(9);

        s.lane_start_of_game(2);

        for player in PlayerId::ALL {
            assert_eq!(s.lanes[2].characters[player].len(), 2);
            assert!(s.lanes[2].characters[player].iter().all(|c| c.did_on_reveal));
        }
    }
}
