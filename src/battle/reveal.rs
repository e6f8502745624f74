//! On-reveal resolution.
//!
//! Characters placed this turn reveal together, one phase at a time across
//! the whole batch:
//!
//! 1. very early: played-here buffs, the lane's played-here reward, Shield
//! 2. early: silences
//! 3. regular: shackles, pumps, healing, mana, draws, summons
//! 4. late: effects that should see the settled board (mass damage, bonus
//!    attacks, stealing, forced fights and moves)
//!
//! Phases 2 and 3 only run for characters that are still new. Once phase 4
//! completes the character is marked and never reveals again.

use log::debug;

use super::combat::FightOptions;
use super::events::{EventData, EventKind};
use super::reward::RewardEffect;
use super::state::{GameTurnState, Location};
use crate::cards::catalog::{CABBAGE, DESNA};
use crate::cards::{AbilityKind, Element};
use crate::core::EntityId;

/// Regular-phase effects in resolution order.
const REGULAR_REVEALS: [AbilityKind; 22] = [
    AbilityKind::OnRevealShackle,
    AbilityKind::OnRevealShackleSeveral,
    AbilityKind::OnRevealShackleAllEnemies,
    AbilityKind::OnRevealPumpFriends,
    AbilityKind::OnRevealPumpAttackers,
    AbilityKind::OnRevealGainMana,
    AbilityKind::HealFriendlyCharacterAndTower,
    AbilityKind::OnRevealHealAllFriendliesAndTowers,
    AbilityKind::OnRevealLaneFightsFirst,
    AbilityKind::OnRevealFriendliesSwitchLanes,
    AbilityKind::OnRevealDrawCards,
    AbilityKind::OnRevealDamageSelf,
    // Fires from friends already in the lane, not from the revealing character.
    AbilityKind::ShackleOnFriendlyEarth,
    AbilityKind::OnRevealPumpFriendlyCharactersOfElement,
    AbilityKind::OnRevealFillEnemyLaneWithCabbages,
    AbilityKind::OnRevealSummonDesna,
    AbilityKind::OnRevealHealAndPumpSelf,
    AbilityKind::OnRevealDiscard,
    AbilityKind::OnRevealDiscardHandAndPump,
    AbilityKind::OnRevealShieldFriendlies,
    AbilityKind::OnRevealPumpCardsInHand,
    AbilityKind::OnRevealPumpFriendliesIfFullMatchingLane,
];

const LATE_REVEALS: [AbilityKind; 8] = [
    AbilityKind::OnRevealDiscardRandomCardAndDealDamageEqualToCost,
    AbilityKind::OnRevealDamageToAll,
    AbilityKind::OnRevealBonusAttack,
    AbilityKind::OnRevealFriendliesMakeBonusAttack,
    AbilityKind::OnRevealAllAttackersMakeBonusAttack,
    AbilityKind::OnRevealStealEnemy,
    AbilityKind::OnRevealEnemiesFight,
    AbilityKind::OnRevealEnemiesSwitchLanes,
];

impl GameTurnState {
    /// Run all four reveal phases over a batch of characters.
    pub fn reveal_batch(&mut self, ids: &[EntityId]) {
        for &id in ids {
            self.reveal_very_early(id);
        }
        for &id in ids {
            self.reveal_early(id);
        }
        for &id in ids {
            self.reveal_regular(id);
        }
        for &id in ids {
            self.reveal_late(id);
        }
    }

    /// Reveal a single character on its own, e.g. a freshly summoned token.
    pub fn reveal_all(&mut self, id: EntityId) {
        self.reveal_batch(&[id]);
    }

    /// Where `id` stands, if it still has a reveal to run.
    fn awaiting_reveal(&self, id: EntityId, new_only: bool) -> Option<Location> {
        let c = self.character(id)?;
        if c.did_on_reveal || (new_only && !c.is_new) {
            return None;
        }
        self.locate(id)
    }

    fn reveal_very_early(&mut self, id: EntityId) {
        let Some(at) = self.awaiting_reveal(id, false) else {
            return;
        };
        let Some(c) = self.character(id) else {
            return;
        };
        let lane = &self.lanes[at.lane];

        let (mut attack, mut health) = (0, 0);
        for friend in lane.roster(at.owner).iter().filter(|f| f.id != id) {
            if let Some((a, h)) = friend.active_pump(AbilityKind::PumpCharactersPlayedHere) {
                attack += a;
                health += h;
            }
            let kind = AbilityKind::PumpFriendlyCharactersOfElementPlayedHere;
            if friend.has_ability(kind) && c.has_element(friend.element_of(kind)) {
                let (a, h) = friend.ability(kind).pump_amounts();
                attack += a;
                health += h;
            }
        }
        if let Some(&RewardEffect::PumpAllCharactersPlayedHere { attack: a, health: h }) = lane.reward_effect() {
            attack += a;
            health += h;
        }
        let shield = c.has_ability(AbilityKind::Shield);

        self.pump_character(id, attack, health);
        if shield {
            self.gain_shield(id);
        }
        if let Some(c) = self.character_mut(id) {
            c.current_attack = c.current_attack.max(0);
        }
    }

    fn reveal_early(&mut self, id: EntityId) {
        let Some(at) = self.awaiting_reveal(id, true) else {
            return;
        };
        let enemy = at.owner.opponent();

        if self.has(id, AbilityKind::OnRevealSilenceRandomEnemy) {
            if let Some(target) = self.random_character(at.lane, enemy, |c| c.silenced) {
                self.silence(target, id);
            }
        }

        if self.has(id, AbilityKind::OnRevealSilenceAllCharacters) {
            let Some(at) = self.locate(id) else {
                return;
            };
            let lane = &self.lanes[at.lane];
            let others: Vec<EntityId> = lane
                .ids(enemy)
                .into_iter()
                .chain(lane.ids(at.owner))
                .filter(|&other| other != id)
                .collect();
            for other in others {
                self.apply_silence(other, id, false);
            }
            self.emit_reveal(id);
        }
    }

    fn reveal_regular(&mut self, id: EntityId) {
        if self.awaiting_reveal(id, true).is_none() {
            return;
        }
        for kind in REGULAR_REVEALS {
            let Some(at) = self.locate(id) else {
                return;
            };
            if kind == AbilityKind::ShackleOnFriendlyEarth {
                self.earth_played_here(id, at);
            } else if self.has(id, kind) {
                debug!("{} reveals {}", id, kind);
                self.regular_reveal(id, at, kind);
            }
        }
    }

    fn regular_reveal(&mut self, id: EntityId, at: Location, kind: AbilityKind) {
        let Some(c) = self.character(id) else {
            return;
        };
        let ability = c.ability(kind).clone();
        let owner = at.owner;
        let enemy = owner.opponent();
        let cap = self.config.max_characters_per_lane;

        match kind {
            AbilityKind::OnRevealShackle => {
                if let Some(target) = self.random_character(at.lane, enemy, |c| c.shackled_turns > 0) {
                    self.shackle(target, id);
                }
            }
            AbilityKind::OnRevealShackleSeveral => {
                for _ in 0..ability.number() {
                    if let Some(target) = self.random_character(at.lane, enemy, |c| c.shackled_turns > 0) {
                        self.shackle(target, id);
                    }
                }
            }
            AbilityKind::OnRevealShackleAllEnemies => {
                for target in self.lanes[at.lane].ids(enemy) {
                    if self.character(target).is_some_and(|c| c.shackled_turns == 0) {
                        self.apply_shackle(target, id, false);
                    }
                }
                self.emit_reveal(id);
            }
            AbilityKind::OnRevealPumpFriends => {
                let (attack, health) = ability.pump_amounts();
                for friend in self.lanes[at.lane].ids(owner) {
                    if friend != id {
                        self.pump_character(friend, attack, health);
                    }
                }
                self.emit_reveal(id);
            }
            AbilityKind::OnRevealPumpAttackers => {
                let (attack, health) = ability.pump_amounts();
                for friend in self.lanes[at.lane].ids(owner) {
                    if friend != id && self.is_attacker(friend) {
                        self.pump_character(friend, attack, health);
                    }
                }
                self.emit_reveal(id);
            }
            AbilityKind::OnRevealGainMana => {
                self.mana[owner] += ability.number();
                debug!("{} gained {} mana", owner, ability.number());
            }
            AbilityKind::HealFriendlyCharacterAndTower => {
                if let Some(friend) = self.random_character(at.lane, owner, |c| c.id == id || !c.is_damaged()) {
                    self.fully_heal(friend);
                    self.emit_heal(id, friend);
                }
                let damage = &mut self.lanes[at.lane].damage[enemy];
                *damage = (*damage - ability.number()).max(0);
            }
            AbilityKind::OnRevealHealAllFriendliesAndTowers => {
                for friend in self.character_ids(owner) {
                    self.fully_heal(friend);
                }
                for lane in &mut self.lanes {
                    lane.damage[enemy] = (lane.damage[enemy] - ability.number()).max(0);
                }
                self.emit_reveal(id);
            }
            AbilityKind::OnRevealLaneFightsFirst => {
                self.lanes[at.lane].additional_combat_priority -= self.config.lane_fights_first_priority;
            }
            AbilityKind::OnRevealFriendliesSwitchLanes => {
                self.emit_reveal(id);
                for friend in self.lanes[at.lane].ids(owner) {
                    self.switch_lanes(friend, None, false);
                }
            }
            AbilityKind::OnRevealDrawCards => {
                for _ in 0..ability.number() {
                    self.draw_random_card(owner);
                }
            }
            AbilityKind::OnRevealDamageSelf => {
                if let Some(c) = self.character_mut(id) {
                    c.current_health -= ability.number();
                }
                self.emit_reveal(id);
            }
            AbilityKind::OnRevealPumpFriendlyCharactersOfElement => {
                let element = ability.element();
                let (attack, health) = ability.pump_amounts();
                for friend in self.lanes[at.lane].ids(owner) {
                    if friend != id && self.character(friend).is_some_and(|c| c.has_element(element)) {
                        self.pump_character(friend, attack, health);
                    }
                }
                self.emit_reveal(id);
            }
            AbilityKind::OnRevealFillEnemyLaneWithCabbages => {
                while self.lanes[at.lane].characters[enemy].len() < cap {
                    let Some(cabbage) = self.spawn(CABBAGE, at.lane, enemy) else {
                        break;
                    };
                    self.reveal_all(cabbage);
                }
            }
            AbilityKind::OnRevealSummonDesna => {
                if self.lanes[at.lane].characters[owner].len() < cap {
                    self.emit_reveal(id);
                    if let Some(desna) = self.spawn(DESNA, at.lane, owner) {
                        self.reveal_all(desna);
                    }
                }
            }
            AbilityKind::OnRevealHealAndPumpSelf => {
                if let Some(friend) = self.random_character(at.lane, owner, |c| c.id == id || !c.is_damaged()) {
                    let healed = self.character(friend).map_or(0, |c| c.max_health - c.current_health);
                    self.fully_heal(friend);
                    self.pump_character(id, healed, healed);
                    self.emit_heal(id, friend);
                }
            }
            AbilityKind::OnRevealDiscard => {
                let hand: Vec<EntityId> = self.hands[owner].iter().map(|c| c.id).collect();
                if let Some(&card) = self.rng.choose(&hand) {
                    self.discard_card(owner, card);
                }
            }
            AbilityKind::OnRevealDiscardHandAndPump => {
                let discarded = self.hands[owner].len() as i32;
                self.discard_all(owner);
                let (attack, health) = ability.pump_amounts();
                self.pump_character(id, discarded * attack, discarded * health);
                self.emit_reveal(id);
            }
            AbilityKind::OnRevealShieldFriendlies => {
                for friend in self.lanes[at.lane].ids(owner) {
                    if friend != id {
                        self.gain_shield(friend);
                    }
                }
                self.emit_reveal(id);
            }
            AbilityKind::OnRevealPumpCardsInHand => {
                let (attack, health) = ability.pump_amounts();
                for card in self.hands[owner].iter_mut() {
                    card.attack_bonus += attack;
                    card.health_bonus += health;
                }
                self.emit_reveal(id);
            }
            AbilityKind::OnRevealPumpFriendliesIfFullMatchingLane => {
                let roster = self.lanes[at.lane].roster(owner);
                let full_of_one_element = roster.len() >= cap
                    && Element::BASIC
                        .into_iter()
                        .any(|element| roster.iter().all(|c| c.has_element(element)));
                if full_of_one_element {
                    let (attack, health) = ability.pump_amounts();
                    for friend in self.lanes[at.lane].ids(owner) {
                        self.pump_character(friend, attack, health);
                    }
                    self.emit_reveal(id);
                }
            }
            _ => {}
        }
    }

    /// Friends holding ShackleOnFriendlyEarth react to an Earth character
    /// being revealed next to them.
    fn earth_played_here(&mut self, id: EntityId, at: Location) {
        if !self.character(id).is_some_and(|c| c.has_element(Element::Earth)) {
            return;
        }
        for friend in self.lanes[at.lane].ids(at.owner) {
            if friend == id || !self.has(friend, AbilityKind::ShackleOnFriendlyEarth) {
                continue;
            }
            if let Some(target) = self.random_character(at.lane, at.owner.opponent(), |c| c.shackled_turns > 0) {
                self.shackle(target, friend);
            }
        }
    }

    fn emit_heal(&mut self, healer: EntityId, healed: EntityId) {
        if let (Some(from), Some(to)) = (self.locate(healer), self.locate(healed)) {
            self.emit(
                EventKind::CharacterHeal,
                EventData::targeted(from.lane, from.owner, Some(from.index), Some(to.index)),
            );
        }
    }

    fn reveal_late(&mut self, id: EntityId) {
        if self.awaiting_reveal(id, false).is_none() {
            return;
        }
        for kind in LATE_REVEALS {
            let Some(at) = self.locate(id) else {
                return;
            };
            if self.has(id, kind) {
                debug!("{} reveals {}", id, kind);
                self.late_reveal(id, at, kind);
            }
        }
        if let Some(c) = self.character_mut(id) {
            c.did_on_reveal = true;
        }
    }

    fn late_reveal(&mut self, id: EntityId, at: Location, kind: AbilityKind) {
        let owner = at.owner;
        let enemy = owner.opponent();

        match kind {
            AbilityKind::OnRevealDiscardRandomCardAndDealDamageEqualToCost => {
                let hand: Vec<(EntityId, i32)> = self.hands[owner].iter().map(|c| (c.id, c.template.cost)).collect();
                let Some(&(card, cost)) = self.rng.choose(&hand) else {
                    return;
                };
                self.discard_card(owner, card);
                if let Some(target) = self.random_character(at.lane, enemy, |_| false) {
                    self.sustain_damage(target, cost, false);
                    if let (Some(from), Some(to)) = (self.locate(id), self.locate(target)) {
                        self.emit(
                            EventKind::CharacterAttack,
                            EventData::targeted(from.lane, owner, Some(from.index), Some(to.index)),
                        );
                    }
                    self.process_dying(at.lane);
                }
            }
            AbilityKind::OnRevealDamageToAll => {
                let damage = self.character(id).map_or(0, |c| c.number_of(kind));
                let lane = &self.lanes[at.lane];
                let targets: Vec<EntityId> = lane.ids(owner).into_iter().chain(lane.ids(enemy)).collect();
                for target in targets {
                    self.sustain_damage(target, damage, false);
                }
                self.emit_reveal(id);
                self.process_dying(at.lane);
            }
            AbilityKind::OnRevealBonusAttack => {
                let times = self.character(id).map_or(0, |c| c.number_of(kind));
                for _ in 0..times {
                    self.bonus_attack(id, false);
                }
                self.process_dying(at.lane);
            }
            AbilityKind::OnRevealFriendliesMakeBonusAttack => {
                self.emit_reveal(id);
                for friend in self.lanes[at.lane].ids(owner) {
                    if friend != id {
                        self.bonus_attack(friend, false);
                    }
                }
                self.process_dying(at.lane);
            }
            AbilityKind::OnRevealAllAttackersMakeBonusAttack => {
                let attackers: Vec<EntityId> = self
                    .character_ids(owner)
                    .into_iter()
                    .filter(|&c| self.is_attacker(c))
                    .collect();
                for attacker in attackers {
                    self.bonus_attack(attacker, false);
                }
            }
            AbilityKind::OnRevealStealEnemy => {
                if self.lanes[at.lane].characters[owner].len() >= self.config.max_characters_per_lane {
                    return;
                }
                self.emit_reveal(id);
                let Some(target) = self.random_character(at.lane, enemy, |_| false) else {
                    return;
                };
                let lane = &mut self.lanes[at.lane];
                let Some(from) = lane.characters[enemy].iter().position(|c| c.id == target) else {
                    return;
                };
                let mut stolen = lane.characters[enemy].remove(from);
                stolen.owner = owner;
                lane.characters[owner].push(stolen);
                let to = lane.characters[owner].len() - 1;
                debug!("{} stole {}", owner, target);
                self.emit(EventKind::SwitchSides, EventData::targeted(at.lane, enemy, Some(from), Some(to)));
            }
            AbilityKind::OnRevealEnemiesFight => {
                if self.lanes[at.lane].characters[enemy].len() < 2 {
                    return;
                }
                self.emit_reveal(id);
                let Some(first) = self.random_character(at.lane, enemy, |_| false) else {
                    return;
                };
                if let Some(second) = self.random_character(at.lane, enemy, |c| c.id == first) {
                    self.fight(
                        first,
                        second,
                        FightOptions {
                            friendly: true,
                            ..FightOptions::default()
                        },
                    );
                }
            }
            AbilityKind::OnRevealEnemiesSwitchLanes => {
                self.emit_reveal(id);
                for target in self.lanes[at.lane].ids(enemy) {
                    self.switch_lanes(target, None, false);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::{BattleBuilder, LaneReward};
    use crate::cards::{Ability, CardCatalog, CardTemplate};
    use crate::core::PlayerId;
    use std::sync::Arc;

    fn catalog() -> Arc<CardCatalog> {
        let mut catalog = CardCatalog::standard();
        catalog.register(CardTemplate::new("Grunt", 1, 2, 3));
        catalog.register(CardTemplate::new("Banner", 1, 0, 2).with(Ability::pump(AbilityKind::PumpCharactersPlayedHere, 1, 0)));
        catalog.register(CardTemplate::new("Jailer", 1, 1, 2).with_ability(AbilityKind::OnRevealShackle));
        catalog.register(CardTemplate::new("Banker", 1, 1, 1).with(Ability::numbered(AbilityKind::OnRevealGainMana, 2)));
        catalog.register(CardTemplate::new("Vanguard", 1, 1, 1).with_ability(AbilityKind::OnRevealLaneFightsFirst));
        catalog.register(CardTemplate::new("Farmer", 1, 1, 1).with_ability(AbilityKind::OnRevealFillEnemyLaneWithCabbages));
        catalog.register(CardTemplate::new("Thief", 1, 1, 1).with_ability(AbilityKind::OnRevealStealEnemy));
        catalog.register(CardTemplate::new("Hushed", 1, 3, 3).with_ability(AbilityKind::OnRevealSilenceAllCharacters));
        Arc::new(catalog)
    }

    fn state() -> GameTurnState {
        BattleBuilder::new().catalog(catalog()).capture_snapshots(false).build(5)
    }

    #[test]
    fn test_played_here_buffs_and_lane_reward() {
        let mut s = BattleBuilder::new()
            .catalog(catalog())
            .lane_reward(0, LaneReward::named("Western Air Temple"))
            .build(5);
        let p0 = PlayerId::new(0);
        let banner = s.play_card_from_template(p0, "Banner", 0).unwrap();
        s.character_mut(banner).unwrap().did_on_reveal = true;
        let grunt = s.play_card_from_template(p0, "Grunt", 0).unwrap();

        s.reveal_all(grunt);

        let c = s.character(grunt).unwrap();
        assert_eq!((c.current_attack, c.current_health, c.max_health), (4, 4, 4));
        assert!(c.did_on_reveal);
    }

    #[test]
    fn test_reveal_shackles_enemy() {
        let mut s = state();
        let [p0, p1] = PlayerId::ALL;
        let jailer = s.play_card_from_template(p0, "Jailer", 1).unwrap();
        let grunt = s.play_card_from_template(p1, "Grunt", 1).unwrap();

        s.reveal_all(jailer);

        assert_eq!(s.character(grunt).unwrap().shackled_turns, 1);
    }

    #[test]
    fn test_reveal_runs_once() {
        let mut s = state();
        let p0 = PlayerId::new(0);
        let banker = s.play_card_from_template(p0, "Banker", 2).unwrap();

        s.reveal_all(banker);
        s.reveal_all(banker);

        assert_eq!(s.mana(p0), 2);
    }

    #[test]
    fn test_not_new_characters_skip_regular_phase() {
        let mut s = state();
        let p0 = PlayerId::new(0);
        let banker = s.play_card_from_template(p0, "Banker", 2).unwrap();
        s.character_mut(banker).unwrap().is_new = false;

        s.reveal_all(banker);

        assert_eq!(s.mana(p0), 0);
        assert!(s.character(banker).unwrap().did_on_reveal);
    }

    #[test]
    fn test_lane_fights_first() {
        let mut s = state();
        let vanguard = s.play_card_from_template(PlayerId::new(1), "Vanguard", 2).unwrap();

        s.reveal_all(vanguard);

        assert_eq!(s.lanes[2].additional_combat_priority, -3);
        assert_eq!(s.lanes[2].combat_order_key(), -1);
    }

    #[test]
    fn test_cabbages_fill_enemy_side() {
        let mut s = state();
        let [p0, p1] = PlayerId::ALL;
        s.play_card_from_template(p1, "Grunt", 0).unwrap();
        let farmer = s.play_card_from_template(p0, "Farmer", 0).unwrap();

        s.reveal_all(farmer);

        let enemies = s.lanes[0].roster(p1);
        assert_eq!(enemies.len(), 4);
        assert_eq!(enemies.iter().filter(|c| c.name() == CABBAGE).count(), 3);
        assert!(enemies[1..].iter().all(|c| c.did_on_reveal));
    }

    #[test]
    fn test_steal_enemy_changes_owner() {
        let mut s = state();
        let [p0, p1] = PlayerId::ALL;
        let grunt = s.play_card_from_template(p1, "Grunt", 1).unwrap();
        let thief = s.play_card_from_template(p0, "Thief", 1).unwrap();

        s.reveal_all(thief);

        let at = s.locate(grunt).unwrap();
        assert_eq!(at.owner, p0);
        assert_eq!(s.character(grunt).unwrap().owner, p0);
        assert!(s.lanes[1].roster(p1).is_empty());
    }

    #[test]
    fn test_silence_all_spares_the_silencer() {
        let mut s = state();
        let [p0, p1] = PlayerId::ALL;
        let friend = s.play_card_from_template(p0, "Jailer", 0).unwrap();
        let enemy = s.play_card_from_template(p1, "Banker", 0).unwrap();
        let hushed = s.play_card_from_template(p0, "Hushed", 0).unwrap();

        s.reveal_batch(&[hushed, friend, enemy]);

        assert!(s.character(friend).unwrap().silenced);
        assert!(s.character(enemy).unwrap().silenced);
        assert!(!s.character(hushed).unwrap().silenced);
        // Silenced before the regular phase, so neither reveal fired.
        assert_eq!(s.mana(p1), 0);
        assert_eq!(s.character(enemy).unwrap().shackled_turns, 0);
    }
}
