//! Attacks, fights, damage, and the triggers they set off.
//!
//! ## Targeting
//!
//! A living enemy Defender always blocks: the attacker fights a random one.
//! Without a Defender the attacker fights a random living enemy, or hits
//! the tower when the enemy side is empty. An Attacker that is not blocked
//! hits the tower as well as fighting; one blocked by a Defender only hits
//! the tower too when it has Twinstrike.
//!
//! ## Damage
//!
//! `(base + losing bonus + shield bonus) * multiplier`, where the base is
//! current attack (or current health under the matching ability or aura)
//! and every doubling source multiplies by two.
//!
//! Fights are simultaneous: both strikes are computed from the pre-fight
//! board and applied with survive triggers held back until after the death
//! pass.

use log::{debug, trace};

use super::events::{EventData, EventKind};
use super::reward::RewardEffect;
use super::state::GameTurnState;
use crate::cards::catalog::{NYLA, SPIRIT};
use crate::cards::AbilityKind;
use crate::core::{EntityId, PlayerId, LANE_COUNT};

/// How an attack was started.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttackOptions {
    /// Bonus attacks leave `has_attacked` untouched.
    pub bonus: bool,
    /// Tower hits during this attack do not grant further bonus attacks.
    pub suppress_bonus_triggers: bool,
}

/// How a fight between two characters was started.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FightOptions {
    /// Both characters are on the same side.
    pub friendly: bool,
    /// The attacker also hits the tower after the exchange.
    pub hit_tower: bool,
    pub suppress_bonus_triggers: bool,
}

/// What one side of a fight does to the other.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strike {
    Nothing,
    Damage(i32),
    /// Sets health to zero regardless of shields.
    Lethal,
}

impl Strike {
    #[must_use]
    pub fn lands(self) -> bool {
        match self {
            Strike::Nothing => false,
            Strike::Damage(n) => n > 0,
            Strike::Lethal => true,
        }
    }
}

const HIT_TOWER_TRIGGERS: [AbilityKind; 10] = [
    AbilityKind::OnTowerAttackDealMassDamage,
    AbilityKind::OnTowerAttackDrawCard,
    AbilityKind::OnDamageTowerPumpTeam,
    AbilityKind::OnTowerDamageGainMana,
    AbilityKind::HitTowerPumpSelf,
    AbilityKind::HitTowerDamageAllCharacters,
    AbilityKind::HitTowerOtherCharactersSwitchLanes,
    AbilityKind::HitTowerGiveShield,
    AbilityKind::HitTowerShackle,
    AbilityKind::HitTowerDamageAllEnemiesEqualToDamage,
];

const KILL_TRIGGERS: [AbilityKind; 4] = [
    AbilityKind::KillEnemySummonNyla,
    AbilityKind::OnKillBuffHealth,
    AbilityKind::KillEnemyAttackAgain,
    AbilityKind::KillEnemyGainShield,
];

const SURVIVE_TRIGGERS: [AbilityKind; 5] = [
    AbilityKind::OnSurviveDamagePump,
    AbilityKind::OnSurviveDrawCard,
    AbilityKind::OnSurviveGainMana,
    AbilityKind::SurviveSwitchLanes,
    AbilityKind::SurvivePumpFriendlyAttackers,
];

// Attacks and fights
impl GameTurnState {
    /// Make one attack with a character, choosing its target.
    pub fn attack(&mut self, id: EntityId, options: AttackOptions) {
        let Some(at) = self.locate(id) else {
            return;
        };
        if !options.bonus {
            if let Some(c) = self.character_mut(id) {
                c.has_attacked = true;
            }
        }

        let enemies = &self.lanes[at.lane].characters[at.owner.opponent()];
        let defenders: Vec<EntityId> = enemies
            .iter()
            .filter(|c| c.can_fight() && c.is_defender())
            .map(|c| c.id)
            .collect();
        let living: Vec<EntityId> = enemies.iter().filter(|c| c.can_fight()).map(|c| c.id).collect();
        let is_attacker = self.is_attacker(id);

        let fight = FightOptions {
            suppress_bonus_triggers: options.suppress_bonus_triggers,
            ..FightOptions::default()
        };
        if let Some(&target) = self.rng.choose(&defenders) {
            let twinstrike = is_attacker && self.has(id, AbilityKind::Twinstrike);
            self.fight(id, target, FightOptions { hit_tower: twinstrike, ..fight });
        } else if let Some(&target) = self.rng.choose(&living) {
            self.fight(id, target, FightOptions { hit_tower: is_attacker, ..fight });
        } else {
            self.deal_tower_damage(id, options.suppress_bonus_triggers);
        }

        if self.has(id, AbilityKind::SwitchLanesAfterAttacking) {
            self.switch_lanes(id, None, false);
        }
        if self.has(id, AbilityKind::OnAttackDoubleAttack) {
            if let Some(c) = self.character_mut(id) {
                c.current_attack = c.current_attack.saturating_mul(2);
            }
        }
    }

    /// An extra attack that does not use up the character's turn.
    pub fn bonus_attack(&mut self, id: EntityId, suppress_bonus_triggers: bool) {
        if !self.character(id).is_some_and(|c| c.can_fight()) {
            return;
        }
        self.attack(
            id,
            AttackOptions {
                bonus: true,
                suppress_bonus_triggers,
            },
        );
    }

    /// Two characters trade strikes simultaneously.
    pub fn fight(&mut self, attacker: EntityId, defender: EntityId, options: FightOptions) {
        let (Some(from), Some(to)) = (self.locate(attacker), self.locate(defender)) else {
            return;
        };
        let lane = from.lane;

        let strike = self.strike(attacker, defender);
        let counter = if self.takes_no_counter_damage(attacker) {
            Strike::Nothing
        } else {
            self.strike(defender, attacker)
        };
        trace!("{} vs {}: {:?} / {:?}", attacker, defender, strike, counter);

        self.apply_strike(defender, strike);
        self.apply_strike(attacker, counter);

        let kind = if options.friendly {
            EventKind::FriendlyAttack
        } else {
            EventKind::CharacterAttack
        };
        self.emit(kind, EventData::targeted(lane, from.owner, Some(from.index), Some(to.index)));

        if options.hit_tower {
            self.deal_tower_damage(attacker, options.suppress_bonus_triggers);
        }

        self.process_dying(lane);

        if strike.lands() && self.has(attacker, AbilityKind::OnDamageCharacterSilenceIt) {
            self.apply_silence(defender, attacker, false);
        }
        if counter.lands() && self.has(defender, AbilityKind::OnDamageCharacterSilenceIt) {
            self.apply_silence(attacker, defender, false);
        }
        if counter.lands() && self.is_alive(attacker) {
            self.survive_triggers(attacker);
        }
        if strike.lands() && self.is_alive(defender) {
            self.survive_triggers(defender);
        }
        if !self.exists(defender) {
            self.kill_triggers(attacker);
        }
        if !self.exists(attacker) {
            self.kill_triggers(defender);
        }
    }

    fn is_alive(&self, id: EntityId) -> bool {
        self.character(id).is_some_and(|c| c.can_fight())
    }

    fn takes_no_counter_damage(&self, attacker: EntityId) -> bool {
        let Some(c) = self.character(attacker) else {
            return false;
        };
        c.has_ability(AbilityKind::InvincibilityWhileAttacking)
            || (self.is_attacker(attacker)
                && self.lanes[c.lane].aura(c.owner, AbilityKind::FriendlyAttackersAreInvincibleWhileAttacking) > 0)
    }

    /// What `striker` does to `target` in a fight.
    #[must_use]
    pub fn strike(&self, striker: EntityId, target: EntityId) -> Strike {
        let (Some(s), Some(t)) = (self.character(striker), self.character(target)) else {
            return Strike::Nothing;
        };
        let lane = &self.lanes[s.lane];

        if s.shackled_turns > 0 && t.has_ability(AbilityKind::InvincibilityAgainstShackled) {
            return Strike::Nothing;
        }
        if self.is_attacker(striker)
            && PlayerId::ALL
                .into_iter()
                .any(|p| lane.aura(p, AbilityKind::AttackersDontDealDamage) > 0)
        {
            return Strike::Nothing;
        }

        let damage = self.compute_damage(striker, Some(target), false);
        let deathtouch = s.has_ability(AbilityKind::Deathtouch)
            || (t.is_defender() && s.has_ability(AbilityKind::DeathtouchAgainstDefenders));
        if deathtouch {
            return if damage > 0 { Strike::Lethal } else { Strike::Nothing };
        }
        if s.has_ability(AbilityKind::DoNotDamageEnemyCharacters) {
            return Strike::Nothing;
        }
        Strike::Damage(damage)
    }

    fn apply_strike(&mut self, target: EntityId, strike: Strike) {
        match strike {
            Strike::Nothing => {}
            Strike::Damage(n) => self.sustain_damage(target, n, true),
            Strike::Lethal => {
                if let Some(c) = self.character_mut(target) {
                    c.current_health = c.current_health.min(0);
                }
            }
        }
    }

    /// Damage `striker` would deal to `target`, or to the tower when
    /// `target` is `None` and `tower` is set.
    #[must_use]
    pub fn compute_damage(&self, striker: EntityId, target: Option<EntityId>, tower: bool) -> i32 {
        let Some(c) = self.character(striker) else {
            return 0;
        };
        let lane = &self.lanes[c.lane];
        let owner = c.owner;

        let mut multiplier: i32 = 1;
        if tower && c.has_ability(AbilityKind::DoubleTowerDamage) {
            multiplier = multiplier.saturating_mul(2);
        }
        if c.current_attack > c.current_health {
            for _ in 0..lane.aura(owner, AbilityKind::MoreStrengthMeansDoubleDamage) {
                multiplier = multiplier.saturating_mul(2);
            }
        }
        let target_shackled = target
            .and_then(|t| self.character(t))
            .is_some_and(|t| t.shackled_turns > 0);
        if target_shackled && c.has_ability(AbilityKind::DealDoubleDamageAgainstShackled) {
            multiplier = multiplier.saturating_mul(2);
        }

        let losing = if lane.damage[owner.opponent()] > lane.damage[owner] {
            c.active_number(AbilityKind::DealMoreDamageWhenLosing).unwrap_or(0)
        } else {
            0
        };
        let shield_bonus = if c.shielded {
            lane.aura(owner, AbilityKind::ShieldedCharactersDealExtraDamage)
        } else {
            0
        };
        let base = if c.has_ability(AbilityKind::DealDamageEqualToCurrentHealth)
            || lane.aura(owner, AbilityKind::FriendliesDealDamageEqualToCurrentHealth) > 0
        {
            c.current_health
        } else {
            c.current_attack
        };

        (base + losing + shield_bonus).saturating_mul(multiplier)
    }
}

// Damage and shields
impl GameTurnState {
    /// Take ordinary damage. A shield absorbs the whole hit and breaks.
    pub fn sustain_damage(&mut self, id: EntityId, damage: i32, suppress_triggers: bool) {
        if damage <= 0 {
            return;
        }
        let Some(c) = self.character_mut(id) else {
            return;
        };
        if c.shielded {
            self.break_shield(id);
            return;
        }
        c.current_health -= damage;
        let survived = c.can_fight();
        if survived && !suppress_triggers {
            self.survive_triggers(id);
        }
    }

    pub fn gain_shield(&mut self, id: EntityId) {
        let Some(at) = self.locate(id) else {
            return;
        };
        let Some(c) = self.character_mut(id) else {
            return;
        };
        if c.shielded {
            return;
        }
        c.shielded = true;
        for friend in self.lanes[at.lane].ids(at.owner) {
            if let Some((attack, health)) = self.pump_of(friend, AbilityKind::PumpOnGainShield) {
                self.pump_character(id, attack, health);
                self.emit_reveal(friend);
            }
        }
    }

    pub fn break_shield(&mut self, id: EntityId) {
        let Some(at) = self.locate(id) else {
            return;
        };
        let Some(c) = self.character_mut(id) else {
            return;
        };
        if !c.shielded {
            return;
        }
        c.shielded = false;
        self.emit(EventKind::ShieldBreak, EventData::actor(at.lane, at.owner, Some(at.index)));
        for friend in self.lanes[at.lane].ids(at.owner) {
            if let Some((attack, health)) = self.pump_of(friend, AbilityKind::OnShieldBreakPumpSelf) {
                self.pump_character(friend, attack, health);
                self.emit_reveal(friend);
            }
        }
    }

    /// Restore current health to max, firing friendly heal triggers.
    pub fn fully_heal(&mut self, id: EntityId) {
        let Some(at) = self.locate(id) else {
            return;
        };
        let Some(c) = self.character_mut(id) else {
            return;
        };
        if c.current_health >= c.max_health {
            return;
        }
        c.current_health = c.max_health;

        for friend in self.lanes[at.lane].ids(at.owner) {
            if friend == id {
                continue;
            }
            if let Some((attack, health)) = self.pump_of(friend, AbilityKind::PumpOnFriendlyHeal) {
                self.pump_character(id, attack, health);
            }
            if let Some((attack, health)) = self.pump_of(friend, AbilityKind::OnFriendlyHealPumpMyself) {
                self.pump_character(friend, attack, health);
            }
        }
    }

    pub(crate) fn pump_of(&self, id: EntityId, kind: AbilityKind) -> Option<(i32, i32)> {
        self.character(id).and_then(|c| c.active_pump(kind))
    }
}

// Tower damage
impl GameTurnState {
    /// Hit the opposing tower in the character's lane.
    pub fn deal_tower_damage(&mut self, id: EntityId, suppress_bonus_triggers: bool) {
        let Some(at) = self.locate(id) else {
            return;
        };
        let damage = self.compute_damage(id, None, true);
        self.lanes[at.lane].damage[at.owner] += damage;
        debug!("{} dealt {} tower damage in lane {}", id, damage, at.lane);
        self.emit(EventKind::TowerDamage, EventData::actor(at.lane, at.owner, Some(at.index)));

        for kind in HIT_TOWER_TRIGGERS {
            if self.has(id, kind) && self.hit_tower_trigger(id, kind, damage) {
                self.on_hit_tower_trigger(id, suppress_bonus_triggers);
            }
        }

        self.maybe_grant_reward(at.lane, at.owner);
    }

    /// Resolve one tower-hit ability. Returns whether it fired.
    fn hit_tower_trigger(&mut self, id: EntityId, kind: AbilityKind, damage: i32) -> bool {
        let Some(at) = self.locate(id) else {
            return false;
        };
        let enemy = at.owner.opponent();

        match kind {
            AbilityKind::OnTowerAttackDealMassDamage => {
                let amount = self.character(id).map_or(0, |c| c.number_of(kind));
                self.emit_reveal(id);
                for target in self.lanes[at.lane].living_ids(enemy) {
                    self.sustain_damage(target, amount, false);
                }
                true
            }
            AbilityKind::OnTowerAttackDrawCard => {
                self.draw_random_card(at.owner);
                self.emit_reveal(id);
                true
            }
            AbilityKind::OnDamageTowerPumpTeam => {
                let (attack, health) = self.pump_of(id, kind).unwrap_or_default();
                for friend in self.lanes[at.lane].ids(at.owner) {
                    if friend != id {
                        self.pump_character(friend, attack, health);
                    }
                }
                self.emit_reveal(id);
                true
            }
            AbilityKind::OnTowerDamageGainMana => {
                self.mana[at.owner] += 1;
                self.emit_reveal(id);
                true
            }
            AbilityKind::HitTowerPumpSelf => {
                let (attack, health) = self.pump_of(id, kind).unwrap_or_default();
                self.pump_character(id, attack, health);
                self.emit_reveal(id);
                true
            }
            AbilityKind::HitTowerDamageAllCharacters => {
                let amount = self.character(id).map_or(0, |c| c.number_of(kind));
                self.emit_reveal(id);
                for target in self.lanes[at.lane].all_ids() {
                    if target != id {
                        self.sustain_damage(target, amount, false);
                    }
                }
                true
            }
            AbilityKind::HitTowerOtherCharactersSwitchLanes => {
                let friends: Vec<EntityId> = self.lanes[at.lane].ids(at.owner).into_iter().filter(|&f| f != id).collect();
                for friend in &friends {
                    self.switch_lanes(*friend, None, false);
                }
                !friends.is_empty()
            }
            AbilityKind::HitTowerGiveShield => match self.random_character(at.lane, at.owner, |c| c.shielded) {
                Some(friend) => {
                    self.gain_shield(friend);
                    true
                }
                None => false,
            },
            AbilityKind::HitTowerShackle => match self.random_character(at.lane, enemy, |c| c.shackled_turns > 0) {
                Some(target) => {
                    self.shackle(target, id);
                    true
                }
                None => false,
            },
            AbilityKind::HitTowerDamageAllEnemiesEqualToDamage => {
                self.emit_reveal(id);
                for target in self.lanes[at.lane].ids(enemy) {
                    self.sustain_damage(target, damage, false);
                }
                true
            }
            _ => false,
        }
    }

    /// Friendly reactions to `id` triggering a tower-hit ability.
    fn on_hit_tower_trigger(&mut self, id: EntityId, suppress_bonus_triggers: bool) {
        let Some(at) = self.locate(id) else {
            return;
        };
        for friend in self.lanes[at.lane].ids(at.owner) {
            if let Some((attack, health)) = self.pump_of(friend, AbilityKind::OnTriggerHitTowerPump) {
                self.pump_character(id, attack, health);
                self.emit_reveal(friend);
            }
            if !suppress_bonus_triggers && self.has(friend, AbilityKind::OnTriggerHitTowerBonusAttack) {
                self.emit_reveal(friend);
                self.bonus_attack(id, true);
            }
        }
    }
}

// Kill and survive triggers
impl GameTurnState {
    fn kill_triggers(&mut self, killer: EntityId) {
        for kind in KILL_TRIGGERS {
            if !self.has(killer, kind) {
                continue;
            }
            let Some(at) = self.locate(killer) else {
                return;
            };
            match kind {
                AbilityKind::KillEnemySummonNyla => {
                    let roster = &self.lanes[at.lane].characters[at.owner];
                    let has_room = roster.len() < self.config.max_characters_per_lane;
                    if has_room && !roster.iter().any(|c| c.name() == NYLA) {
                        self.emit_reveal(killer);
                        if let Some(nyla) = self.spawn(NYLA, at.lane, at.owner) {
                            self.reveal_all(nyla);
                        }
                        self.on_kill_trigger(killer);
                    }
                }
                AbilityKind::OnKillBuffHealth => {
                    let (attack, health) = self.pump_of(killer, kind).unwrap_or_default();
                    self.pump_character(killer, attack, health);
                    self.emit_reveal(killer);
                    self.on_kill_trigger(killer);
                }
                AbilityKind::KillEnemyAttackAgain => {
                    self.on_kill_trigger(killer);
                    if let Some(at) = self.locate(killer) {
                        self.bonus_attack(killer, false);
                        self.process_dying(at.lane);
                    }
                }
                AbilityKind::KillEnemyGainShield => {
                    self.gain_shield(killer);
                    self.emit_reveal(killer);
                    self.on_kill_trigger(killer);
                }
                _ => {}
            }
        }
    }

    fn on_kill_trigger(&mut self, killer: EntityId) {
        let Some(at) = self.locate(killer) else {
            return;
        };
        for friend in self.lanes[at.lane].ids(at.owner) {
            if let Some((attack, health)) = self.pump_of(friend, AbilityKind::OnTriggerKillEnemyHealAndPumpSelf) {
                self.fully_heal(killer);
                self.pump_character(friend, attack, health);
                self.emit_reveal(friend);
            }
            if self.has(friend, AbilityKind::OnTriggerKillEnemyBonusAttack) {
                self.emit_reveal(friend);
                self.bonus_attack(friend, false);
            }
        }
    }

    pub(crate) fn survive_triggers(&mut self, id: EntityId) {
        for kind in SURVIVE_TRIGGERS {
            if !self.has(id, kind) {
                continue;
            }
            let Some(at) = self.locate(id) else {
                return;
            };
            match kind {
                AbilityKind::OnSurviveDamagePump => {
                    let (attack, health) = self.pump_of(id, kind).unwrap_or_default();
                    self.pump_character(id, attack, health);
                    self.emit_reveal(id);
                    self.on_survive_trigger(id);
                }
                AbilityKind::OnSurviveDrawCard => {
                    self.draw_random_card(at.owner);
                    self.emit_reveal(id);
                    self.on_survive_trigger(id);
                }
                AbilityKind::OnSurviveGainMana => {
                    self.mana[at.owner] += 1;
                    self.emit_reveal(id);
                    self.on_survive_trigger(id);
                }
                AbilityKind::SurviveSwitchLanes => {
                    self.on_survive_trigger(id);
                    self.switch_lanes(id, None, false);
                }
                AbilityKind::SurvivePumpFriendlyAttackers => {
                    let (attack, health) = self.pump_of(id, kind).unwrap_or_default();
                    for friend in self.lanes[at.lane].ids(at.owner) {
                        if self.is_attacker(friend) {
                            self.pump_character(friend, attack, health);
                        }
                    }
                    self.emit_reveal(id);
                    self.on_survive_trigger(id);
                }
                _ => {}
            }
        }
    }

    fn on_survive_trigger(&mut self, id: EntityId) {
        let Some(at) = self.locate(id) else {
            return;
        };
        for friend in self.lanes[at.lane].ids(at.owner) {
            if let Some((attack, health)) = self.pump_of(friend, AbilityKind::OnTriggerSurvivePumpSelf) {
                self.pump_character(friend, attack, health);
                self.emit_reveal(friend);
            }
            if let Some((attack, health)) = self.pump_of(friend, AbilityKind::OnTriggerSurvivePump) {
                self.pump_character(id, attack, health);
                self.emit_reveal(friend);
            }
        }
    }
}

// Status effects and movement
impl GameTurnState {
    /// Shackle `target` on behalf of `by`.
    ///
    /// Duration is one turn plus one per extra-turn source on the shackling
    /// side of the lane (abilities and the lane reward).
    pub fn shackle(&mut self, target: EntityId, by: EntityId) {
        self.apply_shackle(target, by, true);
    }

    pub(crate) fn apply_shackle(&mut self, target: EntityId, by: EntityId, animate: bool) {
        let Some(at) = self.locate(target) else {
            return;
        };
        let side = at.owner.opponent();
        let lane = &self.lanes[at.lane];
        let shacklers = lane.roster(side);

        let mut extra_turns = shacklers
            .iter()
            .filter(|c| c.has_ability(AbilityKind::ShacklesLastExtraTurn))
            .count() as u32;
        if matches!(lane.reward_effect(), Some(RewardEffect::ShacklesHereLastExtraTurn)) {
            extra_turns += 1;
        }
        let damage: i32 = shacklers
            .iter()
            .filter_map(|c| c.active_number(AbilityKind::ShacklesDealDamage))
            .sum();
        let draws = shacklers
            .iter()
            .filter(|c| c.has_ability(AbilityKind::OnShackleDrawCard))
            .count();

        if let Some(c) = self.character_mut(target) {
            c.shackled_turns += 1 + extra_turns;
            c.current_health -= damage;
            debug!("{} shackled for {} turns", target, c.shackled_turns);
        }
        for _ in 0..draws {
            self.draw_random_card(side);
        }
        for friend in self.lanes[at.lane].ids(side) {
            if let Some((attack, health)) = self.pump_of(friend, AbilityKind::OnShacklePumpSelf) {
                self.pump_character(friend, attack, health);
                self.emit_reveal(friend);
            }
        }

        if animate {
            let from = self.locate(by).map(|l| l.index);
            self.emit(EventKind::CharacterShackle, EventData::targeted(at.lane, side, from, Some(at.index)));
        }
        if damage > 0 {
            self.process_dying(at.lane);
        }
    }

    /// Silence `target` on behalf of `by`: abilities off, shield gone, stats
    /// back to the printed baseline (current health only ever drops).
    pub fn silence(&mut self, target: EntityId, by: EntityId) {
        self.apply_silence(target, by, true);
    }

    pub(crate) fn apply_silence(&mut self, target: EntityId, by: EntityId, animate: bool) {
        let Some(at) = self.locate(target) else {
            return;
        };
        if let Some(c) = self.character_mut(target) {
            c.silenced = true;
        }
        self.break_shield(target);
        if let Some(c) = self.character_mut(target) {
            c.current_attack = c.template.attack;
            c.current_health = c.current_health.min(c.template.health);
            c.max_health = c.template.health;
        }
        debug!("{} silenced {}", by, target);

        if animate {
            let (acting, from) = match self.locate(by) {
                Some(l) => (l.owner, Some(l.index)),
                None => (at.owner.opponent(), None),
            };
            self.emit(EventKind::CharacterSilence, EventData::targeted(at.lane, acting, from, Some(at.index)));
        }
    }

    /// Move a character to another lane. With `to` unset, a lane is picked
    /// at random weighted by free slots. Returns whether it moved.
    pub fn switch_lanes(&mut self, id: EntityId, to: Option<usize>, heal: bool) -> bool {
        let Some(from) = self.locate(id) else {
            return false;
        };
        let Some(c) = self.character(id) else {
            return false;
        };
        if c.has_ability(AbilityKind::CannotSwitchLanes) || (!heal && !c.can_fight()) {
            return false;
        }
        let owner = from.owner;
        let cap = self.config.max_characters_per_lane;

        let target = match to {
            Some(lane) => {
                if lane >= LANE_COUNT || lane == from.lane || self.lanes[lane].characters[owner].len() >= cap {
                    return false;
                }
                lane
            }
            None => match self.random_other_lane_with_room(from.lane, owner) {
                Some(lane) => lane,
                None => return false,
            },
        };

        let mut character = self.lanes[from.lane].characters[owner].remove(from.index);
        character.lane = target;
        character.has_attacked = false;
        self.lanes[target].characters[owner].push(character);
        let to_index = self.lanes[target].characters[owner].len() - 1;
        if heal {
            self.fully_heal(id);
        }
        debug!("{} switched from lane {} to lane {}", id, from.lane, target);

        self.emit(
            EventKind::CharacterSwitchLanes,
            EventData {
                to_lane: Some(target),
                ..EventData::targeted(from.lane, owner, Some(from.index), Some(to_index))
            },
        );

        self.on_character_moved_here(id, target, owner);
        true
    }

    fn on_character_moved_here(&mut self, id: EntityId, lane: usize, owner: PlayerId) {
        for friend in self.lanes[lane].ids(owner) {
            if friend == id {
                continue;
            }
            if let Some((attack, health)) = self.pump_of(friend, AbilityKind::CharacterMovesHerePumps) {
                self.pump_character(friend, attack, health);
            }
            if let Some((attack, health)) = self.pump_of(friend, AbilityKind::CharacterMovesHereThatCharacterPumps) {
                self.pump_character(id, attack, health);
            }
            if self.has(friend, AbilityKind::OnCharacterMoveHereMakeSpirit) {
                if let Some(other) = self.random_other_lane_with_room(lane, owner) {
                    if let Some(spirit) = self.spawn(SPIRIT, other, owner) {
                        self.reveal_all(spirit);
                    }
                }
            }
            if self.has(friend, AbilityKind::OnCharacterMoveHereShackle) {
                if let Some(target) = self.random_character(lane, owner.opponent(), |c| c.shackled_turns > 0) {
                    self.shackle(target, friend);
                }
            }
        }
    }
}
