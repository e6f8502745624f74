//! Battlefield characters.
//!
//! A `Character` is the mutable projection of a card on a lane. Queries that
//! only need the character itself live here; anything that reads the lane
//! or the wider board is implemented on `GameTurnState`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cards::{Ability, AbilityKind, Card, CardTemplate, Element};
use crate::core::{EntityId, PlayerId};

/// A card in play.
///
/// `current_health` may exceed the template's health after pumps. A
/// character at zero health or below is removed by the next death pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: EntityId,
    pub template: Arc<CardTemplate>,
    pub current_health: i32,
    pub max_health: i32,
    pub current_attack: i32,
    pub shackled_turns: u32,
    pub has_attacked: bool,
    pub owner: PlayerId,
    /// Index of the lane holding this character. Restored from position
    /// when a snapshot is loaded.
    #[serde(skip)]
    pub lane: usize,
    pub is_new: bool,
    pub escaped_death: bool,
    pub did_on_reveal: bool,
    pub did_end_of_turn: bool,
    pub silenced: bool,
    pub shielded: bool,
}

impl Character {
    #[must_use]
    pub fn new(id: EntityId, template: Arc<CardTemplate>, owner: PlayerId, lane: usize) -> Self {
        Self {
            id,
            current_health: template.health,
            max_health: template.health,
            current_attack: template.attack,
            template,
            shackled_turns: 0,
            has_attacked: false,
            owner,
            lane,
            is_new: true,
            escaped_death: false,
            did_on_reveal: false,
            did_end_of_turn: false,
            silenced: false,
            shielded: false,
        }
    }

    /// Bring a card into play, keeping its id and hand bonuses.
    #[must_use]
    pub fn from_card(card: Card, owner: PlayerId, lane: usize) -> Self {
        let mut character = Self::new(card.id, card.template, owner, lane);
        character.current_attack += card.attack_bonus;
        character.current_health += card.health_bonus;
        character.max_health += card.health_bonus;
        character
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.template.name
    }

    /// True iff not silenced and the template prints `kind`.
    #[must_use]
    pub fn has_ability(&self, kind: AbilityKind) -> bool {
        !self.silenced && self.template.abilities.contains(kind)
    }

    /// The printed ability of `kind`, ignoring silence.
    ///
    /// Panics if the template does not print `kind`.
    #[must_use]
    pub fn ability(&self, kind: AbilityKind) -> &Ability {
        match self.template.abilities.get(kind) {
            Some(ability) => ability,
            None => panic!("{} does not have ability {}", self.template.name, kind),
        }
    }

    #[must_use]
    pub fn number_of(&self, kind: AbilityKind) -> i32 {
        self.ability(kind).number()
    }

    #[must_use]
    pub fn number2_of(&self, kind: AbilityKind) -> i32 {
        self.ability(kind).number2()
    }

    #[must_use]
    pub fn element_of(&self, kind: AbilityKind) -> Element {
        self.ability(kind).element()
    }

    /// Attack/health pair of a pump-style ability, if active.
    #[must_use]
    pub fn active_pump(&self, kind: AbilityKind) -> Option<(i32, i32)> {
        self.has_ability(kind).then(|| self.ability(kind).pump_amounts())
    }

    /// Single number of an ability, if active.
    #[must_use]
    pub fn active_number(&self, kind: AbilityKind) -> Option<i32> {
        self.has_ability(kind).then(|| self.number_of(kind))
    }

    /// Sum of this character's contributions to a lane aura.
    #[must_use]
    pub fn aura_contribution(&self, kind: AbilityKind) -> i32 {
        if self.silenced {
            return 0;
        }
        self.template
            .abilities
            .iter()
            .filter(|a| a.kind == kind)
            .map(Ability::aura_weight)
            .sum()
    }

    #[must_use]
    pub fn has_element(&self, element: Element) -> bool {
        self.template.has_element(element)
    }

    #[must_use]
    pub fn is_defender(&self) -> bool {
        self.has_ability(AbilityKind::Defender)
    }

    #[must_use]
    pub fn can_fight(&self) -> bool {
        self.current_health > 0
    }

    /// Alive, has not attacked, not shackled, and has attack to deal.
    #[must_use]
    pub fn can_attack(&self) -> bool {
        self.can_fight() && !self.has_attacked && self.shackled_turns == 0 && self.current_attack > 0
    }

    #[must_use]
    pub fn is_damaged(&self) -> bool {
        self.current_health < self.max_health
    }

    /// Add to attack, current health, and max health.
    pub fn pump(&mut self, attack: i32, health: i32) {
        self.current_attack += attack;
        self.current_health += health;
        self.max_health += health;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> Character {
        let template = CardTemplate::new("Sample", 2, 3, 4)
            .with_ability(AbilityKind::Defender)
            .with(Ability::pump(AbilityKind::OnSurviveDamagePump, 1, 2))
            .with(Ability::numbered(AbilityKind::ShieldedCharactersDealExtraDamage, 2));
        Character::new(EntityId(1), Arc::new(template), PlayerId::new(0), 0)
    }

    #[test]
    fn test_new_copies_printed_stats() {
        let c = sample();
        assert_eq!(c.current_attack, 3);
        assert_eq!(c.current_health, 4);
        assert_eq!(c.max_health, 4);
        assert!(c.is_new);
        assert!(!c.did_on_reveal);
    }

    #[test]
    fn test_from_card_applies_bonuses() {
        let mut card = Card::new(EntityId(9), Arc::new(CardTemplate::new("Recruit", 1, 1, 1)));
        card.attack_bonus = 2;
        card.health_bonus = 3;

        let c = Character::from_card(card, PlayerId::new(1), 2);

        assert_eq!(c.id, EntityId(9));
        assert_eq!((c.current_attack, c.current_health, c.max_health), (3, 4, 4));
        assert_eq!(c.lane, 2);
    }

    #[test]
    fn test_can_attack() {
        let mut c = sample();
        assert!(c.can_attack());

        c.shackled_turns = 1;
        assert!(!c.can_attack());
        c.shackled_turns = 0;

        c.has_attacked = true;
        assert!(!c.can_attack());
        c.has_attacked = false;

        c.current_attack = 0;
        assert!(!c.can_attack());
        c.current_attack = 3;

        c.current_health = 0;
        assert!(!c.can_attack());
    }

    #[test]
    fn test_active_parameters() {
        let mut c = sample();
        assert_eq!(c.active_pump(AbilityKind::OnSurviveDamagePump), Some((1, 2)));
        assert_eq!(c.aura_contribution(AbilityKind::ShieldedCharactersDealExtraDamage), 2);

        c.silenced = true;
        assert_eq!(c.active_pump(AbilityKind::OnSurviveDamagePump), None);
        assert_eq!(c.aura_contribution(AbilityKind::ShieldedCharactersDealExtraDamage), 0);
    }

    #[test]
    #[should_panic(expected = "does not have ability")]
    fn test_missing_ability_parameter_panics() {
        let _ = sample().number_of(AbilityKind::OnRevealGainMana);
    }

    proptest! {
        #[test]
        fn prop_silenced_characters_have_no_abilities(index in 0usize..AbilityKind::ALL.len()) {
            let kind = AbilityKind::ALL[index];
            let template = CardTemplate::new("Everything", 1, 1, 1).with_ability(kind);
            let mut c = Character::new(EntityId(1), Arc::new(template), PlayerId::new(0), 0);
            prop_assert!(c.has_ability(kind));

            c.silenced = true;
            prop_assert!(!c.has_ability(kind));
        }
    }
}
