//! Card catalog for template lookup.
//!
//! The `CardCatalog` stores every template a battle can reference by name:
//! the playable pool used for random draws plus the tokens that abilities
//! and lane rewards summon.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::ability::{Ability, AbilityKind};
use super::template::{CardTemplate, Element, Rarity};

/// Template summoned to fill spare slots by movement triggers.
pub const SPIRIT: &str = "Spirit";
/// Token that fills an enemy lane.
pub const CABBAGE: &str = "Cabbage";
/// Helper summoned on reveal.
pub const DESNA: &str = "Desna";
/// Helper summoned on a kill.
pub const NYLA: &str = "Nyla";

/// Registry of card templates keyed by name.
///
/// ## Example
///
/// ```
/// use lane_battle::cards::{CardCatalog, CardTemplate};
///
/// let mut catalog = CardCatalog::new();
/// catalog.register(CardTemplate::new("Lightning Bolt", 3, 3, 1));
///
/// let found = catalog.get("Lightning Bolt").unwrap();
/// assert_eq!(found.attack, 3);
/// assert_eq!(catalog.pool().len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardCatalog {
    templates: FxHashMap<String, Arc<CardTemplate>>,
    pool: Vec<Arc<CardTemplate>>,
}

impl CardCatalog {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template.
    ///
    /// Panics if a template with the same name already exists.
    pub fn register(&mut self, template: CardTemplate) -> Arc<CardTemplate> {
        if self.templates.contains_key(&template.name) {
            panic!("Card template {:?} already registered", template.name);
        }
        let template = Arc::new(template);
        if !template.excluded_from_pool {
            self.pool.push(Arc::clone(&template));
        }
        self.templates.insert(template.name.clone(), Arc::clone(&template));
        template
    }

    /// Get a template by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<CardTemplate>> {
        self.templates.get(name).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Templates eligible for random draws, in registration order.
    #[must_use]
    pub fn pool(&self) -> &[Arc<CardTemplate>] {
        &self.pool
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// The built-in card set.
    #[must_use]
    pub fn standard() -> Self {
        use AbilityKind::*;
        use Element::*;

        let mut catalog = Self::new();
        let cards = [
            CardTemplate::new("Aang", 4, 3, 4)
                .with_element(Avatar)
                .with_rarity(Rarity::Legendary)
                .with_ability(EarlyFighter)
                .with_ability(SwitchLanesInsteadOfDying),
            CardTemplate::new("Katara", 3, 2, 3)
                .with_element(Water)
                .with_rarity(Rarity::Rare)
                .with(Ability::numbered(HealFriendlyCharacterAndTower, 2)),
            CardTemplate::new("Sokka", 2, 2, 2)
                .with_element(Water)
                .with_ability(Attacker)
                .with(Ability::pump(OnKillBuffHealth, 1, 1)),
            CardTemplate::new("Toph", 4, 3, 5)
                .with_element(Earth)
                .with_rarity(Rarity::Rare)
                .with(Ability::numbered(OnRevealShackleSeveral, 2)),
            CardTemplate::new("Zuko", 3, 3, 3)
                .with_element(Fire)
                .with(Ability::numbered(DealMoreDamageWhenLosing, 2)),
            CardTemplate::new("Iroh", 4, 2, 5)
                .with_element(Fire)
                .with_rarity(Rarity::Rare)
                .with(Ability::elemental(PumpFriendlyCharactersOfElementPlayedHere, 1, 1, Fire)),
            CardTemplate::new("Azula", 5, 5, 3)
                .with_element(Fire)
                .with_rarity(Rarity::Legendary)
                .with_ability(OnRevealSilenceRandomEnemy)
                .with_ability(DoubleTowerDamage),
            CardTemplate::new("Appa", 4, 2, 6)
                .with_element(Air)
                .with_ability(Defender)
                .with(Ability::pump(CharacterMovesHerePumps, 1, 1)),
            CardTemplate::new("Momo", 1, 1, 1)
                .with_element(Air)
                .with_ability(SwitchLanesAfterAttacking),
            CardTemplate::new("Suki", 2, 2, 3)
                .with_ability(Defender)
                .with(Ability::pump(OnSurviveDamagePump, 1, 1)),
            CardTemplate::new("Kyoshi Warrior", 1, 1, 2).with_ability(Defender),
            CardTemplate::new("Earth Kingdom Soldier", 2, 2, 3).with_element(Earth),
            CardTemplate::new("Firebending Master", 3, 4, 2)
                .with_element(Fire)
                .with_rarity(Rarity::Uncommon)
                .with_ability(Attacker)
                .with_ability(Twinstrike),
            CardTemplate::new("Waterbending Healer", 2, 1, 3)
                .with_element(Water)
                .with_ability(EndOfTurnFullHealForAllFriendlies),
            CardTemplate::new("Dai Li Agent", 3, 2, 3)
                .with_element(Earth)
                .with_ability(OnRevealShackle)
                .with(Ability::numbered(ShacklesDealDamage, 1)),
            CardTemplate::new("Yue", 3, 1, 4)
                .with_element(Water)
                .with_rarity(Rarity::Rare)
                .with_ability(OnFriendlyCharacterDeathHealFullyAndSwitchLanes),
            CardTemplate::new("Ty Lee", 2, 2, 2)
                .with_element(Air)
                .with_ability(OnRevealSilenceRandomEnemy),
            CardTemplate::new("Mai", 2, 2, 2)
                .with_element(Fire)
                .with_ability(EarlyFighter)
                .with_ability(DealDoubleDamageAgainstShackled),
            CardTemplate::new("Bumi", 5, 4, 6)
                .with_element(Earth)
                .with_rarity(Rarity::Legendary)
                .with_ability(OnRevealShackleAllEnemies),
            CardTemplate::new("Combustion Man", 4, 5, 3)
                .with_element(Fire)
                .with_rarity(Rarity::Uncommon)
                .with(Ability::numbered(OnTowerAttackDealMassDamage, 2)),
            CardTemplate::new("Jet", 2, 3, 1)
                .with_element(Earth)
                .with_ability(KillEnemyAttackAgain),
            CardTemplate::new("Hakoda", 3, 3, 3)
                .with_element(Water)
                .with(Ability::pump(OnRevealPumpFriends, 1, 1)),
            CardTemplate::new("Pakku", 4, 3, 4)
                .with_element(Water)
                .with(Ability::elemental(OnRevealPumpFriendlyCharactersOfElement, 1, 2, Water)),
            CardTemplate::new("Long Feng", 3, 2, 3)
                .with_element(Earth)
                .with_rarity(Rarity::Rare)
                .with_ability(OnRevealStealEnemy),
            CardTemplate::new("Cabbage Merchant", 1, 1, 1).with_ability(OnRevealFillEnemyLaneWithCabbages),
            CardTemplate::new("Unalaq", 5, 4, 4)
                .with_element(Water)
                .with_rarity(Rarity::Rare)
                .with_ability(OnRevealSummonDesna),
            CardTemplate::new("June", 3, 2, 3)
                .with_rarity(Rarity::Uncommon)
                .with_ability(KillEnemySummonNyla),
            CardTemplate::new("Hei Bai", 4, 4, 4)
                .with_rarity(Rarity::Uncommon)
                .with_ability(OnCharacterMoveHereMakeSpirit),
            CardTemplate::new("Koh", 5, 3, 5)
                .with_rarity(Rarity::Legendary)
                .with_ability(OnRevealSilenceAllCharacters),
            CardTemplate::new("Wan Shi Tong", 4, 3, 5)
                .with_element(Air)
                .with_rarity(Rarity::Rare)
                .with(Ability::numbered(OnRevealDrawCards, 2)),
            CardTemplate::new("Zhao", 3, 3, 2)
                .with_element(Fire)
                .with_ability(EarlyFighter)
                .with_ability(OnRevealLaneFightsFirst),
            CardTemplate::new("Ozai", 6, 6, 6)
                .with_element(Fire)
                .with_rarity(Rarity::Legendary)
                .with_ability(MoreStrengthMeansDoubleDamage),
            CardTemplate::new("Guru Pathik", 2, 0, 3)
                .with_element(Air)
                .with(Ability::numbered(OnRevealGainMana, 2)),
            CardTemplate::new("Kuei", 2, 1, 2)
                .with_element(Earth)
                .with(Ability::pump(OnRevealPumpCardsInHand, 1, 1)),
            // Tokens
            CardTemplate::new(SPIRIT, 1, 1, 1).with_element(Air).excluded(),
            CardTemplate::new(CABBAGE, 0, 0, 1).excluded(),
            CardTemplate::new(DESNA, 3, 3, 3).with_element(Water).excluded(),
            CardTemplate::new(NYLA, 3, 3, 3).excluded(),
            CardTemplate::new("Air Temple Guardian", 4, 4, 4).with_element(Air).excluded(),
            CardTemplate::new("Earth Kingdom Recruit", 1, 1, 2).with_element(Earth).excluded(),
            // Playout stand-ins
            CardTemplate::new("generic_1drop", 1, 1, 2).excluded(),
            CardTemplate::new("generic_2drop", 2, 2, 3).excluded(),
            CardTemplate::new("generic_3drop", 3, 3, 4).excluded(),
            CardTemplate::new("generic_4drop", 4, 4, 5).excluded(),
        ];

        for template in cards {
            catalog.register(template);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_has_tokens_outside_pool() {
        let catalog = CardCatalog::standard();
        for name in [SPIRIT, CABBAGE, DESNA, NYLA] {
            assert!(catalog.contains(name), "missing {name}");
            assert!(catalog.pool().iter().all(|t| t.name != name));
        }
        assert!(!catalog.pool().is_empty());
        assert!(catalog.pool().iter().all(|t| !t.excluded_from_pool));
    }

    #[test]
    fn test_templates_are_shared() {
        let catalog = CardCatalog::standard();
        let a = catalog.get("Aang").unwrap();
        let b = catalog.get("Aang").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_duplicate_registration_panics() {
        let mut catalog = CardCatalog::new();
        catalog.register(CardTemplate::new("Twin", 1, 1, 1));
        catalog.register(CardTemplate::new("Twin", 2, 2, 2));
    }
}
