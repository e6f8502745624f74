//! Ability catalog.
//!
//! An ability is a named capability printed on a card template, optionally
//! carrying up to two numbers and an element. Rules code never inspects
//! ability names as strings: each capability is an `AbilityKind` variant
//! and characters answer "do I have X" through an `AbilitySet`, which keeps
//! an O(1) index from kind to entry.
//!
//! ## Parameters
//!
//! Pump-style abilities use `number` for attack and `number2` for health.
//! Asking an ability for a parameter it was not printed with is a
//! programming error and panics with the ability's name.
//!
//! ```
//! use lane_battle::cards::{Ability, AbilityKind, AbilitySet};
//!
//! let set = AbilitySet::from(vec![
//!     Ability::new(AbilityKind::Defender),
//!     Ability::pump(AbilityKind::OnSurviveDamagePump, 1, 1),
//! ]);
//!
//! assert!(set.contains(AbilityKind::Defender));
//! assert_eq!(set.get(AbilityKind::OnSurviveDamagePump).unwrap().pump_amounts(), (1, 1));
//! assert!(!set.contains(AbilityKind::Attacker));
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::template::Element;

macro_rules! ability_kinds {
    ($($kind:ident => $text:literal,)*) => {
        /// Every capability the rules engine understands.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum AbilityKind {
            $($kind,)*
        }

        impl AbilityKind {
            /// All kinds in declaration order.
            pub const ALL: &'static [AbilityKind] = &[$(AbilityKind::$kind,)*];

            /// Stable catalog name.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(AbilityKind::$kind => stringify!($kind),)*
                }
            }

            /// Rules text with `{n}`, `{m}` and `{element}` placeholders.
            #[must_use]
            pub const fn rules_text(self) -> &'static str {
                match self {
                    $(AbilityKind::$kind => $text,)*
                }
            }

            /// Look a kind up by its catalog name.
            #[must_use]
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $(stringify!($kind) => Some(AbilityKind::$kind),)*
                    _ => None,
                }
            }
        }
    };
}

ability_kinds! {
    // Targeting and roles
    Defender => "Enemies must fight me before anything else.",
    Attacker => "I fight enemy characters and still hit the tower.",
    EarlyFighter => "I attack in the first-strike pass.",
    LateFighter => "I attack after my other friendlies.",
    CannotSwitchLanes => "I can never switch lanes.",
    Shield => "I enter with a shield.",
    Twinstrike => "When a Defender blocks me as an Attacker, I hit the tower too.",

    // Damage shaping
    DoubleTowerDamage => "I deal double damage to the tower.",
    DealDoubleDamageAgainstShackled => "I deal double damage to shackled characters.",
    DealMoreDamageWhenLosing => "I deal {n} extra damage while losing this lane.",
    DealDamageEqualToCurrentHealth => "I deal damage equal to my current health.",
    Deathtouch => "I kill any character I damage.",
    DeathtouchAgainstDefenders => "I kill any Defender I damage.",
    DoNotDamageEnemyCharacters => "I don't damage enemy characters.",
    InvincibilityWhileAttacking => "I take no damage back when I attack.",
    InvincibilityAgainstShackled => "Shackled characters can't damage me.",

    // Lane auras
    FriendliesDealDamageEqualToCurrentHealth => "Friendlies here deal damage equal to their current health.",
    AttackersDontDealDamage => "Attackers here deal no damage to characters.",
    MoreStrengthMeansDoubleDamage => "Friendlies here with more attack than health deal double damage.",
    ShieldedCharactersDealExtraDamage => "Shielded friendlies here deal {n} extra damage.",
    FriendlyAttackersAreInvincibleWhileAttacking => "Friendly Attackers here take no damage back.",

    // Tower hits
    OnTowerAttackDealMassDamage => "When I hit the tower, deal {n} damage to each enemy here.",
    OnTowerAttackDrawCard => "When I hit the tower, draw a random card.",
    OnDamageTowerPumpTeam => "When I hit the tower, other friendlies here get +{n}/+{m}.",
    OnTowerDamageGainMana => "When I hit the tower, gain 1 mana.",
    HitTowerPumpSelf => "When I hit the tower, I get +{n}/+{m}.",
    HitTowerDamageAllCharacters => "When I hit the tower, deal {n} damage to every other character here.",
    HitTowerOtherCharactersSwitchLanes => "When I hit the tower, my friendlies here switch lanes.",
    HitTowerGiveShield => "When I hit the tower, shield a random friendly here.",
    HitTowerShackle => "When I hit the tower, shackle a random enemy here.",
    HitTowerDamageAllEnemiesEqualToDamage => "When I hit the tower, deal that much damage to each enemy here.",
    OnTriggerHitTowerPump => "When a friendly here triggers a tower-hit ability, it gets +{n}/+{m}.",
    OnTriggerHitTowerBonusAttack => "When a friendly here triggers a tower-hit ability, it attacks again.",

    // Attack follow-ups
    SwitchLanesAfterAttacking => "After I attack, I switch lanes.",
    OnAttackDoubleAttack => "After I attack, my attack doubles.",
    OnDamageCharacterSilenceIt => "Characters I damage are silenced.",

    // Kills
    KillEnemySummonNyla => "When I kill an enemy, summon Nyla here.",
    OnKillBuffHealth => "When I kill an enemy, I get +{n}/+{m}.",
    KillEnemyAttackAgain => "When I kill an enemy, I attack again.",
    KillEnemyGainShield => "When I kill an enemy, I gain a shield.",
    OnTriggerKillEnemyHealAndPumpSelf => "When a friendly here triggers a kill ability, heal it and I get +{n}/+{m}.",
    OnTriggerKillEnemyBonusAttack => "When a friendly here triggers a kill ability, I attack again.",

    // Shields
    PumpOnGainShield => "Friendlies here that gain a shield get +{n}/+{m}.",
    OnShieldBreakPumpSelf => "When a friendly shield here breaks, I get +{n}/+{m}.",

    // Surviving damage
    OnSurviveDamagePump => "When I survive damage, I get +{n}/+{m}.",
    OnSurviveDrawCard => "When I survive damage, draw a random card.",
    OnSurviveGainMana => "When I survive damage, gain 1 mana.",
    SurviveSwitchLanes => "When I survive damage, I switch lanes.",
    SurvivePumpFriendlyAttackers => "When I survive damage, friendly Attackers here get +{n}/+{m}.",
    OnTriggerSurvivePumpSelf => "When a friendly here triggers a survive ability, I get +{n}/+{m}.",
    OnTriggerSurvivePump => "When a friendly here triggers a survive ability, it gets +{n}/+{m}.",

    // Movement
    CharacterMovesHerePumps => "When a friendly moves here, I get +{n}/+{m}.",
    CharacterMovesHereThatCharacterPumps => "When a friendly moves here, it gets +{n}/+{m}.",
    OnCharacterMoveHereMakeSpirit => "When a friendly moves here, create a Spirit in another lane.",
    OnCharacterMoveHereShackle => "When a friendly moves here, shackle a random enemy here.",

    // Healing
    PumpOnFriendlyHeal => "Other friendlies here that are healed get +{n}/+{m}.",
    OnFriendlyHealPumpMyself => "When another friendly here is healed, I get +{n}/+{m}.",

    // Turn boundaries
    StartOfTurnFullHeal => "At the start of each turn, I fully heal.",
    EndOfTurnFullHeal => "At the end of each turn, I fully heal.",
    EndOfTurnFullHealForAllFriendlies => "At the end of each turn, fully heal my friendlies here.",
    SwitchLanesAtEndOfTurn => "At the end of each turn, I switch lanes.",

    // Shackles
    ShacklesLastExtraTurn => "Enemies shackled here stay shackled one extra turn.",
    ShacklesDealDamage => "Enemies shackled here take {n} damage.",
    OnShackleDrawCard => "When an enemy here is shackled, draw a random card.",
    OnShacklePumpSelf => "When an enemy here is shackled, I get +{n}/+{m}.",
    ShackleOnFriendlyEarth => "When a friendly Earth character is played here, shackle a random enemy here.",

    // Played-here buffs
    PumpCharactersPlayedHere => "Friendlies played here get +{n}/+{m}.",
    PumpFriendlyCharactersOfElementPlayedHere => "Friendly {element} characters played here get +{n}/+{m}.",

    // Reveal: early
    OnRevealSilenceRandomEnemy => "On reveal: silence a random enemy here.",
    OnRevealSilenceAllCharacters => "On reveal: silence every other character here.",

    // Reveal: regular
    OnRevealShackle => "On reveal: shackle a random enemy here.",
    OnRevealShackleSeveral => "On reveal: shackle {n} random enemies here.",
    OnRevealShackleAllEnemies => "On reveal: shackle every enemy here.",
    OnRevealPumpFriends => "On reveal: other friendlies here get +{n}/+{m}.",
    OnRevealPumpAttackers => "On reveal: friendly Attackers here get +{n}/+{m}.",
    OnRevealGainMana => "On reveal: gain {n} mana.",
    HealFriendlyCharacterAndTower => "On reveal: fully heal another damaged friendly here and heal my tower here by {n}.",
    OnRevealHealAllFriendliesAndTowers => "On reveal: fully heal all friendlies and heal all my towers by {n}.",
    OnRevealLaneFightsFirst => "On reveal: this lane fights first this turn.",
    OnRevealFriendliesSwitchLanes => "On reveal: friendlies here switch lanes.",
    OnRevealDrawCards => "On reveal: draw {n} random cards.",
    OnRevealDamageSelf => "On reveal: I take {n} damage.",
    OnRevealPumpFriendlyCharactersOfElement => "On reveal: other friendly {element} characters here get +{n}/+{m}.",
    OnRevealFillEnemyLaneWithCabbages => "On reveal: fill the enemy side of this lane with Cabbages.",
    OnRevealSummonDesna => "On reveal: summon Desna here.",
    OnRevealHealAndPumpSelf => "On reveal: fully heal another damaged friendly here and gain what was healed.",
    OnRevealDiscard => "On reveal: discard a random card.",
    OnRevealDiscardHandAndPump => "On reveal: discard your hand; I get +{n}/+{m} per card discarded.",
    OnRevealShieldFriendlies => "On reveal: shield other friendlies here.",
    OnRevealPumpCardsInHand => "On reveal: cards in your hand get +{n}/+{m}.",
    OnRevealPumpFriendliesIfFullMatchingLane => "On reveal: if this lane is full of one element, friendlies here get +{n}/+{m}.",

    // Reveal: late
    OnRevealDiscardRandomCardAndDealDamageEqualToCost => "On reveal: discard a random card and deal its cost as damage to a random enemy here.",
    OnRevealDamageToAll => "On reveal: deal {n} damage to every character here.",
    OnRevealBonusAttack => "On reveal: attack {n} times.",
    OnRevealFriendliesMakeBonusAttack => "On reveal: other friendlies here attack.",
    OnRevealAllAttackersMakeBonusAttack => "On reveal: all friendly Attackers attack.",
    OnRevealStealEnemy => "On reveal: take control of a random enemy here.",
    OnRevealEnemiesFight => "On reveal: two random enemies here fight each other.",
    OnRevealEnemiesSwitchLanes => "On reveal: enemies here switch lanes.",

    // Death
    OnFriendlyCharacterDeathHealFullyAndSwitchLanes => "When a friendly in another lane would die, it moves here fully healed instead.",
    SwitchLanesInsteadOfDying => "Once per turn, when I would die, I switch lanes fully healed instead.",
    DeathMoveCharactersHereAndPumpThem => "When I die, friendlies from other lanes move here and get +{n}/+{n}.",

    // Hand
    OnDrawCardPump => "When you draw a card, I get +{n}/+{m}.",
    OnDiscardPump => "When you discard a card, I get +{n}/+{m}.",
}

impl AbilityKind {
    /// Kinds that modify combat for their whole side of a lane.
    #[must_use]
    pub const fn is_lane_aura(self) -> bool {
        matches!(
            self,
            AbilityKind::FriendliesDealDamageEqualToCurrentHealth
                | AbilityKind::AttackersDontDealDamage
                | AbilityKind::MoreStrengthMeansDoubleDamage
                | AbilityKind::ShieldedCharactersDealExtraDamage
                | AbilityKind::FriendlyAttackersAreInvincibleWhileAttacking
        )
    }
}

impl std::fmt::Display for AbilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One printed ability: a kind plus its optional parameters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ability {
    pub kind: AbilityKind,
    pub number: Option<i32>,
    pub number2: Option<i32>,
    pub element: Option<Element>,
}

impl Ability {
    /// Ability without parameters.
    #[must_use]
    pub const fn new(kind: AbilityKind) -> Self {
        Self {
            kind,
            number: None,
            number2: None,
            element: None,
        }
    }

    /// Ability with a single number.
    #[must_use]
    pub const fn numbered(kind: AbilityKind, number: i32) -> Self {
        Self {
            kind,
            number: Some(number),
            number2: None,
            element: None,
        }
    }

    /// Ability with an attack/health pair.
    #[must_use]
    pub const fn pump(kind: AbilityKind, attack: i32, health: i32) -> Self {
        Self {
            kind,
            number: Some(attack),
            number2: Some(health),
            element: None,
        }
    }

    /// Ability with an attack/health pair restricted to an element.
    #[must_use]
    pub const fn elemental(kind: AbilityKind, attack: i32, health: i32, element: Element) -> Self {
        Self {
            kind,
            number: Some(attack),
            number2: Some(health),
            element: Some(element),
        }
    }

    /// First numeric parameter. Panics if the ability has none.
    #[must_use]
    pub fn number(&self) -> i32 {
        match self.number {
            Some(n) => n,
            None => panic!("ability {} has no number parameter", self.kind),
        }
    }

    /// Second numeric parameter. Panics if the ability has none.
    #[must_use]
    pub fn number2(&self) -> i32 {
        match self.number2 {
            Some(n) => n,
            None => panic!("ability {} has no second number parameter", self.kind),
        }
    }

    /// Element parameter. Panics if the ability has none.
    #[must_use]
    pub fn element(&self) -> Element {
        match self.element {
            Some(e) => e,
            None => panic!("ability {} has no element parameter", self.kind),
        }
    }

    /// `(number, number2)` for pump-style abilities.
    #[must_use]
    pub fn pump_amounts(&self) -> (i32, i32) {
        (self.number(), self.number2())
    }

    /// Contribution to a lane aura total: its number, or 1 when unnumbered.
    #[must_use]
    pub fn aura_weight(&self) -> i32 {
        self.number.unwrap_or(1)
    }

    /// Human-readable rules text with parameters filled in.
    #[must_use]
    pub fn description(&self) -> String {
        let mut text = self.kind.rules_text().to_string();
        if let Some(n) = self.number {
            text = text.replace("{n}", &n.to_string());
        }
        if let Some(m) = self.number2 {
            text = text.replace("{m}", &m.to_string());
        }
        if let Some(element) = self.element {
            text = text.replace("{element}", element.name());
        }
        text
    }
}

/// A template's abilities with O(1) lookup by kind.
///
/// Order is preserved for display; the index points at the first entry of
/// each kind.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Ability>", into = "Vec<Ability>")]
pub struct AbilitySet {
    abilities: SmallVec<[Ability; 2]>,
    index: FxHashMap<AbilityKind, usize>,
}

impl AbilitySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an ability, indexing it if its kind is new.
    pub fn push(&mut self, ability: Ability) {
        self.index.entry(ability.kind).or_insert(self.abilities.len());
        self.abilities.push(ability);
    }

    #[must_use]
    pub fn contains(&self, kind: AbilityKind) -> bool {
        self.index.contains_key(&kind)
    }

    /// First ability of the given kind.
    #[must_use]
    pub fn get(&self, kind: AbilityKind) -> Option<&Ability> {
        self.index.get(&kind).map(|&i| &self.abilities[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ability> {
        self.abilities.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}

impl PartialEq for AbilitySet {
    fn eq(&self, other: &Self) -> bool {
        self.abilities == other.abilities
    }
}

impl Eq for AbilitySet {}

impl From<Vec<Ability>> for AbilitySet {
    fn from(abilities: Vec<Ability>) -> Self {
        let mut set = Self::new();
        for ability in abilities {
            set.push(ability);
        }
        set
    }
}

impl From<AbilitySet> for Vec<Ability> {
    fn from(set: AbilitySet) -> Self {
        set.abilities.into_vec()
    }
}
