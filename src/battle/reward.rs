//! Lane rewards.
//!
//! Each lane carries at most one reward. A reward with a threshold fires
//! once per player, the first time that player's tower damage in the lane
//! reaches it. A reward without a threshold is a passive rule that the
//! relevant phase consults directly.

use serde::{Deserialize, Serialize};

/// What a reward does.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardEffect {
    // Threshold effects
    /// Every friendly character on the board gets +attack/+health.
    PumpAllFriendlies { attack: i32, health: i32 },
    /// Summon a template into another lane with room.
    Spawn { template: String },
    DrawRandomCards { count: u32 },
    /// Every friendly character on the board makes a bonus attack.
    BonusAttackAllFriendlies,
    DiscardHand,
    GainMana { amount: i32 },
    /// Play every card in hand into other lanes at no cost.
    PlayAllCardsInHandForFree,
    PumpRandomCharacterInAnotherLane { attack: i32, health: i32 },
    HealAllFriendlies,
    FriendlyCharactersInThisLaneSwitchLanes,

    // Passive effects
    /// Both players start the game with copies of a template here.
    SpawnAtStart { template: String, count: u32 },
    HealAllCharactersHereAtEndOfTurn,
    DealDamageToAllCharactersHereAtEndOfTurn { damage: i32 },
    FirstCharacterSwitchesLanesAtEndOfTurn,
    /// Every character here counts as an Attacker.
    CharactersHereFightAsAttackers,
    PumpAllCharactersPlayedHere { attack: i32, health: i32 },
    /// A character dying here gives its owner mana.
    OwnerGainsManaWhenCharacterDiesHere { amount: i32 },
    /// Shackles applied here last one extra turn.
    ShacklesHereLastExtraTurn,
}

/// A named reward attached to a lane.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneReward {
    pub name: String,
    pub threshold: Option<i32>,
    pub effect: RewardEffect,
    pub description: String,
}

impl LaneReward {
    #[must_use]
    pub fn milestone(name: &str, threshold: i32, effect: RewardEffect, description: &str) -> Self {
        Self {
            name: name.to_string(),
            threshold: Some(threshold),
            effect,
            description: description.to_string(),
        }
    }

    #[must_use]
    pub fn passive(name: &str, effect: RewardEffect, description: &str) -> Self {
        Self {
            name: name.to_string(),
            threshold: None,
            effect,
            description: description.to_string(),
        }
    }

    #[must_use]
    pub fn is_passive(&self) -> bool {
        self.threshold.is_none()
    }

    /// Look a reward up in the built-in catalog.
    #[must_use]
    pub fn named(name: &str) -> Option<Self> {
        Self::catalog().into_iter().find(|r| r.name == name)
    }

    /// The built-in rewards.
    #[must_use]
    pub fn catalog() -> Vec<Self> {
        use RewardEffect::*;

        vec![
            Self::milestone("Fire Nation", 25, PumpAllFriendlies { attack: 3, health: 0 }, "25: ALL friendly characters get +3/+0."),
            Self::milestone(
                "Southern Air Temple",
                15,
                Spawn { template: "Air Temple Guardian".to_string() },
                "15: Create a 4/4 in another lane.",
            ),
            Self::milestone("Full Moon Bay", 5, DrawRandomCards { count: 1 }, "5: Draw a card."),
            Self::milestone("Kyoshi Island", 12, BonusAttackAllFriendlies, "12: ALL friendly characters attack."),
            Self::milestone("Si Wong Desert", 8, DiscardHand, "8: Discard your hand."),
            Self::milestone("Omashu", 10, GainMana { amount: 3 }, "10: Gain 3 mana."),
            Self::milestone("Ember Island", 20, PlayAllCardsInHandForFree, "20: Play your whole hand for free."),
            Self::milestone(
                "Northern Water Tribe",
                10,
                PumpRandomCharacterInAnotherLane { attack: 3, health: 3 },
                "10: A random friendly in another lane gets +3/+3.",
            ),
            Self::milestone("Foggy Swamp", 10, HealAllFriendlies, "10: Fully heal ALL friendly characters."),
            Self::milestone("Serpent's Pass", 6, FriendlyCharactersInThisLaneSwitchLanes, "6: Friendlies here switch lanes."),
            Self::passive(
                "Ba Sing Se",
                SpawnAtStart { template: "Earth Kingdom Recruit".to_string(), count: 2 },
                "Each player starts with two 1/2 Recruits here.",
            ),
            Self::passive("Spirit Oasis", HealAllCharactersHereAtEndOfTurn, "Characters here fully heal at end of turn."),
            Self::passive(
                "Boiling Rock",
                DealDamageToAllCharactersHereAtEndOfTurn { damage: 1 },
                "Characters here take 1 damage at end of turn.",
            ),
            Self::passive(
                "Misty Palms Oasis",
                FirstCharacterSwitchesLanesAtEndOfTurn,
                "Each player's first character here switches lanes at end of turn.",
            ),
            Self::passive("Agni Kai Arena", CharactersHereFightAsAttackers, "Characters here fight as Attackers."),
            Self::passive(
                "Western Air Temple",
                PumpAllCharactersPlayedHere { attack: 1, health: 1 },
                "Characters played here get +1/+1.",
            ),
            Self::passive(
                "Crescent Island",
                OwnerGainsManaWhenCharacterDiesHere { amount: 1 },
                "When a character dies here, its owner gains 1 mana.",
            ),
            Self::passive("Lake Laogai", ShacklesHereLastExtraTurn, "Shackles here last an extra turn."),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_lookup() {
        let reward = LaneReward::named("Full Moon Bay").unwrap();
        assert_eq!(reward.threshold, Some(5));
        assert_eq!(reward.effect, RewardEffect::DrawRandomCards { count: 1 });
        assert!(LaneReward::named("Atlantis").is_none());
    }

    #[test]
    fn test_catalog_names_are_unique() {
        let catalog = LaneReward::catalog();
        for (i, a) in catalog.iter().enumerate() {
            assert!(catalog[i + 1..].iter().all(|b| b.name != a.name), "duplicate {}", a.name);
        }
    }

    #[test]
    fn test_passive_rewards_have_no_threshold() {
        assert!(LaneReward::named("Spirit Oasis").unwrap().is_passive());
        assert!(!LaneReward::named("Omashu").unwrap().is_passive());
    }
}
