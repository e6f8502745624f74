//! Card templates: the immutable printed stats of a named card.
//!
//! Templates are shared by `Arc` between every card and character created
//! from them.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::ability::{Ability, AbilityKind, AbilitySet};

/// Creature element. `Avatar` counts as every element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Air,
    Earth,
    Fire,
    Water,
    Avatar,
}

impl Element {
    /// The four elements a lane can be "full of".
    pub const BASIC: [Element; 4] = [Element::Fire, Element::Water, Element::Earth, Element::Air];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Element::Air => "Air",
            Element::Earth => "Earth",
            Element::Fire => "Fire",
            Element::Water => "Water",
            Element::Avatar => "Avatar",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Legendary,
}

/// Printed card data.
///
/// ```
/// use lane_battle::cards::{AbilityKind, CardTemplate, Element};
///
/// let template = CardTemplate::new("Earth Guard", 2, 1, 4)
///     .with_element(Element::Earth)
///     .with_ability(AbilityKind::Defender);
///
/// assert!(template.has_element(Element::Earth));
/// assert!(template.abilities.contains(AbilityKind::Defender));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardTemplate {
    pub name: String,
    pub abilities: AbilitySet,
    pub cost: i32,
    pub attack: i32,
    pub health: i32,
    pub elements: SmallVec<[Element; 2]>,
    pub rarity: Rarity,
    /// Tokens and playout stand-ins never come from random draws.
    pub excluded_from_pool: bool,
}

impl CardTemplate {
    #[must_use]
    pub fn new(name: impl Into<String>, cost: i32, attack: i32, health: i32) -> Self {
        Self {
            name: name.into(),
            abilities: AbilitySet::new(),
            cost,
            attack,
            health,
            elements: SmallVec::new(),
            rarity: Rarity::Common,
            excluded_from_pool: false,
        }
    }

    /// Add a parameterless ability.
    #[must_use]
    pub fn with_ability(self, kind: AbilityKind) -> Self {
        self.with(Ability::new(kind))
    }

    /// Add a fully specified ability.
    #[must_use]
    pub fn with(mut self, ability: Ability) -> Self {
        self.abilities.push(ability);
        self
    }

    #[must_use]
    pub fn with_element(mut self, element: Element) -> Self {
        if !self.elements.contains(&element) {
            self.elements.push(element);
        }
        self
    }

    #[must_use]
    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }

    /// Keep this template out of the random-draw pool.
    #[must_use]
    pub fn excluded(mut self) -> Self {
        self.excluded_from_pool = true;
        self
    }

    /// Element check with the Avatar wildcard.
    #[must_use]
    pub fn has_element(&self, element: Element) -> bool {
        self.elements.contains(&element) || self.elements.contains(&Element::Avatar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avatar_matches_every_element() {
        let avatar = CardTemplate::new("Avatar", 5, 5, 5).with_element(Element::Avatar);
        for element in Element::BASIC {
            assert!(avatar.has_element(element));
        }

        let fire = CardTemplate::new("Firebender", 1, 2, 1).with_element(Element::Fire);
        assert!(fire.has_element(Element::Fire));
        assert!(!fire.has_element(Element::Water));
    }

    #[test]
    fn test_duplicate_elements_are_ignored() {
        let template = CardTemplate::new("x", 1, 1, 1)
            .with_element(Element::Air)
            .with_element(Element::Air);
        assert_eq!(template.elements.len(), 1);
    }
}
