//! Drawable card instances and decks.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::catalog::CardCatalog;
use super::template::CardTemplate;
use crate::core::{EntityId, IdAllocator};

/// A card in a hand or draw pile.
///
/// Bonuses come from effects that pump cards while they are still in hand
/// and are applied when the card becomes a character.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: EntityId,
    pub template: Arc<CardTemplate>,
    pub attack_bonus: i32,
    pub health_bonus: i32,
}

impl Card {
    #[must_use]
    pub fn new(id: EntityId, template: Arc<CardTemplate>) -> Self {
        Self {
            id,
            template,
            attack_bonus: 0,
            health_bonus: 0,
        }
    }

    /// Printed attack plus hand bonuses.
    #[must_use]
    pub fn attack(&self) -> i32 {
        self.template.attack + self.attack_bonus
    }

    /// Printed health plus hand bonuses.
    #[must_use]
    pub fn health(&self) -> i32 {
        self.template.health + self.health_bonus
    }
}

/// A named list of template names.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub name: String,
    pub cards: Vec<String>,
}

impl Deck {
    #[must_use]
    pub fn new(name: impl Into<String>, cards: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            cards: cards.into_iter().map(Into::into).collect(),
        }
    }

    /// Instantiate one card per entry, skipping names the catalog lacks.
    pub fn to_cards(&self, catalog: &CardCatalog, ids: &mut IdAllocator) -> Vec<Card> {
        self.cards
            .iter()
            .filter_map(|name| match catalog.get(name) {
                Some(template) => Some(Card::new(ids.allocate(), template)),
                None => {
                    log::warn!("deck {:?} names unknown card {:?}", self.name, name);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bonuses_add_to_printed_stats() {
        let template = Arc::new(CardTemplate::new("Scout", 1, 2, 3));
        let mut card = Card::new(EntityId(5), template);
        card.attack_bonus = 1;
        card.health_bonus = 2;
        assert_eq!(card.attack(), 3);
        assert_eq!(card.health(), 5);
    }

    #[test]
    fn test_deck_skips_unknown_names() {
        let catalog = CardCatalog::standard();
        let deck = Deck::new("test", ["Cabbage", "Nobody", "Spirit"]);
        let mut ids = IdAllocator::default();

        let cards = deck.to_cards(&catalog, &mut ids);

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].template.name, "Cabbage");
        assert_ne!(cards[0].id, cards[1].id);
    }
}
