//! Card system: abilities, templates, cards, and the catalog.
//!
//! ## Key Types
//!
//! - `AbilityKind` / `Ability`: typed capabilities with optional parameters
//! - `AbilitySet`: a template's abilities with O(1) lookup
//! - `CardTemplate`: immutable printed stats, shared by `Arc`
//! - `Card`: a drawable instance of a template
//! - `CardCatalog`: name-keyed template lookup and the random-draw pool

pub mod ability;
pub mod template;
pub mod card;
pub mod catalog;

pub use ability::{Ability, AbilityKind, AbilitySet};
pub use template::{CardTemplate, Element, Rarity};
pub use card::{Card, Deck};
pub use catalog::CardCatalog;
