//! Entity identification.
//!
//! Every card and every battlefield character carries a unique `EntityId`.
//! A card keeps its id when it is played, so the character that replaces it
//! can be traced back to the card in hand.
//!
//! ## Usage
//!
//! ```
//! use lane_battle::core::{EntityId, IdAllocator};
//!
//! let mut ids = IdAllocator::default();
//! let first = ids.allocate();
//! let second = ids.allocate();
//!
//! assert_ne!(first, second);
//! assert_eq!(first, EntityId::new(1));
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for a card or character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Monotonic id source owned by a game.
///
/// Ids start at 1. The allocator position is part of a snapshot so a
/// restored game never reuses an id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    /// Resume allocation from a saved position.
    #[must_use]
    pub const fn starting_at(next: u32) -> Self {
        Self { next }
    }

    /// Hand out the next unused id.
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// The id the next call to `allocate` will return.
    #[must_use]
    pub const fn peek(&self) -> u32 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_is_sequential() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.allocate(), EntityId(1));
        assert_eq!(ids.allocate(), EntityId(2));
        assert_eq!(ids.peek(), 3);
    }

    #[test]
    fn test_allocator_resumes() {
        let mut ids = IdAllocator::starting_at(40);
        assert_eq!(ids.allocate(), EntityId(40));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", EntityId(42)), "Entity(42)");
    }

    #[test]
    fn test_serialization() {
        let id = EntityId(123);
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
