//! Player identification and per-player data storage.
//!
//! ## PlayerId
//!
//! Type-safe identifier for one of the two seats at the table.
//!
//! ## PlayerMap
//!
//! Per-player storage backed by a fixed `[T; 2]` array. Indexable by
//! `PlayerId`, serializable, and cheap to clone for small `T`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One of the two players. Indices are 0-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Both players in seat order.
    pub const ALL: [PlayerId; 2] = [PlayerId(0), PlayerId(1)];

    /// Create a new player ID.
    ///
    /// Panics if `id` is not 0 or 1.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        assert!(id < 2, "PlayerId must be 0 or 1");
        Self(id)
    }

    /// Convert an untrusted seat number, rejecting anything but 0 and 1.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self(0)),
            1 => Some(Self(1)),
            _ => None,
        }
    }

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The other player.
    ///
    /// ```
    /// use lane_battle::core::PlayerId;
    ///
    /// assert_eq!(PlayerId::new(0).opponent(), PlayerId::new(1));
    /// assert_eq!(PlayerId::new(1).opponent(), PlayerId::new(0));
    /// ```
    #[must_use]
    pub const fn opponent(self) -> Self {
        Self(1 - self.0)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Per-player data storage with O(1) access.
///
/// ## Example
///
/// ```
/// use lane_battle::core::{PlayerId, PlayerMap};
///
/// let mut mana: PlayerMap<i32> = PlayerMap::with_value(0);
/// mana[PlayerId::new(1)] = 3;
///
/// assert_eq!(mana[PlayerId::new(0)], 0);
/// assert_eq!(mana[PlayerId::new(1)], 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: [T; 2],
}

impl<T> PlayerMap<T> {
    /// Create a new PlayerMap with values from a factory function.
    pub fn new(mut factory: impl FnMut(PlayerId) -> T) -> Self {
        Self {
            data: [factory(PlayerId(0)), factory(PlayerId(1))],
        }
    }

    /// Create a new PlayerMap with both entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            data: [value.clone(), value],
        }
    }

    /// Build from an explicit pair, player 0 first.
    pub fn from_pair(first: T, second: T) -> Self {
        Self { data: [first, second] }
    }

    /// Unwrap into `[player 0, player 1]`.
    pub fn into_array(self) -> [T; 2] {
        self.data
    }

    #[must_use]
    pub fn get(&self, player: PlayerId) -> &T {
        &self.data[player.index()]
    }

    pub fn get_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.data[player.index()]
    }

    /// Iterate over (PlayerId, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        PlayerId::ALL.into_iter().zip(self.data.iter())
    }

    /// Iterate over (PlayerId, &mut T) pairs.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        PlayerId::ALL.into_iter().zip(self.data.iter_mut())
    }

    /// Transform every entry, keeping the player association.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PlayerMap<U> {
        PlayerMap {
            data: [f(&self.data[0]), f(&self.data[1])],
        }
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        self.get_mut(player)
    }
}
