//! Errors surfaced to callers.
//!
//! Rule-level mistakes (unknown card, full lane, out-of-range lane) are not
//! errors: they are skipped and logged. Only restoring or encoding a
//! snapshot can fail.

use thiserror::Error;

use super::config::LANE_COUNT;

/// Failure while encoding, decoding, or restoring a game snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] bincode::Error),

    #[error("snapshot has {found} lanes, expected {}", LANE_COUNT)]
    LaneCount { found: usize },

    #[error("lane at position {position} is numbered {number}")]
    LaneNumber { position: usize, number: usize },

    #[error("character {character} in lane {lane} is listed under player {listed} but owned by player {owner}")]
    OwnerMismatch {
        lane: usize,
        character: u32,
        listed: u8,
        owner: u8,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            SnapshotError::LaneCount { found: 2 }.to_string(),
            "snapshot has 2 lanes, expected 3"
        );
        assert_eq!(
            SnapshotError::LaneNumber { position: 1, number: 2 }.to_string(),
            "lane at position 1 is numbered 2"
        );
    }
}
