//! Room configuration and status state machine.

use minehub_board::{BoardError, validate_dimensions};
use serde::{Deserialize, Serialize};

/// Maximum number of chat messages a room keeps. Older ones are dropped
/// first.
pub const CHAT_HISTORY_LIMIT: usize = 100;

/// Colors handed out to players in join order, wrapping around.
pub const PLAYER_COLORS: [&str; 7] = [
    "#3b82f6", "#ef4444", "#10b981", "#f59e0b", "#8b5cf6", "#ec4899", "#06b6d4",
];

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Board settings for a room, fixed from creation until the next reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    pub rows: usize,
    pub cols: usize,
    pub mine_count: usize,

    /// Seeds the room's RNG. `None` draws a seed from the OS, which is
    /// what live rooms want; tests pin it to get reproducible boards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl RoomConfig {
    /// Shorthand for an unseeded config.
    pub fn new(rows: usize, cols: usize, mine_count: usize) -> Self {
        Self {
            rows,
            cols,
            mine_count,
            seed: None,
        }
    }

    /// Same config with a fixed RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Rejects configs no board can satisfy.
    pub fn validate(&self) -> Result<(), BoardError> {
        validate_dimensions(self.rows, self.cols, self.mine_count)
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self::new(10, 10, 15)
    }
}

// ---------------------------------------------------------------------------
// RoomStatus
// ---------------------------------------------------------------------------

/// Where a room is in its game.
///
/// ```text
/// Waiting ──first join──▶ Playing ──board cleared──▶ Won
///                            │
///                            └──everyone eliminated──▶ Lost
/// ```
///
/// Reset moves any status back to `Playing` (or `Waiting` if nobody is
/// in the room).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomStatus {
    Waiting,
    Playing,
    Won,
    Lost,
}

impl RoomStatus {
    /// Returns `true` if `self → target` is a legal transition.
    pub fn can_transition_to(self, target: Self) -> bool {
        use RoomStatus::*;
        match (self, target) {
            (Waiting, Playing) => true,
            (Playing, Won | Lost) => true,
            // Reset.
            (_, Playing | Waiting) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::Playing => write!(f, "Playing"),
            Self::Won => write!(f, "Won"),
            Self::Lost => write!(f, "Lost"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!((config.rows, config.cols, config.mine_count), (10, 10, 15));
        assert_eq!(config.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_room_config_validate_rejects_bad_boards() {
        assert!(RoomConfig::new(0, 10, 0).validate().is_err());
        assert!(RoomConfig::new(2, 2, 5).validate().is_err());
        assert!(RoomConfig::new(2, 2, 4).validate().is_ok());
    }

    #[test]
    fn test_room_config_validate_rejects_oversized_board() {
        assert_eq!(
            RoomConfig::new(1000, 1000, 10).validate(),
            Err(BoardError::InvalidDimensions {
                rows: 1000,
                cols: 1000
            })
        );
    }

    #[test]
    fn test_room_config_seed_is_optional_in_json() {
        let config: RoomConfig =
            serde_json::from_str(r#"{"rows":5,"cols":6,"mine_count":3}"#).unwrap();
        assert_eq!(config, RoomConfig::new(5, 6, 3));
    }

    #[test]
    fn test_room_status_can_transition_to() {
        use RoomStatus::*;
        assert!(Waiting.can_transition_to(Playing));
        assert!(Playing.can_transition_to(Won));
        assert!(Playing.can_transition_to(Lost));
        assert!(Won.can_transition_to(Playing));
        assert!(Lost.can_transition_to(Playing));
        assert!(!Waiting.can_transition_to(Won));
        assert!(!Won.can_transition_to(Lost));
        assert!(!Lost.can_transition_to(Won));
    }

    #[test]
    fn test_room_status_display() {
        assert_eq!(RoomStatus::Waiting.to_string(), "Waiting");
        assert_eq!(RoomStatus::Lost.to_string(), "Lost");
    }

    #[test]
    fn test_player_colors_are_distinct() {
        let mut colors = PLAYER_COLORS.to_vec();
        colors.sort_unstable();
        colors.dedup();
        assert_eq!(colors.len(), PLAYER_COLORS.len());
    }
}
