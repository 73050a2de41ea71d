//! Room members.

use chrono::{DateTime, Utc};
use minehub_protocol::PlayerId;
use serde::{Deserialize, Serialize};

use crate::config::PLAYER_COLORS;

/// A member of one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
    /// Safe cells this player uncovered in the current game.
    pub score: u32,
    /// `false` after hitting a mine, until the next reset.
    pub is_alive: bool,
    pub joined_at: DateTime<Utc>,
}

impl Player {
    /// Creates a fresh player. `seat` is the roster size before joining
    /// and picks the color.
    pub(crate) fn new(id: PlayerId, name: &str, seat: usize) -> Self {
        let name = name.trim();
        Self {
            id,
            name: if name.is_empty() {
                id.to_string()
            } else {
                name.to_string()
            },
            color: PLAYER_COLORS[seat % PLAYER_COLORS.len()].to_string(),
            score: 0,
            is_alive: true,
            joined_at: Utc::now(),
        }
    }

    pub(crate) fn revive(&mut self) {
        self.score = 0;
        self.is_alive = true;
    }
}

/// Roster sorted by score, highest first. Equal scores keep roster
/// order, so the first entry is also the winner.
pub fn standings(players: &[Player]) -> Vec<Player> {
    let mut sorted = players.to_vec();
    sorted.sort_by(|a, b| b.score.cmp(&a.score));
    sorted
}
