//! The per-room game state machine.
//!
//! [`Room`] is plain synchronous data: every method runs to completion
//! and either applies its change or returns an error with the state
//! untouched. The actor in [`room`](crate::room) owns one `Room` and
//! feeds it commands one at a time, which is all the locking it needs.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use minehub_board::{Board, BoardSnapshot, RevealOutcome, generate, reveal};
use minehub_protocol::{Coord, PlayerId, RoomId};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::player::standings;
use crate::{ChatLog, ChatMessage, Player, RoomConfig, RoomError, RoomStatus};

/// Result of a successful reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealReport {
    pub player_id: PlayerId,
    pub outcome: RevealOutcome,
    /// The acting player's score after the reveal.
    pub score: u32,
    /// The acting player hit a mine and is out until reset.
    pub eliminated: bool,
    /// Set when this reveal ended the game.
    pub finished: Option<GameSummary>,
}

/// Result of a successful leave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub player: Player,
    /// Players still in the room.
    pub remaining: usize,
    /// Set when the leaver was the last player alive.
    pub finished: Option<GameSummary>,
}

/// Final state of a finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub status: RoomStatus,
    /// Top scorer on a win, `None` on a loss.
    pub winner_id: Option<PlayerId>,
    /// Roster by score, highest first.
    pub standings: Vec<Player>,
    /// Every mine on the board. The game is over, so nothing is secret.
    pub mines: Vec<Coord>,
}

/// Everything a newly joined client needs to draw the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub status: RoomStatus,
    pub board: BoardSnapshot,
    pub players: Vec<Player>,
    pub messages: Vec<ChatMessage>,
    pub winner_id: Option<PlayerId>,
    pub created_at: DateTime<Utc>,
}

/// One line of the room list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub status: RoomStatus,
    pub player_count: usize,
    pub rows: usize,
    pub cols: usize,
    pub mine_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Authoritative state of one room: board, roster, chat, status.
///
/// Rules:
/// - The first join moves a `Waiting` room to `Playing`.
/// - Revealing a safe region adds its size to the player's score.
///   Clearing the last safe cell wins the game for the top scorer (ties
///   go to whoever joined first).
/// - Revealing a mine eliminates only the acting player. The game is
///   lost once nobody is left alive.
/// - Eliminated players can't reveal or flag but can still chat.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    config: RoomConfig,
    board: Board,
    players: Vec<Player>,
    chat: ChatLog,
    status: RoomStatus,
    created_at: DateTime<Utc>,
    winner_id: Option<PlayerId>,
    rng: StdRng,
}

impl Room {
    /// Creates an empty `Waiting` room with a freshly generated board.
    ///
    /// With `config.seed` set, the first board is exactly
    /// `generate(rows, cols, mine_count, &mut StdRng::seed_from_u64(seed))`.
    pub fn new(id: RoomId, config: RoomConfig) -> Result<Self, RoomError> {
        config.validate().map_err(RoomError::InvalidConfig)?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let board = generate(config.rows, config.cols, config.mine_count, &mut rng)
            .map_err(RoomError::InvalidConfig)?;

        Ok(Self {
            id,
            config,
            board,
            players: Vec::new(),
            chat: ChatLog::new(),
            status: RoomStatus::Waiting,
            created_at: Utc::now(),
            winner_id: None,
            rng,
        })
    }

    // -- Accessors --

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Roster in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub fn winner_id(&self) -> Option<PlayerId> {
        self.winner_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // -- Roster --

    /// Adds a player with score 0 and the next palette color. Starts the
    /// game if the room was waiting.
    pub fn add_player(&mut self, id: PlayerId, name: &str) -> Result<Player, RoomError> {
        if self.player(id).is_some() {
            return Err(RoomError::AlreadyInRoom(id, self.id.clone()));
        }

        let player = Player::new(id, name, self.players.len());
        self.players.push(player.clone());

        if self.status == RoomStatus::Waiting {
            self.set_status(RoomStatus::Playing);
            tracing::info!(room_id = %self.id, "game started");
        }
        Ok(player)
    }

    /// Removes a player. If everyone left behind is already eliminated,
    /// the game ends as lost.
    pub fn remove_player(&mut self, id: PlayerId) -> Result<Departure, RoomError> {
        let index = self
            .players
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| RoomError::PlayerNotFound(id, self.id.clone()))?;
        let player = self.players.remove(index);

        let finished = (self.status == RoomStatus::Playing
            && !self.players.is_empty()
            && self.players.iter().all(|p| !p.is_alive))
        .then(|| self.finish(RoomStatus::Lost));

        Ok(Departure {
            player,
            remaining: self.players.len(),
            finished,
        })
    }

    // -- Moves --

    /// Reveals `at` for `player_id` and applies scoring, elimination and
    /// the win/loss check.
    pub fn reveal(&mut self, player_id: PlayerId, at: Coord) -> Result<RevealReport, RoomError> {
        self.ensure_playing()?;
        let index = self.active_player(player_id)?;
        self.board
            .check_revealable(at)
            .map_err(RoomError::InvalidMove)?;

        let outcome = reveal(&mut self.board, at, player_id);

        let player = &mut self.players[index];
        if outcome.hit_mine {
            player.is_alive = false;
            tracing::info!(room_id = %self.id, %player_id, cell = %at, "player eliminated");
        } else {
            let gained = u32::try_from(outcome.safe_count()).unwrap_or(u32::MAX);
            player.score = player.score.saturating_add(gained);
        }
        let score = player.score;
        let eliminated = outcome.hit_mine;

        let finished = if eliminated && self.players.iter().all(|p| !p.is_alive) {
            Some(self.finish(RoomStatus::Lost))
        } else if !eliminated && self.board.is_cleared() {
            Some(self.finish(RoomStatus::Won))
        } else {
            None
        };

        Ok(RevealReport {
            player_id,
            outcome,
            score,
            eliminated,
            finished,
        })
    }

    /// Flips the flag at `at`. Returns the new flag state.
    pub fn toggle_flag(&mut self, player_id: PlayerId, at: Coord) -> Result<bool, RoomError> {
        self.ensure_playing()?;
        self.active_player(player_id)?;
        self.board.toggle_flag(at).map_err(RoomError::InvalidMove)
    }

    /// Starts a new game with the same dimensions and roster.
    pub fn reset(&mut self) -> Result<(), RoomError> {
        let RoomConfig {
            rows,
            cols,
            mine_count,
            ..
        } = self.config;
        self.board =
            generate(rows, cols, mine_count, &mut self.rng).map_err(RoomError::InvalidConfig)?;

        for player in &mut self.players {
            player.revive();
        }
        self.winner_id = None;
        self.set_status(if self.players.is_empty() {
            RoomStatus::Waiting
        } else {
            RoomStatus::Playing
        });

        tracing::info!(room_id = %self.id, status = %self.status, "game reset");
        Ok(())
    }

    // -- Chat --

    /// Appends a chat line from a member. Allowed in any status.
    pub fn add_message(&mut self, author: PlayerId, text: &str) -> Result<ChatMessage, RoomError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RoomError::EmptyMessage);
        }
        let player = self
            .player(author)
            .ok_or_else(|| RoomError::PlayerNotFound(author, self.id.clone()))?;

        let message = ChatMessage::new(player, text.to_string());
        self.chat.push(message.clone());
        Ok(message)
    }

    // -- Views --

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.id.clone(),
            status: self.status,
            board: self.board.snapshot(),
            players: self.players.clone(),
            messages: self.chat.to_vec(),
            winner_id: self.winner_id,
            created_at: self.created_at,
        }
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            room_id: self.id.clone(),
            status: self.status,
            player_count: self.players.len(),
            rows: self.board.rows(),
            cols: self.board.cols(),
            mine_count: self.board.mine_count(),
            created_at: self.created_at,
        }
    }

    /// Roster by score, highest first.
    pub fn standings(&self) -> Vec<Player> {
        standings(&self.players)
    }

    // -- Internals --

    fn ensure_playing(&self) -> Result<(), RoomError> {
        if self.status != RoomStatus::Playing {
            return Err(RoomError::InvalidState {
                room_id: self.id.clone(),
                status: self.status,
            });
        }
        Ok(())
    }

    /// Index of a member who is still alive.
    fn active_player(&self, id: PlayerId) -> Result<usize, RoomError> {
        let index = self
            .players
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| RoomError::PlayerNotFound(id, self.id.clone()))?;
        if !self.players[index].is_alive {
            return Err(RoomError::PlayerEliminated(id));
        }
        Ok(index)
    }

    fn finish(&mut self, status: RoomStatus) -> GameSummary {
        self.set_status(status);
        self.winner_id = if status == RoomStatus::Won {
            self.players
                .iter()
                .min_by_key(|p| Reverse(p.score))
                .map(|p| p.id)
        } else {
            None
        };

        tracing::info!(
            room_id = %self.id,
            %status,
            winner = ?self.winner_id,
            "game finished"
        );

        GameSummary {
            status,
            winner_id: self.winner_id,
            standings: self.standings(),
            mines: self.board.mines(),
        }
    }

    fn set_status(&mut self, next: RoomStatus) {
        debug_assert!(
            self.status.can_transition_to(next),
            "illegal transition {} -> {}",
            self.status,
            next
        );
        self.status = next;
    }

    #[cfg(test)]
    pub(crate) fn with_board(id: RoomId, board: Board) -> Self {
        let config = RoomConfig::new(board.rows(), board.cols(), board.mine_count()).with_seed(0);
        Self {
            id,
            config,
            board,
            players: Vec::new(),
            chat: ChatLog::new(),
            status: RoomStatus::Waiting,
            created_at: Utc::now(),
            winner_id: None,
            rng: StdRng::seed_from_u64(0),
        }
    }
}
