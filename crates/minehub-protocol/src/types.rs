//! Core protocol types for minehub's wire format.
//!
//! Everything in this module either names something (a player, a room, a
//! cell) or travels on the wire from a client to the server. Server →
//! client messages live next to the engine that produces them.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifies a player for the lifetime of one connection.
///
/// The transport hands out connection ids; the server reuses them as
/// player ids, so a player id is unique within a room but means nothing
/// after the connection closes.
///
/// `#[serde(transparent)]` makes `PlayerId(42)` serialize as plain `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Identifies a room. Supplied by the client (`"lobby"`, `"r1"`) or
/// generated by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Length of a generated id, in hex characters.
    pub const GENERATED_LEN: usize = 8;

    /// Wraps an externally supplied id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random id of [`Self::GENERATED_LEN`] lowercase
    /// hex characters (32 bits of entropy; plenty for short-lived rooms).
    pub fn generate() -> Self {
        use rand::Rng;
        let bytes: [u8; Self::GENERATED_LEN / 2] = rand::rng().random();
        Self(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RoomId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A cell position on a board, zero-based, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

// ---------------------------------------------------------------------------
// Recipient — who should receive an event?
// ---------------------------------------------------------------------------

/// Specifies which members of a room receive an outbound event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every member of the room.
    All,

    /// One specific member (e.g. the board snapshot sent on join).
    Player(PlayerId),
}

impl Recipient {
    /// Returns `true` if `player` is covered by this recipient.
    pub fn includes(&self, player: PlayerId) -> bool {
        match self {
            Self::All => true,
            Self::Player(p) => *p == player,
        }
    }
}

// ---------------------------------------------------------------------------
// ClientMessage — intents sent by clients
// ---------------------------------------------------------------------------

/// Everything a client can ask the server to do.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON, which is the
/// easiest shape to build from JavaScript:
///
/// ```text
/// { "type": "Reveal", "room_id": "r1", "row": 2, "col": 4 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    // -- Connection lifecycle --
    /// First message on every connection. `version` must equal
    /// [`PROTOCOL_VERSION`](crate::PROTOCOL_VERSION).
    Hello { version: u32 },

    /// "I'm still here." Answered with a `HeartbeatAck`.
    Heartbeat { client_time: u64 },

    /// "I'm disconnecting." The server closes the connection.
    Disconnect { reason: String },

    // -- Room membership --
    /// Join a room by id, creating it with default settings if needed.
    JoinRoom { room_id: RoomId, name: String },

    /// Leave a room explicitly (disconnect leaves every joined room).
    LeaveRoom { room_id: RoomId },

    /// Create a room without joining it. A missing `room_id` is
    /// generated; missing board settings take the server defaults.
    CreateRoom {
        room_id: Option<RoomId>,
        rows: Option<usize>,
        cols: Option<usize>,
        mine_count: Option<usize>,
    },

    /// Ask for one room's summary.
    GetRoom { room_id: RoomId },

    /// Ask for a summary of every live room.
    ListRooms,

    // -- Game intents --
    /// Reveal the cell at `(row, col)`.
    Reveal { room_id: RoomId, row: usize, col: usize },

    /// Toggle the flag on the cell at `(row, col)`.
    ToggleFlag { room_id: RoomId, row: usize, col: usize },

    /// Regenerate the board, keeping the roster.
    ResetGame { room_id: RoomId },

    /// Post a chat line to the room.
    SendMessage { room_id: RoomId, text: String },
}

// ---------------------------------------------------------------------------
// Envelope — the top-level wire format
// ---------------------------------------------------------------------------

/// The top-level message wrapper. Every frame on the wire is an
/// `Envelope<ClientMessage>` (inbound) or an envelope around a server
/// message (outbound).
///
/// ```text
/// ┌─────────────────────────────┐
/// │ seq: 42                     │  ← per-direction counter
/// │ timestamp: 15000            │  ← ms since connection start
/// │ body: { "type": "Reveal" …} │  ← the actual content
/// └─────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Auto-incrementing sequence number, maintained by each side.
    pub seq: u64,

    /// Milliseconds since the sender's connection started.
    #[serde(default)]
    pub timestamp: u64,

    /// The message content.
    pub body: T,
}

// =========================================================================
// Tests
// =========================================================================
