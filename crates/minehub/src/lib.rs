//! # minehub
//!
//! Multiplayer minesweeper server. Any number of rooms run side by side,
//! each with its own board, roster, and chat; clients connect over
//! WebSocket, join rooms by id, and receive every change as it happens.
//!
//! The layers, bottom up:
//!
//! - [`minehub_protocol`] — ids, client intents, envelopes, codecs
//! - [`minehub_board`] — board generation and the reveal algorithm
//! - [`minehub_room`] — room state machine, room actors, registry
//! - [`minehub_transport`] — WebSocket transport
//! - this crate — server builder, accept loop, per-connection handler
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use minehub::prelude::*;
//!
//! # async fn run() -> Result<(), MinehubError> {
//! let server = Server::builder()
//!     .bind("0.0.0.0:8080")
//!     .room_defaults(RoomConfig::new(16, 16, 40))
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod message;
mod server;

pub use error::MinehubError;
pub use message::{ServerMessage, error_code};
pub use server::{HANDSHAKE_TIMEOUT, IDLE_TIMEOUT, Server, ServerBuilder, ServerHandle};

pub use minehub_board as board;
pub use minehub_protocol as protocol;
pub use minehub_room as room;
pub use minehub_transport as transport;

/// Everything needed to run a server or write a client test.
pub mod prelude {
    pub use crate::{MinehubError, Server, ServerBuilder, ServerHandle, ServerMessage};
    pub use minehub_board::{BoardSnapshot, CellView, RevealedCell};
    pub use minehub_protocol::{
        ClientMessage, Codec, Coord, Envelope, JsonCodec, PROTOCOL_VERSION, PlayerId, RoomId,
    };
    pub use minehub_room::{
        ChatMessage, GameSummary, Player, RoomConfig, RoomEvent, RoomRegistry, RoomSnapshot,
        RoomStatus, RoomSummary,
    };
}
