//! Room lifecycle and game rules for minehub.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! board, roster, and chat log. All mutations of one room go through its
//! command channel, so they are applied one at a time in arrival order
//! while different rooms run in parallel.
//!
//! # Key types
//!
//! - [`Room`] — the synchronous state machine: join, reveal, flag, chat, reset
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`RoomRegistry`] — creates rooms on demand, routes intents, evicts empty rooms
//! - [`RoomEvent`] — what members are told after each change
//! - [`RoomStatus`] — `Waiting → Playing → {Won, Lost}`
//! - [`RoomConfig`] — board dimensions, mine count, optional seed

mod chat;
mod config;
mod error;
mod event;
mod player;
mod registry;
mod room;
mod state;

pub use chat::{ChatLog, ChatMessage};
pub use config::{CHAT_HISTORY_LIMIT, PLAYER_COLORS, RoomConfig, RoomStatus};
pub use error::{ErrorKind, RoomError};
pub use event::{RoomEvent, RoomOutbound};
pub use player::{Player, standings};
pub use registry::{DEFAULT_CHANNEL_SIZE, RoomRegistry};
pub use room::{PlayerSender, RoomHandle};
pub use state::{Departure, GameSummary, RevealReport, Room, RoomSnapshot, RoomSummary};
