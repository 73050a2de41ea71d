//! Wire protocol for minehub.
//!
//! This crate defines the "language" that clients and the game server
//! speak:
//!
//! - **Types** ([`PlayerId`], [`RoomId`], [`Coord`], [`ClientMessage`],
//!   [`Envelope`]) — identities and intents that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the room
//! engine. It doesn't know about connections or boards — it only knows
//! how to name things and how to serialize them.
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope<ClientMessage>) → Room registry
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{ClientMessage, Coord, Envelope, PlayerId, Recipient, RoomId};

/// The current protocol version. Clients must announce it in their
/// `Hello` or be rejected.
pub const PROTOCOL_VERSION: u32 = 1;
