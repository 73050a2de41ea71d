//! Error types for the protocol layer.
//!
//! Each crate in minehub defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in (de)serialization or in
//! the shape of a message, not in networking or game rules.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, an
    /// unknown `type` tag, or a negative coordinate.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message parsed but violates protocol rules — e.g. a `Hello`
    /// with the wrong version, or an intent sent before `Hello`.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
