//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The server loop only needs something that implements [`Codec`]; the
//! concrete format is chosen once, at build time.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because a single codec instance is shared by
/// every connection task the server spawns.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Browser clients speak JSON natively, so this is the default. It sits
/// behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use minehub_protocol::{ClientMessage, Codec, Envelope, JsonCodec};
///
/// let codec = JsonCodec;
///
/// let envelope = Envelope {
///     seq: 1,
///     timestamp: 5000,
///     body: ClientMessage::Heartbeat { client_time: 5000 },
/// };
///
/// let bytes = codec.encode(&envelope).unwrap();
/// let decoded: Envelope<ClientMessage> = codec.decode(&bytes).unwrap();
/// assert_eq!(envelope, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientMessage, Envelope, RoomId};

    #[test]
    fn test_json_codec_decodes_client_intent() {
        let raw = br#"{"seq":3,"timestamp":0,"body":{"type":"Reveal","room_id":"r1","row":2,"col":4}}"#;
        let env: Envelope<ClientMessage> = JsonCodec.decode(raw).unwrap();

        assert_eq!(env.seq, 3);
        assert_eq!(
            env.body,
            ClientMessage::Reveal {
                room_id: RoomId::from("r1"),
                row: 2,
                col: 4,
            }
        );
    }

    #[test]
    fn test_json_codec_decode_garbage_is_decode_error() {
        let result: Result<Envelope<ClientMessage>, _> = JsonCodec.decode(b"not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_rejects_negative_coordinates() {
        // Coordinates are unsigned on the wire; a negative row never
        // reaches the engine.
        let raw = br#"{"seq":1,"timestamp":0,"body":{"type":"Reveal","room_id":"r1","row":-1,"col":0}}"#;
        let result: Result<Envelope<ClientMessage>, _> = JsonCodec.decode(raw);
        assert!(result.is_err());
    }
}
