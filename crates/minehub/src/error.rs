//! Unified error type for minehub.

use minehub_protocol::ProtocolError;
use minehub_room::RoomError;
use minehub_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impl, so
/// `?` converts sub-crate errors automatically. Board errors reach this
/// level wrapped in [`RoomError`].
#[derive(Debug, thiserror::Error)]
pub enum MinehubError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, bad handshake).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, invalid state, bad move).
    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use minehub_protocol::RoomId;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let err: MinehubError = err.into();
        assert!(matches!(err, MinehubError::Transport(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err: MinehubError = ProtocolError::InvalidMessage("bad".into()).into();
        assert!(matches!(err, MinehubError::Protocol(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err: MinehubError = RoomError::NotFound(RoomId::from("r1")).into();
        assert!(matches!(err, MinehubError::Room(_)));
        assert_eq!(err.to_string(), "room r1 not found");
    }
}
