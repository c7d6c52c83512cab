//! Unified error type for the Warboard server.

use warboard_engine::EngineError;
use warboard_protocol::ProtocolError;
use warboard_store::StoreError;
use warboard_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `warboard` meta-crate you deal with this single type;
/// the `#[from]` attributes let `?` convert sub-crate errors
/// automatically.
#[derive(Debug, thiserror::Error)]
pub enum WarboardError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session engine error (rules, turn order, lifecycle).
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A persistence error outside the engine's control flow.
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use warboard_protocol::UserId;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::SendFailed("gone".into());
        let top: WarboardError = err.into();
        assert!(matches!(top, WarboardError::Transport(_)));
        assert!(top.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let top: WarboardError = err.into();
        assert!(matches!(top, WarboardError::Protocol(_)));
    }

    #[test]
    fn test_from_engine_error() {
        let err = EngineError::UnknownUser(UserId(9));
        let top: WarboardError = err.into();
        assert!(matches!(top, WarboardError::Engine(_)));
    }

    #[test]
    fn test_from_store_error() {
        let err = StoreError::Backend("db down".into());
        let top: WarboardError = err.into();
        assert!(matches!(top, WarboardError::Store(_)));
    }
}
