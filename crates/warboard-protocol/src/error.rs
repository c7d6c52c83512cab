//! Error types for the protocol layer.
//!
//! Protocol errors are deliberately untyped from the game's point of view:
//! a message that fails to decode never reaches the engine, and the client
//! gets back a generic error envelope with no reason code. The typed rule
//! failures (`big_dist`, `not_your_turn`, ...) live in `warboard-rules`.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, an unknown or missing
    /// `type` tag, a missing required field, or a wrong field type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but is invalid at the protocol level, e.g. a
    /// command sent before `session:join`.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
