//! Error types for the persistence layer.

use warboard_protocol::{CharacterId, SessionId, UserId};

/// Errors reported by [`GameStore`](crate::GameStore) and
/// [`MapSource`](crate::MapSource) implementations.
///
/// The not-found variants are part of the engine's control flow (an
/// unknown user rejects the connection, an unknown session closes the
/// join attempt); [`Backend`](Self::Backend) covers everything a real
/// database can throw and is surfaced to clients as a generic error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No user with this id exists.
    #[error("user {0} not found")]
    UserNotFound(UserId),

    /// No session with this id exists.
    #[error("session {0} not found")]
    SessionNotFound(SessionId),

    /// No character with this id exists.
    #[error("character {0} not found")]
    CharacterNotFound(CharacterId),

    /// The underlying storage failed (connection lost, query error,
    /// poisoned lock, ...).
    #[error("storage backend error: {0}")]
    Backend(String),
}
