//! Error types for the session engine.

use warboard_protocol::{CharacterId, SessionId, UserId};
use warboard_rules::ActionError;
use warboard_store::StoreError;

/// Every way a session engine operation can fail.
///
/// Two tiers, mirrored by the error envelope on the wire:
/// - [`Action`](Self::Action) wraps the typed rule failures and carries a
///   machine-readable reason code ([`reason`](Self::reason));
/// - everything else is a rejection or an internal failure with a human
///   message only.
///
/// None of these abort the connection or the session; the message router
/// turns them into an error envelope for the originating connection.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A game rule rejected the action (wrong turn, out of range, ...).
    #[error(transparent)]
    Action(#[from] ActionError),

    /// The joining user does not exist in persistence.
    #[error("unknown user {0}")]
    UnknownUser(UserId),

    /// No session with this id exists in persistence.
    #[error("session {0} not found")]
    SessionNotFound(SessionId),

    /// The referenced character is not part of this session.
    #[error("unknown character {0}")]
    UnknownCharacter(CharacterId),

    /// The character exists but belongs to someone else.
    #[error("character {0} does not belong to user {1}")]
    NotOwner(CharacterId, UserId),

    /// The acting user has no connection to this session.
    #[error("user {0} is not connected to this session")]
    NotConnected(UserId),

    /// The session actor has shut down (last player left while this
    /// operation was in flight). Callers should treat the session as gone.
    #[error("session is closed")]
    SessionClosed,

    /// The persistence collaborator failed. Logged server-side; clients
    /// see a generic error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// The machine-readable reason code for the error envelope, present
    /// only for typed rule failures.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Self::Action(e) => Some(e.code()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_errors_carry_reason_codes() {
        let err = EngineError::from(ActionError::NotYourTurn);
        assert_eq!(err.reason(), Some("not_your_turn"));
    }

    #[test]
    fn test_other_errors_have_no_reason_code() {
        assert_eq!(EngineError::UnknownUser(UserId(1)).reason(), None);
        assert_eq!(EngineError::SessionClosed.reason(), None);
        let store_err = EngineError::from(StoreError::Backend("db down".into()));
        assert_eq!(store_err.reason(), None);
    }
}
