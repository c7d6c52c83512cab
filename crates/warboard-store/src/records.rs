//! Persistence record shapes.

use serde::{Deserialize, Serialize};
use warboard_protocol::{MapId, SessionId, UserId};

/// A registered player account. Registration and authentication happen
/// outside the session server; the engine only ever *looks up* users to
/// validate incoming connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

/// The durable shape of a game session.
///
/// The live engine owns a richer in-memory version (connections, turn
/// order, loaded characters); this record is what survives between the
/// last disconnect and the next join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub map_id: MapId,
    /// Unix timestamp (seconds) of session creation.
    pub started_at: u64,
    /// True while at least one connection is attached to the live engine.
    pub active: bool,
    /// The turn holder persisted at teardown, restored on the next spin-up.
    pub turn: Option<UserId>,
}
