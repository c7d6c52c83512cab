//! The persistence collaborator interface.

use std::future::Future;

use warboard_protocol::{CharacterId, MapId, SessionId, UserId};
use warboard_rules::{Character, NewCharacter};

use crate::{SessionRecord, StoreError, User};

/// Durable storage for users, sessions, and characters.
///
/// Every method returns a `Send` future so implementations can be driven
/// from inside spawned session actors (Tokio may poll them on any worker
/// thread). Calls are treated as blocking I/O by the engine: they are the
/// only suspension points inside a session's exclusive section.
///
/// Implementations must be cheap to share (`&self` methods, typically a
/// connection pool or a mutex-guarded map inside).
pub trait GameStore: Send + Sync + 'static {
    /// Looks up a user account. Unknown ids reject the connection
    /// attempt at join time.
    fn get_user_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<User, StoreError>> + Send;

    /// Loads a session record. Unknown ids fail session spin-up.
    fn get_session_by_id(
        &self,
        id: SessionId,
    ) -> impl Future<Output = Result<SessionRecord, StoreError>> + Send;

    /// Creates a new session on the given map. The store assigns the id.
    fn add_session(
        &self,
        map_id: MapId,
        started_at: u64,
    ) -> impl Future<Output = Result<SessionRecord, StoreError>> + Send;

    /// Flips the session's active flag (engine spin-up and teardown).
    fn set_session_active(
        &self,
        id: SessionId,
        active: bool,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Writes back a full session record (final turn holder at teardown).
    fn update_session(
        &self,
        record: SessionRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Loads a single character.
    fn get_character_by_id(
        &self,
        id: CharacterId,
    ) -> impl Future<Output = Result<Character, StoreError>> + Send;

    /// Loads every character a user owns inside one session, in creation
    /// order. Used to attach existing characters on join.
    fn get_all_characters_of_user_in_session(
        &self,
        user_id: UserId,
        session_id: SessionId,
    ) -> impl Future<Output = Result<Vec<Character>, StoreError>> + Send;

    /// Persists a new character. The store assigns the id and returns the
    /// complete entity (derived attributes included).
    fn add_character(
        &self,
        new: NewCharacter,
    ) -> impl Future<Output = Result<Character, StoreError>> + Send;

    /// Writes back a character's mutable state (health, mana, defeated).
    fn update_character(
        &self,
        character: &Character,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Deletes a character.
    fn delete_character_by_id(
        &self,
        id: CharacterId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Persists a position change without rewriting the whole character.
    fn move_character(
        &self,
        id: CharacterId,
        row: u32,
        col: u32,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
