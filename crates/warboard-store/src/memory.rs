//! In-memory reference implementation of the persistence interface.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use warboard_protocol::{CharacterId, MapId, SessionId, UserId};
use warboard_rules::{Character, NewCharacter};

use crate::{GameStore, SessionRecord, StoreError, User};

/// A [`GameStore`] backed by mutex-guarded maps.
///
/// Used by the demo server and the test suites. Ids are assigned
/// monotonically; character iteration order is creation order, matching
/// what a database's auto-increment primary key would give.
///
/// The mutex is never held across an await point (every operation locks,
/// mutates, and releases synchronously), so the async trait methods are
/// suspension points in name only here. A database-backed store would
/// actually suspend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, User>,
    sessions: HashMap<SessionId, SessionRecord>,
    // BTreeMap: ids are monotonic, so in-order iteration is creation order.
    characters: BTreeMap<CharacterId, Character>,
    next_user: u64,
    next_session: u64,
    next_character: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user account. Registration lives outside the session
    /// server, so this is a seeding helper rather than a `GameStore`
    /// method.
    pub fn add_user(&self, name: &str) -> Result<User, StoreError> {
        let mut inner = self.lock()?;
        inner.next_user += 1;
        let user = User {
            id: UserId(inner.next_user),
            name: name.to_owned(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("store mutex poisoned".into()))
    }
}

impl GameStore for MemoryStore {
    async fn get_user_by_id(&self, id: UserId) -> Result<User, StoreError> {
        self.lock()?
            .users
            .get(&id)
            .cloned()
            .ok_or(StoreError::UserNotFound(id))
    }

    async fn get_session_by_id(
        &self,
        id: SessionId,
    ) -> Result<SessionRecord, StoreError> {
        self.lock()?
            .sessions
            .get(&id)
            .copied()
            .ok_or(StoreError::SessionNotFound(id))
    }

    async fn add_session(
        &self,
        map_id: MapId,
        started_at: u64,
    ) -> Result<SessionRecord, StoreError> {
        let mut inner = self.lock()?;
        inner.next_session += 1;
        let record = SessionRecord {
            id: SessionId(inner.next_session),
            map_id,
            started_at,
            active: false,
            turn: None,
        };
        inner.sessions.insert(record.id, record);
        tracing::debug!(session_id = %record.id, %map_id, "session stored");
        Ok(record)
    }

    async fn set_session_active(
        &self,
        id: SessionId,
        active: bool,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let record = inner
            .sessions
            .get_mut(&id)
            .ok_or(StoreError::SessionNotFound(id))?;
        record.active = active;
        Ok(())
    }

    async fn update_session(&self, record: SessionRecord) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if !inner.sessions.contains_key(&record.id) {
            return Err(StoreError::SessionNotFound(record.id));
        }
        inner.sessions.insert(record.id, record);
        Ok(())
    }

    async fn get_character_by_id(
        &self,
        id: CharacterId,
    ) -> Result<Character, StoreError> {
        self.lock()?
            .characters
            .get(&id)
            .cloned()
            .ok_or(StoreError::CharacterNotFound(id))
    }

    async fn get_all_characters_of_user_in_session(
        &self,
        user_id: UserId,
        session_id: SessionId,
    ) -> Result<Vec<Character>, StoreError> {
        Ok(self
            .lock()?
            .characters
            .values()
            .filter(|c| c.user_id == user_id && c.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn add_character(&self, new: NewCharacter) -> Result<Character, StoreError> {
        let mut inner = self.lock()?;
        inner.next_character += 1;
        let character = Character::create(CharacterId(inner.next_character), new);
        inner.characters.insert(character.id, character.clone());
        tracing::debug!(character_id = %character.id, "character stored");
        Ok(character)
    }

    async fn update_character(&self, character: &Character) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let slot = inner
            .characters
            .get_mut(&character.id)
            .ok_or(StoreError::CharacterNotFound(character.id))?;
        *slot = character.clone();
        Ok(())
    }

    async fn delete_character_by_id(&self, id: CharacterId) -> Result<(), StoreError> {
        self.lock()?
            .characters
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::CharacterNotFound(id))
    }

    async fn move_character(
        &self,
        id: CharacterId,
        row: u32,
        col: u32,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let character = inner
            .characters
            .get_mut(&id)
            .ok_or(StoreError::CharacterNotFound(id))?;
        character.position.row = row;
        character.position.col = col;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warboard_protocol::BaseAttributes;
    use warboard_rules::Position;

    fn new_char(user: UserId, session: SessionId) -> NewCharacter {
        NewCharacter {
            user_id: user,
            session_id: session,
            name: "Brynn".into(),
            avatar_id: None,
            position: Position::new(1, 1),
            base: BaseAttributes::default(),
        }
    }

    #[tokio::test]
    async fn test_add_user_assigns_monotonic_ids() {
        let store = MemoryStore::new();
        let alice = store.add_user("alice").unwrap();
        let bob = store.add_user("bob").unwrap();
        assert_eq!(alice.id, UserId(1));
        assert_eq!(bob.id, UserId(2));
        assert_eq!(store.get_user_by_id(alice.id).await.unwrap().name, "alice");
    }

    #[tokio::test]
    async fn test_get_unknown_user_fails() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.get_user_by_id(UserId(9)).await,
            Err(StoreError::UserNotFound(UserId(9)))
        ));
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let store = MemoryStore::new();
        let record = store.add_session(MapId(1), 1700000000).await.unwrap();
        assert!(!record.active);

        store.set_session_active(record.id, true).await.unwrap();
        assert!(store.get_session_by_id(record.id).await.unwrap().active);

        let updated = SessionRecord {
            turn: Some(UserId(2)),
            active: false,
            ..record
        };
        store.update_session(updated).await.unwrap();
        let loaded = store.get_session_by_id(record.id).await.unwrap();
        assert_eq!(loaded.turn, Some(UserId(2)));
        assert!(!loaded.active);
    }

    #[tokio::test]
    async fn test_character_crud_and_per_user_query() {
        let store = MemoryStore::new();
        let session = store.add_session(MapId(1), 0).await.unwrap();

        let c1 = store
            .add_character(new_char(UserId(1), session.id))
            .await
            .unwrap();
        let c2 = store
            .add_character(new_char(UserId(1), session.id))
            .await
            .unwrap();
        let _other = store
            .add_character(new_char(UserId(2), session.id))
            .await
            .unwrap();

        let mine = store
            .get_all_characters_of_user_in_session(UserId(1), session.id)
            .await
            .unwrap();
        assert_eq!(
            mine.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![c1.id, c2.id],
            "creation order"
        );

        store.move_character(c1.id, 5, 6).await.unwrap();
        let moved = store.get_character_by_id(c1.id).await.unwrap();
        assert_eq!((moved.position.row, moved.position.col), (5, 6));

        store.delete_character_by_id(c2.id).await.unwrap();
        assert!(store.get_character_by_id(c2.id).await.is_err());
    }

    #[tokio::test]
    async fn test_update_character_writes_back_pools() {
        let store = MemoryStore::new();
        let session = store.add_session(MapId(1), 0).await.unwrap();
        let mut c = store
            .add_character(new_char(UserId(1), session.id))
            .await
            .unwrap();

        c.apply_damage(30);
        c.spend_mana(10);
        store.update_character(&c).await.unwrap();

        let loaded = store.get_character_by_id(c.id).await.unwrap();
        assert_eq!(loaded.health, c.health);
        assert_eq!(loaded.mana, c.mana);
    }
}
