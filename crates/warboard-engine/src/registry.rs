//! The session registry: session ids to live engines.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use warboard_protocol::SessionId;
use warboard_store::{GameStore, MapSource, SessionRecord, StoreError};

use crate::session::spawn_session;
use crate::{ConnectionId, EngineConfig, EngineError, SessionHandle};

/// Owns the map from session id to running session actor.
///
/// Sessions are created lazily: the first connection for an id loads the
/// session record from the store and spawns the actor; later connections
/// get the same handle. When the last connection leaves, the registry
/// persists the final state and discards the actor.
///
/// The internal mutex guards only this id-to-handle map and is held
/// across the store load in `get_or_create` precisely so that two
/// concurrent first-connections cannot spawn two actors: the loser waits
/// on the lock and then finds the winner's handle. Per-session state is
/// never behind this lock, so sessions stay parallel to each other.
pub struct SessionRegistry<S: GameStore, M: MapSource> {
    sessions: Mutex<HashMap<SessionId, SessionHandle>>,
    store: Arc<S>,
    map: Arc<M>,
    config: EngineConfig,
}

impl<S: GameStore, M: MapSource> SessionRegistry<S, M> {
    pub fn new(store: Arc<S>, map: Arc<M>, config: EngineConfig) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            store,
            map,
            config,
        }
    }

    /// Returns the live engine for `session_id`, spawning one from the
    /// persisted record if none is running.
    ///
    /// # Errors
    /// [`EngineError::SessionNotFound`] when the session does not exist
    /// in persistence; callers close the connection attempt.
    pub async fn get_or_create(
        &self,
        session_id: SessionId,
    ) -> Result<SessionHandle, EngineError> {
        let mut sessions = self.sessions.lock().await;
        if let Some(handle) = sessions.get(&session_id) {
            return Ok(handle.clone());
        }

        let record = self
            .store
            .get_session_by_id(session_id)
            .await
            .map_err(|e| match e {
                StoreError::SessionNotFound(id) => EngineError::SessionNotFound(id),
                other => EngineError::Store(other),
            })?;

        let handle = spawn_session(
            record,
            Arc::clone(&self.store),
            Arc::clone(&self.map),
            self.config.clone(),
        );
        sessions.insert(session_id, handle.clone());
        tracing::info!(%session_id, "session engine created");
        Ok(handle)
    }

    /// Removes a connection from its session and, if it was the last one,
    /// releases the session: persists the final record (turn holder,
    /// active = false) and stops the actor.
    ///
    /// Safe to call more than once per connection; duplicate disconnects
    /// and disconnects for already-released sessions are no-ops.
    pub async fn disconnect(&self, session_id: SessionId, connection_id: ConnectionId) {
        let mut sessions = self.sessions.lock().await;
        let Some(handle) = sessions.get(&session_id) else {
            return;
        };

        let ack = match handle.finish_connection(connection_id).await {
            Ok(ack) => ack,
            // Actor already gone; just drop the stale entry.
            Err(_) => {
                sessions.remove(&session_id);
                return;
            }
        };

        if ack.remaining > 0 {
            return;
        }

        // Last one out: persist and tear down. A joiner that raced past
        // `get_or_create` before we took the lock will get SessionClosed
        // from the stopped actor and retry through the registry.
        let handle = sessions
            .remove(&session_id)
            .expect("handle was present above");
        handle.shutdown().await;
        self.persist_final_state(ack.record).await;
        tracing::info!(%session_id, "session engine released");
    }

    /// Number of live session engines.
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    async fn persist_final_state(&self, record: SessionRecord) {
        let session_id = record.id;
        let final_record = SessionRecord {
            active: false,
            ..record
        };
        if let Err(e) = self.store.update_session(final_record).await {
            tracing::error!(%session_id, error = %e, "failed to persist session state");
        }
        if let Err(e) = self.store.set_session_active(session_id, false).await {
            tracing::error!(%session_id, error = %e, "failed to clear session active flag");
        }
    }
}
