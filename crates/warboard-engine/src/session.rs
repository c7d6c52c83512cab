//! The session actor: an isolated Tokio task that owns one live game.
//!
//! All state for a session lives inside [`Session`], which runs in its own
//! task and processes [`SessionCommand`]s one at a time in arrival order.
//! That channel is the exclusive section the rest of the server relies on:
//! two players acting "simultaneously" are simply two commands, totally
//! ordered by the queue, and every broadcast reflects the state after one
//! whole operation.
//!
//! Outbound delivery is decoupled from the actor: each connection hands in
//! an unbounded [`EventSender`] and a broadcast is a non-blocking push per
//! connection. A slow or dead client never stalls the session; its writer
//! task (or its closed channel) absorbs the problem.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, oneshot};
use warboard_protocol::{
    AttackType, BaseAttributes, CharacterId, ServerEvent, SessionId, UserId,
};
use warboard_rules::{
    ActionError, Character, NewCharacter, Position, resolve_attack, validate_move,
    validate_placement,
};
use warboard_store::{GameStore, MapSource, SessionRecord, StoreError};

use crate::{EngineConfig, EngineError, TurnChange, TurnManager};

/// Counter for generating unique connection ids, shared by every session
/// in the process. Monotonic for the process lifetime.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier for one live connection to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Channel sender for delivering events to one connection's writer task.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// A live connection as the session sees it: who it belongs to and how to
/// reach it.
struct Connection {
    user_id: UserId,
    sender: EventSender,
    remote_addr: String,
}

/// Client-supplied fields for `character:new`. Everything is optional;
/// the engine fills in defaults and validates the placement.
#[derive(Debug, Clone, Default)]
pub struct CharacterRequest {
    pub name: Option<String>,
    pub row: Option<u32>,
    pub col: Option<u32>,
    pub basic_properties: Option<BaseAttributes>,
    pub avatar_id: Option<u64>,
}

/// Reply to a disconnect: how many connections remain, and the session
/// record to persist if that number is zero.
#[derive(Debug, Clone, Copy)]
pub struct FinishAck {
    pub remaining: usize,
    pub record: SessionRecord,
}

/// Commands sent to a session actor through its channel.
///
/// The `oneshot::Sender` in each variant is the reply channel; the caller
/// awaits it to learn whether the operation succeeded. Broadcasting to the
/// other players happens inside the actor, before the reply is sent.
enum SessionCommand {
    Connect {
        user_id: UserId,
        sender: EventSender,
        remote_addr: String,
        reply: oneshot::Sender<Result<ConnectionId, EngineError>>,
    },
    Disconnect {
        connection_id: ConnectionId,
        reply: oneshot::Sender<FinishAck>,
    },
    AddCharacter {
        user_id: UserId,
        request: CharacterRequest,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    RemoveCharacter {
        user_id: UserId,
        id: CharacterId,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    MoveCharacter {
        user_id: UserId,
        id: CharacterId,
        to: Position,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    AttackCharacter {
        user_id: UserId,
        id: CharacterId,
        opponent_id: CharacterId,
        attack_type: AttackType,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    ReviveCharacter {
        user_id: UserId,
        id: CharacterId,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Handle to a running session actor. Cheap to clone; the registry holds
/// one per live session and every connection handler borrows it.
#[derive(Clone)]
pub struct SessionHandle {
    session_id: SessionId,
    sender: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T, EngineError>>) -> SessionCommand,
    ) -> Result<T, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(build(reply_tx))
            .await
            .map_err(|_| EngineError::SessionClosed)?;
        reply_rx.await.map_err(|_| EngineError::SessionClosed)?
    }

    /// Registers a connection for `user_id`. On success the session
    /// snapshot has already been pushed onto `sender`, the user occupies
    /// a slot in the turn order, and the returned id is what
    /// [`finish_connection`](Self::finish_connection) expects later.
    pub async fn start_connection(
        &self,
        user_id: UserId,
        sender: EventSender,
        remote_addr: impl Into<String>,
    ) -> Result<ConnectionId, EngineError> {
        let remote_addr = remote_addr.into();
        self.request(|reply| SessionCommand::Connect {
            user_id,
            sender,
            remote_addr,
            reply,
        })
        .await
    }

    /// Removes a connection, reassigning the turn if needed. Idempotent:
    /// a second call for the same id reports the current count and
    /// changes nothing. An already-stopped actor reports zero remaining.
    pub async fn finish_connection(
        &self,
        connection_id: ConnectionId,
    ) -> Result<FinishAck, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Disconnect {
                connection_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| EngineError::SessionClosed)?;
        reply_rx.await.map_err(|_| EngineError::SessionClosed)
    }

    pub async fn add_character(
        &self,
        user_id: UserId,
        request: CharacterRequest,
    ) -> Result<(), EngineError> {
        self.request(|reply| SessionCommand::AddCharacter {
            user_id,
            request,
            reply,
        })
        .await
    }

    pub async fn remove_character(
        &self,
        id: CharacterId,
        user_id: UserId,
    ) -> Result<(), EngineError> {
        self.request(|reply| SessionCommand::RemoveCharacter { user_id, id, reply })
            .await
    }

    pub async fn move_character(
        &self,
        id: CharacterId,
        user_id: UserId,
        to: Position,
    ) -> Result<(), EngineError> {
        self.request(|reply| SessionCommand::MoveCharacter {
            user_id,
            id,
            to,
            reply,
        })
        .await
    }

    pub async fn attack_character(
        &self,
        id: CharacterId,
        opponent_id: CharacterId,
        user_id: UserId,
        attack_type: AttackType,
    ) -> Result<(), EngineError> {
        self.request(|reply| SessionCommand::AttackCharacter {
            user_id,
            id,
            opponent_id,
            attack_type,
            reply,
        })
        .await
    }

    pub async fn revive_character(
        &self,
        id: CharacterId,
        user_id: UserId,
    ) -> Result<(), EngineError> {
        self.request(|reply| SessionCommand::ReviveCharacter { user_id, id, reply })
            .await
    }

    /// Stops the actor. Further operations on any clone of this handle
    /// fail with [`EngineError::SessionClosed`].
    pub(crate) async fn shutdown(&self) {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self
            .sender
            .send(SessionCommand::Shutdown { reply: reply_tx })
            .await
            .is_ok()
        {
            let _ = reply_rx.await;
        }
    }
}

/// Spawns a session actor for the given record and returns its handle.
pub(crate) fn spawn_session<S: GameStore, M: MapSource>(
    record: SessionRecord,
    store: Arc<S>,
    map: Arc<M>,
    config: EngineConfig,
) -> SessionHandle {
    let (tx, rx) = mpsc::channel(config.command_buffer);
    let session_id = record.id;

    let actor = Session {
        record,
        config,
        store,
        map,
        connections: HashMap::new(),
        characters: HashMap::new(),
        turns: TurnManager::new(),
        receiver: rx,
    };
    tokio::spawn(actor.run());

    SessionHandle {
        session_id,
        sender: tx,
    }
}

/// The session state machine. Lives inside one Tokio task; nothing here
/// is shared or locked.
struct Session<S: GameStore, M: MapSource> {
    record: SessionRecord,
    config: EngineConfig,
    store: Arc<S>,
    map: Arc<M>,
    connections: HashMap<ConnectionId, Connection>,
    characters: HashMap<CharacterId, Character>,
    turns: TurnManager,
    receiver: mpsc::Receiver<SessionCommand>,
}

impl<S: GameStore, M: MapSource> Session<S, M> {
    async fn run(mut self) {
        let session_id = self.record.id;
        tracing::info!(%session_id, "session actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                SessionCommand::Connect {
                    user_id,
                    sender,
                    remote_addr,
                    reply,
                } => {
                    let result =
                        self.handle_connect(user_id, sender, remote_addr).await;
                    let _ = reply.send(result);
                }
                SessionCommand::Disconnect {
                    connection_id,
                    reply,
                } => {
                    let ack = self.handle_disconnect(connection_id);
                    let _ = reply.send(ack);
                }
                SessionCommand::AddCharacter {
                    user_id,
                    request,
                    reply,
                } => {
                    let result = self.handle_add_character(user_id, request).await;
                    let _ = reply.send(result);
                }
                SessionCommand::RemoveCharacter { user_id, id, reply } => {
                    let result = self.handle_remove_character(user_id, id).await;
                    let _ = reply.send(result);
                }
                SessionCommand::MoveCharacter {
                    user_id,
                    id,
                    to,
                    reply,
                } => {
                    let result = self.handle_move_character(user_id, id, to).await;
                    let _ = reply.send(result);
                }
                SessionCommand::AttackCharacter {
                    user_id,
                    id,
                    opponent_id,
                    attack_type,
                    reply,
                } => {
                    let result = self
                        .handle_attack_character(user_id, id, opponent_id, attack_type)
                        .await;
                    let _ = reply.send(result);
                }
                SessionCommand::ReviveCharacter { user_id, id, reply } => {
                    let result = self.handle_revive_character(user_id, id).await;
                    let _ = reply.send(result);
                }
                SessionCommand::Shutdown { reply } => {
                    let _ = reply.send(());
                    break;
                }
            }
        }

        tracing::info!(%session_id, "session actor stopped");
    }

    // -- connection lifecycle ---------------------------------------------

    async fn handle_connect(
        &mut self,
        user_id: UserId,
        sender: EventSender,
        remote_addr: String,
    ) -> Result<ConnectionId, EngineError> {
        let user = self.store.get_user_by_id(user_id).await.map_err(|e| match e {
            StoreError::UserNotFound(id) => EngineError::UnknownUser(id),
            other => EngineError::Store(other),
        })?;

        // Attach this user's existing characters before building the
        // snapshot, so a returning player sees their own roster.
        let owned = self
            .store
            .get_all_characters_of_user_in_session(user_id, self.record.id)
            .await?;
        for character in owned {
            self.characters.entry(character.id).or_insert(character);
        }

        // Validation is done; from here the join cannot fail. The first
        // connection flips the session active and takes the turn; later
        // joins leave the rotation untouched.
        if self.connections.is_empty() {
            self.store.set_session_active(self.record.id, true).await?;
            self.record.active = true;
        }
        self.turns.join(user_id);

        let connection_id = ConnectionId::next();
        let _ = sender.send(self.snapshot());
        self.connections.insert(
            connection_id,
            Connection {
                user_id,
                sender,
                remote_addr,
            },
        );

        let conn = &self.connections[&connection_id];
        tracing::info!(
            session_id = %self.record.id,
            %user_id,
            user = %user.name,
            %connection_id,
            remote_addr = %conn.remote_addr,
            connections = self.connections.len(),
            "player connected"
        );
        Ok(connection_id)
    }

    fn handle_disconnect(&mut self, connection_id: ConnectionId) -> FinishAck {
        if let Some(conn) = self.connections.remove(&connection_id) {
            // The user leaves the turn order only with their last
            // connection; a second tab closing changes nothing.
            let user_still_here = self
                .connections
                .values()
                .any(|c| c.user_id == conn.user_id);
            if !user_still_here {
                if let TurnChange::Reassigned(next) = self.turns.leave(conn.user_id) {
                    self.broadcast(&ServerEvent::TurnChange { user_id: next });
                }
            }
            tracing::info!(
                session_id = %self.record.id,
                user_id = %conn.user_id,
                %connection_id,
                connections = self.connections.len(),
                "player disconnected"
            );
        }

        FinishAck {
            remaining: self.connections.len(),
            record: self.current_record(),
        }
    }

    // -- character operations ---------------------------------------------

    async fn handle_add_character(
        &mut self,
        user_id: UserId,
        request: CharacterRequest,
    ) -> Result<(), EngineError> {
        if !self.user_connected(user_id) {
            return Err(EngineError::NotConnected(user_id));
        }

        let position =
            Position::new(request.row.unwrap_or(0), request.col.unwrap_or(0));
        let tile = self
            .map
            .tile(self.record.map_id, position.row, position.col)
            .await?;
        validate_placement(tile)?;

        let name = request
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.config.default_character_name.clone());
        let character = self
            .store
            .add_character(NewCharacter {
                user_id,
                session_id: self.record.id,
                name,
                avatar_id: request.avatar_id,
                position,
                base: request.basic_properties.unwrap_or_default(),
            })
            .await?;

        let view = character.view();
        let character_id = character.id;
        self.characters.insert(character.id, character);

        // The creator's own connections get `own: true` so clients can
        // distinguish their pieces without comparing user ids.
        for conn in self.connections.values() {
            let _ = conn.sender.send(ServerEvent::CharacterNew {
                character: view.clone(),
                own: conn.user_id == user_id,
            });
        }

        tracing::info!(
            session_id = %self.record.id,
            %user_id,
            %character_id,
            "character created"
        );
        Ok(())
    }

    async fn handle_remove_character(
        &mut self,
        user_id: UserId,
        id: CharacterId,
    ) -> Result<(), EngineError> {
        self.owned_character(id, user_id)?;

        self.store.delete_character_by_id(id).await?;
        self.characters.remove(&id);
        self.broadcast(&ServerEvent::CharacterRemove { id });

        tracing::info!(
            session_id = %self.record.id,
            %user_id,
            character_id = %id,
            "character removed"
        );
        Ok(())
    }

    async fn handle_move_character(
        &mut self,
        user_id: UserId,
        id: CharacterId,
        to: Position,
    ) -> Result<(), EngineError> {
        let mut character = self.owned_character(id, user_id)?.clone();
        self.ensure_turn(user_id)?;
        if character.defeated {
            return Err(ActionError::IsDefeated.into());
        }

        let tile = self.map.tile(self.record.map_id, to.row, to.col).await?;
        validate_move(character.position, to, character.derived.speed, tile)?;

        self.store.move_character(id, to.row, to.col).await?;
        character.position = to;

        // Tile effects apply on entry, once, before the defeat check.
        let hazard = tile.map(|t| t.hazard_damage).unwrap_or(0);
        let mut newly_defeated = false;
        if hazard > 0 {
            newly_defeated = character.apply_damage(hazard);
            self.store.update_character(&character).await?;
            tracing::debug!(
                session_id = %self.record.id,
                character_id = %id,
                hazard,
                health = character.health,
                "hazard damage applied"
            );
        }

        let view = character.view();
        self.characters.insert(id, character);

        self.broadcast(&ServerEvent::CharacterMove { character: view });
        if newly_defeated {
            self.broadcast(&ServerEvent::CharacterStatus { id, defeated: true });
        }
        self.advance_turn();
        Ok(())
    }

    async fn handle_attack_character(
        &mut self,
        user_id: UserId,
        id: CharacterId,
        opponent_id: CharacterId,
        attack_type: AttackType,
    ) -> Result<(), EngineError> {
        let attacker = self.owned_character(id, user_id)?.clone();
        self.ensure_turn(user_id)?;
        if attacker.defeated {
            return Err(ActionError::IsDefeated.into());
        }

        let opponent = self
            .characters
            .get(&opponent_id)
            .cloned()
            .ok_or(EngineError::UnknownCharacter(opponent_id))?;
        if opponent.defeated {
            return Err(ActionError::OpponentIsDefeated.into());
        }

        let outcome = resolve_attack(&attacker, &opponent, attack_type)?;

        let (attacker_view, opponent_view, newly_defeated) = if id == opponent_id {
            // Self-targeting is legal (a caster can hit their own tile);
            // both sides of the outcome land on the one character.
            let mut me = attacker;
            me.spend_mana(outcome.mana_cost);
            let defeated = me.apply_damage(outcome.damage);
            self.store.update_character(&me).await?;
            let view = me.view();
            self.characters.insert(id, me);
            (view.clone(), view, defeated)
        } else {
            let mut attacker = attacker;
            let mut opponent = opponent;
            attacker.spend_mana(outcome.mana_cost);
            let defeated = opponent.apply_damage(outcome.damage);
            self.store.update_character(&attacker).await?;
            self.store.update_character(&opponent).await?;
            let views = (attacker.view(), opponent.view());
            self.characters.insert(id, attacker);
            self.characters.insert(opponent_id, opponent);
            (views.0, views.1, defeated)
        };

        tracing::debug!(
            session_id = %self.record.id,
            attacker = %id,
            opponent = %opponent_id,
            %attack_type,
            damage = outcome.damage,
            "attack resolved"
        );

        self.broadcast(&ServerEvent::CharacterAttack {
            attacker: attacker_view,
            opponent: opponent_view,
            attack_type,
            damage: outcome.damage,
        });
        if newly_defeated {
            self.broadcast(&ServerEvent::CharacterStatus {
                id: opponent_id,
                defeated: true,
            });
        }
        self.advance_turn();
        Ok(())
    }

    async fn handle_revive_character(
        &mut self,
        user_id: UserId,
        id: CharacterId,
    ) -> Result<(), EngineError> {
        let mut character = self.owned_character(id, user_id)?.clone();
        self.ensure_turn(user_id)?;
        if !character.defeated {
            return Err(ActionError::IsNotDefeated.into());
        }

        character.revive(self.config.revive_policy);
        self.store.update_character(&character).await?;

        let view = character.view();
        self.characters.insert(id, character);

        self.broadcast(&ServerEvent::CharacterRevive { character: view });
        self.broadcast(&ServerEvent::CharacterStatus {
            id,
            defeated: false,
        });
        self.advance_turn();
        Ok(())
    }

    // -- helpers ----------------------------------------------------------

    fn user_connected(&self, user_id: UserId) -> bool {
        self.connections.values().any(|c| c.user_id == user_id)
    }

    /// Looks up a character and checks ownership. Ownership is validated
    /// before the turn, so "that's not your piece" wins over "not your
    /// turn" when both apply.
    fn owned_character(
        &self,
        id: CharacterId,
        user_id: UserId,
    ) -> Result<&Character, EngineError> {
        let character = self
            .characters
            .get(&id)
            .ok_or(EngineError::UnknownCharacter(id))?;
        if character.user_id != user_id {
            return Err(EngineError::NotOwner(id, user_id));
        }
        Ok(character)
    }

    fn ensure_turn(&self, user_id: UserId) -> Result<(), EngineError> {
        if self.turns.holder() != Some(user_id) {
            return Err(ActionError::NotYourTurn.into());
        }
        Ok(())
    }

    fn advance_turn(&mut self) {
        if let Some(next) = self.turns.advance() {
            self.broadcast(&ServerEvent::TurnChange { user_id: next });
        }
    }

    /// The session header plus every loaded character, sorted by id so
    /// snapshots are deterministic.
    fn snapshot(&self) -> ServerEvent {
        let mut characters: Vec<_> =
            self.characters.values().map(Character::view).collect();
        characters.sort_by_key(|c| c.id);
        ServerEvent::Snapshot {
            session_id: self.record.id,
            map_id: self.record.map_id,
            started_at: self.record.started_at,
            turn: self.turns.holder(),
            characters,
        }
    }

    fn current_record(&self) -> SessionRecord {
        SessionRecord {
            active: !self.connections.is_empty(),
            turn: self.turns.holder(),
            ..self.record
        }
    }

    /// Fans an event out to every connection. Fire-and-forget: a closed
    /// or slow receiver is skipped without failing the operation.
    fn broadcast(&self, event: &ServerEvent) {
        for conn in self.connections.values() {
            let _ = conn.sender.send(event.clone());
        }
    }
}
