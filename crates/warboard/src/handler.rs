//! Per-connection handler: the Message Router.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. First frame must be `session:join` (who, which session)
//!   2. Registry lookup → session engine handle
//!   3. Register the connection → snapshot arrives on the event channel
//!   4. Loop: decode one command per frame → dispatch to the engine →
//!      typed failures come back as error envelopes to this connection
//!
//! Outbound traffic runs on a separate writer task fed by an unbounded
//! channel, so session broadcasts never wait for this client's socket.
//! Socket closure (or any read error) ends the loop, and a drop guard
//! fires `finish_connection` exactly once — including on panic — so the
//! turn can never be left with a departed player.

use std::sync::Arc;

use tokio::sync::mpsc;
use warboard_engine::{
    CharacterRequest, ConnectionId, EngineError, EventSender, SessionHandle,
};
use warboard_protocol::{
    ClientCommand, Codec, ServerEvent, SessionId, UserId, command_kind,
};
use warboard_rules::Position;
use warboard_store::{GameStore, MapSource};
use warboard_transport::{WsConnection, WsReader, WsWriter};

use crate::server::ServerState;

/// Drop guard that removes the connection from its session when the
/// handler exits, however it exits. `Drop` is synchronous, so the actual
/// disconnect runs on a fire-and-forget task.
struct DisconnectGuard<S: GameStore, M: MapSource, C: Codec> {
    state: Arc<ServerState<S, M, C>>,
    session_id: SessionId,
    connection_id: ConnectionId,
}

impl<S: GameStore, M: MapSource, C: Codec> Drop for DisconnectGuard<S, M, C> {
    fn drop(&mut self) {
        let state = Arc::clone(&self.state);
        let session_id = self.session_id;
        let connection_id = self.connection_id;
        tokio::spawn(async move {
            state.registry.disconnect(session_id, connection_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<S, M, C>(
    conn: WsConnection,
    state: Arc<ServerState<S, M, C>>,
) where
    S: GameStore,
    M: MapSource,
    C: Codec,
{
    let peer = conn.peer_addr();
    let (mut writer, mut reader) = conn.into_split();

    // --- Step 1: join handshake ---
    let Some((user_id, session_id)) =
        read_join(&mut reader, &mut writer, &state).await
    else {
        let _ = writer.close().await;
        return;
    };

    // --- Step 2: find or spin up the session ---
    let handle = match state.registry.get_or_create(session_id).await {
        Ok(handle) => handle,
        Err(e) => {
            tracing::info!(%peer, %user_id, %session_id, error = %e, "join rejected");
            send_direct(&mut writer, &state, error_event("session:join", &e)).await;
            let _ = writer.close().await;
            return;
        }
    };

    // --- Step 3: outbound channel + writer task ---
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    let writer_state = Arc::clone(&state);
    let writer_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let bytes = match writer_state.codec.encode(&event) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode outbound event");
                    continue;
                }
            };
            if writer.send(bytes).await.is_err() {
                // Socket is gone; the reader loop will notice too.
                break;
            }
        }
        let _ = writer.close().await;
    });

    // --- Step 4: register with the engine (snapshot rides the channel) ---
    let connection_id = match handle
        .start_connection(user_id, tx.clone(), peer.to_string())
        .await
    {
        Ok(id) => id,
        Err(e) => {
            tracing::info!(%peer, %user_id, %session_id, error = %e, "connection rejected");
            let _ = tx.send(error_event("session:join", &e));
            drop(tx);
            let _ = writer_task.await;
            return;
        }
    };

    let _guard = DisconnectGuard {
        state: Arc::clone(&state),
        session_id,
        connection_id,
    };

    // --- Step 5: message loop ---
    loop {
        match reader.recv().await {
            Ok(Some(frame)) => {
                dispatch(&state, &handle, user_id, &tx, &frame).await;
            }
            Ok(None) => {
                tracing::info!(%user_id, %connection_id, "connection closed");
                break;
            }
            Err(e) => {
                tracing::debug!(%user_id, %connection_id, error = %e, "recv error");
                break;
            }
        }
    }

    // _guard drops here → finish_connection fires exactly once.
    drop(tx);
    let _ = writer_task.await;
}

/// Reads and validates the first frame: it must decode to `session:join`
/// within the configured timeout. Anything else gets an error envelope
/// and `None` (caller closes).
async fn read_join<S, M, C>(
    reader: &mut WsReader,
    writer: &mut WsWriter,
    state: &Arc<ServerState<S, M, C>>,
) -> Option<(UserId, SessionId)>
where
    S: GameStore,
    M: MapSource,
    C: Codec,
{
    let frame = match tokio::time::timeout(state.join_timeout, reader.recv()).await {
        Ok(Ok(Some(frame))) => frame,
        Ok(Ok(None)) => return None,
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "recv error before join");
            return None;
        }
        Err(_) => {
            tracing::debug!("connection timed out before join");
            return None;
        }
    };

    match state.codec.decode::<ClientCommand>(&frame) {
        Ok(ClientCommand::SessionJoin {
            user_id,
            session_id,
        }) => Some((user_id, session_id)),
        Ok(other) => {
            send_direct(
                writer,
                state,
                parse_error(other.kind(), "expected session:join first"),
            )
            .await;
            None
        }
        Err(e) => {
            let on = command_kind(&frame).unwrap_or_else(|| "unknown".into());
            send_direct(writer, state, parse_error(&on, &e.to_string())).await;
            None
        }
    }
}

/// Decodes one frame and routes it to the session engine. All failures —
/// parse errors and typed rule failures alike — are answered on this
/// connection only.
async fn dispatch<S, M, C>(
    state: &Arc<ServerState<S, M, C>>,
    handle: &SessionHandle,
    user_id: UserId,
    tx: &EventSender,
    frame: &[u8],
) where
    S: GameStore,
    M: MapSource,
    C: Codec,
{
    let command = match state.codec.decode::<ClientCommand>(frame) {
        Ok(command) => command,
        Err(e) => {
            tracing::debug!(%user_id, error = %e, "failed to decode command");
            let on = command_kind(frame).unwrap_or_else(|| "unknown".into());
            let _ = tx.send(parse_error(&on, "malformed message"));
            return;
        }
    };

    let kind = command.kind();
    let result = match command {
        ClientCommand::SessionJoin { .. } => {
            let _ = tx.send(parse_error(kind, "already joined"));
            return;
        }
        ClientCommand::CharacterNew {
            name,
            row,
            col,
            basic_properties,
            avatar_id,
        } => {
            handle
                .add_character(
                    user_id,
                    CharacterRequest {
                        name,
                        row,
                        col,
                        basic_properties,
                        avatar_id,
                    },
                )
                .await
        }
        ClientCommand::CharacterRemove { id } => {
            handle.remove_character(id, user_id).await
        }
        ClientCommand::CharacterMove { id, row, col } => {
            handle
                .move_character(id, user_id, Position::new(row, col))
                .await
        }
        ClientCommand::CharacterAttack {
            id,
            opponent_id,
            attack_type,
        } => {
            handle
                .attack_character(id, opponent_id, user_id, attack_type)
                .await
        }
        ClientCommand::CharacterRevive { id } => {
            handle.revive_character(id, user_id).await
        }
    };

    if let Err(e) = result {
        tracing::debug!(%user_id, on = kind, error = %e, "command failed");
        let _ = tx.send(error_event(kind, &e));
    }
}

/// Builds the error envelope for an engine failure. Typed rule failures
/// keep their reason code and message; internal failures are logged and
/// flattened to a generic message.
fn error_event(on: &str, err: &EngineError) -> ServerEvent {
    let message = match err {
        EngineError::Store(e) => {
            tracing::error!(error = %e, "persistence failure");
            "internal server error".to_string()
        }
        other => other.to_string(),
    };
    ServerEvent::Error {
        on: on.to_string(),
        reason: err.reason().map(str::to_owned),
        message,
    }
}

/// A protocol-level error envelope: no reason code, just the message.
fn parse_error(on: &str, message: &str) -> ServerEvent {
    ServerEvent::Error {
        on: on.to_string(),
        reason: None,
        message: message.to_string(),
    }
}

/// Sends an event straight down the socket, used before the writer task
/// exists (join phase failures).
async fn send_direct<S, M, C>(
    writer: &mut WsWriter,
    state: &Arc<ServerState<S, M, C>>,
    event: ServerEvent,
) where
    S: GameStore,
    M: MapSource,
    C: Codec,
{
    if let Ok(bytes) = state.codec.encode(&event) {
        let _ = writer.send(bytes).await;
    }
}
