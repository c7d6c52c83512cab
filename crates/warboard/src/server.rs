//! `WarboardServer` builder and accept loop.
//!
//! The entry point for running a session server. It ties the layers
//! together: transport → protocol → engine → store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use warboard_engine::{EngineConfig, SessionRegistry};
use warboard_protocol::{Codec, JsonCodec};
use warboard_store::{GameStore, MapSource};
use warboard_transport::WsListener;

use crate::WarboardError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<S: GameStore, M: MapSource, C: Codec> {
    pub(crate) registry: SessionRegistry<S, M>,
    pub(crate) codec: C,
    /// How long a fresh connection gets to send `session:join` before
    /// the server hangs up.
    pub(crate) join_timeout: Duration,
}

/// Builder for configuring and starting a Warboard server.
///
/// # Example
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use warboard::prelude::*;
/// # async fn run() -> Result<(), WarboardError> {
/// let server = WarboardServerBuilder::new()
///     .bind("0.0.0.0:9090")
///     .engine_config(EngineConfig::default())
///     .build(Arc::new(MemoryStore::new()), Arc::new(GridMap::new(MapId(1), 32, 32)))
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct WarboardServerBuilder {
    bind_addr: String,
    engine_config: EngineConfig,
    join_timeout: Duration,
}

impl WarboardServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:9090".to_string(),
            engine_config: EngineConfig::default(),
            join_timeout: Duration::from_secs(10),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the engine configuration (revive policy, defaults).
    pub fn engine_config(mut self, config: EngineConfig) -> Self {
        self.engine_config = config;
        self
    }

    /// Sets how long a connection may stay silent before `session:join`.
    pub fn join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }

    /// Binds the listener and assembles the server around the given
    /// persistence and map collaborators. Uses `JsonCodec` (the wire
    /// format the client protocol is specified in).
    pub async fn build<S: GameStore, M: MapSource>(
        self,
        store: Arc<S>,
        map: Arc<M>,
    ) -> Result<WarboardServer<S, M, JsonCodec>, WarboardError> {
        let listener = WsListener::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            registry: SessionRegistry::new(store, map, self.engine_config),
            codec: JsonCodec,
            join_timeout: self.join_timeout,
        });

        Ok(WarboardServer {
            listener,
            state,
            shutdown: Arc::new(Notify::new()),
        })
    }
}

impl Default for WarboardServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Warboard session server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct WarboardServer<S: GameStore, M: MapSource, C: Codec> {
    listener: WsListener,
    state: Arc<ServerState<S, M, C>>,
    shutdown: Arc<Notify>,
}

impl<S, M, C> WarboardServer<S, M, C>
where
    S: GameStore,
    M: MapSource,
    C: Codec,
{
    /// Creates a new builder.
    pub fn builder() -> WarboardServerBuilder {
        WarboardServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// A handle that stops the accept loop when notified. Connections
    /// already established keep running on their own tasks.
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }

    /// Runs the accept loop: each incoming connection gets its own task
    /// running the message router. Runs until the process is terminated
    /// or the shutdown handle is notified.
    pub async fn run(mut self) -> Result<(), WarboardError> {
        tracing::info!("warboard server running");

        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(handle_connection(conn, state));
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
                _ = self.shutdown.notified() => {
                    tracing::info!("accept loop stopped");
                    return Ok(());
                }
            }
        }
    }
}
