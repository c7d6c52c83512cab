//! # Warboard
//!
//! Backend for a multiplayer, turn-based tabletop game. Players connect
//! over WebSockets to a shared session, create and command characters on
//! a tile map, and see one consistent, totally ordered view of the game.
//!
//! This meta crate ties the layers together:
//!
//! ```text
//! warboard-transport   accept sockets, move frames
//! warboard-protocol    JSON commands and events
//! warboard-engine      session actors, turn order, registry
//! warboard-rules       movement, combat, attributes (pure)
//! warboard-store       persistence + map collaborator traits
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use warboard::prelude::*;
//!
//! # async fn run() -> Result<(), WarboardError> {
//! let store = Arc::new(MemoryStore::new());
//! let map = Arc::new(GridMap::new(MapId(1), 32, 32));
//!
//! let server = WarboardServerBuilder::new()
//!     .bind("0.0.0.0:9090")
//!     .build(store, map)
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::WarboardError;
pub use server::{WarboardServer, WarboardServerBuilder};

/// Installs a `tracing` subscriber reading the `RUST_LOG` environment
/// variable (`info` for the workspace crates by default).
///
/// Call once at startup; later calls are ignored so tests can race it
/// safely.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}

/// The common imports for building and running a server.
pub mod prelude {
    pub use crate::{WarboardError, WarboardServer, WarboardServerBuilder, init_tracing};
    pub use warboard_engine::{
        CharacterRequest, ConnectionId, EngineConfig, EngineError, SessionHandle,
        SessionRegistry,
    };
    pub use warboard_protocol::{
        AttackType, BaseAttributes, CharacterId, CharacterView, ClientCommand,
        Codec, JsonCodec, MapId, ServerEvent, SessionId, UserId,
    };
    pub use warboard_rules::{Position, RevivePolicy};
    pub use warboard_store::{
        GameStore, GridMap, MapSource, MemoryStore, SessionRecord,
    };
}
