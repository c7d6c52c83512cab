//! The Warboard session engine.
//!
//! This crate is the heart of the server: the in-memory state machine that
//! owns one live game session. Each session runs as an isolated Tokio task
//! (the actor model) that serializes every mutation — joins, disconnects,
//! character creation, movement, combat, revival — through a single command
//! channel, so concurrent players always observe one consistent order of
//! events.
//!
//! # Key types
//!
//! - [`SessionRegistry`] — maps session ids to live engines; spins one up
//!   on first connection, tears it down (persisting final state) after the
//!   last disconnect.
//! - [`SessionHandle`] — cheap-to-clone handle for sending operations to a
//!   running session actor.
//! - [`TurnManager`] — who may act right now, and who acts next.
//! - [`EngineConfig`] — revival policy and other fixed-at-startup knobs.
//! - [`EngineError`] — every way an operation can be rejected.
//!
//! # Concurrency model
//!
//! One actor task per session owns all of that session's state; nothing is
//! shared. Operations arrive on an mpsc channel and are processed strictly
//! in arrival order — the channel *is* the exclusive section. Broadcasts
//! are fire-and-forget pushes onto per-connection channels, so one slow
//! client never stalls the session or the other players. Sessions never
//! lock across each other; the registry's own mutex guards only the
//! id-to-handle map.

mod config;
mod error;
mod registry;
mod session;
mod turn;

pub use config::EngineConfig;
pub use error::EngineError;
pub use registry::SessionRegistry;
pub use session::{
    CharacterRequest, ConnectionId, EventSender, FinishAck, SessionHandle,
};
pub use turn::{TurnChange, TurnManager};
