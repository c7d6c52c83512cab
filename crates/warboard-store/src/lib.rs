//! Persistence and map collaborators for Warboard.
//!
//! The session engine never talks to a database or reads map files
//! directly. It consumes two trait interfaces:
//!
//! 1. **[`GameStore`]** — durable users, sessions, and characters. The
//!    engine loads state through it on join and writes back every
//!    position/health/mana change as it happens.
//! 2. **[`MapSource`]** — tile lookup for a map id. The engine asks for
//!    one tile at a time (the destination of a move, the placement of a
//!    new character).
//!
//! Production deployments implement these against their database and
//! asset pipeline. This crate ships in-memory reference implementations
//! ([`MemoryStore`], [`GridMap`], behind the default `memory` feature)
//! used by the demo server and by every test in the workspace.
//!
//! # Why traits?
//!
//! Same reasoning as the engine's other seams: the engine can be driven
//! by a real database in production, an in-memory store in tests, and a
//! seeded store in the demo, all without changing engine code.

mod error;
mod map;
#[cfg(feature = "memory")]
mod memory;
mod records;
mod store;

pub use error::StoreError;
pub use map::{GridMap, MapSource};
#[cfg(feature = "memory")]
pub use memory::MemoryStore;
pub use records::{SessionRecord, User};
pub use store::GameStore;
