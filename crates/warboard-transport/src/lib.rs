//! WebSocket transport for Warboard.
//!
//! The thinnest layer of the stack: it accepts sockets and moves opaque
//! frames. It knows nothing about commands, sessions, or turns — the
//! protocol crate interprets the bytes, and the engine owns the state.
//!
//! A [`WsConnection`] splits into independent reader and writer halves
//! ([`WsConnection::into_split`]) because the server reads and writes
//! concurrently: the connection handler owns the reader loop while a
//! separate writer task drains the session's broadcast channel into the
//! sink. Neither half ever waits on the other.

mod error;
mod websocket;

pub use error::TransportError;
pub use websocket::{WsConnection, WsListener, WsReader, WsWriter};
