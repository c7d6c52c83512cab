//! Wire protocol for Warboard.
//!
//! This crate defines the "language" that game clients and the session
//! server speak:
//!
//! - **Identity types** ([`UserId`], [`SessionId`], [`CharacterId`],
//!   [`MapId`]) — newtype ids that travel on the wire as plain numbers.
//! - **Commands and events** ([`ClientCommand`], [`ServerEvent`],
//!   [`CharacterView`]) — the JSON envelopes players send and receive.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those envelopes are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw frames) and the session
//! engine (game state). It doesn't know about connections, turns, or maps —
//! it only knows how to serialize and deserialize messages.
//!
//! ```text
//! Transport (frames) → Protocol (ClientCommand) → Engine (session state)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::{JsonCodec, command_kind};
pub use error::ProtocolError;
pub use types::{
    AttackType, BaseAttributes, CharacterId, CharacterView, ClientCommand,
    DisplayProperty, MapId, ServerEvent, SessionId, UserId,
};
