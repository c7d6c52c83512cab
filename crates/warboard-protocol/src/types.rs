//! Core protocol types for Warboard's wire format.
//!
//! Everything here travels "on the wire": these are the structures that get
//! serialized to JSON, sent over the socket, and deserialized on the other
//! side. The exact JSON shapes are load-bearing — a browser client parses
//! them by the `type` tag — so the serde attributes in this module are part
//! of the protocol contract and covered by tests below.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player account.
///
/// Newtype wrapper over `u64`: you can't accidentally pass a `SessionId`
/// where a `UserId` is expected, even though both are `u64` underneath.
/// `#[serde(transparent)]` makes `UserId(42)` serialize as just `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// A unique identifier for a game session (one live table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

/// A unique identifier for a character on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(pub u64);

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// A unique identifier for a tile map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapId(pub u64);

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Character data on the wire
// ---------------------------------------------------------------------------

/// The six base attributes a character is created with.
///
/// Appears on the wire as the `basicProperties` object. Every combat and
/// movement number a character has is derived from these six values once,
/// at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseAttributes {
    pub strength: u32,
    pub dexterity: u32,
    pub constitution: u32,
    pub intelligence: u32,
    pub wisdom: u32,
    pub charisma: u32,
}

/// The classic "all tens" starting block, used when a `character:new`
/// command omits `basicProperties`.
impl Default for BaseAttributes {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
        }
    }
}

/// A named current/max value pair shown by clients (health bar, mana bar).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayProperty {
    pub name: String,
    pub value: u32,
    pub max: u32,
}

/// The full serialized state of one character, as broadcast to clients.
///
/// This is the wire view of a character: enough for a client to draw the
/// token, its owner, and its status bars. Derived combat numbers stay
/// server-side; only the display properties are exposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterView {
    pub id: CharacterId,
    pub user_id: UserId,
    pub session_id: SessionId,
    pub name: String,
    pub row: u32,
    pub col: u32,
    pub basic_properties: BaseAttributes,
    pub defeated: bool,
    pub avatar_id: Option<u64>,
    pub properties: Vec<DisplayProperty>,
}

// ---------------------------------------------------------------------------
// AttackType
// ---------------------------------------------------------------------------

/// Which kind of attack a `character:attack` command performs.
///
/// Serialized lowercase (`"melee"`, `"ranged"`, `"magic"`) to match the
/// client protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackType {
    Melee,
    Ranged,
    Magic,
}

impl fmt::Display for AttackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Melee => write!(f, "melee"),
            Self::Ranged => write!(f, "ranged"),
            Self::Magic => write!(f, "magic"),
        }
    }
}

// ---------------------------------------------------------------------------
// ClientCommand — inbound envelopes
// ---------------------------------------------------------------------------

/// Every message a client can send, selected by the mandatory `type` field.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON:
///   `{ "type": "character:move", "id": 3, "row": 5, "col": 7 }`
/// Decoding fails closed — an unknown `type`, a missing `type`, or a missing
/// required field is a [`ProtocolError`](crate::ProtocolError), never a
/// half-filled command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ClientCommand {
    /// The first message on every connection: which user is joining which
    /// session. Everything before a successful join is rejected.
    #[serde(rename = "session:join")]
    SessionJoin {
        user_id: UserId,
        session_id: SessionId,
    },

    /// Create a character. All fields are optional; the engine fills in
    /// defaults (see the engine config) and validates the placement.
    #[serde(rename = "character:new")]
    CharacterNew {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        row: Option<u32>,
        #[serde(default)]
        col: Option<u32>,
        #[serde(default)]
        basic_properties: Option<BaseAttributes>,
        #[serde(default)]
        avatar_id: Option<u64>,
    },

    /// Delete one of the caller's own characters.
    #[serde(rename = "character:remove")]
    CharacterRemove { id: CharacterId },

    /// Move one of the caller's own characters. Turn-consuming.
    #[serde(rename = "character:move")]
    CharacterMove {
        id: CharacterId,
        row: u32,
        col: u32,
    },

    /// Attack another character. Turn-consuming.
    #[serde(rename = "character:attack")]
    CharacterAttack {
        id: CharacterId,
        opponent_id: CharacterId,
        attack_type: AttackType,
    },

    /// Revive one of the caller's own defeated characters. Turn-consuming.
    #[serde(rename = "character:revive")]
    CharacterRevive { id: CharacterId },
}

impl ClientCommand {
    /// The wire `type` tag of this command. Error envelopes echo it back
    /// in their `on` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SessionJoin { .. } => "session:join",
            Self::CharacterNew { .. } => "character:new",
            Self::CharacterRemove { .. } => "character:remove",
            Self::CharacterMove { .. } => "character:move",
            Self::CharacterAttack { .. } => "character:attack",
            Self::CharacterRevive { .. } => "character:revive",
        }
    }
}

// ---------------------------------------------------------------------------
// ServerEvent — outbound envelopes
// ---------------------------------------------------------------------------

/// Every message the server sends, tagged the same way as commands.
///
/// Successful operations broadcast an event mirroring the command's `type`
/// to every connection in the session; failures produce an
/// [`Error`](Self::Error) envelope sent only to the originating connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Sent to a joining connection only: the session header, the current
    /// turn holder, and every character already on the board.
    #[serde(rename = "session:snapshot")]
    Snapshot {
        session_id: SessionId,
        map_id: MapId,
        started_at: u64,
        turn: Option<UserId>,
        characters: Vec<CharacterView>,
    },

    /// A character was created. `own` is true on the creator's own
    /// connections and false everywhere else.
    #[serde(rename = "character:new")]
    CharacterNew { character: CharacterView, own: bool },

    /// A character was deleted.
    #[serde(rename = "character:remove")]
    CharacterRemove { id: CharacterId },

    /// A character moved (position and, after tile effects, health may
    /// have changed).
    #[serde(rename = "character:move")]
    CharacterMove { character: CharacterView },

    /// An attack resolved. Both sides' updated state rides along so
    /// clients never have to infer health from the damage number.
    #[serde(rename = "character:attack")]
    CharacterAttack {
        attacker: CharacterView,
        opponent: CharacterView,
        attack_type: AttackType,
        damage: u32,
    },

    /// A defeated character was brought back.
    #[serde(rename = "character:revive")]
    CharacterRevive { character: CharacterView },

    /// A character's defeated flag flipped (health reached zero, or a
    /// revive cleared it).
    #[serde(rename = "character:status")]
    CharacterStatus { id: CharacterId, defeated: bool },

    /// The turn moved to another player.
    #[serde(rename = "turn:change")]
    TurnChange { user_id: UserId },

    /// Something went wrong with a command. `on` echoes the command's
    /// `type`; `reason` is a machine-readable code present only for the
    /// typed rule failures (`big_dist`, `not_your_turn`, ...).
    #[serde(rename = "error")]
    Error {
        on: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        message: String,
    },
}

// =========================================================================
// Tests
// =========================================================================
