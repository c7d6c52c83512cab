//! Pure game rules for Warboard.
//!
//! Everything in this crate is a deterministic function over plain data:
//! no I/O, no clocks, no locks. The session engine owns the state and the
//! sequencing; this crate answers the questions the engine asks:
//!
//! - [`DerivedAttributes::from_base`] — what a character's combat numbers
//!   are, fixed once at creation.
//! - [`validate_move`] / [`validate_placement`] — whether a position change
//!   is legal (distance rule first, then the obstacle rule).
//! - [`resolve_attack`] — what an attack would do (damage, mana cost),
//!   or which typed rule it violates.
//! - [`Character`] — the domain entity and its health/mana transitions.
//!
//! Every user-visible rule failure is an [`ActionError`] carrying the wire
//! reason code the error envelope reports.

mod attributes;
mod character;
mod combat;
mod error;
mod movement;

pub use attributes::DerivedAttributes;
pub use character::{Character, NewCharacter, RevivePolicy};
pub use combat::{AttackOutcome, resolve_attack};
pub use error::ActionError;
pub use movement::{Position, Tile, chebyshev, validate_move, validate_placement};
