//! The Combat Resolver.

use warboard_protocol::AttackType;

use crate::{ActionError, Character, chebyshev};

/// What an attack would do, computed before anything mutates.
///
/// The resolver never touches the characters; the engine applies the
/// outcome inside its exclusive section so a rejected attack provably
/// changes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackOutcome {
    /// Damage to apply to the defender's current health.
    pub damage: u32,
    /// Mana to deduct from the attacker (non-zero only for magic).
    pub mana_cost: u32,
}

/// Resolves an attack between two living characters.
///
/// Preconditions the *engine* establishes before calling: the attacker is
/// not defeated and the defender is not defeated (a defeated opponent is
/// [`ActionError::OpponentIsDefeated`] at the engine level, before range
/// is ever considered).
///
/// Per attack type:
/// - melee: range 1 (the 8 adjacent tiles), damage = melee attack power;
/// - ranged: range = ranged range attribute, damage = ranged attack power;
/// - magic: range = magic range attribute, then mana ≥ magic cost
///   (range is checked first, so an out-of-range caster with an empty
///   mana pool sees `big_dist`), damage = magic attack power.
pub fn resolve_attack(
    attacker: &Character,
    defender: &Character,
    attack_type: AttackType,
) -> Result<AttackOutcome, ActionError> {
    let distance = chebyshev(attacker.position, defender.position);

    let (range, damage, mana_cost) = match attack_type {
        AttackType::Melee => (1, attacker.derived.melee_attack, 0),
        AttackType::Ranged => {
            (attacker.derived.ranged_range, attacker.derived.ranged_attack, 0)
        }
        AttackType::Magic => (
            attacker.derived.magic_range,
            attacker.derived.magic_attack,
            attacker.derived.magic_cost,
        ),
    };

    if distance > range {
        return Err(ActionError::BigDist);
    }
    if attacker.mana < mana_cost {
        return Err(ActionError::LowMana);
    }

    Ok(AttackOutcome { damage, mana_cost })
}
