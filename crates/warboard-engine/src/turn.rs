//! The Turn Manager: who may act now, and who acts next.

use warboard_protocol::UserId;

/// The result of removing a user from the turn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnChange {
    /// The departing user did not hold the turn; nothing to announce.
    Unchanged,
    /// The departing user held the turn; it now belongs to this user.
    Reassigned(UserId),
    /// The departing user was the last one; the turn is unassigned.
    Cleared,
}

/// Tracks the join-ordered set of acting users and the current holder.
///
/// State machine:
///
/// ```text
/// Unassigned ──(first join)──→ Assigned(user)
///     ↑                            │ ↺ advance / holder leaves
///     └───────(last user leaves)───┘
/// ```
///
/// Invariant: the holder, if set, is always a member of `order`, and
/// `order` is never empty while a holder is set. The session actor calls
/// [`leave`](Self::leave) *before* any other mutation becomes observable,
/// so clients never see a turn held by a departed player.
#[derive(Debug, Default)]
pub struct TurnManager {
    /// Users in join order. Wrapping rotation happens over this.
    order: Vec<UserId>,
    holder: Option<UserId>,
}

impl TurnManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user to the turn order (no-op if already present).
    /// The very first user becomes the holder; later joins leave the
    /// holder untouched. Returns `true` if this join assigned the turn.
    pub fn join(&mut self, user: UserId) -> bool {
        if !self.order.contains(&user) {
            self.order.push(user);
        }
        if self.holder.is_none() {
            self.holder = Some(user);
            return true;
        }
        false
    }

    /// Moves the turn to the next user in join order, wrapping.
    /// Returns the new holder, or `None` when no turn is assigned.
    pub fn advance(&mut self) -> Option<UserId> {
        let current = self.holder?;
        let idx = self.order.iter().position(|u| *u == current)?;
        let next = self.order[(idx + 1) % self.order.len()];
        self.holder = Some(next);
        Some(next)
    }

    /// Removes a user from the order, reassigning the turn if they held
    /// it. The replacement is the next user in join order (wrapping), so
    /// the rotation continues as if the departed user had simply been
    /// skipped.
    pub fn leave(&mut self, user: UserId) -> TurnChange {
        let Some(idx) = self.order.iter().position(|u| *u == user) else {
            return TurnChange::Unchanged;
        };
        self.order.remove(idx);

        if self.holder != Some(user) {
            return TurnChange::Unchanged;
        }
        if self.order.is_empty() {
            self.holder = None;
            return TurnChange::Cleared;
        }
        let next = self.order[idx % self.order.len()];
        self.holder = Some(next);
        TurnChange::Reassigned(next)
    }

    /// The user currently allowed to perform a turn-consuming action.
    pub fn holder(&self) -> Option<UserId> {
        self.holder
    }

    /// Whether the user occupies a slot in the turn order.
    pub fn contains(&self, user: UserId) -> bool {
        self.order.contains(&user)
    }

    /// Number of users in the rotation.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
