use serenity::all::UserId;

use crate::dispatch::Caller;

/// The one user who may run privileged commands without holding the
/// administrator permission. Supplements the role-based check, never
/// replaces it.
pub const OVERRIDE_USER_ID: UserId = UserId::new(994507052652843028);

/// Whether a caller may invoke a privileged command. The same predicate
/// serves the text-prefix and slash surfaces so the two cannot drift.
pub fn is_privileged(caller: &Caller) -> bool {
    caller.is_admin || caller.id == OVERRIDE_USER_ID
}
