use std::collections::HashSet;

use tracing::{debug, warn};

use super::filter::should_exclude;
use super::traits::NameResolver;
use crate::models::{Identity, Leaderboard, TallyMessage};

/// Name shown on the leaderboard: the member's display name when the guild
/// has one, their username otherwise, and the raw username off the message
/// when the user can't be resolved at all.
pub fn resolve_name(identity: &Identity, resolver: &dyn NameResolver) -> String {
    match resolver.resolve(identity.id) {
        Some(member) => member.preferred().to_string(),
        None => identity.username.clone(),
    }
}

/// Checked update. A rejected contribution is logged and dropped so it can't
/// skew the user's counts.
fn credit(board: &mut Leaderboard, name: &str, mention: bool, post: bool) {
    if let Err(e) = board.update(name, mention, post) {
        warn!("dropping update: {}", e);
    }
}

/// Folds `messages` (oldest first) into a leaderboard sorted by total.
pub fn aggregate<'a, I>(messages: I, resolver: &dyn NameResolver) -> Leaderboard
where
    I: IntoIterator<Item = &'a TallyMessage>,
{
    let mut board = Leaderboard::new();

    for message in messages {
        if should_exclude(message) {
            debug!(message = %message.id, "skipping message voted down with ❌");
            continue;
        }

        credit(&mut board, &resolve_name(&message.author, resolver), false, true);

        let mut seen = HashSet::new();
        for mention in &message.mentions {
            if seen.insert(mention.id) {
                credit(&mut board, &resolve_name(mention, resolver), true, false);
            }
        }
    }

    board.sort_by_total();
    board
}
