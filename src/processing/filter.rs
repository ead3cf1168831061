use crate::models::TallyMessage;

/// Community-note check: a message is excluded from the tally when ❌ is its
/// most-reacted emoji. ❌ wins ties against reactions seen before it, and
/// loses as soon as a later reaction strictly overtakes it.
pub fn should_exclude(message: &TallyMessage) -> bool {
    let mut cross_is_leading = false;
    let mut largest_count_seen = 0;

    for reaction in &message.reactions {
        if cross_is_leading && reaction.count > largest_count_seen {
            return false;
        }
        if reaction.is_cross() && reaction.count >= largest_count_seen {
            cross_is_leading = true;
        }
        largest_count_seen = largest_count_seen.max(reaction.count);
    }

    cross_is_leading
}
