use chrono::{DateTime, Utc};
use serenity::all::{MessageId, UserId};

/// Reaction that marks a message as disputed by the community.
pub const CROSS_EMOJI: &str = "❌";

/// A user as it appears on a message, before guild name resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: UserId,
    pub username: String,
}

/// Names a guild knows a member by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberName {
    /// Server nickname, or the account's global display name when no nickname is set.
    pub display_name: Option<String>,
    pub username: String,
}

impl MemberName {
    pub fn preferred(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionCount {
    pub emoji: String,
    pub count: u64,
}

impl ReactionCount {
    pub fn new(emoji: impl Into<String>, count: u64) -> Self {
        Self {
            emoji: emoji.into(),
            count,
        }
    }

    pub fn is_cross(&self) -> bool {
        self.emoji == CROSS_EMOJI
    }
}

/// The parts of a chat message the tally reads.
#[derive(Debug, Clone)]
pub struct TallyMessage {
    pub id: MessageId,
    pub author: Identity,
    pub mentions: Vec<Identity>,
    /// Reaction tallies in the order the platform reports them.
    pub reactions: Vec<ReactionCount>,
    pub timestamp: DateTime<Utc>,
}
