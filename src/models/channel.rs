use std::fmt;

use serenity::all::{ChannelId, GuildId, UserId};

/// An eligible channel picked for the weekly tally.
#[derive(Debug, Clone)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub guild_id: GuildId,
    pub name: String,
}

/// Where a finished report is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Channel(ChannelId),
    Direct(UserId),
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Channel(id) => write!(f, "channel {}", id),
            Destination::Direct(id) => write!(f, "DM to user {}", id),
        }
    }
}
