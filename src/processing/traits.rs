use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serenity::all::{ChannelId, UserId};

use crate::models::{Destination, MemberName, TallyMessage};

/// Bounded message-history retrieval.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Messages posted at or after `after` and, when given, strictly before
    /// `before`, in chronological order.
    async fn fetch_history(
        &self,
        channel: ChannelId,
        after: DateTime<Utc>,
        before: Option<DateTime<Utc>>,
    ) -> Result<Vec<TallyMessage>>;
}

/// Looks up guild member names. `None` means the user isn't a known member.
pub trait NameResolver: Send + Sync {
    fn resolve(&self, user: UserId) -> Option<MemberName>;
}

impl NameResolver for HashMap<UserId, MemberName> {
    fn resolve(&self, user: UserId) -> Option<MemberName> {
        self.get(&user).cloned()
    }
}

#[async_trait]
pub trait DeliverySink: Send + Sync {
    async fn send(&self, destination: Destination, text: &str) -> Result<()>;
}
