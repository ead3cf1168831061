use std::fmt;

use serde::Deserialize;
use serenity::all::UserId;

/// Bot settings, read once at startup and shared read-only with the job.
#[derive(Clone, Deserialize)]
pub struct BotConfig {
    pub token: String,
    /// Channels whose name contains this are tallied.
    pub channel: String,
    /// Optional DM recipient for reports.
    #[serde(default)]
    pub user: Option<UserId>,
    /// Print reports to stdout instead of posting them.
    #[serde(default)]
    pub dry_run: bool,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("channel", &self.channel)
            .field("user", &self.user)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}
