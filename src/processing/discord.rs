use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serenity::all::{
    ChannelId, GetMessages, GuildId, GuildInfo, GuildPagination, Http, Member, Message, MessageId,
    ReactionType, User, UserId,
};
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

use super::channel::process_channels;
use super::schedule::ScheduledJob;
use super::traits::{DeliverySink, HistorySource, NameResolver};
use crate::display::ConsoleSink;
use crate::models::{
    BotConfig, ChannelInfo, Destination, Identity, MemberName, ReactionCount, RunStats, TallyMessage,
};
use crate::utils::select_channels;

const MESSAGE_PAGE: u8 = 100;
const MEMBER_PAGE: u64 = 1000;
const GUILD_PAGE: u64 = 200;
const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

/// Smallest message snowflake Discord could assign at `time`.
pub fn snowflake_at(time: DateTime<Utc>) -> MessageId {
    let ms = u64::try_from(time.timestamp_millis()).unwrap_or(0);
    MessageId::new((ms.saturating_sub(DISCORD_EPOCH_MS) << 22).max(1))
}

/// Creation time encoded in a snowflake, to the millisecond.
pub fn created_at(id: MessageId) -> DateTime<Utc> {
    let ms = (id.get() >> 22).saturating_add(DISCORD_EPOCH_MS);
    DateTime::from_timestamp_millis(i64::try_from(ms).unwrap_or(i64::MAX)).unwrap_or_default()
}

/// One page of history cut down to `[start, end)` by snowflake.
pub struct TrimmedPage {
    pub kept: Vec<TallyMessage>,
    /// No later page can hold messages inside the window.
    pub done: bool,
}

/// Both windows are cut on the same snowflake boundary, so a message lands
/// in exactly one of them.
pub fn trim_page(page: Vec<TallyMessage>, start: MessageId, end: Option<MessageId>) -> TrimmedPage {
    let short = page.len() < usize::from(MESSAGE_PAGE);
    let past_window = end.is_some_and(|end| page.iter().any(|m| m.id >= end));
    let kept = page
        .into_iter()
        .filter(|m| m.id >= start && end.is_none_or(|end| m.id < end))
        .collect();

    TrimmedPage {
        kept,
        done: short || past_window,
    }
}

fn identity(user: &User) -> Identity {
    Identity {
        id: user.id,
        username: user.name.clone(),
    }
}

fn emoji_name(reaction: &ReactionType) -> String {
    match reaction {
        ReactionType::Unicode(emoji) => emoji.clone(),
        ReactionType::Custom { id, name, .. } => name.clone().unwrap_or_else(|| id.to_string()),
        other => other.to_string(),
    }
}

pub fn to_tally(message: &Message) -> TallyMessage {
    TallyMessage {
        id: message.id,
        author: identity(&message.author),
        mentions: message.mentions.iter().map(identity).collect(),
        reactions: message
            .reactions
            .iter()
            .map(|r| ReactionCount::new(emoji_name(&r.reaction_type), r.count))
            .collect(),
        timestamp: created_at(message.id),
    }
}

/// Channel history over the REST API.
pub struct DiscordHistory {
    http: Arc<Http>,
}

impl DiscordHistory {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl HistorySource for DiscordHistory {
    async fn fetch_history(
        &self,
        channel: ChannelId,
        after: DateTime<Utc>,
        before: Option<DateTime<Utc>>,
    ) -> Result<Vec<TallyMessage>> {
        let start = snowflake_at(after);
        let end = before.map(snowflake_at);
        // `after` is exclusive on Discord's side.
        let mut cursor = MessageId::new(start.get().saturating_sub(1).max(1));
        let mut collected = Vec::new();

        loop {
            let request = GetMessages::new().after(cursor).limit(MESSAGE_PAGE);
            let batch = channel.messages(self.http.as_ref(), request).await?;
            let Some(newest) = batch.iter().map(|m| m.id).max() else {
                break;
            };

            let page = trim_page(batch.iter().map(to_tally).collect(), start, end);
            collected.extend(page.kept);

            debug!(channel = %channel, fetched = batch.len(), kept = collected.len(), "📥 history page");

            if page.done {
                break;
            }
            cursor = newest;

            // Add a small delay to avoid rate limits
            sleep(Duration::from_millis(50)).await;
        }

        collected.sort_by_key(|m| m.id);
        Ok(collected)
    }
}

fn member_name(member: &Member) -> MemberName {
    MemberName {
        display_name: member
            .nick
            .clone()
            .or_else(|| member.user.global_name.clone()),
        username: member.user.name.clone(),
    }
}

/// Member names for one guild, fetched once per run.
#[derive(Default)]
pub struct GuildNames {
    names: HashMap<UserId, MemberName>,
}

impl GuildNames {
    pub async fn fetch(http: &Http, guild: GuildId) -> Result<Self> {
        let mut names = HashMap::new();
        let mut after: Option<UserId> = None;

        loop {
            let page = guild.members(http, Some(MEMBER_PAGE), after).await?;
            names.extend(page.iter().map(|m| (m.user.id, member_name(m))));
            after = page.last().map(|m| m.user.id);
            if page.len() < MEMBER_PAGE as usize {
                break;
            }
        }

        Ok(Self { names })
    }
}

impl NameResolver for GuildNames {
    fn resolve(&self, user: UserId) -> Option<MemberName> {
        self.names.resolve(user)
    }
}

pub struct DiscordSink {
    http: Arc<Http>,
}

impl DiscordSink {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl DeliverySink for DiscordSink {
    async fn send(&self, destination: Destination, text: &str) -> Result<()> {
        match destination {
            Destination::Channel(id) => {
                id.say(self.http.as_ref(), text).await?;
            }
            Destination::Direct(user) => {
                let dm = user.create_dm_channel(self.http.as_ref()).await?;
                dm.id.say(self.http.as_ref(), text).await?;
            }
        }
        Ok(())
    }
}

async fn fetch_guilds(http: &Http) -> Result<Vec<GuildInfo>> {
    let mut guilds = Vec::new();
    let mut target = None;

    loop {
        let page = http.get_guilds(target, Some(GUILD_PAGE)).await?;
        let short = page.len() < GUILD_PAGE as usize;
        target = page.last().map(|g| GuildPagination::After(g.id));
        guilds.extend(page);
        if short {
            break;
        }
    }

    Ok(guilds)
}

async fn eligible_channels(http: &Http, guild: GuildId, pattern: &str) -> Result<Vec<ChannelInfo>> {
    let channels = guild.channels(http).await?;
    Ok(select_channels(
        channels.into_values().map(|c| {
            (
                ChannelInfo {
                    id: c.id,
                    guild_id: c.guild_id,
                    name: c.name,
                },
                c.kind,
            )
        }),
        pattern,
    ))
}

/// The weekly job: every eligible channel in every guild the bot is in.
pub struct WeeklyTally {
    http: Arc<Http>,
    config: Arc<BotConfig>,
}

impl WeeklyTally {
    pub fn new(http: Arc<Http>, config: Arc<BotConfig>) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl ScheduledJob for WeeklyTally {
    fn name(&self) -> &str {
        "weekly-tally"
    }

    async fn run(&self, now: DateTime<Utc>) -> Result<()> {
        let history = DiscordHistory::new(Arc::clone(&self.http));
        let sink: Box<dyn DeliverySink> = if self.config.dry_run {
            Box::new(ConsoleSink)
        } else {
            Box::new(DiscordSink::new(Arc::clone(&self.http)))
        };

        let guilds = fetch_guilds(&self.http).await.context("listing guilds")?;
        info!(guilds = guilds.len(), "🚀 starting weekly tally");

        let mut run = RunStats::new();
        for guild in guilds {
            let channels = match eligible_channels(&self.http, guild.id, &self.config.channel).await {
                Ok(channels) => channels,
                Err(e) => {
                    warn!(guild = %guild.name, "⚠️ could not list channels: {:#}", e);
                    continue;
                }
            };
            if channels.is_empty() {
                continue;
            }

            let names = GuildNames::fetch(&self.http, guild.id)
                .await
                .unwrap_or_else(|e| {
                    warn!(guild = %guild.name, "⚠️ member lookup failed, using usernames: {:#}", e);
                    GuildNames::default()
                });

            process_channels(
                &channels,
                now,
                &history,
                &names,
                sink.as_ref(),
                self.config.user,
                &mut run,
            )
            .await;
        }

        run.log_stats();
        Ok(())
    }
}
