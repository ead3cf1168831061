use std::time::Instant;

use anyhow::{Context as _, Result};
use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use serenity::all::UserId;
use tokio::time::timeout;
use tracing::{error, info};

use super::aggregate::aggregate;
use super::compare::compare;
use super::traits::{DeliverySink, HistorySource, NameResolver};
use crate::display::format_report;
use crate::models::{ChannelInfo, ChannelStats, Destination, RunStats};

/// Length of one tally period, in days.
pub const PERIOD_DAYS: i64 = 7;

/// Upper bound on one channel's fetch-and-deliver run.
pub const RUN_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(300);

/// Reports go to the configured DM recipient when there is one, otherwise
/// back into the tallied channel.
pub fn destination_for(channel: &ChannelInfo, recipient: Option<UserId>) -> Destination {
    match recipient {
        Some(user) => Destination::Direct(user),
        None => Destination::Channel(channel.id),
    }
}

/// Tallies one channel: the week up to `now` against the week before it,
/// then delivers the report. Nothing is sent if either fetch fails.
pub async fn handle_channel(
    channel: &ChannelInfo,
    now: DateTime<Utc>,
    history: &dyn HistorySource,
    resolver: &dyn NameResolver,
    sink: &dyn DeliverySink,
    destination: Destination,
) -> Result<ChannelStats> {
    let start_time = Instant::now();
    let period = Duration::days(PERIOD_DAYS);
    let week_ago = now - period;
    let two_weeks_ago = week_ago - period;

    info!(channel = %channel.name, "🔍 tallying channel");

    let messages = history
        .fetch_history(channel.id, week_ago, None)
        .await
        .with_context(|| format!("fetching this week's history for #{}", channel.name))?;
    let old_messages = history
        .fetch_history(channel.id, two_weeks_ago, Some(week_ago))
        .await
        .with_context(|| format!("fetching last week's history for #{}", channel.name))?;

    let current = aggregate(&messages, resolver);
    let prior = aggregate(&old_messages, resolver);
    let report = compare(current, prior);
    let text = format_report(&report);

    sink.send(destination, &text)
        .await
        .with_context(|| format!("delivering report for #{} to {}", channel.name, destination))?;

    info!(
        channel = %channel.name,
        total = report.current_total,
        delta = report.delta,
        "✅ report delivered to {}", destination
    );

    Ok(ChannelStats {
        name: channel.name.clone(),
        messages_scanned: messages.len(),
        current_total: report.current_total,
        delta: report.delta,
        time_taken: start_time.elapsed(),
    })
}

/// [`handle_channel`] bounded by [`RUN_TIMEOUT`].
pub async fn run_channel(
    channel: &ChannelInfo,
    now: DateTime<Utc>,
    history: &dyn HistorySource,
    resolver: &dyn NameResolver,
    sink: &dyn DeliverySink,
    destination: Destination,
) -> Result<ChannelStats> {
    timeout(
        RUN_TIMEOUT,
        handle_channel(channel, now, history, resolver, sink, destination),
    )
    .await
    .with_context(|| format!("tally for #{} timed out", channel.name))?
}

/// Runs every channel concurrently. A failing channel is logged and counted,
/// the rest carry on.
pub async fn process_channels(
    channels: &[ChannelInfo],
    now: DateTime<Utc>,
    history: &dyn HistorySource,
    resolver: &dyn NameResolver,
    sink: &dyn DeliverySink,
    recipient: Option<UserId>,
    run: &mut RunStats,
) {
    let results = join_all(channels.iter().map(|channel| {
        let destination = destination_for(channel, recipient);
        async move {
            let result = run_channel(channel, now, history, resolver, sink, destination).await;
            (channel, result)
        }
    }))
    .await;

    for (channel, result) in results {
        match result {
            Ok(stats) => run.add_channel_stats(stats),
            Err(e) => {
                error!(channel = %channel.name, "Error processing channel: {:#}", e);
                run.add_failure();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use serenity::all::{ChannelId, GuildId, MessageId};

    use super::*;
    use crate::models::{Identity, MemberName, TallyMessage};

    type Call = (ChannelId, DateTime<Utc>, Option<DateTime<Utc>>);

    #[derive(Default)]
    struct FakeHistory {
        current: Vec<TallyMessage>,
        prior: Vec<TallyMessage>,
        fail_prior: bool,
        failing_channel: Option<ChannelId>,
        calls: Mutex<Vec<Call>>,
    }

    #[async_trait]
    impl HistorySource for FakeHistory {
        async fn fetch_history(
            &self,
            channel: ChannelId,
            after: DateTime<Utc>,
            before: Option<DateTime<Utc>>,
        ) -> Result<Vec<TallyMessage>> {
            self.calls.lock().unwrap().push((channel, after, before));
            if self.failing_channel == Some(channel) {
                return Err(anyhow!("history unavailable"));
            }
            match before {
                None => Ok(self.current.clone()),
                Some(_) if self.fail_prior => Err(anyhow!("rate limited")),
                Some(_) => Ok(self.prior.clone()),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        fail: bool,
        sent: Mutex<Vec<(Destination, String)>>,
    }

    #[async_trait]
    impl DeliverySink for RecordingSink {
        async fn send(&self, destination: Destination, text: &str) -> Result<()> {
            if self.fail {
                return Err(anyhow!("missing access"));
            }
            self.sent.lock().unwrap().push((destination, text.to_string()));
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 9, 9, 0, 0).unwrap()
    }

    fn channel(id: u64, name: &str) -> ChannelInfo {
        ChannelInfo {
            id: ChannelId::new(id),
            guild_id: GuildId::new(1),
            name: name.to_string(),
        }
    }

    fn post(id: u64, author: u64) -> TallyMessage {
        TallyMessage {
            id: MessageId::new(id),
            author: Identity {
                id: UserId::new(author),
                username: format!("user{}", author),
            },
            mentions: Vec::new(),
            reactions: Vec::new(),
            timestamp: now(),
        }
    }

    fn names() -> HashMap<UserId, MemberName> {
        HashMap::new()
    }

    #[tokio::test]
    async fn fetches_both_windows_then_delivers() {
        let history = FakeHistory {
            current: vec![post(1, 1), post(2, 1), post(3, 2), post(4, 2)],
            prior: (10..16).map(|id| post(id, 3)).collect(),
            ..Default::default()
        };
        let sink = RecordingSink::default();
        let grind = channel(7, "grind");
        let destination = Destination::Channel(grind.id);

        let stats = handle_channel(&grind, now(), &history, &names(), &sink, destination)
            .await
            .unwrap();

        let calls = history.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                (grind.id, now() - Duration::days(7), None),
                (grind.id, now() - Duration::days(14), Some(now() - Duration::days(7))),
            ]
        );

        let sent = sink.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, destination);
        assert!(sent[0].1.starts_with("There were 4 posts and mentions this week\n"));
        assert!(sent[0].1.contains("A change of -2 from week before"));
        assert_eq!(stats.messages_scanned, 4);
        assert_eq!(stats.delta, -2);
    }

    #[tokio::test]
    async fn failed_fetch_sends_nothing() {
        let history = FakeHistory {
            current: vec![post(1, 1)],
            fail_prior: true,
            ..Default::default()
        };
        let sink = RecordingSink::default();
        let grind = channel(7, "grind");

        let result = handle_channel(
            &grind,
            now(),
            &history,
            &names(),
            &sink,
            Destination::Channel(grind.id),
        )
        .await;

        assert!(result.is_err());
        assert!(sink.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_delivery_is_an_error() {
        let history = FakeHistory::default();
        let sink = RecordingSink {
            fail: true,
            ..Default::default()
        };
        let grind = channel(7, "grind");

        let err = handle_channel(
            &grind,
            now(),
            &history,
            &names(),
            &sink,
            Destination::Direct(UserId::new(42)),
        )
        .await
        .unwrap_err();

        assert!(format!("{:#}", err).contains("missing access"));
    }

    #[test]
    fn destination_prefers_dm_recipient() {
        let grind = channel(7, "grind");
        assert_eq!(destination_for(&grind, None), Destination::Channel(grind.id));
        assert_eq!(
            destination_for(&grind, Some(UserId::new(42))),
            Destination::Direct(UserId::new(42))
        );
    }

    #[tokio::test]
    async fn one_failing_channel_does_not_stop_others() {
        let history = FakeHistory {
            current: vec![post(1, 1)],
            failing_channel: Some(ChannelId::new(8)),
            ..Default::default()
        };
        let sink = RecordingSink::default();
        let channels = vec![channel(7, "grind"), channel(8, "grind-broken")];
        let mut run = RunStats::new();

        process_channels(&channels, now(), &history, &names(), &sink, None, &mut run).await;

        assert_eq!(run.channels_processed, 1);
        assert_eq!(run.channels_failed, 1);
        let sent = sink.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, Destination::Channel(ChannelId::new(7)));
    }

    struct StalledHistory;

    #[async_trait]
    impl HistorySource for StalledHistory {
        async fn fetch_history(
            &self,
            _channel: ChannelId,
            _after: DateTime<Utc>,
            _before: Option<DateTime<Utc>>,
        ) -> Result<Vec<TallyMessage>> {
            tokio::time::sleep(RUN_TIMEOUT * 2).await;
            Ok(Vec::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_run_times_out_without_sending() {
        let sink = RecordingSink::default();
        let grind = channel(7, "grind");

        let err = run_channel(
            &grind,
            now(),
            &StalledHistory,
            &names(),
            &sink,
            Destination::Channel(grind.id),
        )
        .await
        .unwrap_err();

        assert!(format!("{:#}", err).contains("timed out"));
        assert!(sink.sent.lock().unwrap().is_empty());
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn process_channels_future_is_send() {
        let history = FakeHistory::default();
        let sink = RecordingSink::default();
        let resolver = names();
        let channels = vec![channel(7, "grind")];
        let mut run = RunStats::new();

        let future =
            process_channels(&channels, now(), &history, &resolver, &sink, None, &mut run);
        assert_send(&future);
    }
}
