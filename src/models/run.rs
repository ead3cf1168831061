use std::time::{Duration, Instant};

use tracing::info;

#[derive(Debug, Default, Clone)]
pub struct ChannelStats {
    pub name: String,
    pub messages_scanned: usize,
    pub current_total: u64,
    pub delta: i64,
    pub time_taken: Duration,
}

/// Outcome of one scheduled run over every eligible channel.
#[derive(Debug)]
pub struct RunStats {
    pub channels_processed: usize,
    pub channels_failed: usize,
    pub total_messages: usize,
    pub channel_stats: Vec<ChannelStats>,
    pub start_time: Instant,
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            channels_processed: 0,
            channels_failed: 0,
            total_messages: 0,
            channel_stats: Vec::new(),
            start_time: Instant::now(),
        }
    }

    pub fn add_channel_stats(&mut self, stats: ChannelStats) {
        self.channels_processed += 1;
        self.total_messages += stats.messages_scanned;
        self.channel_stats.push(stats);
    }

    pub fn add_failure(&mut self) {
        self.channels_failed += 1;
    }

    pub fn log_stats(&self) {
        info!(
            elapsed = ?self.start_time.elapsed(),
            processed = self.channels_processed,
            failed = self.channels_failed,
            messages = self.total_messages,
            "📊 weekly tally finished"
        );
        for stats in &self.channel_stats {
            info!(
                channel = %stats.name,
                messages = stats.messages_scanned,
                total = stats.current_total,
                delta = stats.delta,
                time = ?stats.time_taken,
                "  #{}", stats.name
            );
        }
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}
