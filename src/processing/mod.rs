mod aggregate;
mod channel;
mod compare;
mod discord;
mod filter;
mod schedule;
mod traits;

pub use aggregate::{aggregate, resolve_name};
pub use channel::{
    destination_for, handle_channel, process_channels, run_channel, PERIOD_DAYS, RUN_TIMEOUT,
};
pub use compare::compare;
pub use discord::{
    created_at, snowflake_at, to_tally, trim_page, DiscordHistory, DiscordSink, GuildNames,
    TrimmedPage, WeeklyTally,
};
pub use filter::should_exclude;
pub use schedule::{
    next_occurrence, next_slot, run_once, run_weekly, ScheduledJob, RUN_HOUR, RUN_WEEKDAY,
};
pub use traits::{DeliverySink, HistorySource, NameResolver};
