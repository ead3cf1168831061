use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc, Weekday};
use tracing::{error, info};

/// Day of the week the tally runs on.
pub const RUN_WEEKDAY: Weekday = Weekday::Sun;
/// Hour of day (UTC) the tally runs at.
pub const RUN_HOUR: i64 = 9;

/// Work fired by the weekly timer.
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, now: DateTime<Utc>) -> Result<()>;
}

/// First run slot strictly after `after`.
pub fn next_occurrence(after: DateTime<Utc>) -> DateTime<Utc> {
    let today = after.date_naive();
    let days_ahead = (i64::from(RUN_WEEKDAY.num_days_from_monday())
        - i64::from(today.weekday().num_days_from_monday()))
    .rem_euclid(7);

    let midnight = (today + Duration::days(days_ahead)).and_time(NaiveTime::default());
    let candidate = Utc.from_utc_datetime(&midnight) + Duration::hours(RUN_HOUR);

    if candidate > after {
        candidate
    } else {
        candidate + Duration::weeks(1)
    }
}

/// Next slot to wait for. Never returns `last` or anything before it, even
/// if the wall clock has stepped back since that slot fired.
pub fn next_slot(now: DateTime<Utc>, last: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match last {
        Some(last) => next_occurrence(now.max(last)),
        None => next_occurrence(now),
    }
}

/// Runs `job` once and logs how it went. Returns whether it succeeded.
pub async fn run_once(job: &dyn ScheduledJob, now: DateTime<Utc>) -> bool {
    match job.run(now).await {
        Ok(()) => {
            info!(job = job.name(), "🎉 scheduled run completed");
            true
        }
        Err(e) => {
            error!(job = job.name(), "scheduled run failed: {:#}", e);
            false
        }
    }
}

/// Fires `job` at every weekly slot, forever. Runs are sequential so a slow
/// run delays the next one instead of overlapping it.
pub async fn run_weekly(job: Arc<dyn ScheduledJob>) {
    let mut last = None;
    loop {
        let now = Utc::now();
        let next = next_slot(now, last);
        let wait = (next - now).to_std().unwrap_or_default();
        info!(job = job.name(), next = %next, "⏰ next run scheduled");

        tokio::time::sleep(wait).await;
        run_once(job.as_ref(), Utc::now().max(next)).await;
        last = Some(next);
    }
}
