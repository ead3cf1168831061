use crate::models::{Leaderboard, PeriodReport};

/// Week-over-week comparison on aggregate totals only.
pub fn compare(current: Leaderboard, prior: Leaderboard) -> PeriodReport {
    let current_total = current.total();
    let prior_total = prior.total();

    PeriodReport {
        current,
        prior,
        current_total,
        prior_total,
        delta: current_total as i64 - prior_total as i64,
    }
}
