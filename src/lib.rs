//! Weekly activity tally for Discord channels.
//!
//! Counts posts and mentions per member over the last week, compares the
//! total with the week before and posts a leaderboard.

pub mod display;
pub mod models;
pub mod processing;
pub mod utils;
