mod channel;
mod config;
mod error;
mod message;
mod run;
mod stats;

pub use channel::{ChannelInfo, Destination};
pub use config::BotConfig;
pub use error::TallyError;
pub use message::{Identity, MemberName, ReactionCount, TallyMessage, CROSS_EMOJI};
pub use run::{ChannelStats, RunStats};
pub use stats::{Contribution, Leaderboard, PeriodReport, UserStat};
