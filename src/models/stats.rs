use std::collections::HashMap;

use super::TallyError;

/// One unit of activity credited to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contribution {
    /// The user authored a counted message.
    Post,
    /// The user was mentioned in a counted message.
    Mention,
}

impl Contribution {
    /// Builds a contribution from a pair of flags, rejecting any pair that
    /// isn't exactly one of the two.
    pub fn from_flags(name: &str, mention: bool, post: bool) -> Result<Self, TallyError> {
        match (mention, post) {
            (true, false) => Ok(Contribution::Mention),
            (false, true) => Ok(Contribution::Post),
            _ => Err(TallyError::AmbiguousContribution {
                name: name.to_string(),
                mention,
                post,
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserStat {
    pub name: String,
    pub total: u64,
    pub mentions: u64,
    pub posts: u64,
}

impl UserStat {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    fn apply(&mut self, contribution: Contribution) {
        self.total += 1;
        match contribution {
            Contribution::Post => self.posts += 1,
            Contribution::Mention => self.mentions += 1,
        }
    }
}

/// Per-user activity for one period, keyed by display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<UserStat>,
    index: HashMap<String, usize>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `contribution` to `name`, creating the entry on first sight.
    pub fn record(&mut self, name: &str, contribution: Contribution) {
        let slot = match self.index.get(name) {
            Some(&slot) => slot,
            None => {
                self.entries.push(UserStat::new(name));
                self.index.insert(name.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        self.entries[slot].apply(contribution);
    }

    /// Flag-based update. Fails without touching the board unless exactly
    /// one flag is set.
    pub fn update(&mut self, name: &str, mention: bool, post: bool) -> Result<(), TallyError> {
        let contribution = Contribution::from_flags(name, mention, post)?;
        self.record(name, contribution);
        Ok(())
    }

    /// Orders entries by total, highest first. Ties keep insertion order.
    pub fn sort_by_total(&mut self) {
        self.entries.sort_by(|a, b| b.total.cmp(&a.total));
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(slot, stat)| (stat.name.clone(), slot))
            .collect();
    }

    pub fn get(&self, name: &str) -> Option<&UserStat> {
        self.index.get(name).map(|&slot| &self.entries[slot])
    }

    pub fn entries(&self) -> &[UserStat] {
        &self.entries
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|stat| stat.total).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Current and prior leaderboards with their aggregate totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodReport {
    pub current: Leaderboard,
    pub prior: Leaderboard,
    pub current_total: u64,
    pub prior_total: u64,
    pub delta: i64,
}
