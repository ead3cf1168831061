use serenity::all::ChannelType;

use crate::models::ChannelInfo;

/// Text-like channels whose name contains `pattern`.
pub fn is_eligible(kind: ChannelType, name: &str, pattern: &str) -> bool {
    matches!(kind, ChannelType::Text | ChannelType::News) && name.contains(pattern)
}

/// Picks eligible channels, ordered by name.
pub fn select_channels<I>(channels: I, pattern: &str) -> Vec<ChannelInfo>
where
    I: IntoIterator<Item = (ChannelInfo, ChannelType)>,
{
    let mut selected: Vec<_> = channels
        .into_iter()
        .filter(|(info, kind)| is_eligible(*kind, &info.name, pattern))
        .map(|(info, _)| info)
        .collect();
    selected.sort_by(|a, b| a.name.cmp(&b.name));
    selected
}
