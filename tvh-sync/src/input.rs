use std::fs;
use std::path::Path;
use anyhow::{Context, Result};
use shared::types::{Channel, ChannelListItem};

/// Read the scraped channels (a JSON array) produced by the grabber
pub fn read_channels(path: &Path) -> Result<Vec<Channel>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read channels file: {}", path.display()))?;
    let channels: Vec<Channel> = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse channels file: {}", path.display()))?;
    tracing::info!("Read {} scraped channels from {}", channels.len(), path.display());
    Ok(channels)
}

/// Read the channel ordering list. When there is no list, or it holds no
/// valid lines, every available channel is taken in scrape order, numbered from 1.
pub fn read_channel_list(path: Option<&Path>, available: &[Channel]) -> Result<Vec<ChannelListItem>> {
    let mut items = Vec::new();

    if let Some(path) = path.filter(|p| p.exists()) {
        tracing::debug!("Reading channel list from {}", path.display());
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read channel list: {}", path.display()))?;
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            match ChannelListItem::parse(line) {
                Some(item) => items.push(item),
                None => tracing::warn!("Ignoring channel list line {:?}", line),
            }
        }
    }

    if items.is_empty() {
        tracing::info!("No channel list entries, using all {} available channels", available.len());
        items = available
            .iter()
            .zip(1..)
            .map(|(channel, number)| ChannelListItem::new(number, channel.name.clone()))
            .collect();
    }

    Ok(items)
}
