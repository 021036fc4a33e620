use serde::Deserialize;

/// A channel as scraped from the provider's web assets.
/// This is the input handed to the synchronizer; it is never written to Tvheadend as-is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Channel {
    /// Provider key, e.g. "ned1"
    #[serde(default)]
    pub key: String,

    /// Provider display name, e.g. "NPO 1"
    pub name: String,

    /// Whether this is a radio channel
    #[serde(default)]
    pub radio: bool,

    /// Stream locations in provider order
    #[serde(default)]
    pub locations: Vec<ChannelLocation>,

    /// Icon file names relative to the icon folder
    #[serde(default)]
    pub icons: Vec<String>,
}

/// A labelled stream url, e.g. ("fiber", "igmp://239.1.1.1:7000")
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelLocation {
    pub name: String,
    pub url: String,
}

/// One line of the channel ordering list: `{number},{original name}[,{new name}]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelListItem {
    pub number: i64,
    pub original_name: String,
    pub new_name: Option<String>,
}

impl ChannelListItem {
    pub fn new(number: i64, original_name: impl Into<String>) -> Self {
        Self {
            number,
            original_name: original_name.into(),
            new_name: None,
        }
    }

    /// Name the channel should get in Tvheadend
    pub fn display_name(&self) -> &str {
        match self.new_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.original_name,
        }
    }

    /// Parse a single ordering line. Returns None for anything that is not
    /// two or three comma separated parts with a numeric first part.
    pub fn parse(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.split(',').map(str::trim).collect();
        if parts.len() != 2 && parts.len() != 3 {
            return None;
        }

        let number = parts[0].parse::<i64>().ok()?;
        Some(Self {
            number,
            original_name: parts[1].to_string(),
            new_name: parts.get(2).map(|s| s.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_parts() {
        let item = ChannelListItem::parse("1, NPO 1").unwrap();
        assert_eq!(item.number, 1);
        assert_eq!(item.original_name, "NPO 1");
        assert_eq!(item.new_name, None);
        assert_eq!(item.display_name(), "NPO 1");
    }

    #[test]
    fn test_parse_with_override() {
        let item = ChannelListItem::parse("12,RTL 4 HD,RTL 4").unwrap();
        assert_eq!(item.number, 12);
        assert_eq!(item.display_name(), "RTL 4");
    }

    #[test]
    fn test_blank_override_falls_back() {
        let item = ChannelListItem::parse("3,Veronica,  ").unwrap();
        assert_eq!(item.display_name(), "Veronica");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(ChannelListItem::parse("").is_none());
        assert!(ChannelListItem::parse("NPO 1").is_none());
        assert!(ChannelListItem::parse("x,NPO 1").is_none());
        assert!(ChannelListItem::parse("1,a,b,c").is_none());
    }
}
