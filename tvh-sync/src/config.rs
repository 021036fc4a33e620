use std::path::{Path, PathBuf};
use serde::Deserialize;
use anyhow::{bail, Context, Result};
use shared::protocol::DEFAULT_NETWORK_NAME;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub tvheadend: TvheadendConfig,
    #[serde(default)]
    pub input: InputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TvheadendConfig {
    /// Tvheadend configuration root, e.g. /home/hts/.hts/tvheadend
    pub folder: PathBuf,
    /// Network new muxes are added to
    #[serde(default = "default_network_name")]
    pub network_name: String,
    /// Value written to `iptv_interface` of every synchronized mux
    #[serde(default)]
    pub interface: String,
    /// Location labels in order of preference, e.g. ["fiber", "cable"]
    #[serde(default)]
    pub location_importance: Vec<String>,
    /// Rewrite igmp:// urls to udp://@
    #[serde(default)]
    pub igmp_to_udp: bool,
    /// Folder holding downloaded channel icons
    #[serde(default)]
    pub icon_folder: Option<PathBuf>,
    #[serde(default)]
    pub stale_channels: StalePolicy,
}

/// What to do with channels on disk that no list entry resolved to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StalePolicy {
    /// Leave them alone
    #[default]
    Keep,
    /// Delete their config files
    Remove,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    /// Scraped channels, a JSON array
    #[serde(default = "default_channels_file")]
    pub channels_file: PathBuf,
    /// Ordering list, one `{number},{name}[,{new name}]` per line
    #[serde(default)]
    pub channel_list_file: Option<PathBuf>,
}

fn default_network_name() -> String {
    DEFAULT_NETWORK_NAME.to_string()
}

fn default_channels_file() -> PathBuf {
    PathBuf::from("/var/lib/tvh-sync/channels.json")
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            channels_file: default_channels_file(),
            channel_list_file: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tvheadend.network_name.trim().is_empty() {
            bail!("tvheadend.network_name must not be empty");
        }
        if self.tvheadend.location_importance.iter().any(|l| l.trim().is_empty()) {
            bail!("tvheadend.location_importance must not contain empty labels");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [tvheadend]
            folder = "/home/hts/.hts/tvheadend"
            "#,
        )
        .unwrap();

        assert_eq!(config.tvheadend.folder, PathBuf::from("/home/hts/.hts/tvheadend"));
        assert_eq!(config.tvheadend.network_name, "IPTV");
        assert!(config.tvheadend.location_importance.is_empty());
        assert!(!config.tvheadend.igmp_to_udp);
        assert_eq!(config.tvheadend.stale_channels, StalePolicy::Keep);
        assert_eq!(config.input.channels_file, default_channels_file());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_config() {
        let config: Config = toml::from_str(
            r#"
            [tvheadend]
            folder = "/tvh"
            network_name = "Glashart"
            interface = "eth1"
            location_importance = ["fiber", "cable"]
            igmp_to_udp = true
            icon_folder = "/icons"
            stale_channels = "remove"

            [input]
            channels_file = "/data/channels.json"
            channel_list_file = "/data/channels.txt"
            "#,
        )
        .unwrap();

        assert_eq!(config.tvheadend.interface, "eth1");
        assert_eq!(config.tvheadend.location_importance, vec!["fiber", "cable"]);
        assert_eq!(config.tvheadend.stale_channels, StalePolicy::Remove);
        assert_eq!(config.input.channel_list_file, Some(PathBuf::from("/data/channels.txt")));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: Result<Config, _> = toml::from_str(
            r#"
            [tvheadend]
            folder = "/tvh"
            TvMenuURL = "http://example"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_empty_values() {
        let mut config: Config = toml::from_str("[tvheadend]\nfolder = \"/tvh\"\n").unwrap();
        config.tvheadend.location_importance = vec!["fiber".into(), " ".into()];
        assert!(config.validate().is_err());

        config.tvheadend.location_importance.clear();
        config.tvheadend.network_name = String::new();
        assert!(config.validate().is_err());
    }
}
