use std::collections::HashSet;
use std::path::PathBuf;
use anyhow::Result;
use shared::protocol::{SERVICE_TYPE_RADIO, SERVICE_TYPE_TV, TAG_RADIO, TAG_TV};
use shared::types::{Channel as ScrapedChannel, ChannelListItem, ChannelLocation};
use crate::config::{StalePolicy, TvheadendConfig};
use crate::configuration::{Configuration, SaveReport};
use crate::tvh::{unix_now, Field};

/// Settings that shape how scraped channels are written to Tvheadend
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub interface: String,
    pub location_importance: Vec<String>,
    pub igmp_to_udp: bool,
    pub icon_folder: Option<PathBuf>,
    pub stale_channels: StalePolicy,
}

impl From<&TvheadendConfig> for SyncOptions {
    fn from(config: &TvheadendConfig) -> Self {
        Self {
            interface: config.interface.clone(),
            location_importance: config.location_importance.clone(),
            igmp_to_udp: config.igmp_to_udp,
            icon_folder: config.icon_folder.clone(),
            stale_channels: config.stale_channels,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub saved: SaveReport,
    /// List entries written to a channel
    pub synchronized: usize,
    /// List entries without a scraped channel or without a usable location
    pub skipped: usize,
    /// Stale channels deleted
    pub removed: usize,
    pub hash_before: String,
    pub hash_after: String,
}

impl SyncReport {
    pub fn changed(&self) -> bool {
        self.hash_before != self.hash_after
    }
}

pub struct Synchronizer {
    options: SyncOptions,
}

impl Synchronizer {
    pub fn new(options: SyncOptions) -> Self {
        Self { options }
    }

    /// Bring `config` in line with the channel list, then write everything once
    pub fn run(
        &self,
        config: &mut Configuration,
        list: &[ChannelListItem],
        channels: &[ScrapedChannel],
    ) -> Result<SyncReport> {
        config.layout().prepare()?;
        let hash_before = config.hash()?;

        let mut touched = HashSet::new();
        let mut skipped = 0;
        for entry in list {
            match self.sync_entry(config, entry, channels) {
                Some(channel_id) => {
                    touched.insert(channel_id);
                }
                None => skipped += 1,
            }
        }

        let removed = match self.options.stale_channels {
            StalePolicy::Keep => 0,
            StalePolicy::Remove => config.remove_stale_channels(&touched)?,
        };

        let saved = config.save()?;
        let report = SyncReport {
            saved,
            synchronized: touched.len(),
            skipped,
            removed,
            hash_before,
            hash_after: config.hash()?,
        };

        tracing::info!(
            "Synchronized {} channels ({} skipped, {} stale removed), configuration {}",
            report.synchronized,
            report.skipped,
            report.removed,
            if report.changed() { "changed" } else { "unchanged" }
        );
        Ok(report)
    }

    /// Returns the id of the channel the entry was written to
    fn sync_entry(
        &self,
        config: &mut Configuration,
        entry: &ChannelListItem,
        channels: &[ScrapedChannel],
    ) -> Option<String> {
        let Some(scraped) = channels
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(&entry.original_name))
        else {
            tracing::warn!(
                "Channel '{}' not found in available channels. Ignoring...",
                entry.original_name
            );
            return None;
        };

        let location = match self.pick_location(scraped) {
            Some(LocationPick::Preferred(location)) => location,
            Some(LocationPick::Fallback(location)) => {
                tracing::info!(
                    "Selecting first location {} for channel {}, because no preferred location is found",
                    location.name,
                    scraped.name
                );
                location
            }
            None => {
                tracing::warn!("Ignoring {}, because no locations found", scraped.name);
                return None;
            }
        };
        let url = self.location_url(&location.url);

        let service = config.resolve_service(&entry.original_name);
        let tag = config.resolve_tag(if scraped.radio { TAG_RADIO } else { TAG_TV });
        let channel = config.resolve_channel(entry.display_name());

        let service_id = config.service(service).id.clone();
        let tag_id = config.tag(tag).id.clone();

        let mux = config.mux_mut(service.mux);
        mux.iptv_url = Field::Set(url);
        mux.iptv_interface = Field::Set(self.options.interface.clone());
        mux.iptv_muxname = Field::Set(identifier(&scraped.name));

        let svc = config.service_mut(service);
        svc.dvb_servicetype = Field::Set(if scraped.radio { SERVICE_TYPE_RADIO } else { SERVICE_TYPE_TV });
        svc.last_seen = Field::Set(unix_now());

        let icon = self.find_icon(scraped);
        let ch = config.channel_mut(channel);
        ch.number = Field::Set(entry.number);
        ch.add_tag(&tag_id);
        ch.add_service(&service_id);
        if let Some(icon) = icon {
            ch.icon = Field::Set(icon);
        }

        tracing::debug!("Synchronized {} as channel {}", entry.original_name, ch.id);
        Some(ch.id.clone())
    }

    /// First location matching the preference list, else the first one the
    /// provider lists. Locations without a url are never picked.
    fn pick_location<'c>(&self, channel: &'c ScrapedChannel) -> Option<LocationPick<'c>> {
        let usable = || channel.locations.iter().filter(|l| !l.url.trim().is_empty());

        for preferred in &self.options.location_importance {
            if let Some(location) = usable().find(|l| l.name.eq_ignore_ascii_case(preferred)) {
                return Some(LocationPick::Preferred(location));
            }
        }

        usable().next().map(LocationPick::Fallback)
    }

    fn location_url(&self, url: &str) -> String {
        if self.options.igmp_to_udp {
            url.replace("igmp://", "udp://@")
        } else {
            url.to_string()
        }
    }

    /// First icon of the channel present in the icon folder, as a file:// url
    fn find_icon(&self, channel: &ScrapedChannel) -> Option<String> {
        let folder = self.options.icon_folder.as_ref()?;
        channel
            .icons
            .iter()
            .map(|icon| folder.join(icon))
            .find(|path| path.is_file())
            .map(|path| format!("file://{}", path.display()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LocationPick<'c> {
    /// Named in `location_importance`
    Preferred(&'c ChannelLocation),
    /// None of the preferred names offered; first usable location
    Fallback(&'c ChannelLocation),
}

/// Channel name reduced to letters and digits
fn identifier(name: &str) -> String {
    name.chars().filter(|c| c.is_alphanumeric()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use crate::store::layout::Layout;
    use crate::tvh::State;
    use tempfile::TempDir;

    fn scraped(name: &str, locations: &[(&str, &str)]) -> ScrapedChannel {
        ScrapedChannel {
            key: name.to_lowercase(),
            name: name.to_string(),
            radio: false,
            locations: locations
                .iter()
                .map(|(name, url)| ChannelLocation {
                    name: name.to_string(),
                    url: url.to_string(),
                })
                .collect(),
            icons: Vec::new(),
        }
    }

    fn options(preferred: &[&str]) -> SyncOptions {
        SyncOptions {
            interface: "eth0".to_string(),
            location_importance: preferred.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn run(
        dir: &TempDir,
        options: SyncOptions,
        list: &[ChannelListItem],
        channels: &[ScrapedChannel],
    ) -> (Configuration, SyncReport) {
        let mut config = Configuration::read_from_disk(Layout::new(dir.path()), "IPTV");
        let report = Synchronizer::new(options).run(&mut config, list, channels).unwrap();
        (config, report)
    }

    #[test]
    fn test_bootstrap_empty_folder() {
        let dir = TempDir::new().unwrap();
        let list = [ChannelListItem::new(1, "Channel1")];
        let channels = [scraped("Channel1", &[("fiber", "udp://A")])];

        let (config, report) = run(&dir, options(&[]), &list, &channels);

        assert_eq!(config.networks().len(), 1);
        let network = &config.networks()[0];
        assert_eq!(network.muxes.len(), 1);
        let mux = &network.muxes[0];
        assert_eq!(mux.iptv_url.as_deref(), Some("udp://A"));
        assert_eq!(mux.iptv_interface.as_deref(), Some("eth0"));
        assert_eq!(mux.services.len(), 1);
        let service = &mux.services[0];
        assert_eq!(service.svcname.as_deref(), Some("Channel1"));

        assert_eq!(config.channels().len(), 1);
        let channel = &config.channels()[0];
        assert_eq!(channel.name.as_deref(), Some("Channel1"));
        assert_eq!(channel.number, Field::Set(1));
        assert_eq!(channel.services, vec![service.id.clone()]);

        assert_eq!(config.tags().len(), 1);
        let tag = &config.tags()[0];
        assert_eq!(tag.name.as_deref(), Some("TV"));
        assert_eq!(channel.tags, vec![tag.id.clone()]);

        assert_eq!(report.synchronized, 1);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.saved.networks.created, 1);
        assert_eq!(report.saved.muxes.created, 1);
        assert_eq!(report.saved.services.created, 1);
        assert_eq!(report.saved.channels.created, 1);
        assert_eq!(report.saved.tags.created, 1);
        assert!(report.changed());

        let layout = Layout::new(dir.path());
        let service_file = layout.services_dir(&network.id, &mux.id).join(&service.id);
        assert!(service_file.is_file());
        assert!(layout.channels_dir().join(&channel.id).is_file());
        assert!(layout.tags_dir().join(&tag.id).is_file());
        assert!(layout.epg_channels_dir().is_dir());
        assert!(layout.iptv_config().is_file());
    }

    #[test]
    fn test_radio_channel_gets_radio_tag() {
        let dir = TempDir::new().unwrap();
        let mut radio = scraped("Radio 1", &[("fiber", "udp://R")]);
        radio.radio = true;

        let (config, _) = run(&dir, options(&[]), &[ChannelListItem::new(1, "Radio 1")], &[radio]);

        assert_eq!(config.tags()[0].name.as_deref(), Some("Radio"));
        let service = &config.networks()[0].muxes[0].services[0];
        assert_eq!(service.dvb_servicetype, Field::Set(SERVICE_TYPE_RADIO));
    }

    #[test]
    fn test_second_run_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let list = [ChannelListItem::new(1, "NPO 1"), ChannelListItem::new(2, "NPO 2")];
        let channels = [
            scraped("NPO 1", &[("fiber", "udp://1")]),
            scraped("NPO 2", &[("fiber", "udp://2")]),
        ];

        let (first, _) = run(&dir, options(&[]), &list, &channels);
        let (second, report) = run(&dir, options(&[]), &list, &channels);

        for kind in [
            report.saved.networks,
            report.saved.muxes,
            report.saved.services,
            report.saved.channels,
            report.saved.tags,
        ] {
            assert_eq!(kind.created, 0);
        }
        assert_eq!(report.saved.networks.updated, 1);
        assert_eq!(report.saved.muxes.updated, 2);
        assert_eq!(report.saved.services.updated, 2);
        assert_eq!(report.saved.channels.updated, 2);
        assert_eq!(report.saved.tags.updated, 1);
        assert_eq!(report.saved.channels.unchanged, 2);
        assert!(!report.changed());
        assert!(second.channels().iter().all(|c| c.state == State::Updated));

        let ids = |config: &Configuration| -> Vec<String> {
            config.channels().iter().map(|c| c.id.clone()).collect()
        };
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn test_preferred_location_wins() {
        let dir = TempDir::new().unwrap();
        let channels = [scraped("NPO 1", &[("cable", "udp://A"), ("fiber", "udp://B")])];

        let (config, _) = run(&dir, options(&["fiber"]), &[ChannelListItem::new(1, "NPO 1")], &channels);
        assert_eq!(config.networks()[0].muxes[0].iptv_url.as_deref(), Some("udp://B"));
    }

    #[test]
    fn test_falls_back_to_first_location() {
        let dir = TempDir::new().unwrap();
        let channels = [scraped("NPO 1", &[("cable", "udp://A"), ("fiber", "udp://B")])];

        let (config, _) = run(&dir, options(&["satellite"]), &[ChannelListItem::new(1, "NPO 1")], &channels);
        assert_eq!(config.networks()[0].muxes[0].iptv_url.as_deref(), Some("udp://A"));
    }

    #[test]
    fn test_pick_location_reports_fallback() {
        let channel = scraped("NPO 1", &[("cable", " "), ("fiber", "udp://B"), ("dsl", "udp://C")]);

        let sync = Synchronizer::new(options(&["satellite", "DSL"]));
        assert_eq!(sync.pick_location(&channel), Some(LocationPick::Preferred(&channel.locations[2])));

        let sync = Synchronizer::new(options(&["satellite"]));
        assert_eq!(sync.pick_location(&channel), Some(LocationPick::Fallback(&channel.locations[1])));

        let sync = Synchronizer::new(options(&[]));
        assert_eq!(sync.pick_location(&channel), Some(LocationPick::Fallback(&channel.locations[1])));

        let empty = scraped("NPO 2", &[("cable", "")]);
        assert_eq!(sync.pick_location(&empty), None);
    }

    #[test]
    fn test_igmp_rewritten_to_udp() {
        let dir = TempDir::new().unwrap();
        let channels = [scraped("NPO 1", &[("fiber", "igmp://239.1.1.1:7000")])];
        let mut opts = options(&[]);
        opts.igmp_to_udp = true;

        let (config, _) = run(&dir, opts, &[ChannelListItem::new(1, "NPO 1")], &channels);
        let mux = &config.networks()[0].muxes[0];
        assert_eq!(mux.iptv_url.as_deref(), Some("udp://@239.1.1.1:7000"));
        assert_eq!(mux.iptv_muxname.as_deref(), Some("NPO1"));
    }

    #[test]
    fn test_unmatched_entry_is_skipped() {
        let dir = TempDir::new().unwrap();
        let channels = [scraped("NPO 1", &[("fiber", "udp://1")])];

        let (config, report) = run(&dir, options(&[]), &[ChannelListItem::new(1, "Unknown")], &channels);
        assert!(config.networks().is_empty());
        assert!(config.channels().is_empty());
        assert!(config.tags().is_empty());
        assert_eq!(report.skipped, 1);
        assert_eq!(report.synchronized, 0);
    }

    #[test]
    fn test_channel_without_location_is_skipped() {
        let dir = TempDir::new().unwrap();
        let channels = [scraped("NPO 1", &[]), scraped("NPO 2", &[("fiber", "  ")])];
        let list = [ChannelListItem::new(1, "NPO 1"), ChannelListItem::new(2, "NPO 2")];

        let (config, report) = run(&dir, options(&[]), &list, &channels);
        assert!(config.networks().is_empty());
        assert!(config.channels().is_empty());
        assert_eq!(report.skipped, 2);
    }

    #[test]
    fn test_entry_matches_scraped_name_case_insensitively_and_renames() {
        let dir = TempDir::new().unwrap();
        let channels = [scraped("RTL 4 HD", &[("fiber", "udp://4")])];
        let list = [ChannelListItem::parse("4,rtl 4 hd,RTL 4").unwrap()];

        let (config, _) = run(&dir, options(&[]), &list, &channels);
        assert_eq!(config.channels()[0].name.as_deref(), Some("RTL 4"));
        assert_eq!(config.channels()[0].number, Field::Set(4));
    }

    #[test]
    fn test_tag_referenced_once_for_repeated_entries() {
        let dir = TempDir::new().unwrap();
        let channels = [scraped("NPO 1", &[("fiber", "udp://1")])];
        let list = [ChannelListItem::new(1, "NPO 1"), ChannelListItem::new(1, "NPO 1")];

        let (config, _) = run(&dir, options(&[]), &list, &channels);
        assert_eq!(config.channels().len(), 1);
        assert_eq!(config.channels()[0].tags.len(), 1);
        assert_eq!(config.channels()[0].services.len(), 1);
    }

    #[test]
    fn test_unknown_fields_survive_sync() {
        let dir = TempDir::new().unwrap();
        let list = [ChannelListItem::new(1, "NPO 1")];
        let channels = [scraped("NPO 1", &[("fiber", "udp://1")])];
        let (config, _) = run(&dir, options(&[]), &list, &channels);

        // Tvheadend adds its own keys between runs
        let layout = Layout::new(dir.path());
        let path = layout.channels_dir().join(&config.channels()[0].id);
        let mut json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        json["autoname"] = serde_json::json!(false);
        json["epg_running"] = serde_json::json!(-1);
        json["dvr_config"] = serde_json::json!({"profile": "default", "retention": [1, 2]});
        fs::write(&path, serde_json::to_string(&json).unwrap()).unwrap();

        run(&dir, options(&[]), &list, &channels);

        let after: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(after["autoname"], serde_json::json!(false));
        assert_eq!(after["epg_running"], serde_json::json!(-1));
        assert_eq!(after["dvr_config"], json["dvr_config"]);
        assert_eq!(after["name"], "NPO 1");
    }

    #[test]
    fn test_legacy_records_with_loose_types_are_reused() {
        let dir = TempDir::new().unwrap();
        let layout = Layout::new(dir.path());
        fs::create_dir_all(layout.channels_dir()).unwrap();
        fs::create_dir_all(layout.tags_dir()).unwrap();
        fs::write(layout.channels_dir().join("legacy"), r#"{"name": "NPO 1", "number": "1", "icon": null}"#).unwrap();
        fs::write(layout.tags_dir().join("tv"), r#"{"name": "TV", "index": "0", "comment": null}"#).unwrap();

        let channels = [scraped("NPO 1", &[("fiber", "udp://1")])];
        let (config, _) = run(&dir, options(&[]), &[ChannelListItem::new(1, "NPO 1")], &channels);

        assert_eq!(config.channels().len(), 1);
        assert_eq!(config.channels()[0].id, "legacy");
        assert_eq!(config.channels()[0].tags, vec!["tv".to_string()]);
        assert_eq!(fs::read_dir(layout.channels_dir()).unwrap().count(), 1);
        assert_eq!(fs::read_dir(layout.tags_dir()).unwrap().count(), 1);

        let channel: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(layout.channels_dir().join("legacy")).unwrap()).unwrap();
        assert_eq!(channel["number"], serde_json::json!(1));
        assert!(channel["icon"].is_null());
        let tag: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(layout.tags_dir().join("tv")).unwrap()).unwrap();
        assert!(tag.as_object().unwrap().contains_key("comment"));
        assert!(tag["comment"].is_null());
    }

    #[test]
    fn test_stale_channels_kept_by_default() {
        let dir = TempDir::new().unwrap();
        let layout = Layout::new(dir.path());
        fs::create_dir_all(layout.channels_dir()).unwrap();
        fs::write(layout.channels_dir().join("handmade"), r#"{"name": "Local cam", "number": 99}"#).unwrap();

        let channels = [scraped("NPO 1", &[("fiber", "udp://1")])];
        let (config, report) = run(&dir, options(&[]), &[ChannelListItem::new(1, "NPO 1")], &channels);

        assert_eq!(report.removed, 0);
        assert_eq!(config.channels().len(), 2);
        assert!(layout.channels_dir().join("handmade").exists());
    }

    #[test]
    fn test_stale_channels_removed_when_configured() {
        let dir = TempDir::new().unwrap();
        let layout = Layout::new(dir.path());
        fs::create_dir_all(layout.channels_dir()).unwrap();
        fs::write(layout.channels_dir().join("handmade"), r#"{"name": "Local cam"}"#).unwrap();

        let channels = [scraped("NPO 1", &[("fiber", "udp://1")])];
        let mut opts = options(&[]);
        opts.stale_channels = StalePolicy::Remove;
        let (config, report) = run(&dir, opts, &[ChannelListItem::new(1, "NPO 1")], &channels);

        assert_eq!(report.removed, 1);
        assert_eq!(config.channels().len(), 1);
        assert!(!layout.channels_dir().join("handmade").exists());
    }

    #[test]
    fn test_icon_taken_from_icon_folder() {
        let dir = TempDir::new().unwrap();
        let icons = TempDir::new().unwrap();
        fs::write(icons.path().join("npo1.png"), b"png").unwrap();

        let mut channel = scraped("NPO 1", &[("fiber", "udp://1")]);
        channel.icons = vec!["missing.png".to_string(), "npo1.png".to_string()];
        let mut opts = options(&[]);
        opts.icon_folder = Some(icons.path().to_path_buf());

        let (config, _) = run(&dir, opts, &[ChannelListItem::new(1, "NPO 1")], &[channel]);
        let expected = format!("file://{}", icons.path().join("npo1.png").display());
        assert_eq!(config.channels()[0].icon.as_deref(), Some(expected.as_str()));
    }
}
