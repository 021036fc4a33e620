//! In-memory view of a Tvheadend configuration folder with find-or-create
//! lookups by name.
//!
//! Records are handed out as index handles rather than references so a
//! caller can hold a mux, a channel and a tag at the same time and mutate
//! them one after another.

use std::collections::{HashSet, HashMap};
use std::fs;
use std::io;
use anyhow::{Context, Result};
use crate::store::codec::write_entity;
use crate::store::layout::Layout;
use crate::store::{hash, loader};
use crate::tvh::{Channel, Mux, Network, Service, State, Tag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MuxRef {
    pub network: usize,
    pub mux: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceRef {
    pub mux: MuxRef,
    pub service: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelRef(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagRef(usize);

/// Save outcome for one kind of record
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KindCount {
    pub created: usize,
    pub updated: usize,
    /// Updated records whose file content did not change
    pub unchanged: usize,
}

impl KindCount {
    fn record(&mut self, state: State, unchanged: bool) {
        match state {
            State::Created => self.created += 1,
            State::Updated => {
                self.updated += 1;
                if unchanged {
                    self.unchanged += 1;
                }
            }
            State::New | State::Loaded => {}
        }
    }

    pub fn total(&self) -> usize {
        self.created + self.updated
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SaveReport {
    pub networks: KindCount,
    pub muxes: KindCount,
    pub services: KindCount,
    pub channels: KindCount,
    pub tags: KindCount,
}

pub struct Configuration {
    layout: Layout,
    default_network_name: String,
    networks: Vec<Network>,
    channels: Vec<Channel>,
    tags: Vec<Tag>,
}

impl Configuration {
    /// An empty configuration, as for a fresh Tvheadend install
    pub fn new(layout: Layout, default_network_name: &str) -> Self {
        Self {
            layout,
            default_network_name: default_network_name.to_string(),
            networks: Vec::new(),
            channels: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Load everything under the layout root. Unreadable parts are logged and skipped.
    pub fn read_from_disk(layout: Layout, default_network_name: &str) -> Self {
        tracing::info!("Reading Tvheadend configuration from {}", layout.root().display());
        let mut config = Self::new(layout, default_network_name);
        config.networks = loader::read_networks(&config.layout);
        config.channels = loader::read_channels(&config.layout);
        config.tags = loader::read_tags(&config.layout);

        let services = config
            .networks
            .iter()
            .flat_map(|n| &n.muxes)
            .flat_map(|m| &m.services)
            .map(|s| s.svcname.as_deref());
        warn_duplicates("service", services);
        warn_duplicates("channel", config.channels.iter().map(|c| c.name.as_deref()));
        warn_duplicates("tag", config.tags.iter().map(|t| t.name.as_deref()));

        tracing::info!(
            "Loaded {} networks, {} muxes, {} channels, {} tags",
            config.networks.len(),
            config.networks.iter().map(|n| n.muxes.len()).sum::<usize>(),
            config.channels.len(),
            config.tags.len()
        );
        config
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Find the first service named `name` in any mux of any network, or
    /// create a new mux holding just that service in the default network.
    pub fn resolve_service(&mut self, name: &str) -> ServiceRef {
        for (n, network) in self.networks.iter().enumerate() {
            for (m, mux) in network.muxes.iter().enumerate() {
                if let Some(s) = mux.find_service(name) {
                    return ServiceRef {
                        mux: MuxRef { network: n, mux: m },
                        service: s,
                    };
                }
            }
        }

        tracing::info!("Create new mux with service for {}", name);
        let network = self.default_network();
        let muxes = &mut self.networks[network].muxes;
        muxes.push(Mux::with_service(Service::new(name)));
        ServiceRef {
            mux: MuxRef { network, mux: muxes.len() - 1 },
            service: 0,
        }
    }

    /// The mux owning the service named `service_name`, created if needed
    pub fn resolve_mux(&mut self, service_name: &str) -> MuxRef {
        self.resolve_service(service_name).mux
    }

    pub fn resolve_channel(&mut self, name: &str) -> ChannelRef {
        if let Some(i) = self.channels.iter().position(|c| c.name.as_deref() == Some(name)) {
            return ChannelRef(i);
        }

        tracing::info!("Create new channel for {}", name);
        self.channels.push(Channel::new(name));
        ChannelRef(self.channels.len() - 1)
    }

    pub fn resolve_tag(&mut self, name: &str) -> TagRef {
        if let Some(i) = self.tags.iter().position(|t| t.name.as_deref() == Some(name)) {
            return TagRef(i);
        }

        tracing::info!("Create new tag for {}", name);
        self.tags.push(Tag::new(name));
        TagRef(self.tags.len() - 1)
    }

    fn default_network(&mut self) -> usize {
        if let Some(i) = self
            .networks
            .iter()
            .position(|n| n.is_named(&self.default_network_name))
        {
            return i;
        }

        tracing::info!("Create new network {}", self.default_network_name);
        self.networks.push(Network::new(&self.default_network_name));
        self.networks.len() - 1
    }

    pub fn mux(&self, r: MuxRef) -> &Mux {
        &self.networks[r.network].muxes[r.mux]
    }

    pub fn mux_mut(&mut self, r: MuxRef) -> &mut Mux {
        &mut self.networks[r.network].muxes[r.mux]
    }

    pub fn service(&self, r: ServiceRef) -> &Service {
        &self.mux(r.mux).services[r.service]
    }

    pub fn service_mut(&mut self, r: ServiceRef) -> &mut Service {
        &mut self.mux_mut(r.mux).services[r.service]
    }

    pub fn channel(&self, r: ChannelRef) -> &Channel {
        &self.channels[r.0]
    }

    pub fn channel_mut(&mut self, r: ChannelRef) -> &mut Channel {
        &mut self.channels[r.0]
    }

    pub fn tag(&self, r: TagRef) -> &Tag {
        &self.tags[r.0]
    }

    /// Delete the files of loaded channels whose id is not in `keep` and drop
    /// them from memory. Returns how many were removed.
    pub fn remove_stale_channels(&mut self, keep: &HashSet<String>) -> Result<usize> {
        let (kept, stale): (Vec<Channel>, Vec<Channel>) = std::mem::take(&mut self.channels)
            .into_iter()
            .partition(|c| c.state != State::Loaded || keep.contains(&c.id));
        self.channels = kept;

        let channels_dir = self.layout.channels_dir();
        for channel in &stale {
            let path = channels_dir.join(&channel.id);
            match fs::remove_file(&path) {
                Ok(()) => tracing::info!("Removed stale channel {:?} ({})", channel.name.as_deref(), channel.id),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to remove stale channel file: {}", path.display())
                    })
                }
            }
        }
        Ok(stale.len())
    }

    /// Write every record: networks with their muxes and services, then
    /// channels, then tags.
    pub fn save(&mut self) -> Result<SaveReport> {
        let mut report = SaveReport::default();

        for network in &mut self.networks {
            let path = Layout::config_file(&self.layout.network_dir(&network.id));
            let unchanged = write_entity(network, &path)?;
            report.networks.record(network.state, unchanged);

            for mux in &mut network.muxes {
                let path = Layout::config_file(&self.layout.mux_dir(&network.id, &mux.id));
                let unchanged = write_entity(mux, &path)?;
                report.muxes.record(mux.state, unchanged);

                let services_dir = self.layout.services_dir(&network.id, &mux.id);
                for service in &mut mux.services {
                    let path = services_dir.join(&service.id);
                    let unchanged = write_entity(service, &path)?;
                    report.services.record(service.state, unchanged);
                }
            }
        }
        log_saved("networks", &report.networks);
        log_saved("muxes", &report.muxes);
        log_saved("services", &report.services);

        let channels_dir = self.layout.channels_dir();
        for channel in &mut self.channels {
            let path = channels_dir.join(&channel.id);
            let unchanged = write_entity(channel, &path)?;
            report.channels.record(channel.state, unchanged);
        }
        log_saved("channels", &report.channels);

        let tags_dir = self.layout.tags_dir();
        for tag in &mut self.tags {
            let path = tags_dir.join(&tag.id);
            let unchanged = write_entity(tag, &path)?;
            report.tags.record(tag.state, unchanged);
        }
        log_saved("tags", &report.tags);

        Ok(report)
    }

    /// Content hash of the whole configuration, see [`hash::compute_hash`]
    pub fn hash(&self) -> Result<String> {
        hash::compute_hash(&self.networks, &self.channels, &self.tags)
    }
}

fn log_saved(kind: &str, count: &KindCount) {
    tracing::info!(
        "Saved {} {} to disk ({} created; {} updated, {} unchanged)",
        count.total(),
        kind,
        count.created,
        count.updated,
        count.unchanged
    );
}

/// Duplicate names are left alone; lookups return the first one loaded
fn warn_duplicates<'a>(kind: &str, names: impl Iterator<Item = Option<&'a str>>) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for name in names.flatten() {
        *seen.entry(name).or_default() += 1;
    }
    for (name, count) in seen.into_iter().filter(|(_, count)| *count > 1) {
        tracing::warn!("Found {} {}s named {:?}, using the first one", count, kind, name);
    }
}
