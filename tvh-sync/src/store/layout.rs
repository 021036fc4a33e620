use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use serde_json::json;
use shared::protocol::{
    CHANNEL_CONFIG_DIR, CHANNEL_TAG_DIR, CONFIG_FILE, EPG_CHANNELS_DIR, IPTV_DIR, MUXES_DIR,
    NETWORKS_DIR, SERVICES_DIR,
};
use crate::store::codec;
use crate::tvh::generate_id;

/// Paths inside a Tvheadend configuration folder.
///
/// The shape of this tree is what Tvheadend reads on startup, so every path
/// is built here and nowhere else.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn join(&self, parts: &[&str]) -> PathBuf {
        parts.iter().fold(self.root.clone(), |path, part| path.join(part))
    }

    pub fn iptv_dir(&self) -> PathBuf {
        self.join(&IPTV_DIR)
    }

    pub fn iptv_config(&self) -> PathBuf {
        self.iptv_dir().join(CONFIG_FILE)
    }

    pub fn networks_dir(&self) -> PathBuf {
        self.iptv_dir().join(NETWORKS_DIR)
    }

    pub fn network_dir(&self, network_id: &str) -> PathBuf {
        self.networks_dir().join(network_id)
    }

    pub fn muxes_dir(&self, network_id: &str) -> PathBuf {
        self.network_dir(network_id).join(MUXES_DIR)
    }

    pub fn mux_dir(&self, network_id: &str, mux_id: &str) -> PathBuf {
        self.muxes_dir(network_id).join(mux_id)
    }

    pub fn services_dir(&self, network_id: &str, mux_id: &str) -> PathBuf {
        self.mux_dir(network_id, mux_id).join(SERVICES_DIR)
    }

    pub fn channels_dir(&self) -> PathBuf {
        self.join(&CHANNEL_CONFIG_DIR)
    }

    pub fn tags_dir(&self) -> PathBuf {
        self.join(&CHANNEL_TAG_DIR)
    }

    pub fn epg_channels_dir(&self) -> PathBuf {
        self.join(&EPG_CHANNELS_DIR)
    }

    /// `config` file inside a network or mux folder
    pub fn config_file(folder: &Path) -> PathBuf {
        folder.join(CONFIG_FILE)
    }

    /// Create the folders Tvheadend expects and the IPTV input config if it
    /// is missing. Nothing that already exists is touched.
    pub fn prepare(&self) -> Result<()> {
        for dir in [
            self.networks_dir(),
            self.channels_dir(),
            self.tags_dir(),
            self.epg_channels_dir(),
        ] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }

        let iptv_config = self.iptv_config();
        if !iptv_config.exists() {
            let config = json!({
                "uuid": generate_id(),
                "skipinitscan": true,
                "autodiscovery": false,
            });
            fs::write(&iptv_config, codec::to_json(&config)?)
                .with_context(|| format!("Failed to write {}", iptv_config.display()))?;
            tracing::info!("Created IPTV input config {}", iptv_config.display());
        }

        Ok(())
    }
}
