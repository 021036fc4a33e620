use std::fs;
use std::path::{Path, PathBuf};
use crate::store::codec::read_entity;
use crate::store::layout::Layout;
use crate::tvh::{Channel, Entity, Mux, Network, Service, Tag};

/// Read every network with its muxes and their services
pub fn read_networks(layout: &Layout) -> Vec<Network> {
    list_dir(&layout.networks_dir(), true)
        .into_iter()
        .filter_map(|folder| read_network(layout, &folder))
        .collect()
}

/// Read every channel from `channel/config`
pub fn read_channels(layout: &Layout) -> Vec<Channel> {
    read_flat(&layout.channels_dir())
}

/// Read every tag from `channel/tag`
pub fn read_tags(layout: &Layout) -> Vec<Tag> {
    read_flat(&layout.tags_dir())
}

fn read_network(layout: &Layout, folder: &Path) -> Option<Network> {
    tracing::debug!("Read network from {}", folder.display());
    let mut network: Network = read_config(folder)?;

    network.muxes = list_dir(&layout.muxes_dir(&network.id), true)
        .into_iter()
        .filter_map(|mux_folder| read_mux(layout, &network.id, &mux_folder))
        .collect();

    tracing::debug!(
        "Read network {} ({:?}) with {} muxes",
        network.id,
        network.networkname,
        network.muxes.len()
    );
    Some(network)
}

fn read_mux(layout: &Layout, network_id: &str, folder: &Path) -> Option<Mux> {
    let mut mux: Mux = read_config(folder)?;
    mux.services = read_flat::<Service>(&layout.services_dir(network_id, &mux.id));
    Some(mux)
}

/// Read the `config` file of a network or mux folder, skipping the folder
/// when the file is missing or broken
fn read_config<T: Entity>(folder: &Path) -> Option<T> {
    let config = Layout::config_file(folder);
    match read_entity::<T>(&config) {
        Ok(Some(mut entity)) => {
            // The folder, not the file, carries the id
            if let Some(id) = folder.file_name().and_then(|name| name.to_str()) {
                entity.set_id(id.to_string());
            }
            Some(entity)
        }
        Ok(None) => {
            tracing::warn!("{} config file ({}) doesn't exist", T::KIND, config.display());
            None
        }
        Err(e) => {
            tracing::warn!("Skipping {}: {:#}", T::KIND, e);
            None
        }
    }
}

/// Read a folder holding one record per file
fn read_flat<T: Entity>(folder: &Path) -> Vec<T> {
    list_dir(folder, false)
        .into_iter()
        .filter_map(|file| match read_entity::<T>(&file) {
            Ok(entity) => entity,
            Err(e) => {
                tracing::warn!("Skipping {}: {:#}", T::KIND, e);
                None
            }
        })
        .collect()
}

/// Entries of `folder` sorted by name, only directories or only files.
/// A missing or unreadable folder is treated as empty.
fn list_dir(folder: &Path, dirs: bool) -> Vec<PathBuf> {
    let entries = match fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Directory {} can't be read: {}", folder.display(), e);
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| if dirs { path.is_dir() } else { path.is_file() })
        .collect();
    paths.sort();
    paths
}
