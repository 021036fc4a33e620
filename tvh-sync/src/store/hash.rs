use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use crate::tvh::{Channel, Entity, Network, Tag};

/// Only stable content is hashed: `last_seen` moves on every sync without
/// the configuration meaningfully changing.
const VOLATILE_KEYS: &[&str] = &["last_seen"];

#[derive(Serialize)]
struct HashView<'a> {
    kind: &'static str,
    id: &'a str,
    parent: &'a str,
    body: Value,
}

fn view<'a, T: Entity>(entity: &'a T, parent: &'a str) -> Result<HashView<'a>> {
    let mut body = serde_json::to_value(entity)
        .with_context(|| format!("Failed to serialize {} {} for hashing", T::KIND, entity.id()))?;
    if let Value::Object(map) = &mut body {
        for key in VOLATILE_KEYS {
            map.remove(*key);
        }
    }
    Ok(HashView { kind: T::KIND, id: entity.id(), parent, body })
}

/// SHA-256 over the whole configuration graph, hex encoded.
/// Records are sorted by kind and id so load order does not matter.
pub fn compute_hash(networks: &[Network], channels: &[Channel], tags: &[Tag]) -> Result<String> {
    let mut views = Vec::new();
    for network in networks {
        views.push(view(network, "")?);
        for mux in &network.muxes {
            views.push(view(mux, &network.id)?);
            for service in &mux.services {
                views.push(view(service, &mux.id)?);
            }
        }
    }
    for channel in channels {
        views.push(view(channel, "")?);
    }
    for tag in tags {
        views.push(view(tag, "")?);
    }
    views.sort_by(|a, b| (a.kind, a.id).cmp(&(b.kind, b.id)));

    let json = serde_json::to_string(&views).context("Failed to serialize configuration for hashing")?;
    Ok(hex::encode(Sha256::digest(json.as_bytes())))
}
