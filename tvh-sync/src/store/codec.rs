use std::fs;
use std::path::Path;
use anyhow::{Context, Result};
use serde::Serialize;
use crate::tvh::{Entity, State};

/// Read one record from `path`. The file name becomes the record id.
///
/// Returns Ok(None) when there is no file at `path`, and an error when the
/// file exists but cannot be read or parsed.
pub fn read_entity<T: Entity>(path: &Path) -> Result<Option<T>> {
    if !path.is_file() {
        return Ok(None);
    }

    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} file: {}", T::KIND, path.display()))?;
    tracing::debug!("Parse {} json from {}", T::KIND, path.display());

    let mut entity: T = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse {} file: {}", T::KIND, path.display()))?;

    let id = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Invalid {} file name: {}", T::KIND, path.display()))?;

    entity.set_id(id.to_string());
    entity.set_state(State::Loaded);
    Ok(Some(entity))
}

/// Write one record to `path`, creating parent folders as needed.
///
/// Sets the record state to Created or Updated depending on whether a file
/// was already there. Returns true when the file already held exactly the
/// bytes that were written.
pub fn write_entity<T: Entity>(entity: &mut T, path: &Path) -> Result<bool> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let json = to_json(entity)?;
    let existed = path.exists();
    let unchanged = existed && fs::read(path).is_ok_and(|previous| previous == json.as_bytes());
    let state = if existed { State::Updated } else { State::Created };

    fs::write(path, &json)
        .with_context(|| format!("Failed to write {} file: {}", T::KIND, path.display()))?;

    entity.set_state(state);
    tracing::debug!("Written {} to {} ({:?})", T::KIND, path.display(), state);
    Ok(unchanged)
}

/// Tab indented JSON, the way Tvheadend writes its own files
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .context("Failed to serialize record")?;

    let mut json = String::from_utf8(buf).context("Serialized record is not UTF-8")?;
    json.push('\n');
    Ok(json)
}
