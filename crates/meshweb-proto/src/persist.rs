//! Whole-file rewrite with atomic rename: write to a temp path, then
//! rename over the real one, so a crash mid-write never leaves a torn
//! file behind. Adapted from sqlite to plain JSON since the on-disk state
//! here is a handful of named files (`config.json`, etc.) rather than a
//! database.
//!
//! Shared by `meshweb-server` and `meshweb-client` so both sides rewrite
//! their small JSON state files (registry, config, cache index,
//! bookmarks/history) the same way.

use std::io;
use std::path::Path;

pub fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let payload = serde_json::to_vec_pretty(value)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    let tmp_path = path.with_extension("tmp");
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&tmp_path, payload)?;
    std::fs::rename(&tmp_path, path)
}

/// Reads and decodes `path` as JSON, falling back to `default` on a missing
/// or malformed file: log and continue, never abort.
pub fn read_json_or<T: serde::de::DeserializeOwned>(path: &Path, default: T) -> T {
    match std::fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), error = %err, "malformed persistence file, starting fresh");
            default
        }),
        Err(_) => default,
    }
}
