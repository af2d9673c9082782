//! Shared fixtures for the integration flows.

use serde_json::Value;
use std::fs;
use std::path::Path;

/// Parse every published file under `group_dir`, oldest first.
///
/// Files still being written (hidden names) are ignored.
pub fn read_published(group_dir: &Path) -> Vec<Vec<Value>> {
    let mut names: Vec<String> = match fs::read_dir(group_dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| !name.starts_with('.'))
            .collect(),
        Err(_) => return Vec::new(),
    };
    names.sort_by_key(|name| sort_key(name));

    names
        .iter()
        .filter_map(|name| fs::read(group_dir.join(name)).ok())
        .filter_map(|bytes| serde_json::from_slice::<Vec<Value>>(&bytes).ok())
        .collect()
}

/// Names are `<micros>-<sequence>.json`.
fn sort_key(name: &str) -> (u128, u64) {
    let stem = name.trim_end_matches(".json");
    let mut parts = stem.splitn(2, '-');
    let micros = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let sequence = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    (micros, sequence)
}

/// Names of hidden files left in `group_dir`.
pub fn hidden_files(group_dir: &Path) -> Vec<String> {
    fs::read_dir(group_dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .filter(|name| name.starts_with('.'))
                .collect()
        })
        .unwrap_or_default()
}
