//! Fixture conformance for the federation configuration bridge.
//!
//! Wire documents live under `docs/fixtures/` at the workspace root; the test
//! modules here drive them through the assemblers and the codec config loader.


#[cfg(test)]
use std::path::{Path, PathBuf};

#[cfg(test)]
fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(3)
        .expect("workspace root")
        .to_path_buf()
}

#[cfg(test)]
fn read_json(path: &Path) -> serde_json::Value {
    let data = std::fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read {}: {err}", path.display()));
    serde_json::from_str(&data)
        .unwrap_or_else(|err| panic!("failed to parse {}: {err}", path.display()))
}

/// Every `*.json` file below `relative`, sorted by path.
#[cfg(test)]
fn fixture_paths(relative: &str) -> Vec<PathBuf> {
    let mut pending = vec![workspace_root().join(relative)];
    let mut files = Vec::new();
    while let Some(dir) = pending.pop() {
        let entries = std::fs::read_dir(&dir)
            .unwrap_or_else(|err| panic!("failed to read directory {}: {err}", dir.display()));
        for entry in entries {
            let path = entry
                .unwrap_or_else(|err| panic!("failed to read entry in {}: {err}", dir.display()))
                .path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}
