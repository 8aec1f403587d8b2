// Tracked state file: gives every coordinate's first commit a real change.

use std::io;
use std::path::{Path, PathBuf};

use contribart_common::types::RepositoryState;

/// File name of the state file at the repository root.
pub const STATE_FILE: &str = "data.json";

pub fn state_path(repo_root: &Path) -> PathBuf {
    repo_root.join(STATE_FILE)
}

/// Write the empty state (`{}`) used for freshly initialized repositories.
pub fn initialize_state(repo_root: &Path) -> io::Result<()> {
    std::fs::write(state_path(repo_root), "{}")
}

/// Overwrite the state file with `state`.
pub fn write_state(repo_root: &Path, state: &RepositoryState) -> io::Result<()> {
    let contents = serde_json::to_string_pretty(state).map_err(io::Error::other)?;
    std::fs::write(state_path(repo_root), contents)
}

/// Read the last applied coordinate, or `None` if the file is still empty.
pub fn read_state(repo_root: &Path) -> io::Result<Option<RepositoryState>> {
    let contents = std::fs::read_to_string(state_path(repo_root))?;
    let value: serde_json::Value = serde_json::from_str(&contents).map_err(io::Error::other)?;
    if value.as_object().is_some_and(|object| object.is_empty()) {
        return Ok(None);
    }
    serde_json::from_value(value).map(Some).map_err(io::Error::other)
}
