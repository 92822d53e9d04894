#![allow(clippy::module_name_repetitions)]
//! Canonical file paths for the startup inputs.
//!
//! All paths are relative to the project root's `data/` directory.

use std::path::{Path, PathBuf};

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`, falling back to the
/// current directory when the manifest is not nested as expected.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    project_root().join("data")
}

/// Returns the default aggregate (per-block) CSV path.
#[must_use]
pub fn default_aggregate_path() -> PathBuf {
    data_dir().join("blocks.csv")
}

/// Returns the default transaction CSV path.
#[must_use]
pub fn default_transactions_path() -> PathBuf {
    data_dir().join("transactions.csv")
}

/// Returns the default Mapbox token file path.
#[must_use]
pub fn default_token_path() -> PathBuf {
    data_dir().join("mapbox_token.txt")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_live_under_data_dir() {
        let data = data_dir();
        for path in [
            default_aggregate_path(),
            default_transactions_path(),
            default_token_path(),
        ] {
            assert!(path.starts_with(&data), "{} not under data/", path.display());
        }
    }
}
