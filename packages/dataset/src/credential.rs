//! Optional Mapbox access token.
//!
//! The authenticated tile style is only offered when a token file exists
//! and holds a non-empty token. Absence is not an error: the map falls
//! back to OpenStreetMap tiles.

use std::fmt;
use std::path::Path;

/// A Mapbox access token.
///
/// `Debug` output is redacted so the token never reaches logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a token, trimming surrounding whitespace. Returns `None` for
    /// an empty token.
    #[must_use]
    pub fn new(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            None
        } else {
            Some(Self(token.to_owned()))
        }
    }

    /// Returns the raw token for embedding in a scene.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Reads the access token at `path`.
///
/// Returns `None`, logging at info level, when the file is absent or empty.
/// Other read failures are logged as warnings and also yield `None`.
#[must_use]
pub fn load_access_token(path: &Path) -> Option<AccessToken> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let token = AccessToken::new(&content);
            if token.is_none() {
                log::info!(
                    "Mapbox token file {} is empty, Mapbox map style will be disabled",
                    path.display()
                );
            } else {
                log::info!("Loaded Mapbox token from {}", path.display());
            }
            token
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!(
                "Mapbox token not found at {}, Mapbox map style will be disabled",
                path.display()
            );
            None
        }
        Err(e) => {
            log::warn!(
                "Failed to read Mapbox token from {}: {e}; Mapbox map style will be disabled",
                path.display()
            );
            None
        }
    }
}
