//! Zone-to-email notification directory.
//!
//! A flat JSON configuration maps zone numbers to the mailbox of the crew
//! responsible for the zone. The directory is consulted with the zone *label*
//! stored on a report (`"Zone 5"`), because that label is the one value the
//! report keeps after resolution.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use super::catalog::ZoneResolution;

#[derive(Debug, Deserialize)]
struct DirectoryFile {
    zones: Vec<DirectoryEntry>,
}

#[derive(Debug, Deserialize)]
struct DirectoryEntry {
    zone_number: u32,
    email: String,
}

/// Immutable zone number → notification address mapping.
///
/// The zone numbers here need not match the catalog's set; a lookup for an
/// unlisted zone simply misses.
#[derive(Debug, Default)]
pub struct ZoneDirectory {
    entries: HashMap<u32, String>,
}

impl ZoneDirectory {
    pub fn new(entries: HashMap<u32, String>) -> Self {
        Self { entries }
    }

    /// Loads the directory, degrading every failure to an empty directory.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        match Self::from_path(path.as_ref()) {
            Ok(directory) => directory,
            Err(error) => {
                warn!(path = %path.as_ref().display(), %error, "zone email directory unavailable, notifications will be skipped");
                Self::default()
            }
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, DirectoryError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, DirectoryError> {
        let file: DirectoryFile = serde_json::from_str(content)?;
        Ok(Self::new(
            file.zones
                .into_iter()
                .map(|entry| (entry.zone_number, entry.email))
                .collect(),
        ))
    }

    /// Resolves a zone label to the notification address for that zone.
    ///
    /// Empty and `"Unknown Zone"` labels short-circuit to `None`; otherwise the
    /// zone number is the label's last whitespace-separated token. Malformed
    /// labels and directory misses are both `None`, never an error.
    pub fn notification_address(&self, zone_label: &str) -> Option<&str> {
        if zone_label.is_empty() || zone_label == ZoneResolution::UNKNOWN_LABEL {
            return None;
        }

        let zone_number: u32 = zone_label.split_whitespace().last()?.parse().ok()?;
        self.entries.get(&zone_number).map(String::as_str)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("failed to read zone email directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("zone email directory is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
