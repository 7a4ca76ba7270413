//! Sync configuration — venue list and per-venue policy, loaded from TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use fillbook_core::classify;
use fillbook_core::InstrumentKind;

use crate::pipeline::VenuePolicy;

/// Errors from loading a sync config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config declares no venues")]
    NoVenues,
}

/// Top-level sync configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(rename = "venue")]
    pub venues: Vec<VenueConfig>,
}

/// One venue's settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueConfig {
    /// Display name, used in trade records and fingerprints.
    pub name: String,

    /// Instrument category this venue's fills belong to.
    #[serde(default = "default_kind")]
    pub kind: InstrumentKind,

    /// Path to a JSON array of raw fill records for this venue.
    pub fills: PathBuf,

    /// Tag markers identifying automated orders. Defaults to the built-in
    /// marker list when omitted.
    #[serde(default)]
    pub bot_markers: Option<Vec<String>>,

    /// Spot-venue policy: mark every trade from this venue as bot,
    /// independent of tag detection.
    #[serde(default)]
    pub force_bot: bool,
}

fn default_kind() -> InstrumentKind {
    InstrumentKind::Futures
}

impl SyncConfig {
    /// Load and validate a TOML config file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text)?;
        if config.venues.is_empty() {
            return Err(ConfigError::NoVenues);
        }
        Ok(config)
    }
}

impl VenueConfig {
    pub fn policy(&self) -> VenuePolicy {
        VenuePolicy {
            venue: self.name.clone(),
            kind: self.kind,
            bot_markers: self
                .bot_markers
                .clone()
                .unwrap_or_else(classify::default_markers),
            force_bot: self.force_bot,
        }
    }
}
