//! Configuration documents for sprig.
//!
//! Two files live side by side in `<git common dir>/sprig/`:
//! `config.json` records which branch is trunk, and the optional
//! `settings.toml` tunes `sync`.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Schema version written into new trunk configs.
pub const CONFIG_VERSION: &str = "1.0.0";

/// Trunk configuration written by `sprig init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrunkConfig {
    /// Schema version.
    pub version: String,
    /// Name of the trunk branch.
    pub trunk: String,
    /// When the repository was initialized.
    pub initialized: DateTime<Utc>,
}

impl TrunkConfig {
    /// A fresh config for `trunk`, stamped now.
    #[must_use]
    pub fn new(trunk: impl Into<String>) -> Self {
        Self {
            version: CONFIG_VERSION.into(),
            trunk: trunk.into(),
            initialized: Utc::now(),
        }
    }
}

/// Tool settings loaded from `settings.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Settings for `sprig sync`.
    #[serde(default)]
    pub sync: SyncSettings,
}

impl Settings {
    /// Load settings from a TOML file, falling back to defaults if absent.
    ///
    /// # Errors
    /// Returns error if file can't be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

/// `[sync]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Remote whose trunk is synced from.
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Restack every tracked branch after syncing trunk.
    #[serde(default = "default_true")]
    pub restack: bool,

    /// Offer to delete branches already merged into trunk.
    #[serde(default = "default_true")]
    pub delete_merged: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            restack: true,
            delete_merged: true,
        }
    }
}

fn default_remote() -> String {
    "origin".into()
}

const fn default_true() -> bool {
    true
}
