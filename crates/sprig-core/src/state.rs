//! State persistence for the `<git common dir>/sprig/` directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::{Settings, TrunkConfig};
use crate::error::{Error, Result};
use crate::metadata::Metadata;
use crate::traits::StateStore;

/// Manages the sprig state directory.
#[derive(Debug)]
pub struct State {
    /// Path to the sprig/ directory.
    sprig_dir: PathBuf,
}

impl State {
    /// File names within sprig/
    const CONFIG_FILE: &'static str = "config.json";
    const METADATA_FILE: &'static str = "metadata.json";
    const SETTINGS_FILE: &'static str = "settings.toml";

    /// Create a State rooted in a repository's common git directory.
    ///
    /// # Errors
    /// Returns [`Error::NotARepository`] if `common_dir` does not exist.
    pub fn new(common_dir: impl AsRef<Path>) -> Result<Self> {
        let common_dir = common_dir.as_ref();
        if !common_dir.is_dir() {
            return Err(Error::NotARepository);
        }

        Ok(Self {
            sprig_dir: common_dir.join("sprig"),
        })
    }

    fn config_path(&self) -> PathBuf {
        self.sprig_dir.join(Self::CONFIG_FILE)
    }

    fn metadata_path(&self) -> PathBuf {
        self.sprig_dir.join(Self::METADATA_FILE)
    }

    fn settings_path(&self) -> PathBuf {
        self.sprig_dir.join(Self::SETTINGS_FILE)
    }

    fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| Error::StateParseError {
            file: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Write through a temporary file so a crash never leaves half a document.
    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        fs::create_dir_all(&self.sprig_dir)?;
        let content = serde_json::to_string_pretty(value)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, path)?;
        tracing::debug!(path = %path.display(), "saved");
        Ok(())
    }
}

impl StateStore for State {
    fn is_initialized(&self) -> bool {
        self.config_path().exists()
    }

    fn init(&self, config: &TrunkConfig) -> Result<()> {
        if self.is_initialized() {
            let existing = self.load_config()?;
            return Err(Error::AlreadyInitialized(existing.trunk));
        }

        fs::create_dir_all(&self.sprig_dir)?;
        self.save_config(config)?;
        if !self.metadata_path().exists() {
            self.save_metadata(&Metadata::new())?;
        }
        Ok(())
    }

    fn sprig_dir(&self) -> &Path {
        &self.sprig_dir
    }

    fn load_config(&self) -> Result<TrunkConfig> {
        if !self.is_initialized() {
            return Err(Error::NotInitialized);
        }
        Self::read_json(&self.config_path())
    }

    fn save_config(&self, config: &TrunkConfig) -> Result<()> {
        self.write_json(&self.config_path(), config)
    }

    fn load_metadata(&self) -> Result<Metadata> {
        let path = self.metadata_path();
        if !path.exists() {
            return Ok(Metadata::new());
        }
        Self::read_json(&path)
    }

    fn save_metadata(&self, metadata: &Metadata) -> Result<()> {
        self.write_json(&self.metadata_path(), metadata)
            .map_err(|e| Error::MetadataPersist(e.to_string()))
    }

    fn load_settings(&self) -> Result<Settings> {
        Settings::load(self.settings_path())
    }
}
