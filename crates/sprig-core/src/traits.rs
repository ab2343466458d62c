//! Trait abstractions for state storage operations.
//!
//! This module defines the `StateStore` trait which abstracts state persistence,
//! enabling dependency injection and testability.

use std::path::Path;

use crate::Result;
use crate::config::{Settings, TrunkConfig};
use crate::metadata::Metadata;

/// Trait for state storage operations.
///
/// Implemented by [`crate::State`] on disk and by in-memory stores in tests.
#[allow(clippy::missing_errors_doc)]
pub trait StateStore {
    // === Initialization ===

    /// Check if sprig is initialized in this repository.
    fn is_initialized(&self) -> bool;

    /// Write the trunk config and an empty metadata document.
    ///
    /// Fails with `AlreadyInitialized` if a config exists.
    fn init(&self, config: &TrunkConfig) -> Result<()>;

    /// Get the path to the sprig directory.
    fn sprig_dir(&self) -> &Path;

    // === Config Operations ===

    /// Load the trunk config, failing with `NotInitialized` if absent.
    fn load_config(&self) -> Result<TrunkConfig>;

    /// Save the trunk config.
    fn save_config(&self, config: &TrunkConfig) -> Result<()>;

    /// Name of the trunk branch.
    fn trunk(&self) -> Result<String> {
        Ok(self.load_config()?.trunk)
    }

    // === Metadata Operations ===

    /// Load branch metadata; a missing document is empty.
    fn load_metadata(&self) -> Result<Metadata>;

    /// Save branch metadata, failing with `MetadataPersist`.
    fn save_metadata(&self, metadata: &Metadata) -> Result<()>;

    // === Settings ===

    /// Load tool settings, defaulting when absent.
    fn load_settings(&self) -> Result<Settings>;
}
