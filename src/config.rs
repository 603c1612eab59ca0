//! Configuration for yourdb
//!
//! Centralized configuration with sensible defaults.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Main configuration for a yourdb instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Base filename shared by the three backing files:
    ///   {base_path}.link   (index: id → offset/length)
    ///   {base_path}.meta   (allocation cursor + deleted-byte statistic)
    ///   {base_path}.store  (raw payload bytes)
    pub base_path: PathBuf,

    /// Sync strategy: how often to fsync the backing files
    pub sync_strategy: SyncStrategy,
}

/// File sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStrategy {
    /// Leave flushing to the OS; files are synced on close only
    #[default]
    Never,

    /// fsync after every mutating write (safest, slowest)
    EveryWrite,
}

impl SyncStrategy {
    pub(crate) fn sync_on_write(self) -> bool {
        matches!(self, SyncStrategy::EveryWrite)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("./yourdb_data/storage"),
            sync_strategy: SyncStrategy::Never,
        }
    }
}

impl Config {
    pub const LINK_EXT: &'static str = ".link";
    pub const META_EXT: &'static str = ".meta";
    pub const STORE_EXT: &'static str = ".store";

    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Path of the index file
    pub fn link_path(&self) -> PathBuf {
        with_extension(&self.base_path, Self::LINK_EXT)
    }

    /// Path of the metadata file
    pub fn meta_path(&self) -> PathBuf {
        with_extension(&self.base_path, Self::META_EXT)
    }

    /// Path of the blob file
    pub fn store_path(&self) -> PathBuf {
        with_extension(&self.base_path, Self::STORE_EXT)
    }
}

/// Appends `ext` verbatim; `Path::with_extension` would replace a dotted
/// suffix already present in the base name.
fn with_extension(base: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(ext);
    PathBuf::from(name)
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the base path shared by the backing files
    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.base_path = path.into();
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
