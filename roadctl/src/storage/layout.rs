//! Storage layout configuration

use std::path::{Path, PathBuf};

use crate::filesys::dir::Dir;
use crate::filesys::file::File;

/// Default snapshot directory, relative to the base directory
pub const DEFAULT_SNAPSHOT_DIR: &str = "memory/snapshots";

/// File name of the genesis snapshot inside the snapshot directory
pub const GENESIS_FILE_NAME: &str = "genesis.json";

/// Storage layout for roadctl
///
/// Every relative path found in target definitions (env files, journal
/// files) is resolved against `base_dir`.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    /// Base directory for all storage
    pub base_dir: PathBuf,

    /// Snapshot directory, relative to `base_dir` unless absolute
    pub snapshot_dir: PathBuf,
}

impl StorageLayout {
    /// Create a new storage layout
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            snapshot_dir: PathBuf::from(DEFAULT_SNAPSHOT_DIR),
        }
    }

    /// Override the snapshot directory
    pub fn with_snapshot_dir(mut self, snapshot_dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = snapshot_dir.into();
        self
    }

    /// Resolve a possibly relative path against the base directory
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Get the settings file path
    pub fn settings_file(&self) -> File {
        File::new(self.base_dir.join("roadctl.json"))
    }

    /// Get the snapshot directory
    pub fn snapshots_dir(&self) -> Dir {
        Dir::new(self.resolve(&self.snapshot_dir))
    }

    /// Get the genesis snapshot file
    pub fn genesis_file(&self) -> File {
        self.snapshots_dir().file(GENESIS_FILE_NAME)
    }
}

impl Default for StorageLayout {
    fn default() -> Self {
        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(base_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_and_absolute() {
        let layout = StorageLayout::new("/srv/road");
        assert_eq!(layout.resolve(".env"), PathBuf::from("/srv/road/.env"));
        assert_eq!(layout.resolve("/etc/road.env"), PathBuf::from("/etc/road.env"));
    }

    #[test]
    fn test_genesis_file_location() {
        let layout = StorageLayout::new("/srv/road");
        assert_eq!(
            layout.genesis_file().path(),
            Path::new("/srv/road/memory/snapshots/genesis.json")
        );

        let layout = layout.with_snapshot_dir("/var/lib/road/snap");
        assert_eq!(
            layout.genesis_file().path(),
            Path::new("/var/lib/road/snap/genesis.json")
        );
    }
}
