//! Directory operations

use std::path::{Component, Path, PathBuf};

use tokio::fs;

use crate::errors::RoadError;
use crate::filesys::file::File;

/// A directory wrapper with path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dir {
    path: PathBuf,
}

impl Dir {
    /// Create a new directory reference
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the directory (and parents)
    pub async fn create(&self) -> Result<(), RoadError> {
        fs::create_dir_all(&self.path).await?;
        Ok(())
    }

    /// Get a file within this directory
    pub fn file(&self, name: &str) -> File {
        File::new(self.path.join(name))
    }

    /// Path of `target` expressed relative to this directory.
    ///
    /// Both paths are compared lexically; callers pass paths resolved
    /// against the same base.
    pub fn relative_path_to(&self, target: &Path) -> PathBuf {
        let from: Vec<Component> = self.path.components().collect();
        let to: Vec<Component> = target.components().collect();

        let common = from
            .iter()
            .zip(to.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let mut relative = PathBuf::new();
        for _ in common..from.len() {
            relative.push("..");
        }
        for component in &to[common..] {
            relative.push(component.as_os_str());
        }
        relative
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_sibling() {
        let dir = Dir::new("/srv/memory/snapshots");
        let rel = dir.relative_path_to(Path::new("/srv/memory/journal.json"));
        assert_eq!(rel, PathBuf::from("../journal.json"));
    }

    #[test]
    fn test_relative_path_nested() {
        let dir = Dir::new("/srv/memory");
        let rel = dir.relative_path_to(Path::new("/srv/memory/logs/journal.json"));
        assert_eq!(rel, PathBuf::from("logs/journal.json"));
    }

    #[tokio::test]
    async fn test_create_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = Dir::new(tmp.path().join("a").join("b"));
        assert!(!dir.path().exists());
        dir.create().await.unwrap();
        assert!(dir.path().is_dir());
    }
}
