use super::backend::StorageBackend;
use crate::error::{GardenError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Filesystem backend: one file per key under a root directory.
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Backend rooted at the platform data directory for this crate.
    pub fn at_default_root() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "tilegarden").ok_or_else(|| {
            GardenError::Store("could not determine a data directory for this platform".to_string())
        })?;
        Ok(Self::new(dirs.data_dir().to_path_buf()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    fn ensure_root(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(GardenError::Io)?;
        }
        Ok(())
    }
}

impl StorageBackend for FsBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let document = fs::read_to_string(path).map_err(GardenError::Io)?;
        Ok(Some(document))
    }

    fn write(&self, key: &str, document: &str) -> Result<()> {
        self.ensure_root()?;
        let target = self.key_path(key);

        // Atomic write
        let tmp = self.root.join(format!(".{}-{}.tmp", key, Uuid::new_v4()));
        fs::write(&tmp, document).map_err(GardenError::Io)?;
        fs::rename(&tmp, target).map_err(GardenError::Io)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(path).map_err(GardenError::Io)?;
        }
        Ok(())
    }

    fn len(&self, key: &str) -> Result<Option<usize>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let meta = fs::metadata(path).map_err(GardenError::Io)?;
        Ok(Some(meta.len() as usize))
    }
}
