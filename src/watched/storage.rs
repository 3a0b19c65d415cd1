use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Durable named slots holding one serialized value each.
pub trait KeyValueStorage: Send + Sync {
    /// `Ok(None)` when the slot has never been written.
    fn read(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Replaces the whole slot.
    fn write(&self, key: &str, value: &str) -> Result<(), AppError>;
}

/// One `<dir>/<key>.json` file per slot.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, AppError> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), AppError> {
        fs::create_dir_all(&self.dir)?;

        // Readers never see a half-written slot.
        let path = self.slot_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;

        tracing::debug!(path = %path.display(), bytes = value.len(), "Slot written");
        Ok(())
    }
}

#[cfg(test)]
pub use memory::MemoryStorage;
