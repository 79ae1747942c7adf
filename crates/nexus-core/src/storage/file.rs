use std::path::PathBuf;

use anyhow::{Context, Result};

use super::KeyValueStore;

/// Stores each key as a file in one directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create storage directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read stored value: {}", key))?;
        Ok(Some(contents))
    }

    /// Write to a sibling temp file and rename, so a crash never leaves a torn value
    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        let tmp = self.dir.join(format!(".{}.tmp", key));
        std::fs::write(&tmp, value)
            .with_context(|| format!("Failed to write stored value: {}", key))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to commit stored value: {}", key))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove stored value: {}", key)),
        }
    }
}
