//! Single-document JSON files with atomic replacement.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::StorageError;

/// A JSON file holding one value of type `T`.
pub struct JsonFile<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T> JsonFile<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl<T: DeserializeOwned> JsonFile<T> {
    /// Read the value, or `None` if the file does not exist.
    pub fn read(&self) -> Result<Option<T>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)?;
        let value = serde_json::from_str(&contents)?;
        debug!("Read {:?}", self.path);
        Ok(Some(value))
    }
}

impl<T: DeserializeOwned + Default> JsonFile<T> {
    /// Read the value, falling back to `T::default()` when the file is
    /// missing or unreadable.
    pub fn read_or_default(&self) -> T {
        match self.read() {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                warn!("Ignoring unreadable {:?}: {}", self.path, e);
                T::default()
            }
        }
    }
}

impl<T: Serialize> JsonFile<T> {
    /// Replace the file contents: write a sibling temp file, then rename it over the target.
    pub fn write(&self, value: &T) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.temp_path();
        {
            let file = File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        debug!("Wrote {:?}", self.path);
        Ok(())
    }
}

impl<T: Serialize + Default> JsonFile<T> {
    /// Create the file with a default value if it does not exist yet.
    pub fn ensure(&self) -> Result<bool, StorageError> {
        if self.exists() {
            return Ok(false);
        }
        self.write(&T::default())?;
        Ok(true)
    }
}
