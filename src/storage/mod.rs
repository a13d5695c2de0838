//! Durable storage for cached ranking data.
//!
//! Everything lives in flat JSON snapshots under the data directory:
//! - `settings.json`: region and the tournament count of the last refresh
//! - `players.json`: player list of the region
//! - `rankings.json`: ranking snapshot
//! - `match_records.json`: match history keyed by player ID
//!
//! Each write replaces the whole file through a temp file and a rename.

mod cache_store;
mod json_file;

pub use cache_store::*;
pub use json_file::*;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }

    pub fn players_path(&self) -> PathBuf {
        self.data_dir.join("players.json")
    }

    pub fn rankings_path(&self) -> PathBuf {
        self.data_dir.join("rankings.json")
    }

    pub fn match_records_path(&self) -> PathBuf {
        self.data_dir.join("match_records.json")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_paths() {
        let config = StorageConfig::new(PathBuf::from("/data"));

        assert_eq!(config.settings_path(), PathBuf::from("/data/settings.json"));
        assert_eq!(config.players_path(), PathBuf::from("/data/players.json"));
        assert_eq!(config.rankings_path(), PathBuf::from("/data/rankings.json"));
        assert_eq!(
            config.match_records_path(),
            PathBuf::from("/data/match_records.json")
        );
    }

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }
}
