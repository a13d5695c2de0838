//! Persistence of the cache state across the four snapshot files.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{JsonFile, StorageConfig, StorageError};
use crate::cache::CacheState;
use crate::models::{PlayerId, PlayerStats, PlayersResponse, RankingsResponse, Region};

/// Persisted settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Region selected by the last `set_region`, if any
    #[serde(default)]
    pub region: Option<Region>,

    /// Tournament count observed at the last full refresh
    #[serde(default)]
    pub tournaments_on_record: Option<u64>,

    #[serde(default)]
    pub refreshed_at: Option<DateTime<Utc>>,
}

pub type MatchRecords = BTreeMap<PlayerId, PlayerStats>;

/// Reads and writes [`CacheState`] as flat JSON snapshots.
pub struct CacheStore {
    settings: JsonFile<Settings>,
    players: JsonFile<PlayersResponse>,
    rankings: JsonFile<RankingsResponse>,
    match_records: JsonFile<MatchRecords>,
}

impl CacheStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            settings: JsonFile::new(config.settings_path()),
            players: JsonFile::new(config.players_path()),
            rankings: JsonFile::new(config.rankings_path()),
            match_records: JsonFile::new(config.match_records_path()),
        }
    }

    /// Create any missing snapshot file with an empty document.
    pub fn bootstrap(&self) -> Result<(), StorageError> {
        let created = [
            self.settings.ensure()?,
            self.players.ensure()?,
            self.rankings.ensure()?,
            self.match_records.ensure()?,
        ];
        let count = created.iter().filter(|c| **c).count();
        if count > 0 {
            info!("Created {} empty snapshot files", count);
        }
        Ok(())
    }

    pub fn load_settings(&self) -> Settings {
        self.settings.read_or_default()
    }

    /// Assemble the last saved state. `fallback_region` applies when no
    /// region was ever persisted.
    pub fn load(&self, fallback_region: &Region) -> CacheState {
        let settings = self.load_settings();
        CacheState {
            region: settings.region.unwrap_or_else(|| fallback_region.clone()),
            tournament_count: settings.tournaments_on_record,
            players: self.players.read_or_default().players,
            rankings: self.rankings.read_or_default().ranking,
            match_cache: self.match_records.read_or_default(),
        }
    }

    /// Persist region and tournament count, keeping the last refresh time.
    pub fn save_settings(&self, state: &CacheState) -> Result<(), StorageError> {
        let refreshed_at = self.load_settings().refreshed_at;
        self.write_settings(state, refreshed_at)
    }

    fn write_settings(
        &self,
        state: &CacheState,
        refreshed_at: Option<DateTime<Utc>>,
    ) -> Result<(), StorageError> {
        self.settings.write(&Settings {
            region: Some(state.region.clone()),
            tournaments_on_record: state.tournament_count,
            refreshed_at,
        })
    }

    pub fn save_players(&self, state: &CacheState) -> Result<(), StorageError> {
        self.players.write(&PlayersResponse {
            players: state.players.clone(),
        })
    }

    pub fn save_rankings(&self, state: &CacheState) -> Result<(), StorageError> {
        self.rankings.write(&RankingsResponse {
            ranking: state.rankings.clone(),
        })
    }

    pub fn save_match_records(&self, state: &CacheState) -> Result<(), StorageError> {
        self.match_records.write(&state.match_cache)
    }

    /// Persist every snapshot.
    pub fn save_all(&self, state: &CacheState) -> Result<(), StorageError> {
        self.save_players(state)?;
        self.save_rankings(state)?;
        self.save_match_records(state)?;
        self.save_settings(state)
    }

    /// Persist every snapshot of a state just rebuilt from upstream and
    /// record the refresh time.
    pub fn save_refreshed(&self, state: &CacheState) -> Result<(), StorageError> {
        self.save_players(state)?;
        self.save_rankings(state)?;
        self.save_match_records(state)?;
        self.write_settings(state, Some(Utc::now()))
    }
}
