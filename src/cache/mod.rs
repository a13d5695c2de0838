//! Invalidation-aware read-through cache over the ranking API.
//!
//! Holds three region-scoped resources: players, rankings and per-player
//! match history. Players and rankings are rebuilt together whenever the
//! region's tournament count moves (see [`invalidation`]); match history is
//! fetched lazily on first access and kept until the next rebuild. Every
//! mutation is written through to the [`CacheStore`].

pub mod invalidation;
pub mod lookup;

pub use invalidation::{needs_refresh, tournament_count_changed};
pub use lookup::*;

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::config::validate_region;
use crate::fetch::{FetchError, LadderApi};
use crate::models::{Player, PlayerId, PlayerStats, RankingEntry, Region};
use crate::storage::{CacheStore, MatchRecords, StorageError};

/// Errors surfaced by cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("No cached player with ID {0}")]
    UnknownPlayer(PlayerId),
}

/// Everything the cache knows about one region.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheState {
    pub region: Region,

    /// Tournament count at the last full refresh; `None` before the first one
    pub tournament_count: Option<u64>,

    pub players: Vec<Player>,

    /// Ordered by rank
    pub rankings: Vec<RankingEntry>,

    /// Match history by player ID, filled on first access
    pub match_cache: MatchRecords,
}

impl CacheState {
    pub fn empty(region: Region) -> Self {
        Self {
            region,
            tournament_count: None,
            players: Vec::new(),
            rankings: Vec::new(),
            match_cache: MatchRecords::new(),
        }
    }

    /// Drop every region-scoped resource and forget the tournament count.
    fn invalidate(&mut self) {
        self.tournament_count = None;
        self.players.clear();
        self.rankings.clear();
        self.match_cache.clear();
    }
}

/// Result of a refresh check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RefreshOutcome {
    UpToDate {
        tournament_count: u64,
    },
    Refreshed {
        tournament_count: u64,
        players: usize,
        rankings: usize,
    },
}

struct Inner {
    state: CacheState,
    /// Bumped on every rebuild so in-flight match fetches from an older
    /// generation are not written into the new one.
    generation: u64,
}

/// Shared cache service.
pub struct ResourceCache {
    api: LadderApi,
    store: CacheStore,
    site_url: String,
    inner: RwLock<Inner>,
    refresh_lock: Mutex<()>,
    inflight: StdMutex<HashMap<PlayerId, Arc<Mutex<()>>>>,
}

impl ResourceCache {
    /// Wrap an existing state without contacting the API.
    pub fn with_state(api: LadderApi, store: CacheStore, state: CacheState) -> Self {
        Self {
            api,
            store,
            site_url: String::new(),
            inner: RwLock::new(Inner {
                state,
                generation: 0,
            }),
            refresh_lock: Mutex::new(()),
            inflight: StdMutex::new(HashMap::new()),
        }
    }

    /// Base URL of the human-facing site, used for links in lookups.
    pub fn with_site_url(mut self, site_url: impl Into<String>) -> Self {
        self.site_url = site_url.into();
        self
    }

    /// Load the saved state for `region` without contacting the API.
    ///
    /// Saved state for a different region is dropped.
    pub fn open(api: LadderApi, store: CacheStore, region: Region) -> Result<Self, CacheError> {
        validate_region(region.as_str())
            .map_err(|e| CacheError::InvalidRegion(e.to_string()))?;
        store.bootstrap()?;

        let mut state = store.load(&region);
        if state.region != region {
            info!(
                "Region changed from {} to {}, invalidating cache",
                state.region, region
            );
            state.region = region;
            state.invalidate();
            store.save_all(&state)?;
        }

        Ok(Self::with_state(api, store, state))
    }

    /// Load the saved state for `region` and rebuild it if the region's
    /// tournament count moved since the last refresh.
    ///
    /// A failed upstream check is logged and the saved state is served as-is;
    /// only storage failures abort start-up.
    pub async fn initialize(
        api: LadderApi,
        store: CacheStore,
        region: Region,
    ) -> Result<Self, CacheError> {
        let cache = Self::open(api, store, region)?;
        match cache.sync().await {
            Ok(_) => {}
            Err(CacheError::Fetch(e)) => {
                warn!(
                    "Couldn't refresh ranking data, some lookups may not work as expected: {}",
                    e
                );
            }
            Err(e) => return Err(e),
        }

        Ok(cache)
    }

    /// Compare tournament counts and rebuild on mismatch.
    pub async fn sync(&self) -> Result<RefreshOutcome, CacheError> {
        let _guard = self.refresh_lock.lock().await;

        let (region, cached) = {
            let inner = self.inner.read().await;
            (inner.state.region.clone(), inner.state.tournament_count)
        };

        let fetched = self.api.tournament_count(&region).await?;
        if !needs_refresh(cached, fetched) {
            info!("{} tournaments on record for {}, cache is current", fetched, region);
            return Ok(RefreshOutcome::UpToDate {
                tournament_count: fetched,
            });
        }

        info!(
            cached = ?cached,
            fetched,
            "Tournament count changed for {}, rebuilding cache",
            region
        );
        self.rebuild(&region, fetched).await
    }

    /// Rebuild unconditionally.
    pub async fn refresh(&self) -> Result<RefreshOutcome, CacheError> {
        let _guard = self.refresh_lock.lock().await;

        let region = self.region().await;
        let fetched = self.api.tournament_count(&region).await?;
        self.rebuild(&region, fetched).await
    }

    /// Switch regions. All resources are dropped and rebuilt for the new
    /// region regardless of its tournament count.
    pub async fn set_region(&self, new_region: Region) -> Result<RefreshOutcome, CacheError> {
        validate_region(new_region.as_str())
            .map_err(|e| CacheError::InvalidRegion(e.to_string()))?;
        let _guard = self.refresh_lock.lock().await;

        {
            let mut inner = self.inner.write().await;
            inner.state.region = new_region.clone();
            inner.state.invalidate();
            inner.generation += 1;
            self.store.save_all(&inner.state)?;
        }
        info!("Set new region: {}, refreshing data now", new_region);

        let fetched = self.api.tournament_count(&new_region).await?;
        self.rebuild(&new_region, fetched).await
    }

    /// Fetch players and rankings, then swap them in and clear match history.
    /// Callers hold `refresh_lock`.
    async fn rebuild(
        &self,
        region: &Region,
        tournament_count: u64,
    ) -> Result<RefreshOutcome, CacheError> {
        let players = self.api.players(region).await?.players;
        let rankings = self.api.rankings(region).await?.ranking;

        let mut inner = self.inner.write().await;
        inner.generation += 1;
        let state = &mut inner.state;
        state.players = players;
        state.rankings = rankings;
        state.match_cache.clear();
        state.tournament_count = Some(tournament_count);
        self.store.save_refreshed(state)?;

        info!(
            "Cached {} players and {} ranking entries for {}",
            state.players.len(),
            state.rankings.len(),
            region
        );
        Ok(RefreshOutcome::Refreshed {
            tournament_count,
            players: state.players.len(),
            rankings: state.rankings.len(),
        })
    }

    pub async fn region(&self) -> Region {
        self.inner.read().await.state.region.clone()
    }

    pub async fn tournament_count(&self) -> Option<u64> {
        self.inner.read().await.state.tournament_count
    }

    /// Copy of the whole state.
    pub async fn snapshot(&self) -> CacheState {
        self.inner.read().await.state.clone()
    }

    /// Copy of the cached rankings.
    pub async fn get_rankings(&self) -> Vec<RankingEntry> {
        self.inner.read().await.state.rankings.clone()
    }

    /// Case-insensitive linear scan over the cached players.
    pub async fn find_player(&self, name: &str) -> Option<Player> {
        self.inner
            .read()
            .await
            .state
            .players
            .iter()
            .find(|p| p.name_matches(name))
            .cloned()
    }

    async fn cached_stats(&self, player_id: &PlayerId) -> Option<PlayerStats> {
        self.inner
            .read()
            .await
            .state
            .match_cache
            .get(player_id)
            .cloned()
    }

    async fn knows_player(&self, player_id: &PlayerId) -> bool {
        self.inner
            .read()
            .await
            .state
            .players
            .iter()
            .any(|p| &p.id == player_id)
    }

    /// Match history for a cached player, fetched and persisted on first
    /// access. IDs that are not among the cached players are rejected
    /// without a request.
    ///
    /// At most one fetch per player ID is in flight; concurrent callers wait
    /// for it and read the stored result.
    pub async fn get_player_stats(&self, player_id: &PlayerId) -> Result<PlayerStats, CacheError> {
        if let Some(stats) = self.cached_stats(player_id).await {
            debug!("Match history for {} served from cache", player_id);
            return Ok(stats);
        }
        if !self.knows_player(player_id).await {
            return Err(CacheError::UnknownPlayer(player_id.clone()));
        }

        let key_lock = self.key_lock(player_id);
        let _guard = key_lock.lock().await;

        if let Some(stats) = self.cached_stats(player_id).await {
            debug!("Match history for {} filled while waiting", player_id);
            self.release_key(player_id, &key_lock);
            return Ok(stats);
        }

        let (region, generation) = {
            let inner = self.inner.read().await;
            (inner.state.region.clone(), inner.generation)
        };

        let result = self.fetch_and_store(&region, generation, player_id).await;
        self.release_key(player_id, &key_lock);
        result
    }

    async fn fetch_and_store(
        &self,
        region: &Region,
        generation: u64,
        player_id: &PlayerId,
    ) -> Result<PlayerStats, CacheError> {
        let stats = self.api.matches(region, player_id).await?;

        let mut inner = self.inner.write().await;
        if inner.generation != generation {
            debug!("Cache rebuilt during fetch for {}, not storing", player_id);
            return Ok(stats);
        }

        inner
            .state
            .match_cache
            .insert(player_id.clone(), stats.clone());
        self.store.save_match_records(&inner.state)?;
        info!(
            "Cached {} matches for {} in {}",
            stats.matches.len(),
            player_id,
            region
        );
        Ok(stats)
    }

    fn key_lock(&self, player_id: &PlayerId) -> Arc<Mutex<()>> {
        let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        inflight.entry(player_id.clone()).or_default().clone()
    }

    /// Drop the key lock from the map once no other caller holds or waits
    /// on it. Waiters keep their clone, so the map entry must outlive them.
    fn release_key(&self, player_id: &PlayerId, key_lock: &Arc<Mutex<()>>) {
        let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        let idle = inflight
            .get(player_id)
            .is_some_and(|entry| Arc::ptr_eq(entry, key_lock) && Arc::strong_count(entry) == 2);
        if idle {
            inflight.remove(player_id);
        }
    }
}
