//! Typed client for the regional ranking API.
//!
//! Every resource lives under `{base}/{region}/`:
//! `players`, `rankings`, `matches/{player_id}` and `tournaments`.

use std::sync::Arc;

use tracing::debug;

use super::{fetch_typed, Fetch, FetchError, Route};
use crate::models::{
    PlayerId, PlayerStats, PlayersResponse, RankingsResponse, Region, TournamentsResponse,
};

/// Endpoint layout of the ranking API.
#[derive(Clone)]
pub struct LadderApi {
    fetcher: Arc<dyn Fetch>,
    base_url: String,
}

impl LadderApi {
    pub fn new(fetcher: Arc<dyn Fetch>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
        }
    }

    pub fn players_route(&self, region: &Region) -> Route {
        Route::get(&self.base_url, format!("{}/players", region))
    }

    pub fn rankings_route(&self, region: &Region) -> Route {
        Route::get(&self.base_url, format!("{}/rankings", region))
    }

    pub fn matches_route(&self, region: &Region, player_id: &PlayerId) -> Route {
        Route::get(&self.base_url, format!("{}/matches/{}", region, player_id))
    }

    pub fn tournaments_route(&self, region: &Region) -> Route {
        Route::get(&self.base_url, format!("{}/tournaments", region))
    }

    pub async fn players(&self, region: &Region) -> Result<PlayersResponse, FetchError> {
        fetch_typed(self.fetcher.as_ref(), &self.players_route(region)).await
    }

    pub async fn rankings(&self, region: &Region) -> Result<RankingsResponse, FetchError> {
        fetch_typed(self.fetcher.as_ref(), &self.rankings_route(region)).await
    }

    pub async fn matches(
        &self,
        region: &Region,
        player_id: &PlayerId,
    ) -> Result<PlayerStats, FetchError> {
        fetch_typed(self.fetcher.as_ref(), &self.matches_route(region, player_id)).await
    }

    /// Number of tournaments recorded for the region.
    pub async fn tournament_count(&self, region: &Region) -> Result<u64, FetchError> {
        let resp: TournamentsResponse =
            fetch_typed(self.fetcher.as_ref(), &self.tournaments_route(region)).await?;
        debug!("{} tournaments on record for {}", resp.tournaments.len(), region);
        Ok(resp.tournaments.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::mock::MockFetcher;
    use serde_json::json;

    const BASE: &str = "https://ladder.test/";

    fn api(fetcher: &Arc<MockFetcher>) -> LadderApi {
        LadderApi::new(fetcher.clone(), BASE)
    }

    #[test]
    fn test_routes_are_region_scoped() {
        let fetcher = Arc::new(MockFetcher::new());
        let api = api(&fetcher);
        let region = Region::from("cfl");

        assert_eq!(
            api.players_route(&region).url().unwrap().as_str(),
            "https://ladder.test/cfl/players"
        );
        assert_eq!(
            api.rankings_route(&region).url().unwrap().as_str(),
            "https://ladder.test/cfl/rankings"
        );
        assert_eq!(
            api.matches_route(&region, &PlayerId::from("p1"))
                .url()
                .unwrap()
                .as_str(),
            "https://ladder.test/cfl/matches/p1"
        );
        assert_eq!(
            api.tournaments_route(&region).url().unwrap().as_str(),
            "https://ladder.test/cfl/tournaments"
        );
    }

    #[tokio::test]
    async fn test_tournament_count() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.respond(
            "https://ladder.test/norcal/tournaments",
            json!({"tournaments": [{"id": "a"}, {"id": "b"}]}),
        );

        let count = api(&fetcher)
            .tournament_count(&Region::from("norcal"))
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_players_schema_error() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.respond("https://ladder.test/norcal/players", json!({"people": []}));

        let err = api(&fetcher)
            .players(&Region::from("norcal"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Schema { .. }));
    }

    #[tokio::test]
    async fn test_matches() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.respond(
            "https://ladder.test/norcal/matches/p1",
            json!({
                "wins": 1,
                "losses": 0,
                "matches": [{
                    "opponent_name": "Bar",
                    "result": "win",
                    "tournament_name": "T1",
                    "tournament_date": "2017-01-01"
                }]
            }),
        );

        let stats = api(&fetcher)
            .matches(&Region::from("norcal"), &PlayerId::from("p1"))
            .await
            .unwrap();
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.matches[0].opponent_name, "Bar");
    }
}
