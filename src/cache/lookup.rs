//! Player-facing read operations built on the cache.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use super::{CacheError, ResourceCache};
use crate::calculate::{self, HeadToHead, Ratio};
use crate::models::{Player, PlayerStats, RankTier};

/// Lookup failures reported to the person asking.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("No data for {player}/{opponent}")]
    NoMatchupData { player: String, opponent: String },

    #[error(transparent)]
    Cache(#[from] CacheError),
}

static MATCHUP_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(?:vs\.?|versus)\s+").expect("valid delimiter regex"));

/// Free-text stats request: one name, or `<p1> vs <p2>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsQuery {
    Player(String),
    Matchup { player: String, opponent: String },
}

impl StatsQuery {
    /// Parse `text`; `None` when it names nobody.
    ///
    /// Recognized delimiters are `vs`, `vs.` and `versus` in any case.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let parts: Vec<&str> = MATCHUP_DELIMITER.splitn(text, 2).collect();
        match parts.as_slice() {
            [player, opponent] if !player.trim().is_empty() && !opponent.trim().is_empty() => {
                Some(StatsQuery::Matchup {
                    player: player.trim().to_string(),
                    opponent: opponent.trim().to_string(),
                })
            }
            _ => Some(StatsQuery::Player(text.to_string())),
        }
    }
}

/// Career summary of one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSummary {
    pub player: String,
    pub matches_recorded: usize,

    /// Date of the oldest recorded match
    pub since: Option<String>,

    pub wins: u32,
    pub losses: u32,
    pub ratio: Ratio,
}

/// Head-to-head result between two named players.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matchup {
    pub player: String,
    pub opponent: String,
    #[serde(flatten)]
    pub record: HeadToHead,
}

/// Ranking card of one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRanking {
    pub name: String,
    pub id: String,

    /// `mu - 3 * sigma` for the current region
    pub adjusted_rating: Option<f64>,

    pub rank: Option<u32>,
    pub tier: Option<RankTier>,
    pub url: String,
}

/// Answer to a [`StatsQuery`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatsAnswer {
    Player(PlayerSummary),
    Matchup(Matchup),
}

impl ResourceCache {
    async fn require_player(&self, name: &str) -> Result<Player, LookupError> {
        self.find_player(name)
            .await
            .ok_or_else(|| LookupError::PlayerNotFound(name.trim().to_string()))
    }

    async fn stats_for(&self, player: &Player) -> Result<PlayerStats, LookupError> {
        self.get_player_stats(&player.id)
            .await
            .map_err(|e| match e {
                CacheError::UnknownPlayer(_) => LookupError::PlayerNotFound(player.name.clone()),
                e => e.into(),
            })
    }

    /// Win/loss summary for a player name.
    pub async fn player_stats(&self, name: &str) -> Result<PlayerSummary, LookupError> {
        let player = self.require_player(name).await?;
        let stats = self.stats_for(&player).await?;

        Ok(PlayerSummary {
            player: player.name,
            matches_recorded: stats.matches.len(),
            since: stats.matches.first().map(|m| m.tournament_date.clone()),
            wins: stats.wins,
            losses: stats.losses,
            ratio: calculate::ratio(stats.wins, stats.losses),
        })
    }

    /// Head-to-head record of `player` against `opponent`, taken from
    /// `player`'s history. The opponent need not be a known player.
    pub async fn matchup(&self, player: &str, opponent: &str) -> Result<Matchup, LookupError> {
        let found = self.require_player(player).await?;
        let stats = self.stats_for(&found).await?;

        let record = calculate::head_to_head(&stats.matches, opponent).ok_or_else(|| {
            LookupError::NoMatchupData {
                player: player.trim().to_string(),
                opponent: opponent.trim().to_string(),
            }
        })?;

        Ok(Matchup {
            player: player.trim().to_string(),
            opponent: opponent.trim().to_string(),
            record,
        })
    }

    /// Dispatch a parsed free-text query.
    pub async fn answer(&self, query: &StatsQuery) -> Result<StatsAnswer, LookupError> {
        match query {
            StatsQuery::Player(name) => self.player_stats(name).await.map(StatsAnswer::Player),
            StatsQuery::Matchup { player, opponent } => self
                .matchup(player, opponent)
                .await
                .map(StatsAnswer::Matchup),
        }
    }

    /// Rating and rank of a player in the current region.
    ///
    /// Also warms the match cache for the player.
    pub async fn player_ranking(&self, name: &str) -> Result<PlayerRanking, LookupError> {
        let player = self.require_player(name).await?;
        self.stats_for(&player).await?;

        let region = self.region().await;
        let adjusted_rating = player
            .rating_in(region.as_str())
            .map(|r| calculate::adjusted_rating(r.mu, r.sigma));
        let rank = self
            .get_rankings()
            .await
            .into_iter()
            .find(|entry| entry.name == player.name)
            .map(|entry| entry.rank);

        Ok(PlayerRanking {
            url: self.player_url(&player).await,
            name: player.name,
            id: player.id.to_string(),
            adjusted_rating,
            rank,
            tier: rank.and_then(RankTier::from_rank),
        })
    }

    /// Public rankings page of the current region.
    pub async fn rankings_url(&self) -> String {
        format!("{}{}/rankings", self.site_url, self.region().await)
    }

    pub async fn player_url(&self, player: &Player) -> String {
        format!(
            "{}{}/players/{}",
            self.site_url,
            self.region().await,
            player.id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheState;
    use crate::fetch::mock::MockFetcher;
    use crate::fetch::LadderApi;
    use crate::models::{PlayerId, RankingEntry, Region};
    use crate::storage::{CacheStore, StorageConfig};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn cache_with(dir: &TempDir, fetcher: &Arc<MockFetcher>) -> ResourceCache {
        let mut state = CacheState::empty(Region::from("norcal"));
        state.players = vec![
            Player::new("p1", "Foo").with_rating("norcal", 30.0, 2.0),
            Player::new("p2", "Bar"),
            Player::new("p3", "Newcomer"),
        ];
        state.rankings = vec![
            RankingEntry {
                name: "Bar".to_string(),
                rank: 1,
            },
            RankingEntry {
                name: "Foo".to_string(),
                rank: 7,
            },
        ];

        fetcher.respond(
            "https://ladder.test/norcal/matches/p1",
            json!({
                "wins": 1,
                "losses": 1,
                "matches": [
                    {"opponent_name": "Bar", "result": "win", "tournament_name": "T1", "tournament_date": "2017-01-01"},
                    {"opponent_name": "Bar", "result": "lose", "tournament_name": "T2", "tournament_date": "2017-03-01"}
                ]
            }),
        );
        fetcher.respond(
            "https://ladder.test/norcal/matches/p2",
            json!({
                "wins": 1,
                "losses": 1,
                "matches": [
                    {"opponent_name": "Foo", "result": "lose", "tournament_name": "T1", "tournament_date": "2017-01-01"},
                    {"opponent_name": "Foo", "result": "win", "tournament_name": "T2", "tournament_date": "2017-03-01"}
                ]
            }),
        );
        fetcher.respond(
            "https://ladder.test/norcal/matches/p3",
            json!({"wins": 0, "losses": 0, "matches": []}),
        );

        let api = LadderApi::new(fetcher.clone(), "https://ladder.test/");
        let store = CacheStore::new(&StorageConfig::new(dir.path().to_path_buf()));
        ResourceCache::with_state(api, store, state).with_site_url("https://site.test/#/")
    }

    #[test]
    fn test_parse_single_player() {
        assert_eq!(
            StatsQuery::parse("  Foo Bar "),
            Some(StatsQuery::Player("Foo Bar".to_string()))
        );
        assert_eq!(StatsQuery::parse("   "), None);
    }

    #[test]
    fn test_parse_matchup_delimiters() {
        let expected = Some(StatsQuery::Matchup {
            player: "Foo".to_string(),
            opponent: "Bar".to_string(),
        });

        assert_eq!(StatsQuery::parse("Foo vs Bar"), expected);
        assert_eq!(StatsQuery::parse("Foo VS Bar"), expected);
        assert_eq!(StatsQuery::parse("Foo vs. Bar"), expected);
        assert_eq!(StatsQuery::parse("Foo VS. Bar"), expected);
        assert_eq!(StatsQuery::parse("Foo versus Bar"), expected);
    }

    #[test]
    fn test_parse_name_containing_vs() {
        assert_eq!(
            StatsQuery::parse("Vsauce"),
            Some(StatsQuery::Player("Vsauce".to_string()))
        );
        assert_eq!(
            StatsQuery::parse("vs Bar"),
            Some(StatsQuery::Player("vs Bar".to_string()))
        );
    }

    #[tokio::test]
    async fn test_player_stats() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(MockFetcher::new());
        let cache = cache_with(&dir, &fetcher);

        let summary = cache.player_stats("foo").await.unwrap();

        assert_eq!(
            summary,
            PlayerSummary {
                player: "Foo".to_string(),
                matches_recorded: 2,
                since: Some("2017-01-01".to_string()),
                wins: 1,
                losses: 1,
                ratio: Ratio::Finite(1.0),
            }
        );
    }

    #[tokio::test]
    async fn test_player_stats_without_matches() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(MockFetcher::new());
        let cache = cache_with(&dir, &fetcher);

        let summary = cache.player_stats("Newcomer").await.unwrap();
        assert_eq!(summary.since, None);
        assert_eq!(summary.ratio, Ratio::NoGames);
    }

    #[tokio::test]
    async fn test_unknown_player_makes_no_request() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(MockFetcher::new());
        let cache = cache_with(&dir, &fetcher);

        let err = cache.player_stats("Nobody").await.unwrap_err();
        assert!(matches!(err, LookupError::PlayerNotFound(ref name) if name == "Nobody"));
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_matchup() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(MockFetcher::new());
        let cache = cache_with(&dir, &fetcher);

        let matchup = cache.matchup("Foo", "bar").await.unwrap();

        assert_eq!(matchup.record.wins, 1);
        assert_eq!(matchup.record.losses, 1);
        assert_eq!(matchup.record.since, "2017-01-01");
        assert_eq!(matchup.record.last_tournament, "T2");
        assert_eq!(matchup.record.last_played, "2017-03-01");
    }

    #[tokio::test]
    async fn test_matchup_is_complementary() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(MockFetcher::new());
        let cache = cache_with(&dir, &fetcher);

        let forward = cache.matchup("Foo", "Bar").await.unwrap();
        let backward = cache.matchup("Bar", "Foo").await.unwrap();

        assert_eq!(forward.record.wins, backward.record.losses);
        assert_eq!(forward.record.losses, backward.record.wins);
    }

    #[tokio::test]
    async fn test_matchup_without_data() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(MockFetcher::new());
        let cache = cache_with(&dir, &fetcher);

        let err = cache.matchup("Foo", "Newcomer").await.unwrap_err();
        assert!(matches!(err, LookupError::NoMatchupData { .. }));
        assert_eq!(err.to_string(), "No data for Foo/Newcomer");
    }

    #[tokio::test]
    async fn test_answer_dispatches() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(MockFetcher::new());
        let cache = cache_with(&dir, &fetcher);

        let query = StatsQuery::parse("foo vs. bar").unwrap();
        match cache.answer(&query).await.unwrap() {
            StatsAnswer::Matchup(m) => assert_eq!(m.record.wins, 1),
            other => panic!("expected matchup, got {:?}", other),
        }

        // p1 history was fetched once and reused
        cache.answer(&StatsQuery::parse("Foo").unwrap()).await.unwrap();
        assert_eq!(fetcher.call_count("https://ladder.test/norcal/matches/p1"), 1);
    }

    #[tokio::test]
    async fn test_player_ranking() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(MockFetcher::new());
        let cache = cache_with(&dir, &fetcher);

        let card = cache.player_ranking("FOO").await.unwrap();

        assert_eq!(
            card,
            PlayerRanking {
                name: "Foo".to_string(),
                id: "p1".to_string(),
                adjusted_rating: Some(24.0),
                rank: Some(7),
                tier: Some(RankTier::Top10),
                url: "https://site.test/#/norcal/players/p1".to_string(),
            }
        );
        assert!(cache
            .snapshot()
            .await
            .match_cache
            .contains_key(&PlayerId::from("p1")));
    }

    #[tokio::test]
    async fn test_player_ranking_unrated_and_unranked() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(MockFetcher::new());
        let cache = cache_with(&dir, &fetcher);

        let card = cache.player_ranking("Newcomer").await.unwrap();
        assert_eq!(card.adjusted_rating, None);
        assert_eq!(card.rank, None);
        assert_eq!(card.tier, None);

        let champion = cache.player_ranking("bar").await.unwrap();
        assert_eq!(champion.tier, Some(RankTier::Champion));
    }

    #[tokio::test]
    async fn test_rankings_url() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(MockFetcher::new());
        let cache = cache_with(&dir, &fetcher);

        assert_eq!(
            cache.rankings_url().await,
            "https://site.test/#/norcal/rankings"
        );
    }
}
