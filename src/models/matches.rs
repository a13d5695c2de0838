//! Match history models.

use serde::{Deserialize, Serialize};

/// Outcome of a match from the owning player's perspective.
///
/// Anything other than `"win"` counts as a loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MatchResult {
    Win,
    Loss,
}

impl From<String> for MatchResult {
    fn from(s: String) -> Self {
        if s.eq_ignore_ascii_case("win") {
            MatchResult::Win
        } else {
            MatchResult::Loss
        }
    }
}

impl From<MatchResult> for String {
    fn from(result: MatchResult) -> Self {
        match result {
            MatchResult::Win => "win".to_string(),
            MatchResult::Loss => "loss".to_string(),
        }
    }
}

/// A single recorded set against an opponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub opponent_name: String,
    pub result: MatchResult,
    pub tournament_name: String,

    /// Upstream date string, e.g. `2017-01-01`
    pub tournament_date: String,
}

impl MatchRecord {
    pub fn new(
        opponent_name: impl Into<String>,
        result: MatchResult,
        tournament_name: impl Into<String>,
        tournament_date: impl Into<String>,
    ) -> Self {
        Self {
            opponent_name: opponent_name.into(),
            result,
            tournament_name: tournament_name.into(),
            tournament_date: tournament_date.into(),
        }
    }
}

/// Body of `{region}/matches/{player_id}`; stored verbatim in the match cache.
///
/// Matches are ordered oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub matches: Vec<MatchRecord>,
    pub wins: u32,
    pub losses: u32,
}
