//! Ranking models.

use serde::{Deserialize, Serialize};

/// One row of the regional ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub name: String,

    /// Dense 1-based rank
    pub rank: u32,
}

/// Body of `{region}/rankings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingsResponse {
    pub ranking: Vec<RankingEntry>,
}

/// Presentation bracket for a rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankTier {
    /// Rank 1
    Champion,
    /// Ranks 2-10
    Top10,
    /// Ranks 11-25
    Top25,
    /// Ranks 26-50
    Top50,
    /// Ranks 51-100
    Top100,
}

impl RankTier {
    /// Bracket for a rank; ranks outside 1..=100 have none.
    pub fn from_rank(rank: u32) -> Option<Self> {
        match rank {
            1 => Some(RankTier::Champion),
            2..=10 => Some(RankTier::Top10),
            11..=25 => Some(RankTier::Top25),
            26..=50 => Some(RankTier::Top50),
            51..=100 => Some(RankTier::Top100),
            _ => None,
        }
    }
}

impl std::fmt::Display for RankTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankTier::Champion => write!(f, "champion"),
            RankTier::Top10 => write!(f, "top 10"),
            RankTier::Top25 => write!(f, "top 25"),
            RankTier::Top50 => write!(f, "top 50"),
            RankTier::Top100 => write!(f, "top 100"),
        }
    }
}
