//! Statistics derived from a player's match history.
//!
//! - Win/loss aggregation and the win/loss ratio
//! - Head-to-head records against a named opponent
//! - Conservative (adjusted) rating

use std::fmt;

use serde::{Serialize, Serializer};

use crate::models::{MatchRecord, MatchResult};

/// Win/loss totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
}

/// Count wins; everything else is a loss.
pub fn aggregate(matches: &[MatchRecord]) -> Record {
    matches.iter().fold(Record::default(), |mut record, m| {
        match m.result {
            MatchResult::Win => record.wins += 1,
            MatchResult::Loss => record.losses += 1,
        }
        record
    })
}

/// Win/loss ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ratio {
    /// wins / losses, rounded to three decimals
    Finite(f64),
    /// Wins without a single loss
    Infinite,
    /// No games on record
    NoGames,
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Finite(value) => write!(f, "{}", value),
            Ratio::Infinite => write!(f, "∞"),
            Ratio::NoGames => write!(f, "-"),
        }
    }
}

impl Serialize for Ratio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Ratio::Finite(value) => serializer.serialize_f64(*value),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

pub fn ratio(wins: u32, losses: u32) -> Ratio {
    match (wins, losses) {
        (0, 0) => Ratio::NoGames,
        (_, 0) => Ratio::Infinite,
        (w, l) => Ratio::Finite(round3(w as f64 / l as f64)),
    }
}

/// Round to three fractional digits.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Displayed rating: `mu - 3 * sigma`.
pub fn adjusted_rating(mu: f64, sigma: f64) -> f64 {
    round3(mu - 3.0 * sigma)
}

/// Record against one opponent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadToHead {
    pub wins: u32,
    pub losses: u32,

    /// Date of the first recorded meeting
    pub since: String,

    pub last_tournament: String,
    pub last_played: String,
}

/// Filter `matches` for `opponent_name` (case-insensitive exact match).
///
/// `matches` is expected oldest first, so `since` is the first hit and the
/// `last_*` fields come from the final hit. `None` when they never met.
pub fn head_to_head(matches: &[MatchRecord], opponent_name: &str) -> Option<HeadToHead> {
    let target = opponent_name.trim().to_lowercase();
    let mut result: Option<HeadToHead> = None;

    for m in matches
        .iter()
        .filter(|m| m.opponent_name.to_lowercase() == target)
    {
        let h2h = result.get_or_insert_with(|| HeadToHead {
            wins: 0,
            losses: 0,
            since: m.tournament_date.clone(),
            last_tournament: String::new(),
            last_played: String::new(),
        });

        match m.result {
            MatchResult::Win => h2h.wins += 1,
            MatchResult::Loss => h2h.losses += 1,
        }
        h2h.last_tournament = m.tournament_name.clone();
        h2h.last_played = m.tournament_date.clone();
    }

    result
}
