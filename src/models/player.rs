//! Player model.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::PlayerId;

/// TrueSkill-style rating for one region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub mu: f64,
    pub sigma: f64,
}

/// A player known to the ranking service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Unique identifier
    pub id: PlayerId,

    /// Display name (matched case-insensitively)
    pub name: String,

    /// Ratings keyed by region name
    #[serde(default)]
    pub ratings: HashMap<String, Rating>,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ratings: HashMap::new(),
        }
    }

    pub fn with_rating(mut self, region: &str, mu: f64, sigma: f64) -> Self {
        self.ratings.insert(region.to_string(), Rating { mu, sigma });
        self
    }

    /// Case-insensitive exact name comparison.
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }

    pub fn rating_in(&self, region: &str) -> Option<Rating> {
        self.ratings.get(region).copied()
    }
}

/// Body of `{region}/players`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayersResponse {
    pub players: Vec<Player>,
}

/// Body of `{region}/tournaments`; only the length is used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TournamentsResponse {
    pub tournaments: Vec<serde_json::Value>,
}
