//! Reaction image client.
//!
//! Talks to a bearer-token image API: the catalog of image types and tags is
//! loaded once, and random images are requested only for known types.

use std::sync::Arc;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::fetch::{fetch_typed, Fetch, FetchError, Route};

const TYPES_PATH: &str = "images/types";
const TAGS_PATH: &str = "images/tags";
const INFO_PATH: &str = "images/";
const RANDOM_PATH: &str = "images/random";

#[derive(Debug, Deserialize)]
struct TypesResponse {
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RandomResponse {
    url: String,
}

/// Known image types and tags, split by the nsfw flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReactionCatalog {
    pub types: Vec<String>,
    pub nsfw_types: Vec<String>,
    pub tags: Vec<String>,
    pub nsfw_tags: Vec<String>,

    /// API information at load time
    pub info: Option<serde_json::Value>,
}

impl ReactionCatalog {
    pub fn knows(&self, kind: &str, nsfw: bool) -> bool {
        let pool = if nsfw { &self.nsfw_types } else { &self.types };
        pool.iter().any(|t| t == kind)
    }
}

/// One served image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReactionImage {
    pub kind: String,
    pub url: String,

    /// Whether the type was chosen at random
    pub random: bool,
}

/// Client for the reaction image API.
pub struct ReactionClient {
    fetcher: Arc<dyn Fetch>,
    base_url: String,
    headers: Vec<(String, String)>,
    catalog: ReactionCatalog,
}

impl ReactionClient {
    pub fn new(fetcher: Arc<dyn Fetch>, base_url: impl Into<String>, api_key: &str) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            headers: vec![
                ("Authorization".to_string(), format!("Bearer {}", api_key)),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            catalog: ReactionCatalog::default(),
        }
    }

    fn route(&self, path: impl Into<String>) -> Route {
        Route::get(&self.base_url, path).with_headers(&self.headers)
    }

    async fn fetch_catalog(&self) -> Result<ReactionCatalog, FetchError> {
        let fetcher = self.fetcher.as_ref();
        let types: TypesResponse = fetch_typed(fetcher, &self.route(TYPES_PATH)).await?;
        let nsfw_types: TypesResponse =
            fetch_typed(fetcher, &self.route(format!("{}?nsfw=true", TYPES_PATH))).await?;
        let tags: TagsResponse = fetch_typed(fetcher, &self.route(TAGS_PATH)).await?;
        let nsfw_tags: TagsResponse =
            fetch_typed(fetcher, &self.route(format!("{}?nsfw=true", TAGS_PATH))).await?;
        let info = fetcher.fetch_json(&self.route(INFO_PATH)).await?;

        Ok(ReactionCatalog {
            types: types.types,
            nsfw_types: nsfw_types.types,
            tags: tags.tags,
            nsfw_tags: nsfw_tags.tags,
            info: Some(info),
        })
    }

    /// Load the catalog. On failure the catalog stays empty, so every
    /// request is ignored until the next successful load.
    pub async fn load(&mut self) {
        match self.fetch_catalog().await {
            Ok(catalog) => {
                info!(
                    "Loaded {} reaction types ({} nsfw)",
                    catalog.types.len(),
                    catalog.nsfw_types.len()
                );
                self.catalog = catalog;
            }
            Err(e) => {
                warn!("Couldn't load reaction types, API key is probably not set: {}", e);
                self.catalog = ReactionCatalog::default();
            }
        }
    }

    pub fn catalog(&self) -> &ReactionCatalog {
        &self.catalog
    }

    /// Random image of `kind`. Unknown types yield `Ok(None)` without a request.
    pub async fn random(&self, kind: &str, nsfw: bool) -> Result<Option<ReactionImage>, FetchError> {
        if !self.catalog.knows(kind, nsfw) {
            return Ok(None);
        }
        self.request(kind, nsfw, false).await.map(Some)
    }

    /// Random image of a randomly chosen known type.
    pub async fn random_any(&self, nsfw: bool) -> Result<Option<ReactionImage>, FetchError> {
        let kind = match self.pick_type(nsfw) {
            Some(kind) => kind,
            None => return Ok(None),
        };
        self.request(&kind, nsfw, true).await.map(Some)
    }

    fn pick_type(&self, nsfw: bool) -> Option<String> {
        let pool = if nsfw {
            &self.catalog.nsfw_types
        } else {
            &self.catalog.types
        };
        pool.choose(&mut rand::thread_rng()).cloned()
    }

    async fn request(&self, kind: &str, nsfw: bool, random: bool) -> Result<ReactionImage, FetchError> {
        let path = format!("{}?type={}&nsfw={}", RANDOM_PATH, kind, nsfw);
        let resp: RandomResponse = fetch_typed(self.fetcher.as_ref(), &self.route(path)).await?;
        Ok(ReactionImage {
            kind: kind.to_string(),
            url: resp.url,
            random,
        })
    }
}
