use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::reactions::ReactionImage;

#[derive(Debug, Default, Deserialize)]
pub struct ReactionParams {
    #[serde(default)]
    pub nsfw: bool,
}

/// Random image of `kind`; `random` picks the type too.
pub async fn reaction(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<ReactionParams>,
) -> Result<Json<ReactionImage>, ApiError> {
    let client = state
        .reactions
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("Reaction images are not configured".to_string()))?;

    let image = if kind == "random" {
        client.random_any(params.nsfw).await?
    } else {
        client.random(&kind, params.nsfw).await?
    };

    image
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown reaction type: {}", kind)))
}
