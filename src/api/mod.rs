//! REST API endpoints.
//!
//! Axum-based JSON surface over the ranking lookups and reaction images.

pub mod routes;
pub mod state;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::trace::TraceLayer;

use crate::cache::{CacheError, LookupError};
use crate::fetch::FetchError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<FetchError> for ApiError {
    fn from(e: FetchError) -> Self {
        tracing::warn!("Upstream request failed: {}", e);
        ApiError::Upstream(e.to_string())
    }
}

impl From<CacheError> for ApiError {
    fn from(e: CacheError) -> Self {
        match e {
            CacheError::Fetch(e) => e.into(),
            CacheError::InvalidRegion(msg) => ApiError::BadRequest(msg),
            CacheError::UnknownPlayer(id) => {
                ApiError::NotFound(format!("No cached player with ID {}", id))
            }
            CacheError::Storage(e) => {
                tracing::error!("Storage failure: {}", e);
                ApiError::Internal(e.to_string())
            }
        }
    }
}

impl From<LookupError> for ApiError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::PlayerNotFound(_) | LookupError::NoMatchupData { .. } => {
                ApiError::NotFound(e.to_string())
            }
            LookupError::Cache(e) => e.into(),
        }
    }
}

/// Assemble the router with all API routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/rankings", get(routes::ladder::list_rankings))
        .route("/api/players/:name", get(routes::ladder::player_ranking))
        .route("/api/players/:name/stats", get(routes::ladder::player_stats))
        .route("/api/matchup", get(routes::ladder::matchup))
        .route("/api/stats", get(routes::ladder::stats_query))
        .route(
            "/api/region",
            get(routes::ladder::get_region).put(routes::ladder::set_region),
        )
        .route("/api/refresh", post(routes::ladder::refresh))
        .route("/api/reactions/:kind", get(routes::reactions::reaction))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
