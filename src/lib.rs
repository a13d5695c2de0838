//! # Ladder Bot
//!
//! Regional ranking lookups for a competitive game community, served from an
//! invalidation-aware read-through cache, plus a reaction image client.
//!
//! ## Architecture
//!
//! - **models**: Players, rankings and match history as returned upstream
//! - **fetch**: Single-request HTTP fetching and the typed ranking API client
//! - **storage**: Flat JSON snapshots of the cache state
//! - **cache**: Read-through cache, invalidation policy and player lookups
//! - **calculate**: Win/loss, ratio and head-to-head derivation
//! - **reactions**: Reaction image API client
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod cache;
pub mod calculate;
pub mod config;
pub mod fetch;
pub mod models;
pub mod reactions;
pub mod storage;

pub use models::*;
