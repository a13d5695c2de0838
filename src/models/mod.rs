//! Core data models for the ladder cache.

mod ids;
mod matches;
mod player;
mod ranking;

pub use ids::*;
pub use matches::*;
pub use player::*;
pub use ranking::*;
