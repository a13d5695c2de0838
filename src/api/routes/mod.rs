pub mod ladder;
pub mod reactions;
