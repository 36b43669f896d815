//! Core data models for the scoring engine.

mod ids;
mod match_result;
mod penalty;
mod team_alias;
mod team_score;
mod tournament_config;

pub use ids::*;
pub use match_result::*;
pub use penalty::*;
pub use team_alias::*;
pub use team_score::*;
pub use tournament_config::*;
