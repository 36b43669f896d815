//! # Battleboard
//!
//! Tournament scoring and leaderboard engine for battle-royale esports
//! events: teams submit per-match results (rank and kills), the engine
//! converts them into points under a configurable scheme, aggregates
//! across matches and days, applies penalties and manual overrides, and
//! produces ranked leaderboards.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (results, penalties, aliases, config)
//! - **scoring**: Pure score calculation and the rank-points codec
//! - **storage**: JSONL-backed keyed tables on local disk
//! - **engine**: Orchestration: saves, consolidation, leaderboards
//! - **config**: Application configuration loading and validation

pub mod config;
pub mod engine;
pub mod models;
pub mod scoring;
pub mod storage;

pub use models::*;
