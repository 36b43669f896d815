//! Embedded local storage.
//!
//! Four durable JSONL tables hold all tournament state:
//! - match results, keyed by (day, match, team)
//! - penalties, keyed by (day, match, team)
//! - team aliases, keyed by (primary, alias)
//! - the tournament configuration singleton
//!
//! Tables are replace-on-write: a keyed upsert rewrites the whole file,
//! which is the transactional unit the storage engine provides. Multi-
//! statement sequences on top of this are not atomic.

mod aliases;
mod config_store;
mod match_results;
mod penalties;
mod table;

pub use aliases::TeamAliasStore;
pub use config_store::ConfigStore;
pub use match_results::MatchResultStore;
pub use penalties::PenaltyStore;
pub use table::JsonlTable;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn match_results_path(&self) -> PathBuf {
        self.data_dir.join("match_results.jsonl")
    }

    pub fn penalties_path(&self) -> PathBuf {
        self.data_dir.join("penalties.jsonl")
    }

    pub fn team_aliases_path(&self) -> PathBuf {
        self.data_dir.join("team_aliases.jsonl")
    }

    pub fn tournament_config_path(&self) -> PathBuf {
        self.data_dir.join("tournament_config.jsonl")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}
