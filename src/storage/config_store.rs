//! Tournament configuration table.

use crate::models::TournamentConfig;

use super::{JsonlTable, StorageConfig, StorageError};

/// Singleton table for the tournament configuration.
///
/// Saving replaces the whole table (delete-all plus insert). Reads are
/// defensive about multiple rows: "current" is the latest by creation
/// timestamp and anything older is ignored.
pub struct ConfigStore {
    table: JsonlTable<TournamentConfig>,
}

impl ConfigStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            table: JsonlTable::new(config.tournament_config_path()),
        }
    }

    /// Replace-all write of the new configuration.
    pub fn save(&self, config: &TournamentConfig) -> Result<(), StorageError> {
        self.table.write_all(std::slice::from_ref(config))?;
        Ok(())
    }

    /// The current configuration: latest `created_at` wins.
    pub fn current(&self) -> Result<Option<TournamentConfig>, StorageError> {
        Ok(self
            .table
            .read_all()?
            .into_iter()
            .max_by_key(|c| c.created_at))
    }

    /// Remove the configuration row(s). Never touches history tables.
    pub fn delete_all(&self) -> Result<(), StorageError> {
        self.table.delete_all()
    }
}
