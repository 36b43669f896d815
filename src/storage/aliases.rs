//! Team alias table.

use crate::models::{AliasGroup, TeamAlias};

use super::{JsonlTable, StorageConfig, StorageError};

/// Persistent many-to-one grouping of alias team numbers under primaries.
///
/// Rows persist until explicitly deleted per group or wholesale; they are
/// never auto-expired. Conflict validation (a team acting as both primary
/// and alias) happens in the repository before writes reach this store.
pub struct TeamAliasStore {
    table: JsonlTable<TeamAlias>,
}

impl TeamAliasStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            table: JsonlTable::new(config.team_aliases_path()),
        }
    }

    /// Replace the alias rows of one group.
    pub fn save_group(
        &self,
        primary_team_number: u32,
        alias_team_numbers: &[u32],
        group_name: &str,
    ) -> Result<(), StorageError> {
        let mut rows = self.table.read_all()?;
        rows.retain(|a| a.primary_team_number != primary_team_number);
        rows.extend(
            alias_team_numbers
                .iter()
                .map(|&alias| TeamAlias::new(primary_team_number, alias, group_name.to_string())),
        );
        self.table.write_all(&rows)?;
        Ok(())
    }

    /// Every alias row, in stored order.
    pub fn all_aliases(&self) -> Result<Vec<TeamAlias>, StorageError> {
        self.table.read_all()
    }

    /// Alias rows for one primary, in stored order.
    pub fn aliases_for_primary(&self, primary_team_number: u32) -> Result<Vec<TeamAlias>, StorageError> {
        Ok(self
            .table
            .read_all()?
            .into_iter()
            .filter(|a| a.primary_team_number == primary_team_number)
            .collect())
    }

    /// All groups, assembled from rows in stored order, sorted by primary.
    pub fn all_groups(&self) -> Result<Vec<AliasGroup>, StorageError> {
        let mut groups: Vec<AliasGroup> = Vec::new();
        for alias in self.table.read_all()? {
            match groups
                .iter_mut()
                .find(|g| g.primary_team_number == alias.primary_team_number)
            {
                Some(group) => group.alias_team_numbers.push(alias.alias_team_number),
                None => groups.push(AliasGroup {
                    primary_team_number: alias.primary_team_number,
                    alias_team_numbers: vec![alias.alias_team_number],
                    group_name: alias.group_name,
                }),
            }
        }
        groups.sort_by_key(|g| g.primary_team_number);
        Ok(groups)
    }

    pub fn delete_group(&self, primary_team_number: u32) -> Result<usize, StorageError> {
        self.table
            .delete_where(|a| a.primary_team_number == primary_team_number)
    }

    pub fn delete_all(&self) -> Result<(), StorageError> {
        self.table.delete_all()
    }
}
