//! Penalty table.

use std::collections::HashMap;

use crate::models::{MatchKey, Penalty, ResultKey};

use super::{JsonlTable, StorageConfig, StorageError};

/// Persistent table of at most one penalty per (day, match, team).
pub struct PenaltyStore {
    table: JsonlTable<Penalty>,
}

impl PenaltyStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            table: JsonlTable::new(config.penalties_path()),
        }
    }

    /// Insert or replace the penalty for a (day, match, team) key.
    /// Re-applying replaces the previous deduction, it never adds to it.
    pub fn upsert(&self, penalty: Penalty) -> Result<(), StorageError> {
        self.table.upsert_by_key(vec![penalty], |p| p.key())
    }

    pub fn penalty_for_team(&self, key: ResultKey) -> Result<Option<Penalty>, StorageError> {
        Ok(self
            .table
            .read_all()?
            .into_iter()
            .find(|p| p.key() == key))
    }

    /// All penalties for one match, sorted by team number ascending.
    pub fn penalties_for_match(&self, key: MatchKey) -> Result<Vec<Penalty>, StorageError> {
        let mut penalties: Vec<Penalty> = self
            .table
            .read_all()?
            .into_iter()
            .filter(|p| p.match_key() == key)
            .collect();
        penalties.sort_by_key(|p| p.team_number);
        Ok(penalties)
    }

    pub fn all_penalties(&self) -> Result<Vec<Penalty>, StorageError> {
        let mut penalties = self.table.read_all()?;
        penalties.sort_by_key(|p| p.key());
        Ok(penalties)
    }

    pub fn delete_for_team(&self, key: ResultKey) -> Result<usize, StorageError> {
        self.table.delete_where(|p| p.key() == key)
    }

    pub fn delete_match(&self, key: MatchKey) -> Result<usize, StorageError> {
        self.table.delete_where(|p| p.match_key() == key)
    }

    pub fn delete_day(&self, day: u32) -> Result<usize, StorageError> {
        self.table.delete_where(|p| p.day == day)
    }

    /// Delete every penalty in the inclusive day range.
    pub fn delete_day_range(&self, from_day: u32, to_day: u32) -> Result<usize, StorageError> {
        self.table
            .delete_where(|p| p.day >= from_day && p.day <= to_day)
    }

    pub fn delete_all(&self) -> Result<(), StorageError> {
        self.table.delete_all()
    }

    /// Total deducted points grouped by team. Teams with no penalties are
    /// simply absent; callers treat a missing team as 0.
    pub fn totals_by_team(&self) -> Result<HashMap<u32, i64>, StorageError> {
        self.totals(None)
    }

    /// Same, restricted to one day.
    pub fn totals_by_team_for_day(&self, day: u32) -> Result<HashMap<u32, i64>, StorageError> {
        self.totals(Some(day))
    }

    fn totals(&self, day_filter: Option<u32>) -> Result<HashMap<u32, i64>, StorageError> {
        let mut totals: HashMap<u32, i64> = HashMap::new();
        for penalty in self.table.read_all()? {
            if let Some(day) = day_filter {
                if penalty.day != day {
                    continue;
                }
            }
            *totals.entry(penalty.team_number).or_default() += penalty.penalty_points;
        }
        Ok(totals)
    }
}
