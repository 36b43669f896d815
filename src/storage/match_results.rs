//! Match result table.

use std::collections::HashMap;

use crate::models::{MatchKey, MatchResult, RawTeamTotals, ResultKey};

use super::{JsonlTable, StorageConfig, StorageError};

/// Persistent table of one result per (day, match, team).
///
/// Pure row storage: deleting results never cascades into penalties or
/// aliases, that coordination belongs to the repository layer.
pub struct MatchResultStore {
    table: JsonlTable<MatchResult>,
}

impl MatchResultStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            table: JsonlTable::new(config.match_results_path()),
        }
    }

    /// Insert or replace one result by its (day, match, team) key.
    pub fn upsert(&self, result: MatchResult) -> Result<(), StorageError> {
        self.upsert_many(vec![result])
    }

    /// Insert or replace a batch of results by key.
    pub fn upsert_many(&self, results: Vec<MatchResult>) -> Result<(), StorageError> {
        if results.is_empty() {
            return Ok(());
        }
        self.table.upsert_by_key(results, |r| r.key())
    }

    /// All results for one match, sorted by team number ascending.
    pub fn results_for_match(&self, key: MatchKey) -> Result<Vec<MatchResult>, StorageError> {
        let mut results: Vec<MatchResult> = self
            .table
            .read_all()?
            .into_iter()
            .filter(|r| r.match_key() == key)
            .collect();
        results.sort_by_key(|r| r.team_number);
        Ok(results)
    }

    /// The single result for one team in one match, if present.
    pub fn result_for_team(&self, key: ResultKey) -> Result<Option<MatchResult>, StorageError> {
        Ok(self
            .table
            .read_all()?
            .into_iter()
            .find(|r| r.key() == key))
    }

    /// Every stored result, sorted by (day, match, team).
    pub fn all_results(&self) -> Result<Vec<MatchResult>, StorageError> {
        let mut results = self.table.read_all()?;
        results.sort_by_key(|r| r.key());
        Ok(results)
    }

    pub fn delete_match(&self, key: MatchKey) -> Result<usize, StorageError> {
        self.table.delete_where(|r| r.match_key() == key)
    }

    pub fn delete_day(&self, day: u32) -> Result<usize, StorageError> {
        self.table.delete_where(|r| r.day == day)
    }

    /// Delete every result in the inclusive day range.
    pub fn delete_day_range(&self, from_day: u32, to_day: u32) -> Result<usize, StorageError> {
        self.table
            .delete_where(|r| r.day >= from_day && r.day <= to_day)
    }

    pub fn delete_all(&self) -> Result<(), StorageError> {
        self.table.delete_all()
    }

    /// Raw per-team aggregates for the leaderboard, optionally restricted
    /// to one day, ordered by points descending then kills descending.
    pub fn raw_totals(&self, day_filter: Option<u32>) -> Result<Vec<RawTeamTotals>, StorageError> {
        let mut by_team: HashMap<u32, RawTeamTotals> = HashMap::new();

        for result in self.table.read_all()? {
            if let Some(day) = day_filter {
                if result.day != day {
                    continue;
                }
            }
            let entry = by_team
                .entry(result.team_number)
                .or_insert_with(|| RawTeamTotals {
                    team_number: result.team_number,
                    total_kills: 0,
                    total_points: 0,
                    matches_played: 0,
                });
            entry.total_kills += result.kills;
            entry.total_points += result.total_points;
            entry.matches_played += 1;
        }

        let mut totals: Vec<RawTeamTotals> = by_team.into_values().collect();
        totals.sort_by(|a, b| {
            b.total_points
                .cmp(&a.total_points)
                .then(b.total_kills.cmp(&a.total_kills))
        });
        Ok(totals)
    }

    /// Days that have at least one row with real data, ascending.
    pub fn days_with_data(&self) -> Result<Vec<u32>, StorageError> {
        let mut days: Vec<u32> = self
            .table
            .read_all()?
            .iter()
            .filter(|r| r.has_data())
            .map(|r| r.day)
            .collect();
        days.sort_unstable();
        days.dedup();
        Ok(days)
    }

    /// Matches with real data for one day, ascending.
    pub fn matches_with_data(&self, day: u32) -> Result<Vec<u32>, StorageError> {
        let mut matches: Vec<u32> = self
            .table
            .read_all()?
            .iter()
            .filter(|r| r.day == day && r.has_data())
            .map(|r| r.match_number)
            .collect();
        matches.sort_unstable();
        matches.dedup();
        Ok(matches)
    }

    /// Whether any day has a result with real data beyond the given match
    /// number. Used to warn before shrinking the schedule.
    pub fn has_data_beyond_match(&self, match_number: u32) -> Result<bool, StorageError> {
        Ok(self
            .table
            .read_all()?
            .iter()
            .any(|r| r.has_data() && r.match_number > match_number))
    }

    /// Whether any result beyond the given day carries real data.
    pub fn has_data_beyond_day(&self, day: u32) -> Result<bool, StorageError> {
        Ok(self
            .table
            .read_all()?
            .iter()
            .any(|r| r.has_data() && r.day > day))
    }

    pub fn has_any_data(&self) -> Result<bool, StorageError> {
        Ok(self.table.read_all()?.iter().any(|r| r.has_data()))
    }

    /// Highest day with real data, if any.
    pub fn last_day_with_data(&self) -> Result<Option<u32>, StorageError> {
        Ok(self
            .table
            .read_all()?
            .iter()
            .filter(|r| r.has_data())
            .map(|r| r.day)
            .max())
    }

    /// Highest match with real data on the given day, if any.
    pub fn last_match_with_data(&self, day: u32) -> Result<Option<u32>, StorageError> {
        Ok(self
            .table
            .read_all()?
            .iter()
            .filter(|r| r.day == day && r.has_data())
            .map(|r| r.match_number)
            .max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(temp_dir: &TempDir) -> MatchResultStore {
        MatchResultStore::new(&StorageConfig::new(temp_dir.path().to_path_buf()))
    }

    fn result(day: u32, match_number: u32, team: u32, kills: u32, rank: u32, points: i64) -> MatchResult {
        MatchResult::new(ResultKey::new(day, match_number, team), kills, rank, points)
    }

    #[test]
    fn test_upsert_replaces_not_duplicates() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        store.upsert(result(1, 1, 5, 2, 3, 8)).unwrap();
        store.upsert(result(1, 1, 5, 7, 1, 22)).unwrap();

        let results = store.results_for_match(MatchKey::new(1, 1)).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kills, 7);
        assert_eq!(results[0].total_points, 22);
    }

    #[test]
    fn test_results_for_match_sorted_by_team() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        store
            .upsert_many(vec![
                result(1, 1, 9, 1, 2, 5),
                result(1, 1, 3, 2, 1, 10),
                result(1, 2, 1, 0, 3, 0),
            ])
            .unwrap();

        let teams: Vec<u32> = store
            .results_for_match(MatchKey::new(1, 1))
            .unwrap()
            .iter()
            .map(|r| r.team_number)
            .collect();
        assert_eq!(teams, vec![3, 9]);
    }

    #[test]
    fn test_result_for_team() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        store.upsert(result(2, 3, 14, 4, 2, 16)).unwrap();

        let found = store
            .result_for_team(ResultKey::new(2, 3, 14))
            .unwrap()
            .unwrap();
        assert_eq!(found.kills, 4);
        assert!(store
            .result_for_team(ResultKey::new(2, 3, 15))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_deletes_by_scope() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        store
            .upsert_many(vec![
                result(1, 1, 1, 1, 1, 10),
                result(1, 2, 1, 1, 2, 8),
                result(2, 1, 1, 1, 3, 6),
                result(3, 1, 1, 1, 4, 4),
                result(4, 1, 1, 1, 5, 2),
            ])
            .unwrap();

        assert_eq!(store.delete_match(MatchKey::new(1, 1)).unwrap(), 1);
        assert_eq!(store.delete_day(1).unwrap(), 1);
        assert_eq!(store.delete_day_range(2, 3).unwrap(), 2);
        assert_eq!(store.all_results().unwrap().len(), 1);

        store.delete_all().unwrap();
        assert!(store.all_results().unwrap().is_empty());
    }

    #[test]
    fn test_raw_totals_grouped_and_ordered() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        store
            .upsert_many(vec![
                result(1, 1, 1, 5, 1, 20),
                result(1, 2, 1, 2, 4, 4),
                result(1, 1, 2, 8, 2, 20),
                result(1, 2, 2, 0, 10, 0),
                result(1, 1, 3, 1, 3, 7),
            ])
            .unwrap();

        let totals = store.raw_totals(None).unwrap();
        assert_eq!(totals.len(), 3);
        // Team 1: 24 points / 7 kills, team 2: 20 points / 8 kills.
        assert_eq!(totals[0].team_number, 1);
        assert_eq!(totals[0].total_points, 24);
        assert_eq!(totals[0].matches_played, 2);
        assert_eq!(totals[1].team_number, 2);
        assert_eq!(totals[2].team_number, 3);
    }

    #[test]
    fn test_raw_totals_tie_broken_by_kills() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        store
            .upsert_many(vec![
                result(1, 1, 1, 2, 2, 12),
                result(1, 1, 2, 6, 3, 12),
            ])
            .unwrap();

        let totals = store.raw_totals(None).unwrap();
        assert_eq!(totals[0].team_number, 2);
        assert_eq!(totals[1].team_number, 1);
    }

    #[test]
    fn test_raw_totals_day_filter() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        store
            .upsert_many(vec![
                result(1, 1, 1, 5, 1, 20),
                result(2, 1, 1, 3, 2, 9),
            ])
            .unwrap();

        let totals = store.raw_totals(Some(2)).unwrap();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].total_points, 9);
        assert_eq!(totals[0].matches_played, 1);
    }

    #[test]
    fn test_data_probes_with_gaps() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        store
            .upsert_many(vec![
                result(1, 1, 1, 3, 1, 13),
                result(1, 3, 1, 0, 2, 0),
                result(3, 2, 1, 1, 5, 1),
                // Placeholder rows carry no data.
                result(2, 1, 1, 0, 0, 0),
                result(3, 4, 2, 0, 0, 0),
            ])
            .unwrap();

        assert_eq!(store.days_with_data().unwrap(), vec![1, 3]);
        assert_eq!(store.matches_with_data(1).unwrap(), vec![1, 3]);
        assert_eq!(store.last_day_with_data().unwrap(), Some(3));
        assert_eq!(store.last_match_with_data(3).unwrap(), Some(2));
        assert_eq!(store.last_match_with_data(2).unwrap(), None);
        assert!(store.has_any_data().unwrap());
        assert!(store.has_data_beyond_match(2).unwrap());
        assert!(!store.has_data_beyond_match(3).unwrap());
        assert!(store.has_data_beyond_day(1).unwrap());
        assert!(!store.has_data_beyond_day(3).unwrap());
    }

    #[test]
    fn test_probes_on_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        assert!(!store.has_any_data().unwrap());
        assert_eq!(store.last_day_with_data().unwrap(), None);
        assert!(store.days_with_data().unwrap().is_empty());
        assert!(store.raw_totals(None).unwrap().is_empty());
    }
}
