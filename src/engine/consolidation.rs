//! Post-save score consolidation across alias groups.
//!
//! After a match save, every alias group is re-ranked internally: the
//! primary team's row receives the group's best result and the remaining
//! results cascade down the group's other participants in descending
//! order. Row identity never changes, only the score payload moves.

use std::sync::Arc;

use tracing::{debug, info};

use crate::models::{AliasGroup, MatchKey, MatchResult, ResultKey};
use crate::storage::{MatchResultStore, TeamAliasStore};

use super::EngineError;

pub struct ScoreConsolidationEngine {
    results: Arc<MatchResultStore>,
    aliases: Arc<TeamAliasStore>,
}

impl ScoreConsolidationEngine {
    pub fn new(results: Arc<MatchResultStore>, aliases: Arc<TeamAliasStore>) -> Self {
        Self { results, aliases }
    }

    /// Redistribute scores within every configured alias group for one
    /// match. Each reassigned row is persisted independently; a failure
    /// partway leaves earlier writes in place (partial-apply).
    pub fn consolidate_match(&self, key: MatchKey) -> Result<(), EngineError> {
        let groups = self
            .aliases
            .all_groups()
            .map_err(EngineError::TeamAlias)?;
        if groups.is_empty() {
            return Ok(());
        }

        let match_results = self
            .results
            .results_for_match(key)
            .map_err(EngineError::MatchResult)?;

        for group in &groups {
            self.consolidate_group(key, group, &match_results)?;
        }
        Ok(())
    }

    fn consolidate_group(
        &self,
        key: MatchKey,
        group: &AliasGroup,
        match_results: &[MatchResult],
    ) -> Result<(), EngineError> {
        // Results belonging to this group, in store order (team ascending).
        let mut group_results: Vec<&MatchResult> = match_results
            .iter()
            .filter(|r| group.contains(r.team_number))
            .collect();

        if group_results.len() <= 1 {
            debug!(
                "Group {} has {} result(s) in {}, nothing to consolidate",
                group.primary_team_number,
                group_results.len(),
                key
            );
            return Ok(());
        }

        // Stable sort: ties on points keep store order, no stronger
        // guarantee is made.
        group_results.sort_by(|a, b| b.total_points.cmp(&a.total_points));

        // Recipients: primary first, then the other participants in the
        // same descending order. A recipient beyond the result count (the
        // lowest scorer, when the primary had no row) keeps its row.
        let mut recipients: Vec<u32> = Vec::with_capacity(group_results.len() + 1);
        recipients.push(group.primary_team_number);
        recipients.extend(
            group_results
                .iter()
                .map(|r| r.team_number)
                .filter(|&t| t != group.primary_team_number),
        );

        let mut reassigned = 0;
        for (source, &recipient) in group_results.iter().zip(recipients.iter()) {
            let current = match_results.iter().find(|r| r.team_number == recipient);
            let unchanged = current.is_some_and(|r| {
                r.kills == source.kills
                    && r.rank == source.rank
                    && r.total_points == source.total_points
            });
            if unchanged {
                continue;
            }

            let row = MatchResult::new(
                ResultKey::new(key.day, key.match_number, recipient),
                source.kills,
                source.rank,
                source.total_points,
            );
            self.results.upsert(row).map_err(EngineError::MatchResult)?;
            reassigned += 1;
        }

        if reassigned > 0 {
            info!(
                "Consolidated group {} in {}: {} row(s) reassigned",
                group.primary_team_number, key, reassigned
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResultKey;
    use crate::storage::StorageConfig;
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        results: Arc<MatchResultStore>,
        aliases: Arc<TeamAliasStore>,
        engine: ScoreConsolidationEngine,
    }

    fn fixture() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let storage = StorageConfig::new(temp_dir.path().to_path_buf());
        let results = Arc::new(MatchResultStore::new(&storage));
        let aliases = Arc::new(TeamAliasStore::new(&storage));
        let engine = ScoreConsolidationEngine::new(results.clone(), aliases.clone());
        Fixture {
            _temp_dir: temp_dir,
            results,
            aliases,
            engine,
        }
    }

    fn save(results: &MatchResultStore, team: u32, kills: u32, rank: u32, points: i64) {
        results
            .upsert(MatchResult::new(ResultKey::new(1, 1, team), kills, rank, points))
            .unwrap();
    }

    fn points_of(results: &MatchResultStore, team: u32) -> i64 {
        results
            .result_for_team(ResultKey::new(1, 1, team))
            .unwrap()
            .unwrap()
            .total_points
    }

    #[test]
    fn test_primary_receives_best_result() {
        let fx = fixture();
        fx.aliases.save_group(19, &[7, 12], "Team Rocket").unwrap();
        save(&fx.results, 7, 5, 3, 15);
        save(&fx.results, 12, 8, 1, 20);
        save(&fx.results, 19, 2, 8, 10);

        fx.engine.consolidate_match(MatchKey::new(1, 1)).unwrap();

        assert_eq!(points_of(&fx.results, 19), 20);
        assert_eq!(points_of(&fx.results, 12), 15);
        assert_eq!(points_of(&fx.results, 7), 10);

        // The winning payload moved whole: kills and rank travel with it.
        let primary = fx
            .results
            .result_for_team(ResultKey::new(1, 1, 19))
            .unwrap()
            .unwrap();
        assert_eq!(primary.kills, 8);
        assert_eq!(primary.rank, 1);
    }

    #[test]
    fn test_single_result_is_noop() {
        let fx = fixture();
        fx.aliases.save_group(19, &[7, 12], "Team Rocket").unwrap();
        save(&fx.results, 7, 5, 3, 15);

        fx.engine.consolidate_match(MatchKey::new(1, 1)).unwrap();

        // The lone result stays on its own row; the primary gains nothing.
        assert_eq!(points_of(&fx.results, 7), 15);
        assert!(fx
            .results
            .result_for_team(ResultKey::new(1, 1, 19))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_no_results_is_noop() {
        let fx = fixture();
        fx.aliases.save_group(19, &[7], "Team Rocket").unwrap();
        fx.engine.consolidate_match(MatchKey::new(1, 1)).unwrap();
        assert!(fx.results.all_results().unwrap().is_empty());
    }

    #[test]
    fn test_primary_without_own_result_gains_row() {
        let fx = fixture();
        fx.aliases.save_group(19, &[7, 12], "Team Rocket").unwrap();
        save(&fx.results, 7, 5, 3, 15);
        save(&fx.results, 12, 8, 1, 20);

        fx.engine.consolidate_match(MatchKey::new(1, 1)).unwrap();

        assert_eq!(points_of(&fx.results, 19), 20);
        assert_eq!(points_of(&fx.results, 12), 15);
        // The lowest scorer keeps its original row when the primary had
        // no row of its own.
        assert_eq!(points_of(&fx.results, 7), 15);
    }

    #[test]
    fn test_already_consolidated_is_stable() {
        let fx = fixture();
        fx.aliases.save_group(19, &[7], "Team Rocket").unwrap();
        save(&fx.results, 19, 8, 1, 20);
        save(&fx.results, 7, 5, 3, 15);

        let before: Vec<(u32, i64)> = fx
            .results
            .all_results()
            .unwrap()
            .iter()
            .map(|r| (r.team_number, r.total_points))
            .collect();

        fx.engine.consolidate_match(MatchKey::new(1, 1)).unwrap();
        fx.engine.consolidate_match(MatchKey::new(1, 1)).unwrap();

        let after: Vec<(u32, i64)> = fx
            .results
            .all_results()
            .unwrap()
            .iter()
            .map(|r| (r.team_number, r.total_points))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_teams_outside_group_untouched() {
        let fx = fixture();
        fx.aliases.save_group(19, &[7], "Team Rocket").unwrap();
        save(&fx.results, 7, 5, 3, 15);
        save(&fx.results, 19, 2, 8, 10);
        save(&fx.results, 4, 9, 1, 30);

        fx.engine.consolidate_match(MatchKey::new(1, 1)).unwrap();

        assert_eq!(points_of(&fx.results, 4), 30);
        assert_eq!(points_of(&fx.results, 19), 15);
        assert_eq!(points_of(&fx.results, 7), 10);
    }

    #[test]
    fn test_two_groups_consolidated_independently() {
        let fx = fixture();
        fx.aliases.save_group(19, &[7], "A").unwrap();
        fx.aliases.save_group(3, &[5], "B").unwrap();
        save(&fx.results, 7, 5, 2, 15);
        save(&fx.results, 19, 2, 8, 10);
        save(&fx.results, 5, 6, 1, 25);
        save(&fx.results, 3, 0, 12, 2);

        fx.engine.consolidate_match(MatchKey::new(1, 1)).unwrap();

        assert_eq!(points_of(&fx.results, 19), 15);
        assert_eq!(points_of(&fx.results, 7), 10);
        assert_eq!(points_of(&fx.results, 3), 25);
        assert_eq!(points_of(&fx.results, 5), 2);
    }
}
