//! Orchestration layer.
//!
//! [`TournamentRepository`] is the single entry point the UI layer calls:
//! validated match saves, penalties, manual overrides, alias groups,
//! cascading resets, and leaderboard reads (one-shot and push-based).

mod config_manager;
mod consolidation;
mod leaderboard;

pub use config_manager::ConfigurationManager;
pub use consolidation::ScoreConsolidationEngine;
pub use leaderboard::{build_leaderboard, sort_leaderboard, SortMode};

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::models::{
    MatchKey, MatchResult, Penalty, ResultKey, TeamScore, TournamentConfig,
};
use crate::scoring::{calculate_total_points, ScoringError};
use crate::storage::{
    ConfigStore, MatchResultStore, PenaltyStore, StorageConfig, StorageError, TeamAliasStore,
};

/// Errors from the orchestration layer.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no tournament configuration is set")]
    NoConfiguration,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid match save: {0}")]
    InvalidSave(String),

    #[error("no stored result for {0}")]
    ResultNotFound(ResultKey),

    #[error("alias conflict: {0}")]
    AliasConflict(String),

    #[error("configuration error: {0}")]
    Configuration(#[source] StorageError),

    #[error("match result error: {0}")]
    MatchResult(#[source] StorageError),

    #[error("penalty error: {0}")]
    Penalty(#[source] StorageError),

    #[error("team alias error: {0}")]
    TeamAlias(#[source] StorageError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

/// One team's input line on the save path: finish position, team slot,
/// kill count. Supplied pre-validated by the UI, re-checked here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamEntry {
    pub rank: u32,
    pub team_number: u32,
    pub kills: u32,
}

/// The orchestrating facade over the four stores.
pub struct TournamentRepository {
    results: Arc<MatchResultStore>,
    penalties: Arc<PenaltyStore>,
    aliases: Arc<TeamAliasStore>,
    consolidation: ScoreConsolidationEngine,
    config: ConfigurationManager,
    leaderboard_tx: watch::Sender<Vec<TeamScore>>,
}

impl TournamentRepository {
    pub fn open(storage: &StorageConfig) -> Result<Self, EngineError> {
        let results = Arc::new(MatchResultStore::new(storage));
        let penalties = Arc::new(PenaltyStore::new(storage));
        let aliases = Arc::new(TeamAliasStore::new(storage));
        let consolidation = ScoreConsolidationEngine::new(results.clone(), aliases.clone());
        let config = ConfigurationManager::new(ConfigStore::new(storage), results.clone())?;

        let repository = Self {
            results,
            penalties,
            aliases,
            consolidation,
            config,
            leaderboard_tx: watch::channel(Vec::new()).0,
        };
        repository.emit_leaderboard();
        Ok(repository)
    }

    // ── Save path ───────────────────────────────────────────────

    /// Save a batch of results for one match: validate, compute points
    /// under the current configuration, upsert, then consolidate alias
    /// groups best-effort.
    pub fn save_match_results(
        &self,
        day: u32,
        match_number: u32,
        entries: &[TeamEntry],
    ) -> Result<(), EngineError> {
        validate_entries(day, match_number, entries)?;

        let config = self
            .config
            .current_config()?
            .ok_or(EngineError::NoConfiguration)?;

        let rows: Vec<MatchResult> = entries
            .iter()
            .map(|entry| {
                let points = calculate_total_points(
                    entry.kills,
                    entry.rank,
                    config.points_per_kill,
                    &config.rank_points,
                )?;
                Ok(MatchResult::new(
                    ResultKey::new(day, match_number, entry.team_number),
                    entry.kills,
                    entry.rank,
                    points,
                ))
            })
            .collect::<Result<_, EngineError>>()?;

        self.results
            .upsert_many(rows)
            .map_err(EngineError::MatchResult)?;
        info!(
            "Saved {} result(s) for {}",
            entries.len(),
            MatchKey::new(day, match_number)
        );

        // Best-effort: a consolidation failure never rolls back the save.
        let key = MatchKey::new(day, match_number);
        if let Err(e) = self.consolidation.consolidate_match(key) {
            warn!("Score consolidation failed for {}: {}", key, e);
        }

        self.emit_leaderboard();
        Ok(())
    }

    // ── Penalties and overrides ─────────────────────────────────

    /// Apply (or replace) a penalty for one team in one match.
    pub fn apply_penalty(
        &self,
        day: u32,
        match_number: u32,
        team_number: u32,
        penalty_points: i64,
    ) -> Result<(), EngineError> {
        if penalty_points < 0 {
            return Err(EngineError::InvalidSave(
                "penalty points must be non-negative".to_string(),
            ));
        }
        let key = ResultKey::new(day, match_number, team_number);
        self.penalties
            .upsert(Penalty::new(key, penalty_points))
            .map_err(EngineError::Penalty)?;
        info!("Applied penalty of {} to {}", penalty_points, key);
        self.emit_leaderboard();
        Ok(())
    }

    pub fn remove_penalty(
        &self,
        day: u32,
        match_number: u32,
        team_number: u32,
    ) -> Result<(), EngineError> {
        let key = ResultKey::new(day, match_number, team_number);
        self.penalties
            .delete_for_team(key)
            .map_err(EngineError::Penalty)?;
        self.emit_leaderboard();
        Ok(())
    }

    /// Directly overwrite one stored result's total points, bypassing the
    /// calculator. The escape hatch for manual corrections.
    pub fn override_score(
        &self,
        day: u32,
        match_number: u32,
        team_number: u32,
        new_total: i64,
    ) -> Result<(), EngineError> {
        let key = ResultKey::new(day, match_number, team_number);
        let mut result = self
            .results
            .result_for_team(key)
            .map_err(EngineError::MatchResult)?
            .ok_or(EngineError::ResultNotFound(key))?;

        result.total_points = new_total;
        result.timestamp = chrono::Utc::now();
        self.results.upsert(result).map_err(EngineError::MatchResult)?;
        info!("Overrode score for {} to {}", key, new_total);
        self.emit_leaderboard();
        Ok(())
    }

    // ── Alias groups ────────────────────────────────────────────

    /// Save an alias group, replacing the primary's previous rows.
    /// Rejected when any team would act as primary and alias at once,
    /// or when an alias already belongs to another group.
    pub fn save_alias_group(
        &self,
        primary_team_number: u32,
        alias_team_numbers: &[u32],
        group_name: &str,
    ) -> Result<(), EngineError> {
        let mut seen = HashSet::new();
        for &alias in alias_team_numbers {
            if alias == primary_team_number {
                return Err(EngineError::AliasConflict(format!(
                    "team {} cannot alias itself",
                    alias
                )));
            }
            if !seen.insert(alias) {
                return Err(EngineError::AliasConflict(format!(
                    "team {} listed twice in the group",
                    alias
                )));
            }
        }

        let existing = self
            .aliases
            .all_aliases()
            .map_err(EngineError::TeamAlias)?;
        for row in existing
            .iter()
            .filter(|a| a.primary_team_number != primary_team_number)
        {
            if row.alias_team_number == primary_team_number {
                return Err(EngineError::AliasConflict(format!(
                    "team {} is already an alias of team {}",
                    primary_team_number, row.primary_team_number
                )));
            }
            if alias_team_numbers.contains(&row.primary_team_number) {
                return Err(EngineError::AliasConflict(format!(
                    "team {} is already a primary of another group",
                    row.primary_team_number
                )));
            }
            if alias_team_numbers.contains(&row.alias_team_number) {
                return Err(EngineError::AliasConflict(format!(
                    "team {} is already an alias of team {}",
                    row.alias_team_number, row.primary_team_number
                )));
            }
        }

        self.aliases
            .save_group(primary_team_number, alias_team_numbers, group_name)
            .map_err(EngineError::TeamAlias)?;
        info!(
            "Saved alias group {}: primary {}, {} alias(es)",
            group_name,
            primary_team_number,
            alias_team_numbers.len()
        );
        Ok(())
    }

    pub fn alias_groups(&self) -> Result<Vec<crate::models::AliasGroup>, EngineError> {
        self.aliases.all_groups().map_err(EngineError::TeamAlias)
    }

    pub fn delete_alias_group(&self, primary_team_number: u32) -> Result<(), EngineError> {
        self.aliases
            .delete_group(primary_team_number)
            .map_err(EngineError::TeamAlias)?;
        Ok(())
    }

    pub fn delete_all_aliases(&self) -> Result<(), EngineError> {
        self.aliases.delete_all().map_err(EngineError::TeamAlias)
    }

    // ── Leaderboard ─────────────────────────────────────────────

    /// Build the leaderboard, optionally restricted to one day. Only
    /// same-day penalties affect a same-day leaderboard. A penalty read
    /// failure degrades to an un-penalized leaderboard with a warning;
    /// the leaderboard always renders.
    pub fn leaderboard(
        &self,
        day_filter: Option<u32>,
        sort: SortMode,
    ) -> Result<Vec<TeamScore>, EngineError> {
        let raw = self
            .results
            .raw_totals(day_filter)
            .map_err(EngineError::MatchResult)?;

        let penalty_totals = match day_filter {
            Some(day) => self.penalties.totals_by_team_for_day(day),
            None => self.penalties.totals_by_team(),
        }
        .unwrap_or_else(|e| {
            warn!("Failed to read penalties, leaderboard ignores them: {}", e);
            Default::default()
        });

        let mut scores = build_leaderboard(&raw, &penalty_totals);
        sort_leaderboard(&mut scores, sort);
        Ok(scores)
    }

    /// Push-based observation of the overall leaderboard (points order).
    /// Every mutating operation re-emits the latest state.
    pub fn watch_leaderboard(&self) -> watch::Receiver<Vec<TeamScore>> {
        self.leaderboard_tx.subscribe()
    }

    fn emit_leaderboard(&self) {
        match self.leaderboard(None, SortMode::ByPoints) {
            Ok(scores) => {
                self.leaderboard_tx.send_replace(scores);
            }
            Err(e) => warn!("Skipping leaderboard emission: {}", e),
        }
    }

    // ── Resets ──────────────────────────────────────────────────
    //
    // Resetting a scope clears results AND penalties together; the
    // stores themselves never cascade.

    pub fn reset_match(&self, day: u32, match_number: u32) -> Result<(), EngineError> {
        let key = MatchKey::new(day, match_number);
        self.results
            .delete_match(key)
            .map_err(EngineError::MatchResult)?;
        self.penalties
            .delete_match(key)
            .map_err(EngineError::Penalty)?;
        info!("Reset {}", key);
        self.emit_leaderboard();
        Ok(())
    }

    pub fn reset_day(&self, day: u32) -> Result<(), EngineError> {
        self.results.delete_day(day).map_err(EngineError::MatchResult)?;
        self.penalties.delete_day(day).map_err(EngineError::Penalty)?;
        info!("Reset day {}", day);
        self.emit_leaderboard();
        Ok(())
    }

    pub fn reset_days(&self, from_day: u32, to_day: u32) -> Result<(), EngineError> {
        self.results
            .delete_day_range(from_day, to_day)
            .map_err(EngineError::MatchResult)?;
        self.penalties
            .delete_day_range(from_day, to_day)
            .map_err(EngineError::Penalty)?;
        info!("Reset days {}..={}", from_day, to_day);
        self.emit_leaderboard();
        Ok(())
    }

    pub fn reset_all(&self) -> Result<(), EngineError> {
        self.results.delete_all().map_err(EngineError::MatchResult)?;
        self.penalties.delete_all().map_err(EngineError::Penalty)?;
        info!("Reset all match data");
        self.emit_leaderboard();
        Ok(())
    }

    // ── Read-backs ──────────────────────────────────────────────

    pub fn days_with_data(&self) -> Result<Vec<u32>, EngineError> {
        self.results.days_with_data().map_err(EngineError::MatchResult)
    }

    pub fn matches_with_data(&self, day: u32) -> Result<Vec<u32>, EngineError> {
        self.results
            .matches_with_data(day)
            .map_err(EngineError::MatchResult)
    }

    pub fn last_day_with_data(&self) -> Result<Option<u32>, EngineError> {
        self.results
            .last_day_with_data()
            .map_err(EngineError::MatchResult)
    }

    pub fn last_match_with_data(&self, day: u32) -> Result<Option<u32>, EngineError> {
        self.results
            .last_match_with_data(day)
            .map_err(EngineError::MatchResult)
    }

    pub fn match_results(&self, day: u32, match_number: u32) -> Result<Vec<MatchResult>, EngineError> {
        self.results
            .results_for_match(MatchKey::new(day, match_number))
            .map_err(EngineError::MatchResult)
    }

    pub fn all_results(&self) -> Result<Vec<MatchResult>, EngineError> {
        self.results.all_results().map_err(EngineError::MatchResult)
    }

    pub fn penalties_for_match(&self, day: u32, match_number: u32) -> Result<Vec<Penalty>, EngineError> {
        self.penalties
            .penalties_for_match(MatchKey::new(day, match_number))
            .map_err(EngineError::Penalty)
    }

    // ── Configuration delegation ────────────────────────────────

    pub fn save_config(&self, config: TournamentConfig) -> Result<(), EngineError> {
        self.config.save_config(config)?;
        // Recomputation may have changed every cached total.
        self.emit_leaderboard();
        Ok(())
    }

    pub fn current_config(&self) -> Result<Option<TournamentConfig>, EngineError> {
        self.config.current_config()
    }

    pub fn watch_config(&self) -> watch::Receiver<Option<TournamentConfig>> {
        self.config.watch_config()
    }

    pub fn delete_configuration(&self) -> Result<(), EngineError> {
        self.config.delete_configuration()
    }

    pub fn check_shrink_conflict(&self, new_matches_per_day: u32) -> Result<bool, EngineError> {
        self.config.check_shrink_conflict(new_matches_per_day)
    }

    pub fn check_day_shrink_conflict(&self, new_total_days: u32) -> Result<bool, EngineError> {
        self.config.check_day_shrink_conflict(new_total_days)
    }
}

/// Save-path validation: 1-based day and match, unique team numbers, and
/// ranks forming a consecutive 1..N sequence with no duplicates or gaps.
fn validate_entries(day: u32, match_number: u32, entries: &[TeamEntry]) -> Result<(), EngineError> {
    if day == 0 {
        return Err(EngineError::InvalidSave("day must be at least 1".to_string()));
    }
    if match_number == 0 {
        return Err(EngineError::InvalidSave(
            "match number must be at least 1".to_string(),
        ));
    }
    if entries.is_empty() {
        return Err(EngineError::InvalidSave("no team entries given".to_string()));
    }

    let mut teams = HashSet::new();
    for entry in entries {
        if !teams.insert(entry.team_number) {
            return Err(EngineError::InvalidSave(format!(
                "team {} appears more than once",
                entry.team_number
            )));
        }
    }

    let mut ranks: Vec<u32> = entries.iter().map(|e| e.rank).collect();
    ranks.sort_unstable();
    for (i, &rank) in ranks.iter().enumerate() {
        let expected = (i + 1) as u32;
        if rank != expected {
            return Err(EngineError::InvalidSave(format!(
                "ranks must form a consecutive 1..{} sequence, got {:?}",
                entries.len(),
                ranks
            )));
        }
    }
    Ok(())
}
