//! Tournament configuration lifecycle.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::models::{MatchResult, TournamentConfig};
use crate::scoring::{calculate_total_points, encode_rank_points};
use crate::storage::{ConfigStore, MatchResultStore};

use super::EngineError;

/// Owns the configuration singleton and the score recomputation that a
/// scoring-parameter change forces on the stored history.
pub struct ConfigurationManager {
    store: ConfigStore,
    results: Arc<MatchResultStore>,
    tx: watch::Sender<Option<TournamentConfig>>,
}

impl ConfigurationManager {
    pub fn new(store: ConfigStore, results: Arc<MatchResultStore>) -> Result<Self, EngineError> {
        let current = store.current().map_err(EngineError::Configuration)?;
        let (tx, _) = watch::channel(current);
        Ok(Self { store, results, tx })
    }

    /// Save a new configuration, replacing the previous one wholesale.
    ///
    /// If a prior configuration existed and its scoring parameters differ
    /// (points per kill, or the encoded rank-points text), every stored
    /// result's cached points are recomputed with the new parameters.
    /// The config write commits before recomputation starts; a
    /// recomputation failure leaves the new config in place with stale
    /// cached totals on old rows. There is no rollback.
    pub fn save_config(&self, new_config: TournamentConfig) -> Result<(), EngineError> {
        new_config
            .validate()
            .map_err(EngineError::InvalidConfiguration)?;

        let prior = self.store.current().map_err(EngineError::Configuration)?;
        self.store
            .save(&new_config)
            .map_err(EngineError::Configuration)?;
        info!(
            "Saved tournament configuration: {} day(s), {} match(es)/day, {} point(s)/kill",
            new_config.total_days, new_config.matches_per_day, new_config.points_per_kill
        );

        let needs_recompute = prior
            .as_ref()
            .is_some_and(|prior| scoring_params_differ(prior, &new_config));

        let recompute_result = if needs_recompute {
            info!("Scoring parameters changed, recomputing all stored results");
            self.recalculate_all(&new_config)
        } else {
            Ok(())
        };
        if recompute_result.is_err() {
            warn!("Recomputation failed, cached totals are stale under the new configuration");
        }

        // The config write committed above regardless of how the
        // recomputation went; watchers must see what the store holds.
        self.tx.send_replace(Some(new_config));
        recompute_result
    }

    pub fn current_config(&self) -> Result<Option<TournamentConfig>, EngineError> {
        self.store.current().map_err(EngineError::Configuration)
    }

    /// Push-based observation of the current configuration.
    pub fn watch_config(&self) -> watch::Receiver<Option<TournamentConfig>> {
        self.tx.subscribe()
    }

    /// Remove the configuration only. Match results, penalties and
    /// aliases are never touched by configuration deletion.
    pub fn delete_configuration(&self) -> Result<(), EngineError> {
        self.store.delete_all().map_err(EngineError::Configuration)?;
        self.tx.send_replace(None);
        info!("Deleted tournament configuration (history retained)");
        Ok(())
    }

    /// Whether any stored result sits beyond the proposed matches-per-day
    /// limit. Shrinking past such results hides them, it never deletes.
    pub fn check_shrink_conflict(&self, new_matches_per_day: u32) -> Result<bool, EngineError> {
        self.results
            .has_data_beyond_match(new_matches_per_day)
            .map_err(EngineError::MatchResult)
    }

    /// Same probe for the day axis.
    pub fn check_day_shrink_conflict(&self, new_total_days: u32) -> Result<bool, EngineError> {
        self.results
            .has_data_beyond_day(new_total_days)
            .map_err(EngineError::MatchResult)
    }

    /// Full-table rewrite of cached points under the given parameters.
    /// Any failure here belongs to the configuration error family: the
    /// config change is what forced the rewrite.
    fn recalculate_all(&self, config: &TournamentConfig) -> Result<(), EngineError> {
        let stored = self
            .results
            .all_results()
            .map_err(EngineError::Configuration)?;
        if stored.is_empty() {
            return Ok(());
        }

        let mut recalculated: Vec<MatchResult> = Vec::with_capacity(stored.len());
        for mut result in stored {
            if result.rank == 0 {
                // Placeholder row (no rank recorded): keeps zero points.
                continue;
            }
            result.total_points = calculate_total_points(
                result.kills,
                result.rank,
                config.points_per_kill,
                &config.rank_points,
            )
            .map_err(|e| {
                EngineError::InvalidConfiguration(format!("recalculation failed: {}", e))
            })?;
            recalculated.push(result);
        }

        let count = recalculated.len();
        self.results
            .upsert_many(recalculated)
            .map_err(EngineError::Configuration)?;
        info!("Recomputed cached points for {} result(s)", count);
        Ok(())
    }
}

fn scoring_params_differ(prior: &TournamentConfig, new_config: &TournamentConfig) -> bool {
    prior.points_per_kill != new_config.points_per_kill
        || encode_rank_points(&prior.rank_points) != encode_rank_points(&new_config.rank_points)
}
