//! Tournament configuration model.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed team-slot count for every tournament.
pub const TOTAL_TEAMS: u32 = 25;

/// The scoring and schedule configuration for a tournament.
///
/// Configuration is a singleton with replace-on-save semantics: the row
/// with the latest `created_at` is current and any older rows are ignored.
/// Changing `points_per_kill` or `rank_points` invalidates every cached
/// `MatchResult::total_points` and triggers a full recomputation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Number of tournament days (>= 1)
    pub total_days: u32,

    /// Matches scheduled per day (>= 1)
    pub matches_per_day: u32,

    /// Team slot count, fixed at [`TOTAL_TEAMS`]
    pub total_teams: u32,

    /// Points awarded per kill
    pub points_per_kill: u32,

    /// Sparse rank -> bonus points table (rank 1 = best)
    pub rank_points: BTreeMap<u32, i64>,

    /// Creation timestamp; the latest row is the current configuration
    pub created_at: DateTime<Utc>,
}

impl TournamentConfig {
    pub fn new(
        total_days: u32,
        matches_per_day: u32,
        points_per_kill: u32,
        rank_points: BTreeMap<u32, i64>,
    ) -> Self {
        Self {
            total_days,
            matches_per_day,
            total_teams: TOTAL_TEAMS,
            points_per_kill,
            rank_points,
            created_at: Utc::now(),
        }
    }

    /// Validate schedule and scoring bounds.
    pub fn validate(&self) -> Result<(), String> {
        if self.total_days == 0 {
            return Err("total_days must be at least 1".to_string());
        }
        if self.matches_per_day == 0 {
            return Err("matches_per_day must be at least 1".to_string());
        }
        if let Some((&rank, _)) = self.rank_points.iter().find(|(&rank, _)| rank == 0) {
            return Err(format!("rank_points contains invalid rank {}", rank));
        }
        if let Some((&rank, &points)) = self.rank_points.iter().find(|(_, &points)| points < 0) {
            return Err(format!(
                "rank_points contains negative points {} for rank {}",
                points, rank
            ));
        }
        Ok(())
    }
}
