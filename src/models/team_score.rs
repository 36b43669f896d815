//! Derived leaderboard entry models. Never persisted.

use serde::{Deserialize, Serialize};

/// Per-team aggregate straight out of the result store, before penalties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTeamTotals {
    pub team_number: u32,

    /// Sum of kills over the aggregated matches
    pub total_kills: u32,

    /// Sum of cached per-match points over the aggregated matches
    pub total_points: i64,

    /// Number of matches with a stored result for this team
    pub matches_played: u32,
}

/// Final leaderboard entry: penalty-adjusted, floored at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamScore {
    pub team_number: u32,
    pub total_kills: u32,
    pub total_points: i64,
    pub matches_played: u32,
}

impl TeamScore {
    /// Apply a penalty total to a raw aggregate. Points never go negative.
    pub fn from_raw(raw: &RawTeamTotals, penalty_total: i64) -> Self {
        Self {
            team_number: raw.team_number,
            total_kills: raw.total_kills,
            total_points: (raw.total_points - penalty_total).max(0),
            matches_played: raw.matches_played,
        }
    }
}
