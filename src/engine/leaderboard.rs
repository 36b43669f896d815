//! Leaderboard aggregation and presentation sorts.

use std::collections::HashMap;

use crate::models::{RawTeamTotals, TeamScore};

/// Supported presentation orders over a leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Points descending, kills descending, team number ascending.
    ByPoints,
    /// Team number ascending.
    ByTeamNumber,
}

/// Apply penalty totals to raw store aggregates.
///
/// Final points are floored at zero and the incoming team set is preserved
/// exactly: penalties alone never add or remove a team. Entry order is
/// kept as delivered by the store (points desc, kills desc); callers that
/// want a different order re-sort with [`sort_leaderboard`].
pub fn build_leaderboard(
    raw: &[RawTeamTotals],
    penalty_totals: &HashMap<u32, i64>,
) -> Vec<TeamScore> {
    raw.iter()
        .map(|entry| {
            let penalty = penalty_totals.get(&entry.team_number).copied().unwrap_or(0);
            TeamScore::from_raw(entry, penalty)
        })
        .collect()
}

/// Sort a leaderboard in place according to the presentation mode.
pub fn sort_leaderboard(scores: &mut [TeamScore], mode: SortMode) {
    match mode {
        SortMode::ByPoints => scores.sort_by(|a, b| {
            b.total_points
                .cmp(&a.total_points)
                .then(b.total_kills.cmp(&a.total_kills))
                .then(a.team_number.cmp(&b.team_number))
        }),
        SortMode::ByTeamNumber => scores.sort_by_key(|s| s.team_number),
    }
}
