//! Per-match team result model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MatchKey, ResultKey};

/// One team's saved result for one match.
///
/// At most one row exists per `(day, match_number, team_number)`; saving
/// the same key again replaces kills, rank and cached points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    /// Tournament day (1-based)
    pub day: u32,

    /// Match number within the day (1-based)
    pub match_number: u32,

    /// Team slot number
    pub team_number: u32,

    /// Kills scored in this match
    pub kills: u32,

    /// Finish position (1 = best)
    pub rank: u32,

    /// Cached total points for this match, derived from the scoring
    /// configuration at save time (or overwritten by a manual override)
    pub total_points: i64,

    /// When this row was last written
    pub timestamp: DateTime<Utc>,
}

impl MatchResult {
    pub fn new(key: ResultKey, kills: u32, rank: u32, total_points: i64) -> Self {
        Self {
            day: key.day,
            match_number: key.match_number,
            team_number: key.team_number,
            kills,
            rank,
            total_points,
            timestamp: Utc::now(),
        }
    }

    pub fn key(&self) -> ResultKey {
        ResultKey::new(self.day, self.match_number, self.team_number)
    }

    pub fn match_key(&self) -> MatchKey {
        MatchKey::new(self.day, self.match_number)
    }

    /// Whether this row carries real data (a zero-kill, zero-rank row is a
    /// placeholder and does not count as played).
    pub fn has_data(&self) -> bool {
        self.kills > 0 || self.rank > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_keys() {
        let result = MatchResult::new(ResultKey::new(2, 3, 14), 6, 1, 25);
        assert_eq!(result.key(), ResultKey::new(2, 3, 14));
        assert_eq!(result.match_key(), MatchKey::new(2, 3));
    }

    #[test]
    fn test_has_data() {
        let placeholder = MatchResult::new(ResultKey::new(1, 1, 1), 0, 0, 0);
        assert!(!placeholder.has_data());

        let ranked_only = MatchResult::new(ResultKey::new(1, 1, 2), 0, 12, 0);
        assert!(ranked_only.has_data());

        let kills_only = MatchResult::new(ResultKey::new(1, 1, 3), 3, 0, 3);
        assert!(kills_only.has_data());
    }

    #[test]
    fn test_serialization_round_trip() {
        let result = MatchResult::new(ResultKey::new(1, 2, 7), 4, 5, 10);
        let json = serde_json::to_string(&result).unwrap();
        let parsed: MatchResult = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.key(), result.key());
        assert_eq!(parsed.kills, 4);
        assert_eq!(parsed.rank, 5);
        assert_eq!(parsed.total_points, 10);
    }
}
