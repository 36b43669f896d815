//! Penalty model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MatchKey, ResultKey};

/// A point deduction applied against one team for one match.
///
/// At most one penalty exists per `(day, match_number, team_number)`;
/// re-applying replaces the previous deduction rather than adding to it.
/// Penalties are kept next to match results, never folded into them, so
/// the underlying result stays auditable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Penalty {
    pub day: u32,
    pub match_number: u32,
    pub team_number: u32,

    /// Points deducted at leaderboard time
    pub penalty_points: i64,

    /// When this penalty was last applied
    pub timestamp: DateTime<Utc>,
}

impl Penalty {
    pub fn new(key: ResultKey, penalty_points: i64) -> Self {
        Self {
            day: key.day,
            match_number: key.match_number,
            team_number: key.team_number,
            penalty_points,
            timestamp: Utc::now(),
        }
    }

    pub fn key(&self) -> ResultKey {
        ResultKey::new(self.day, self.match_number, self.team_number)
    }

    pub fn match_key(&self) -> MatchKey {
        MatchKey::new(self.day, self.match_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_penalty_keys() {
        let penalty = Penalty::new(ResultKey::new(1, 4, 21), 5);
        assert_eq!(penalty.key(), ResultKey::new(1, 4, 21));
        assert_eq!(penalty.match_key(), MatchKey::new(1, 4));
        assert_eq!(penalty.penalty_points, 5);
    }

    #[test]
    fn test_serialization_round_trip() {
        let penalty = Penalty::new(ResultKey::new(2, 1, 3), 10);
        let json = serde_json::to_string(&penalty).unwrap();
        let parsed: Penalty = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.key(), penalty.key());
        assert_eq!(parsed.penalty_points, 10);
    }
}
