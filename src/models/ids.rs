//! Identity types for stored rows.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Identity of one match slot within the tournament schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatchKey {
    /// Tournament day (1-based)
    pub day: u32,

    /// Match number within the day (1-based)
    pub match_number: u32,
}

impl MatchKey {
    pub fn new(day: u32, match_number: u32) -> Self {
        Self { day, match_number }
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day {} match {}", self.day, self.match_number)
    }
}

/// Identity of one team's row within a match.
///
/// Derived ordering is (day, match, team), the canonical listing order
/// used by the stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResultKey {
    pub day: u32,
    pub match_number: u32,
    pub team_number: u32,
}

impl ResultKey {
    pub fn new(day: u32, match_number: u32, team_number: u32) -> Self {
        Self {
            day,
            match_number,
            team_number,
        }
    }

    /// The match slot this row belongs to.
    pub fn match_key(&self) -> MatchKey {
        MatchKey::new(self.day, self.match_number)
    }
}

impl fmt::Display for ResultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "day {} match {} team {}",
            self.day, self.match_number, self.team_number
        )
    }
}

/// A deterministic surrogate id for alias rows, derived from content hash.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AliasId(String);

impl AliasId {
    /// Generate an id from the (primary, alias) pair.
    /// Uses SHA256 and takes the first 16 characters for brevity.
    pub fn generate(primary_team_number: u32, alias_team_number: u32) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(primary_team_number.to_string().as_bytes());
        hasher.update(b"|");
        hasher.update(alias_team_number.to_string().as_bytes());
        let hash = hex::encode(hasher.finalize());
        Self(hash[..16].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AliasId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for AliasId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AliasId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_key_ordering() {
        let mut keys = vec![
            ResultKey::new(2, 1, 5),
            ResultKey::new(1, 3, 1),
            ResultKey::new(1, 1, 9),
            ResultKey::new(1, 1, 2),
        ];
        keys.sort();

        assert_eq!(keys[0], ResultKey::new(1, 1, 2));
        assert_eq!(keys[1], ResultKey::new(1, 1, 9));
        assert_eq!(keys[2], ResultKey::new(1, 3, 1));
        assert_eq!(keys[3], ResultKey::new(2, 1, 5));
    }

    #[test]
    fn test_alias_id_deterministic() {
        let a = AliasId::generate(19, 7);
        let b = AliasId::generate(19, 7);
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 16);
    }

    #[test]
    fn test_alias_id_distinct_pairs() {
        assert_ne!(AliasId::generate(19, 7), AliasId::generate(7, 19));
    }

    #[test]
    fn test_match_key_from_result_key() {
        let key = ResultKey::new(2, 4, 11);
        assert_eq!(key.match_key(), MatchKey::new(2, 4));
    }
}
