//! Team alias model.
//!
//! Alias rows consolidate split or duplicate registrations: every alias
//! team number belongs to exactly one primary team number, and the group
//! formed by a primary plus its aliases is treated as one competitive
//! entity when scores are consolidated after a match save.

use serde::{Deserialize, Serialize};

use super::AliasId;

/// One alias team number grouped under a primary team number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamAlias {
    /// Surrogate id (deterministic, derived from the pair)
    pub id: AliasId,

    /// The team number that represents the group
    pub primary_team_number: u32,

    /// The team number folded into the group
    pub alias_team_number: u32,

    /// Human-readable group label
    pub group_name: String,
}

impl TeamAlias {
    pub fn new(primary_team_number: u32, alias_team_number: u32, group_name: String) -> Self {
        Self {
            id: AliasId::generate(primary_team_number, alias_team_number),
            primary_team_number,
            alias_team_number,
            group_name,
        }
    }
}

/// An alias group assembled from stored rows: the primary team number and
/// its alias members in stored order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasGroup {
    pub primary_team_number: u32,
    pub alias_team_numbers: Vec<u32>,
    pub group_name: String,
}

impl AliasGroup {
    /// All team numbers in the group, primary first.
    pub fn members(&self) -> Vec<u32> {
        let mut members = Vec::with_capacity(1 + self.alias_team_numbers.len());
        members.push(self.primary_team_number);
        members.extend(self.alias_team_numbers.iter().copied());
        members
    }

    pub fn contains(&self, team_number: u32) -> bool {
        self.primary_team_number == team_number
            || self.alias_team_numbers.contains(&team_number)
    }
}
