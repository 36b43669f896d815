//! Rank-points table codec.
//!
//! The sparse rank -> points table is persisted as a flat JSON object with
//! string keys, e.g. `{"1": 15, "2": 12}`. This is the only serialization
//! boundary that must round-trip exactly, since the text travels through
//! the configuration table.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

use super::ScoringError;

/// Canonical encoding of an empty table.
pub const EMPTY_RANK_POINTS: &str = "{}";

/// Decode a rank-points table from its keyed text form.
///
/// Blank input yields an empty table. Structurally malformed input (not a
/// flat JSON object) fails with [`ScoringError::MalformedConfig`]. Bad
/// entries are skipped with a warning rather than failing the whole
/// table: non-integer keys, ranks below 1 and negative points.
pub fn decode_rank_points(text: &str) -> Result<BTreeMap<u32, i64>, ScoringError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(BTreeMap::new());
    }

    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| ScoringError::MalformedConfig(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| ScoringError::MalformedConfig("expected a key-value table".to_string()))?;

    let mut table = BTreeMap::new();
    for (key, points_value) in object {
        let rank: i64 = match key.parse() {
            Ok(rank) => rank,
            Err(_) => {
                warn!("Skipping rank points entry with non-integer rank {:?}", key);
                continue;
            }
        };
        if rank <= 0 {
            warn!("Skipping rank points entry with non-positive rank {}", rank);
            continue;
        }
        let points = match points_value.as_i64() {
            Some(points) => points,
            None => {
                warn!(
                    "Skipping rank points entry for rank {} with non-integer points {}",
                    rank, points_value
                );
                continue;
            }
        };
        if points < 0 {
            warn!(
                "Skipping rank points entry for rank {} with negative points {}",
                rank, points
            );
            continue;
        }
        table.insert(rank as u32, points);
    }

    Ok(table)
}

/// Encode a rank-points table to its keyed text form.
///
/// Entries with rank 0 are dropped before encoding; everything else is
/// written as-is. An empty table encodes to [`EMPTY_RANK_POINTS`].
pub fn encode_rank_points(table: &BTreeMap<u32, i64>) -> String {
    let object: serde_json::Map<String, Value> = table
        .iter()
        .filter(|(&rank, _)| rank > 0)
        .map(|(&rank, &points)| (rank.to_string(), Value::from(points)))
        .collect();

    // A BTreeMap of valid entries cannot fail to serialize.
    serde_json::to_string(&Value::Object(object)).unwrap_or_else(|_| EMPTY_RANK_POINTS.to_string())
}
