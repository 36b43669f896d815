//! Pure scoring logic: the rank-points codec and the score calculator.
//!
//! Nothing in this module touches storage; both halves are deterministic
//! functions over plain values, which keeps the whole scoring scheme
//! testable without fixtures.

mod calculator;
mod rank_points;

pub use calculator::calculate_total_points;
pub use rank_points::{decode_rank_points, encode_rank_points, EMPTY_RANK_POINTS};

use thiserror::Error;

/// Errors from the scoring layer.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// The rank-points text could not be parsed as a flat key-value table.
    #[error("malformed rank points table: {0}")]
    MalformedConfig(String),

    /// A calculator precondition was violated.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}
