//! Per-match score calculation.

use std::collections::BTreeMap;

use super::ScoringError;

/// Compute a team's total points for one match.
///
/// The formula is `kills * points_per_kill + rank_points[rank]`, where an
/// unconfigured rank contributes 0 position points. A rank of 0 violates
/// the 1-based finish-position contract and fails fast; this function
/// never clamps. There is no upper bound on kills or points.
pub fn calculate_total_points(
    kills: u32,
    rank: u32,
    points_per_kill: u32,
    rank_points: &BTreeMap<u32, i64>,
) -> Result<i64, ScoringError> {
    if rank == 0 {
        return Err(ScoringError::InvalidInput("rank must be at least 1"));
    }

    let kill_points = i64::from(kills) * i64::from(points_per_kill);
    let position_points = rank_points.get(&rank).copied().unwrap_or(0);
    Ok(kill_points + position_points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rank_points(entries: &[(u32, i64)]) -> BTreeMap<u32, i64> {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_kills_plus_position() {
        let table = rank_points(&[(1, 15), (2, 12)]);
        assert_eq!(calculate_total_points(5, 1, 1, &table).unwrap(), 20);
        assert_eq!(calculate_total_points(5, 2, 1, &table).unwrap(), 17);
    }

    #[test]
    fn test_unconfigured_rank_contributes_zero() {
        let table = rank_points(&[(1, 15)]);
        assert_eq!(calculate_total_points(3, 9, 2, &table).unwrap(), 6);
    }

    #[test]
    fn test_zero_kills_zero_table() {
        assert_eq!(calculate_total_points(0, 1, 1, &BTreeMap::new()).unwrap(), 0);
    }

    #[test]
    fn test_rank_zero_is_rejected() {
        let err = calculate_total_points(5, 0, 1, &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, ScoringError::InvalidInput(_)));
    }

    #[test]
    fn test_monotonic_in_kills() {
        let table = rank_points(&[(3, 4)]);
        let mut previous = -1;
        for kills in 0..50 {
            let points = calculate_total_points(kills, 3, 2, &table).unwrap();
            assert!(points > previous);
            previous = points;
        }
    }

    #[test]
    fn test_monotonic_in_points_per_kill() {
        let table = rank_points(&[(1, 10)]);
        let mut previous = -1;
        for ppk in 0..20 {
            let points = calculate_total_points(4, 1, ppk, &table).unwrap();
            assert!(points > previous);
            previous = points;
        }
    }

    #[test]
    fn test_no_upper_bound() {
        let points = calculate_total_points(u32::MAX, 1, 1000, &BTreeMap::new()).unwrap();
        assert_eq!(points, i64::from(u32::MAX) * 1000);
    }
}
