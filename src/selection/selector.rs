//! Best pair extraction from a correlation matrix

use super::correlation::CorrelationMatrix;
use super::error::SelectionError;
use crate::types::BestPair;
use tracing::{debug, info};

/// Picks the most correlated pair above a minimum.
///
/// # Algorithm
/// 1. Walk the strict upper triangle row-major (row, then column ascending)
/// 2. Skip undefined (NaN) entries and entries with |r| == 1
/// 3. Keep the first maximum in scan order (ties do not replace it)
/// 4. Accept it only if it reaches `min_correlation`
///
/// Entries with |r| == 1 are excluded by value, matching how existing pair
/// selections were produced. A genuine off-diagonal correlation of exactly
/// ±1 is therefore never picked.
#[derive(Debug, Clone, Copy)]
pub struct BestPairSelector {
    min_correlation: f64,
}

impl BestPairSelector {
    pub fn new(min_correlation: f64) -> Self {
        Self { min_correlation }
    }

    pub fn min_correlation(&self) -> f64 {
        self.min_correlation
    }

    /// Highest candidate cell as `(row, col, value)`, ignoring the threshold.
    pub fn best_candidate(matrix: &CorrelationMatrix) -> Option<(usize, usize, f64)> {
        let mut best: Option<(usize, usize, f64)> = None;

        for (i, j, value) in matrix.upper_triangle() {
            if value.is_nan() {
                continue;
            }
            if value.abs() >= 1.0 {
                debug!(
                    a = %matrix.symbols()[i],
                    b = %matrix.symbols()[j],
                    corr = value,
                    "Perfectly collinear pair excluded"
                );
                continue;
            }
            let is_better = match best {
                Some((_, _, current)) => value > current,
                None => true,
            };
            if is_better {
                best = Some((i, j, value));
            }
        }

        best
    }

    /// Select the qualifying pair.
    ///
    /// # Errors
    /// - `NoCandidatePair` if every entry is undefined or excluded
    /// - `NoQualifyingPair` if the maximum is below `min_correlation`
    pub fn select(&self, matrix: &CorrelationMatrix) -> Result<BestPair, SelectionError> {
        let (i, j, value) =
            Self::best_candidate(matrix).ok_or(SelectionError::NoCandidatePair)?;

        if value < self.min_correlation {
            debug!(
                pair = format!("{}-{}", matrix.symbols()[i], matrix.symbols()[j]),
                corr = value,
                min_corr = self.min_correlation,
                "Correlation too low"
            );
            return Err(SelectionError::NoQualifyingPair {
                best: value,
                minimum: self.min_correlation,
            });
        }

        let pair = BestPair {
            first: matrix.symbols()[i].clone(),
            second: matrix.symbols()[j].clone(),
            correlation: value,
        };

        info!(
            pair = format!("{}-{}", pair.first, pair.second),
            correlation = format!("{:.3}", value),
            "Best pair found"
        );
        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Symbol;

    fn matrix(ab: f64, ac: f64, bc: f64) -> CorrelationMatrix {
        CorrelationMatrix::new(
            vec!["A".into(), "B".into(), "C".into()],
            vec![
                vec![1.0, ab, ac],
                vec![ab, 1.0, bc],
                vec![ac, bc, 1.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_selects_highest_pair() {
        let pair = BestPairSelector::new(0.5).select(&matrix(0.9, 0.3, 0.1)).unwrap();
        assert_eq!(pair.first, Symbol::from("A"));
        assert_eq!(pair.second, Symbol::from("B"));
        assert_eq!(pair.correlation, 0.9);
    }

    #[test]
    fn test_below_minimum_is_rejected() {
        let result = BestPairSelector::new(0.95).select(&matrix(0.9, 0.3, 0.1));
        match result {
            Err(SelectionError::NoQualifyingPair { best, minimum }) => {
                assert_eq!(best, 0.9);
                assert_eq!(minimum, 0.95);
            }
            other => panic!("expected NoQualifyingPair, got {:?}", other),
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let pair = BestPairSelector::new(0.9).select(&matrix(0.9, 0.3, 0.1)).unwrap();
        assert_eq!(pair.correlation, 0.9);
    }

    #[test]
    fn test_undefined_entries_never_win() {
        let pair = BestPairSelector::new(0.0)
            .select(&matrix(f64::NAN, f64::NAN, 0.2))
            .unwrap();
        assert_eq!(pair.first, Symbol::from("B"));
        assert_eq!(pair.second, Symbol::from("C"));

        let all_nan = BestPairSelector::new(0.0).select(&matrix(f64::NAN, f64::NAN, f64::NAN));
        assert!(matches!(all_nan, Err(SelectionError::NoCandidatePair)));
    }

    #[test]
    fn test_unit_correlation_is_excluded() {
        let pair = BestPairSelector::new(0.5).select(&matrix(1.0, 0.7, 0.6)).unwrap();
        assert_eq!(pair.first, Symbol::from("A"));
        assert_eq!(pair.second, Symbol::from("C"));

        let only_collinear = BestPairSelector::new(0.5).select(&matrix(1.0, -1.0, 1.0));
        assert!(matches!(only_collinear, Err(SelectionError::NoCandidatePair)));
    }

    #[test]
    fn test_tie_keeps_first_in_scan_order() {
        let (i, j, _) = BestPairSelector::best_candidate(&matrix(0.4, 0.8, 0.8)).unwrap();
        assert_eq!((i, j), (0, 2));
    }

    #[test]
    fn test_negative_maximum_with_negative_threshold() {
        let pair = BestPairSelector::new(-0.5)
            .select(&matrix(-0.4, -0.9, -0.8))
            .unwrap();
        assert_eq!(pair.correlation, -0.4);
    }
}
