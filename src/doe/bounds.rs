/// Input gate for sampling bounds
use ndarray::{Array2, ArrayView1};

use super::error::ValidationError;
use crate::config::{DESIGN_DIM, DESIGN_VARIABLES};

/// Validated (min, max) limits, one row per design variable.
///
/// The inner array always has shape `(dim, 2)` with `min <= max` and finite
/// entries in every row.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignBounds {
    limits: Array2<f64>,
}

impl DesignBounds {
    /// Validate the standard 14-variable bounds from `(min, max)` pairs.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self, ValidationError> {
        let rows: Vec<[f64; 2]> = pairs.iter().map(|&(lo, hi)| [lo, hi]).collect();
        validate_bounds(&rows, DESIGN_DIM)
    }

    pub fn dim(&self) -> usize {
        self.limits.nrows()
    }

    pub fn lower(&self, var: usize) -> f64 {
        self.limits[(var, 0)]
    }

    pub fn upper(&self, var: usize) -> f64 {
        self.limits[(var, 1)]
    }

    /// Bounds of one variable as a `[min, max]` view.
    pub fn row(&self, var: usize) -> ArrayView1<'_, f64> {
        self.limits.row(var)
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.limits
    }

    pub fn pairs(&self) -> Vec<(f64, f64)> {
        self.limits
            .rows()
            .into_iter()
            .map(|r| (r[0], r[1]))
            .collect()
    }

    /// Map a unit-cube coordinate of variable `var` into its bounds (inclusive).
    pub fn scale(&self, var: usize, unit: f64) -> f64 {
        let (lo, hi) = (self.lower(var), self.upper(var));
        (lo * (1.0 - unit) + hi * unit).clamp(lo, hi)
    }
}

/// Check that `rows` holds exactly `expected_dim` finite `(min, max)` pairs
/// with `min <= max`, and normalize them into a `(expected_dim, 2)` array.
pub fn validate_bounds<R: AsRef<[f64]>>(
    rows: &[R],
    expected_dim: usize,
) -> Result<DesignBounds, ValidationError> {
    let cols = rows.first().map_or(0, |r| r.as_ref().len());
    if rows.iter().any(|r| r.as_ref().len() != cols) {
        return Err(ValidationError::Ragged {
            expected_rows: expected_dim,
            rows: rows.len(),
        });
    }
    if rows.len() != expected_dim || cols != 2 {
        return Err(ValidationError::Shape {
            expected_rows: expected_dim,
            rows: rows.len(),
            cols,
        });
    }

    for (index, row) in rows.iter().enumerate() {
        let (min, max) = (row.as_ref()[0], row.as_ref()[1]);
        if !min.is_finite() || !max.is_finite() {
            return Err(ValidationError::NonFinite {
                index,
                name: variable_name(index),
            });
        }
        if min > max {
            return Err(ValidationError::InvertedBound {
                index,
                name: variable_name(index),
                min,
                max,
            });
        }
    }

    let limits = Array2::from_shape_fn((expected_dim, 2), |(i, j)| rows[i].as_ref()[j]);
    Ok(DesignBounds { limits })
}

/// Column name for variable `index`, or a positional name past the standard set.
pub fn variable_name(index: usize) -> String {
    DESIGN_VARIABLES
        .get(index)
        .map_or_else(|| format!("x{index}"), |name| (*name).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::REFERENCE_BOUNDS;

    #[test]
    fn reference_bounds_normalize_to_14_by_2() {
        let bounds = DesignBounds::from_pairs(&REFERENCE_BOUNDS).unwrap();
        assert_eq!(bounds.as_array().dim(), (14, 2));
        assert_eq!(bounds.lower(0), 8.0);
        assert_eq!(bounds.upper(13), 0.35);
        assert_eq!(bounds.pairs(), REFERENCE_BOUNDS.to_vec());
    }

    #[test]
    fn missing_diameter_reports_shapes() {
        let err = DesignBounds::from_pairs(&REFERENCE_BOUNDS[..13]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Shape {
                expected_rows: 14,
                rows: 13,
                cols: 2
            }
        );
        let msg = err.to_string();
        assert!(msg.contains("(14, 2)") && msg.contains("(13, 2)"), "{msg}");
    }

    #[test]
    fn inverted_pair_anywhere_is_rejected() {
        for index in [0, 7, 13] {
            let mut pairs = vec![(0.0, 1.0); 14];
            pairs[index] = (5.0, 2.0);
            match DesignBounds::from_pairs(&pairs) {
                Err(ValidationError::InvertedBound { index: i, min, max, .. }) => {
                    assert_eq!(i, index);
                    assert_eq!((min, max), (5.0, 2.0));
                }
                other => panic!("expected inverted bound, got {other:?}"),
            }
        }
    }

    #[test]
    fn degenerate_pair_is_allowed() {
        let mut pairs = vec![(0.0, 1.0); 14];
        pairs[4] = (2.0, 2.0);
        let bounds = DesignBounds::from_pairs(&pairs).unwrap();
        assert_eq!(bounds.scale(4, 0.73), 2.0);
    }

    #[test]
    fn full_range_bounds_keep_strata_apart() {
        let mut pairs = vec![(0.0, 1.0); 14];
        pairs[0] = (-f64::MAX, f64::MAX);
        let bounds = DesignBounds::from_pairs(&pairs).unwrap();

        let scaled: Vec<f64> = [0.125, 0.375, 0.625, 0.875]
            .iter()
            .map(|&u| bounds.scale(0, u))
            .collect();
        assert!(scaled.iter().all(|v| v.is_finite()));
        assert!(scaled.windows(2).all(|w| w[0] < w[1]), "{scaled:?}");
        assert_eq!(bounds.scale(0, 0.0), -f64::MAX);
        assert_eq!(bounds.scale(0, 1.0), f64::MAX);
        assert_eq!(bounds.scale(0, 0.5), 0.0);
    }

    #[test]
    fn ragged_and_wide_rows_fail() {
        let mut rows: Vec<Vec<f64>> = vec![vec![0.0, 1.0]; 14];
        rows[3] = vec![0.0, 1.0, 2.0];
        assert!(matches!(
            validate_bounds(&rows, 14),
            Err(ValidationError::Ragged { rows: 14, .. })
        ));

        let wide = vec![vec![0.0, 1.0, 2.0]; 14];
        assert!(matches!(
            validate_bounds(&wide, 14),
            Err(ValidationError::Shape { cols: 3, .. })
        ));
    }

    #[test]
    fn nan_bound_fails() {
        let mut pairs = vec![(0.0, 1.0); 14];
        pairs[2] = (f64::NAN, 1.0);
        assert!(matches!(
            DesignBounds::from_pairs(&pairs),
            Err(ValidationError::NonFinite { index: 2, .. })
        ));
    }

    #[test]
    fn custom_dimension() {
        let bounds = validate_bounds(&[[0.0, 1.0], [-2.0, 2.0], [3.0, 4.0]], 3).unwrap();
        assert_eq!(bounds.dim(), 3);
        assert_eq!(bounds.scale(1, 0.5), 0.0);
        assert_eq!(variable_name(20), "x20");
    }
}
