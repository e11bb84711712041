//! Latin Hypercube Sampling over validated design bounds.
//!
//! The sampling itself is `egobox_doe::Lhs`; this module maps the study's
//! criterion names onto its `LhsKind`, seeds it reproducibly and scales the
//! unit-cube design into the bounds so every value lies inside its
//! `(min, max)` pair inclusively.
//!
//! | Criterion       | `LhsKind`         |
//! |-----------------|-------------------|
//! | `random`        | `Classic`         |
//! | `center`        | `Centered`        |
//! | `maximin`       | `Maximin`         |
//! | `centermaximin` | `CenteredMaximin` |
//! | `correlation`   | `Optimized` (ESE) |

use std::fmt;
use std::str::FromStr;

use egobox_doe::{Lhs, LhsKind, SamplingMethod};
use ndarray::Array2;
use rand::Rng;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::bounds::DesignBounds;
use super::error::SamplingError;

/// Space-filling criterion passed through to the LHS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    Random,
    #[serde(alias = "c")]
    Center,
    #[default]
    #[serde(alias = "m")]
    Maximin,
    #[serde(alias = "cm")]
    CenterMaximin,
    #[serde(alias = "corr")]
    Correlation,
}

impl Criterion {
    pub fn as_str(self) -> &'static str {
        match self {
            Criterion::Random => "random",
            Criterion::Center => "center",
            Criterion::Maximin => "maximin",
            Criterion::CenterMaximin => "centermaximin",
            Criterion::Correlation => "correlation",
        }
    }

    /// Matching LHS variant. The optimizing variants need at least two points
    /// to compare, so a single configuration falls back to the plain one.
    pub fn lhs_kind(self, n: usize) -> LhsKind {
        match self {
            Criterion::Random => LhsKind::Classic,
            Criterion::Center => LhsKind::Centered,
            Criterion::Maximin | Criterion::Correlation if n < 2 => LhsKind::Classic,
            Criterion::CenterMaximin if n < 2 => LhsKind::Centered,
            Criterion::Maximin => LhsKind::Maximin,
            Criterion::CenterMaximin => LhsKind::CenteredMaximin,
            Criterion::Correlation => LhsKind::Optimized,
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Criterion {
    type Err = SamplingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" | "none" => Ok(Criterion::Random),
            "center" | "c" => Ok(Criterion::Center),
            "maximin" | "m" => Ok(Criterion::Maximin),
            "centermaximin" | "cm" => Ok(Criterion::CenterMaximin),
            "correlation" | "corr" => Ok(Criterion::Correlation),
            other => Err(SamplingError::UnknownCriterion(other.to_string())),
        }
    }
}

/// LHS configured with a criterion and an optional seed.
#[derive(Debug, Clone)]
pub struct LhsSampler {
    pub criterion: Criterion,
    pub seed: Option<u64>,
}

impl LhsSampler {
    pub fn new(criterion: Criterion, seed: Option<u64>) -> Self {
        Self { criterion, seed }
    }

    /// Draw an `n x dim` sample matrix inside `bounds`.
    pub fn sample(&self, bounds: &DesignBounds, n: usize) -> Result<Array2<f64>, SamplingError> {
        if n == 0 {
            return Err(SamplingError::NoConfigurations);
        }
        let seed = self.seed.unwrap_or_else(|| rand::rng().random());
        let kind = self.criterion.lhs_kind(n);
        debug!("{} lhs with {} points, seed {}", self.criterion, n, seed);

        let unit = Lhs::new(bounds.as_array())
            .kind(kind)
            .with_rng(Xoshiro256Plus::seed_from_u64(seed))
            .normalized_sample(n);

        Ok(Array2::from_shape_fn((n, bounds.dim()), |(i, j)| {
            bounds.scale(j, unit[(i, j)])
        }))
    }
}

/// Sample `n` configurations with the given criterion and seed.
pub fn sample_design_space(
    bounds: &DesignBounds,
    n: usize,
    criterion: Criterion,
    seed: Option<u64>,
) -> Result<Array2<f64>, SamplingError> {
    LhsSampler::new(criterion, seed).sample(bounds, n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::REFERENCE_BOUNDS;
    use approx::assert_relative_eq;

    fn unit_bounds() -> DesignBounds {
        DesignBounds::from_pairs(&[(0.0, 1.0); 14]).unwrap()
    }

    #[test]
    fn samples_stay_inside_bounds() {
        let bounds = DesignBounds::from_pairs(&REFERENCE_BOUNDS).unwrap();
        for criterion in [
            Criterion::Random,
            Criterion::Center,
            Criterion::Maximin,
            Criterion::CenterMaximin,
            Criterion::Correlation,
        ] {
            let samples = sample_design_space(&bounds, 25, criterion, Some(7)).unwrap();
            assert_eq!(samples.dim(), (25, 14));
            for ((_, j), &v) in samples.indexed_iter() {
                assert!(
                    v >= bounds.lower(j) && v <= bounds.upper(j),
                    "{criterion}: column {j} value {v} out of bounds"
                );
            }
        }
    }

    #[test]
    fn same_seed_same_design() {
        let bounds = unit_bounds();
        let a = sample_design_space(&bounds, 10, Criterion::Maximin, Some(42)).unwrap();
        let b = sample_design_space(&bounds, 10, Criterion::Maximin, Some(42)).unwrap();
        assert_eq!(a, b);

        let c = sample_design_space(&bounds, 10, Criterion::Maximin, Some(43)).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn one_sample_per_stratum() {
        let bounds = unit_bounds();
        let n = 12;
        for criterion in [Criterion::Random, Criterion::Maximin, Criterion::Correlation] {
            let samples = sample_design_space(&bounds, n, criterion, Some(3)).unwrap();
            for column in samples.columns() {
                let mut strata: Vec<usize> = column
                    .iter()
                    .map(|v| ((v * n as f64).floor() as usize).min(n - 1))
                    .collect();
                strata.sort_unstable();
                assert_eq!(strata, (0..n).collect::<Vec<_>>(), "{criterion}");
            }
        }
    }

    #[test]
    fn center_uses_stratum_midpoints() {
        let bounds = unit_bounds();
        let samples = sample_design_space(&bounds, 4, Criterion::Center, Some(1)).unwrap();
        for v in samples.iter() {
            let k = v * 4.0 - 0.5;
            assert_relative_eq!(k, k.round(), epsilon = 1e-12);
        }
    }

    #[test]
    fn zero_configurations_fail() {
        let err = sample_design_space(&unit_bounds(), 0, Criterion::Maximin, Some(1)).unwrap_err();
        assert_eq!(err, SamplingError::NoConfigurations);
    }

    #[test]
    fn single_configuration_is_fine() {
        let samples = sample_design_space(&unit_bounds(), 1, Criterion::Maximin, None).unwrap();
        assert_eq!(samples.nrows(), 1);
    }

    #[test]
    fn criterion_names_and_aliases() {
        assert_eq!("m".parse::<Criterion>().unwrap(), Criterion::Maximin);
        assert_eq!("CM".parse::<Criterion>().unwrap(), Criterion::CenterMaximin);
        assert_eq!("corr".parse::<Criterion>().unwrap(), Criterion::Correlation);
        assert_eq!(Criterion::default().to_string(), "maximin");
        assert!(matches!(
            "ese".parse::<Criterion>(),
            Err(SamplingError::UnknownCriterion(_))
        ));
    }

    #[test]
    fn criteria_map_to_lhs_kinds() {
        assert!(matches!(Criterion::Random.lhs_kind(10), LhsKind::Classic));
        assert!(matches!(Criterion::Center.lhs_kind(10), LhsKind::Centered));
        assert!(matches!(Criterion::Maximin.lhs_kind(10), LhsKind::Maximin));
        assert!(matches!(Criterion::CenterMaximin.lhs_kind(10), LhsKind::CenteredMaximin));
        assert!(matches!(Criterion::Correlation.lhs_kind(10), LhsKind::Optimized));
        assert!(matches!(Criterion::Maximin.lhs_kind(1), LhsKind::Classic));
        assert!(matches!(Criterion::CenterMaximin.lhs_kind(1), LhsKind::Centered));
    }
}
