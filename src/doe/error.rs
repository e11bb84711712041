//! Error types for design-space sampling.
//!
//! Only `ValidationError`, `SamplingError` and `ConfigError` abort a run.
//! Geometry and metric failures are folded into the row's error trail by
//! the runner and never leave the row that produced them.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for design-space operations.
pub type DoeResult<T> = Result<T, DoeError>;

/// Top-level error for a design-space run.
#[derive(Debug, Error)]
pub enum DoeError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("sampling failed: {0}")]
    Sampling(#[from] SamplingError),

    #[error("study configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    #[error("worker pool: {0}")]
    WorkerPool(String),
}

/// Malformed sampling bounds or flow conditions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("bounds must have shape ({expected_rows}, 2) with min <= max, got ({rows}, {cols})")]
    Shape {
        expected_rows: usize,
        rows: usize,
        cols: usize,
    },

    #[error("bounds must have shape ({expected_rows}, 2), got {rows} rows of unequal length")]
    Ragged { expected_rows: usize, rows: usize },

    #[error("bound {index} ({name}) has min {min} > max {max}")]
    InvertedBound {
        index: usize,
        name: String,
        min: f64,
        max: f64,
    },

    #[error("bound {index} ({name}) is not finite")]
    NonFinite { index: usize, name: String },

    #[error("flow conditions: {0}")]
    Flow(String),
}

/// Failure of the sampling algorithm itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplingError {
    #[error("number of configurations must be positive")]
    NoConfigurations,

    #[error("unknown sampling criterion '{0}' (expected random, center, maximin, centermaximin or correlation)")]
    UnknownCriterion(String),
}

/// Failure reported by the modeling collaborator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("geometry {0} does not exist")]
    UnknownGeom(u32),

    #[error("parameter {0} does not exist")]
    UnknownParm(u64),

    #[error("value {value} rejected for {name}@{group}")]
    RejectedValue {
        name: String,
        group: String,
        value: f64,
    },

    #[error("{0}")]
    Tool(String),
}

/// Failure of one geometry-construction step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("unresolved parameters: {}", .0.join(", "))]
    Unresolved(Vec<String>),
}

/// Failure inside the metrics block.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricError {
    #[error("geometry state unavailable: {0}")]
    GeometryState(#[from] ModelError),

    #[error("{metric} failed: {reason}")]
    Evaluation { metric: &'static str, reason: String },
}

impl MetricError {
    /// Create an evaluation failure for the named metric.
    #[must_use]
    pub fn evaluation(metric: &'static str, reason: impl Into<String>) -> Self {
        Self::Evaluation {
            metric,
            reason: reason.into(),
        }
    }
}

/// Study file could not be read or parsed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize study: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result table could not be persisted.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
