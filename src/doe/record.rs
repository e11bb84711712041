/// Per-configuration output rows and the result table
use std::fmt::Write as _;

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::config::{DESIGN_DIM, DESIGN_VARIABLES, ERROR_COLUMN, METRIC_COLUMNS};

/// Planform of a lifting surface (wing or horizontal tail).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceParams {
    pub aspect_ratio: f64,
    pub taper_ratio: f64,
    pub sweep_deg: f64,
    pub dihedral_deg: f64,
    pub area: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuselageParams {
    pub fore_length: f64,
    pub mid_length: f64,
    pub aft_length: f64,
    pub diameter: f64,
}

/// One sampled configuration, sliced into its three geometry groups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignVector {
    pub wing: SurfaceParams,
    pub tail: SurfaceParams,
    pub fuselage: FuselageParams,
}

impl DesignVector {
    /// Slice a 14-value row: wing `[0..5)`, tail `[5..10)`, fuselage `[10..14)`.
    ///
    /// Returns `None` unless the row has exactly 14 values.
    pub fn from_row(row: ArrayView1<'_, f64>) -> Option<Self> {
        if row.len() != DESIGN_DIM {
            return None;
        }
        let v: Vec<f64> = row.iter().copied().collect();
        Some(Self::from_values(&v))
    }

    fn from_values(v: &[f64]) -> Self {
        let surface = |s: &[f64]| SurfaceParams {
            aspect_ratio: s[0],
            taper_ratio: s[1],
            sweep_deg: s[2],
            dihedral_deg: s[3],
            area: s[4],
        };
        Self {
            wing: surface(&v[0..5]),
            tail: surface(&v[5..10]),
            fuselage: FuselageParams {
                fore_length: v[10],
                mid_length: v[11],
                aft_length: v[12],
                diameter: v[13],
            },
        }
    }

    /// Values in DESIGN_VARIABLES order.
    pub fn to_array(&self) -> [f64; DESIGN_DIM] {
        let (w, t, f) = (&self.wing, &self.tail, &self.fuselage);
        [
            w.aspect_ratio,
            w.taper_ratio,
            w.sweep_deg,
            w.dihedral_deg,
            w.area,
            t.aspect_ratio,
            t.taper_ratio,
            t.sweep_deg,
            t.dihedral_deg,
            t.area,
            f.fore_length,
            f.mid_length,
            f.aft_length,
            f.diameter,
        ]
    }
}

/// Metric fields of a row. `NaN` marks a value that could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub cl: f64,
    pub cd: f64,
    pub cm: f64,
    pub sigma_dbsm: f64,
    pub structural_weight: f64,
    pub empty_weight: f64,
}

impl Metrics {
    pub fn undefined() -> Self {
        Self {
            cl: f64::NAN,
            cd: f64::NAN,
            cm: f64::NAN,
            sigma_dbsm: f64::NAN,
            structural_weight: f64::NAN,
            empty_weight: f64::NAN,
        }
    }

    pub fn is_undefined(&self) -> bool {
        self.to_array().iter().all(|v| v.is_nan())
    }

    /// Values in METRIC_COLUMNS order.
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.cl,
            self.cd,
            self.cm,
            self.sigma_dbsm,
            self.structural_weight,
            self.empty_weight,
        ]
    }
}

/// One output row: design values, metrics and the error trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationRecord {
    pub index: usize,
    pub design: DesignVector,
    pub metrics: Metrics,
    /// Empty when nothing failed, otherwise `"; "`-joined failure messages
    pub error: String,
}

impl ConfigurationRecord {
    pub fn has_error(&self) -> bool {
        !self.error.is_empty()
    }

    /// Numeric cells in column order (design values, then metrics).
    pub fn numeric_values(&self) -> Vec<f64> {
        let mut values = self.design.to_array().to_vec();
        values.extend_from_slice(&self.metrics.to_array());
        values
    }
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableSummary {
    pub rows: usize,
    pub rows_with_errors: usize,
    pub rows_without_metrics: usize,
}

/// Records in sampling order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    records: Vec<ConfigurationRecord>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, record: ConfigurationRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ConfigurationRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConfigurationRecord> {
        self.records.iter()
    }

    /// Column names in output order.
    pub fn columns() -> Vec<&'static str> {
        let mut columns: Vec<&'static str> = DESIGN_VARIABLES.to_vec();
        columns.extend_from_slice(&METRIC_COLUMNS);
        columns.push(ERROR_COLUMN);
        columns
    }

    /// Values of numeric column `name`, or `None` for an unknown or text column.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = Self::columns().iter().position(|c| *c == name)?;
        if idx >= DESIGN_DIM + METRIC_COLUMNS.len() {
            return None;
        }
        Some(self.records.iter().map(|r| r.numeric_values()[idx]).collect())
    }

    pub fn summary(&self) -> TableSummary {
        TableSummary {
            rows: self.records.len(),
            rows_with_errors: self.records.iter().filter(|r| r.has_error()).count(),
            rows_without_metrics: self
                .records
                .iter()
                .filter(|r| r.metrics.is_undefined())
                .count(),
        }
    }

    /// Plain-text preview of the first and last `edge` rows.
    pub fn preview(&self, edge: usize) -> String {
        let columns = Self::columns();
        let mut out = String::new();
        let _ = write!(out, "{:>5}", "");
        for name in &columns[..columns.len() - 1] {
            let _ = write!(out, " {:>13}", name);
        }
        let _ = writeln!(out, "  {}", ERROR_COLUMN);

        let n = self.records.len();
        for (i, record) in self.records.iter().enumerate() {
            if n > 2 * edge && i == edge {
                let _ = writeln!(out, "{:>5}", "...");
            }
            if n > 2 * edge && i >= edge && i < n - edge {
                continue;
            }
            let _ = write!(out, "{:>5}", record.index);
            for v in record.numeric_values() {
                let _ = write!(out, " {:>13.6}", v);
            }
            let _ = writeln!(out, "  {}", record.error);
        }
        let _ = writeln!(out, "[{} rows x {} columns]", n, columns.len());
        out
    }
}

impl<'a> IntoIterator for &'a ResultTable {
    type Item = &'a ConfigurationRecord;
    type IntoIter = std::slice::Iter<'a, ConfigurationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<ConfigurationRecord> for ResultTable {
    fn from_iter<I: IntoIterator<Item = ConfigurationRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
