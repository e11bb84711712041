/// Export result tables to CSV or JSON
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::ExportError;
use super::record::ResultTable;
use crate::config::DEFAULT_OUTPUT_NAME;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Reduce a user-supplied name to a safe file stem.
///
/// Path separators and other unsafe characters become `_`, a trailing
/// `.csv`/`.json` is dropped, and an empty result falls back to the default name.
pub fn sanitize_name(name: &str) -> String {
    let trimmed = name.trim();
    let stem = trimmed
        .strip_suffix(".csv")
        .or_else(|| trimmed.strip_suffix(".json"))
        .unwrap_or(trimmed);

    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.chars().all(|c| c == '_') {
        DEFAULT_OUTPUT_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

pub fn output_path(output_dir: &Path, name: &str, format: ExportFormat) -> PathBuf {
    output_dir.join(format!("{}.{}", sanitize_name(name), format.extension()))
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Write `table` as CSV with a header row. Undefined values are empty cells.
pub fn write_csv<W: Write>(table: &ResultTable, mut out: W) -> std::io::Result<()> {
    writeln!(out, "{}", ResultTable::columns().join(","))?;

    for record in table {
        let mut cells: Vec<String> = record
            .numeric_values()
            .into_iter()
            .map(|v| if v.is_nan() { String::new() } else { v.to_string() })
            .collect();
        cells.push(csv_field(&record.error));
        writeln!(out, "{}", cells.join(","))?;
    }
    out.flush()
}

/// Write `<output_dir>/<name>.csv`, creating the directory if needed.
pub fn export_results_to_csv(
    table: &ResultTable,
    output_dir: &Path,
    name: &str,
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(output_dir).map_err(|e| ExportError::io(output_dir, e))?;

    let path = output_path(output_dir, name, ExportFormat::Csv);
    let file = File::create(&path).map_err(|e| ExportError::io(&path, e))?;
    write_csv(table, BufWriter::new(file)).map_err(|e| ExportError::io(&path, e))?;

    info!("exported {} rows to {}", table.len(), path.display());
    Ok(path)
}

/// Write `<output_dir>/<name>.json` as an array of records.
pub fn export_results_to_json(
    table: &ResultTable,
    output_dir: &Path,
    name: &str,
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(output_dir).map_err(|e| ExportError::io(output_dir, e))?;

    let path = output_path(output_dir, name, ExportFormat::Json);
    let file = File::create(&path).map_err(|e| ExportError::io(&path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, table.records())?;
    writer.flush().map_err(|e| ExportError::io(&path, e))?;

    info!("exported {} rows to {}", table.len(), path.display());
    Ok(path)
}

pub fn export_results(
    table: &ResultTable,
    output_dir: &Path,
    name: &str,
    format: ExportFormat,
) -> Result<PathBuf, ExportError> {
    match format {
        ExportFormat::Csv => export_results_to_csv(table, output_dir, name),
        ExportFormat::Json => export_results_to_json(table, output_dir, name),
    }
}
