//! Reports derived from written result tables.
//!
//! Both report writers re-read a result file from disk rather than
//! taking in-memory results, so they work on any file with the result
//! writer's column layout regardless of which run produced it.

pub mod significant;
pub mod volcano;

pub use significant::{significant_entries, write_significant_lists, SignificantCategory};
pub use volcano::{write_volcano_points, VolcanoClass};

use crate::error::{ProtdiffError, Result};
use std::path::Path;

/// Significance threshold on the -log10 corrected p-value scale.
pub const NEG_LOG10_P_CUTOFF: f64 = 2.0;
/// Fold-change threshold for calling a feature over- or underexpressed.
pub const LOG2_FC_CUTOFF: f64 = 2.0;
/// Fold changes beyond this magnitude are dropped from volcano output.
pub const LOG2_FC_LIMIT: f64 = 15.0;

/// The columns of a result table the reports consume.
#[derive(Debug, Clone)]
pub struct ResultRow {
    pub feature_id: String,
    pub annotation: String,
    pub presence: String,
    pub log2_fold_change: f64,
    pub neg_log10_corrected_p: f64,
}

impl ResultRow {
    /// Whether the row was detected in only one condition.
    #[inline]
    pub fn is_exclusive(&self) -> bool {
        self.presence.starts_with("Only_")
    }
}

/// A result table re-read from disk for report generation.
#[derive(Debug, Clone)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
    stem: String,
}

impl ResultTable {
    /// Read the report-relevant columns from a result file.
    ///
    /// Columns are located by header name, so extra columns and column
    /// reordering are tolerated.
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .quoting(false)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        let column = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| ProtdiffError::MissingColumn(name.to_string()))
        };
        let id_col = column("feature_id")?;
        let annotation_col = column("annotation")?;
        let presence_col = column("presence")?;
        let fc_col = column("log2_fold_change")?;
        let neg_log10_col = column("neg_log10_corrected_p")?;

        let parse = |record: &csv::StringRecord, col: usize, row: usize| -> Result<f64> {
            let raw = record.get(col).unwrap_or("").trim();
            raw.parse::<f64>()
                .map_err(|_| ProtdiffError::InvalidMeasurement {
                    value: raw.to_string(),
                    row,
                    col,
                })
        };

        let mut rows = Vec::new();
        for (row_idx, record_result) in reader.records().enumerate() {
            let record = record_result?;
            rows.push(ResultRow {
                feature_id: record.get(id_col).unwrap_or("").to_string(),
                annotation: record.get(annotation_col).unwrap_or("").to_string(),
                presence: record.get(presence_col).unwrap_or("").to_string(),
                log2_fold_change: parse(&record, fc_col, row_idx)?,
                neg_log10_corrected_p: parse(&record, neg_log10_col, row_idx)?,
            });
        }

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("results")
            .to_string();
        Ok(Self { rows, stem })
    }

    #[inline]
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    /// Result-file stem used to derive report file names.
    #[inline]
    pub fn stem(&self) -> &str {
        &self.stem
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
