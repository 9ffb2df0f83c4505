//! Abundance tables loaded from annotated TSV files.

use crate::error::{ProtdiffError, Result};
use log::warn;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Field contents treated as a missing measurement.
const MISSING_MARKERS: [&str; 3] = ["na", "nan", ""];

/// A dense abundance table: one row of replicate measurements per feature.
///
/// Rows are features (proteins / protein groups), columns are replicate
/// samples. Missing measurements are stored as NaN. The second header
/// column may be a free-text `Annotation` column; everything after it is
/// treated as a measurement column.
#[derive(Debug, Clone)]
pub struct AbundanceTable {
    /// Condition label derived from the file name.
    label: String,
    /// Feature identifiers (row names).
    feature_ids: Vec<String>,
    /// Annotation per feature (empty when the file carries none).
    annotations: Vec<String>,
    /// Measurements, one row per feature.
    values: Vec<Vec<f64>>,
    /// Replicate column headers.
    sample_labels: Vec<String>,
    /// Feature id -> row index.
    index: HashMap<String, usize>,
}

impl AbundanceTable {
    /// Load an abundance table from a TSV file.
    ///
    /// Expected format:
    /// - First row: header with the feature-id column, an optional
    ///   `Annotation` column, then one column per replicate.
    /// - Subsequent rows: feature id followed by the per-column fields.
    ///
    /// Empty fields and `NA`/`NaN` markers become NaN; any other
    /// non-numeric field is an error. Duplicate feature ids keep the
    /// first occurrence.
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let header_line = lines.next().ok_or_else(|| {
            ProtdiffError::EmptyData(format!("empty abundance table: {}", path.display()))
        })??;
        let header: Vec<&str> = header_line.split('\t').collect();
        if header.len() < 2 {
            return Err(ProtdiffError::EmptyData(format!(
                "{}: table must have at least one measurement column",
                path.display()
            )));
        }

        let has_annotation = header[1].trim().eq_ignore_ascii_case("annotation");
        let first_value_col = if has_annotation { 2 } else { 1 };
        if header.len() <= first_value_col {
            return Err(ProtdiffError::EmptyData(format!(
                "{}: no measurement columns after the annotation column",
                path.display()
            )));
        }
        let sample_labels: Vec<String> = header[first_value_col..]
            .iter()
            .map(|s| s.trim().to_string())
            .collect();
        let n_samples = sample_labels.len();

        let mut feature_ids: Vec<String> = Vec::new();
        let mut annotations: Vec<String> = Vec::new();
        let mut values: Vec<Vec<f64>> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (row_idx, line_result) in lines.enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();

            let feature_id = fields[0].trim().to_string();
            if feature_id.is_empty() {
                warn!(
                    "{}: data row {} has an empty feature id, skipping",
                    path.display(),
                    row_idx
                );
                continue;
            }
            if index.contains_key(&feature_id) {
                warn!(
                    "duplicate feature id '{}' in {}, keeping the first occurrence",
                    feature_id,
                    path.display()
                );
                continue;
            }

            let annotation = if has_annotation {
                fields.get(1).map(|s| s.trim().to_string()).unwrap_or_default()
            } else {
                String::new()
            };

            let mut row = Vec::with_capacity(n_samples);
            for col in 0..n_samples {
                let value = match fields.get(first_value_col + col) {
                    None => f64::NAN,
                    Some(raw) => {
                        let trimmed = raw.trim();
                        if MISSING_MARKERS.contains(&trimmed.to_ascii_lowercase().as_str()) {
                            f64::NAN
                        } else {
                            trimmed.parse::<f64>().map_err(|_| {
                                ProtdiffError::InvalidMeasurement {
                                    value: trimmed.to_string(),
                                    row: row_idx,
                                    col,
                                }
                            })?
                        }
                    }
                };
                row.push(value);
            }

            index.insert(feature_id.clone(), feature_ids.len());
            feature_ids.push(feature_id);
            annotations.push(annotation);
            values.push(row);
        }

        if feature_ids.is_empty() {
            return Err(ProtdiffError::EmptyData(format!(
                "no features in {}",
                path.display()
            )));
        }

        Ok(Self {
            label: condition_label(path),
            feature_ids,
            annotations,
            values,
            sample_labels,
            index,
        })
    }

    /// Condition label this table was loaded under.
    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of features (rows).
    #[inline]
    pub fn n_features(&self) -> usize {
        self.feature_ids.len()
    }

    /// Number of replicate columns.
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.sample_labels.len()
    }

    /// Feature identifiers.
    #[inline]
    pub fn feature_ids(&self) -> &[String] {
        &self.feature_ids
    }

    /// Replicate column headers.
    #[inline]
    pub fn sample_labels(&self) -> &[String] {
        &self.sample_labels
    }

    /// Annotation for a feature row (empty string when absent).
    #[inline]
    pub fn annotation(&self, row: usize) -> &str {
        &self.annotations[row]
    }

    /// Measurements for a feature row.
    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        &self.values[row]
    }

    /// Row index for a feature id.
    #[inline]
    pub fn row_index(&self, feature_id: &str) -> Option<usize> {
        self.index.get(feature_id).copied()
    }

    /// Measurements for a feature id.
    pub fn get(&self, feature_id: &str) -> Option<&[f64]> {
        self.row_index(feature_id).map(|i| self.values[i].as_slice())
    }

    /// Whether a feature id is present.
    #[inline]
    pub fn contains(&self, feature_id: &str) -> bool {
        self.index.contains_key(feature_id)
    }
}

/// Derive a condition label from a table's file name.
///
/// Strips the extension and the `annotated` / `formatted` naming suffix:
/// `A_annotated.txt` → `A`. Falls back to the bare stem when no suffix
/// matches.
pub fn condition_label(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("table");
    for suffix in ["_annotated", "annotated", "_formatted", "formatted"] {
        if let Some(prefix) = stem.strip_suffix(suffix) {
            let trimmed = prefix.trim_end_matches('_');
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }
    stem.to_string()
}
