//! Significant-feature listing.

use super::{ResultTable, LOG2_FC_CUTOFF, NEG_LOG10_P_CUTOFF};
use crate::error::Result;
use log::info;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Category a significant feature is listed under.
///
/// Categories overlap: an exclusive detection with a strong fold change
/// is listed both as exclusive and as over-/underexpressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignificantCategory {
    ExclusiveOverexpressed,
    ExclusiveUnderexpressed,
    Overexpressed,
    Underexpressed,
}

impl SignificantCategory {
    pub fn name(&self) -> &'static str {
        match self {
            SignificantCategory::ExclusiveOverexpressed => "exclusive_overexpressed",
            SignificantCategory::ExclusiveUnderexpressed => "exclusive_underexpressed",
            SignificantCategory::Overexpressed => "overexpressed",
            SignificantCategory::Underexpressed => "underexpressed",
        }
    }
}

/// One listed feature with the category it matched.
#[derive(Debug, Clone)]
pub struct SignificantEntry {
    pub category: SignificantCategory,
    pub feature_id: String,
    pub annotation: String,
    pub log2_fold_change: f64,
    pub neg_log10_corrected_p: f64,
}

/// Collect the significant features of a result table.
///
/// Only rows past the significance gate are considered; each emits one
/// entry per matching category, exclusive categories first.
pub fn significant_entries(table: &ResultTable) -> Vec<SignificantEntry> {
    let mut entries = Vec::new();
    for row in table.rows() {
        if !(row.neg_log10_corrected_p > NEG_LOG10_P_CUTOFF) {
            continue;
        }
        let mut categories = Vec::new();
        if row.is_exclusive() && row.log2_fold_change > 0.0 {
            categories.push(SignificantCategory::ExclusiveOverexpressed);
        }
        if row.is_exclusive() && row.log2_fold_change < 0.0 {
            categories.push(SignificantCategory::ExclusiveUnderexpressed);
        }
        if row.log2_fold_change > LOG2_FC_CUTOFF {
            categories.push(SignificantCategory::Overexpressed);
        }
        if row.log2_fold_change < -LOG2_FC_CUTOFF {
            categories.push(SignificantCategory::Underexpressed);
        }
        for category in categories {
            entries.push(SignificantEntry {
                category,
                feature_id: row.feature_id.clone(),
                annotation: row.annotation.clone(),
                log2_fold_change: row.log2_fold_change,
                neg_log10_corrected_p: row.neg_log10_corrected_p,
            });
        }
    }
    entries
}

/// List the significant features of a result file as TSV.
///
/// The output lands in `output_dir` as `<stem>_significant.txt` and its
/// path is returned.
pub fn write_significant_lists<P: AsRef<Path>, Q: AsRef<Path>>(
    result_path: P,
    output_dir: Q,
) -> Result<PathBuf> {
    let table = ResultTable::from_tsv(result_path.as_ref())?;
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    let entries = significant_entries(&table);
    let output = output_dir.join(format!("{}_significant.txt", table.stem()));
    let mut writer = BufWriter::new(File::create(&output)?);
    writeln!(
        writer,
        "category\tfeature_id\tannotation\tlog2_fold_change\tneg_log10_corrected_p"
    )?;
    for entry in &entries {
        writeln!(
            writer,
            "{}\t{}\t{}\t{:.6}\t{:.4}",
            entry.category.name(),
            entry.feature_id,
            entry.annotation,
            entry.log2_fold_change,
            entry.neg_log10_corrected_p,
        )?;
    }
    writer.flush()?;

    info!(
        "significant features: {} entries from {} rows -> {}",
        entries.len(),
        table.len(),
        output.display()
    );
    Ok(output)
}
