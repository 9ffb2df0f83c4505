//! Volcano-point classification.

use super::{ResultRow, ResultTable, LOG2_FC_CUTOFF, LOG2_FC_LIMIT, NEG_LOG10_P_CUTOFF};
use crate::error::Result;
use log::info;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Volcano-plot class of a result row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolcanoClass {
    /// Detected in only one condition.
    Exclusive,
    /// Significant and overexpressed in the first condition.
    Up,
    /// Significant and underexpressed in the first condition.
    Down,
    /// Everything else.
    NotSignificant,
}

impl VolcanoClass {
    /// Classify a row. Exclusive detection wins over the thresholds.
    pub fn classify(row: &ResultRow) -> Self {
        if row.is_exclusive() {
            VolcanoClass::Exclusive
        } else if row.neg_log10_corrected_p > NEG_LOG10_P_CUTOFF
            && row.log2_fold_change > LOG2_FC_CUTOFF
        {
            VolcanoClass::Up
        } else if row.neg_log10_corrected_p > NEG_LOG10_P_CUTOFF
            && row.log2_fold_change < -LOG2_FC_CUTOFF
        {
            VolcanoClass::Down
        } else {
            VolcanoClass::NotSignificant
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            VolcanoClass::Exclusive => "exclusive",
            VolcanoClass::Up => "up",
            VolcanoClass::Down => "down",
            VolcanoClass::NotSignificant => "not_significant",
        }
    }

    /// Plot colour conventionally attached to the class.
    pub fn color(&self) -> &'static str {
        match self {
            VolcanoClass::Exclusive => "#006400",
            VolcanoClass::Up => "#FFA500",
            VolcanoClass::Down => "#3f65d4",
            VolcanoClass::NotSignificant => "rgba(150,150,150,0.5)",
        }
    }
}

/// Classify the points of a result file and write them as TSV.
///
/// Rows whose fold change is NaN or beyond [`LOG2_FC_LIMIT`] in
/// magnitude are dropped so the axis stays readable. The output lands
/// in `output_dir` as `volcano_<stem>.txt` and its path is returned.
pub fn write_volcano_points<P: AsRef<Path>, Q: AsRef<Path>>(
    result_path: P,
    output_dir: Q,
) -> Result<PathBuf> {
    let table = ResultTable::from_tsv(result_path.as_ref())?;
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    let output = output_dir.join(format!("volcano_{}.txt", table.stem()));
    let mut writer = BufWriter::new(File::create(&output)?);
    writeln!(
        writer,
        "feature_id\tannotation\tpresence\tlog2_fold_change\tneg_log10_corrected_p\tclass\tcolor"
    )?;

    let mut n_written = 0;
    for row in table.rows() {
        if !(row.log2_fold_change.abs() <= LOG2_FC_LIMIT) {
            continue;
        }
        let class = VolcanoClass::classify(row);
        writeln!(
            writer,
            "{}\t{}\t{}\t{:.6}\t{:.4}\t{}\t{}",
            row.feature_id,
            row.annotation,
            row.presence,
            row.log2_fold_change,
            row.neg_log10_corrected_p,
            class.name(),
            class.color(),
        )?;
        n_written += 1;
    }
    writer.flush()?;

    info!(
        "volcano points: {} of {} rows -> {}",
        n_written,
        table.len(),
        output.display()
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::super::tests::write_result_file;
    use super::*;
    use std::fs;

    fn row(id: &str, presence: &str, fc: &str, neg: &str) -> String {
        format!(
            "{id}\tprotein\t{presence}\t1.0\t1.0\t0.1\t0.1\t{fc}\t1.0\t1.0e-3\t1.0e-3\t{neg}\ttrue\n"
        )
    }

    #[test]
    fn test_classification() {
        let make = |presence: &str, fc: f64, neg: f64| ResultRow {
            feature_id: "P".to_string(),
            annotation: String::new(),
            presence: presence.to_string(),
            log2_fold_change: fc,
            neg_log10_corrected_p: neg,
        };

        assert_eq!(
            VolcanoClass::classify(&make("Only_A", 10.0, 5.0)),
            VolcanoClass::Exclusive
        );
        assert_eq!(
            VolcanoClass::classify(&make("Both", 3.0, 4.0)),
            VolcanoClass::Up
        );
        assert_eq!(
            VolcanoClass::classify(&make("Both", -3.0, 4.0)),
            VolcanoClass::Down
        );
        // Strong fold change but weak significance.
        assert_eq!(
            VolcanoClass::classify(&make("Both", 3.0, 1.0)),
            VolcanoClass::NotSignificant
        );
        // Significant but inside the fold-change window.
        assert_eq!(
            VolcanoClass::classify(&make("Both", 1.0, 4.0)),
            VolcanoClass::NotSignificant
        );
    }

    #[test]
    fn test_colors() {
        assert_eq!(VolcanoClass::Exclusive.color(), "#006400");
        assert_eq!(VolcanoClass::Up.color(), "#FFA500");
        assert_eq!(VolcanoClass::Down.color(), "#3f65d4");
        assert_eq!(VolcanoClass::NotSignificant.color(), "rgba(150,150,150,0.5)");
    }

    #[test]
    fn test_write_filters_extreme_fold_changes() {
        let dir = tempfile::tempdir().unwrap();
        let body = row("P001", "Both", "3.000000", "4.0")
            + &row("P002", "Only_A", "46.5", "inf")
            + &row("P003", "Both", "-14.9", "4.0")
            + &row("P004", "Both", "NaN", "1.0");
        let result = write_result_file(dir.path(), "A_vs_B_t-test_none.txt", &body);

        let out_dir = dir.path().join("reports");
        let output = write_volcano_points(&result, &out_dir).unwrap();
        assert!(output.ends_with("volcano_A_vs_B_t-test_none.txt"));

        let content = fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        // Header plus P001 and P003; the exclusive and NaN rows fall out.
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("P001\t"));
        assert!(lines[1].ends_with("up\t#FFA500"));
        assert!(lines[2].starts_with("P003\t"));
        assert!(lines[2].contains("\tdown\t"));
    }

    #[test]
    fn test_output_dir_created() {
        let dir = tempfile::tempdir().unwrap();
        let result = write_result_file(
            dir.path(),
            "A_vs_B_welch_holm.txt",
            &row("P001", "Both", "0.5", "0.2"),
        );

        let nested = dir.path().join("x").join("y");
        let output = write_volcano_points(&result, &nested).unwrap();
        assert!(output.exists());
    }
}
