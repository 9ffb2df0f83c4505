//! Directory-level pairwise run: discover, compare, correct, write.

use crate::compare::compare_tables;
use crate::correct::Correction;
use crate::data::AbundanceTable;
use crate::discover::{annotated_tables, pair_indices, PairOrder};
use crate::error::{ProtdiffError, Result};
use crate::report::{write_significant_lists, write_volcano_points};
use crate::test::TestKind;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Configuration of a pairwise run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Two-sample test applied per feature.
    pub test: TestKind,
    /// Multiple-testing correction applied per pair.
    pub correction: Correction,
    /// Significance level for the corrected p-values.
    pub alpha: f64,
    /// Pair enumeration order.
    pub pair_order: PairOrder,
    /// Whether to derive volcano and significant-feature reports from
    /// each written result file.
    pub reports: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            test: TestKind::Student,
            correction: Correction::None,
            alpha: 0.05,
            pair_order: PairOrder::Unordered,
            reports: true,
        }
    }
}

impl RunConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(ProtdiffError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(ProtdiffError::from)
    }

    /// Load from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(ProtdiffError::InvalidParameter(format!(
                "alpha must be in (0, 1), got {}",
                self.alpha
            )));
        }
        Ok(())
    }
}

/// Aggregate counts and outputs of one pairwise run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Annotated tables discovered in the input directory.
    pub n_tables: usize,
    /// Condition pairs compared.
    pub n_pairs: usize,
    /// Feature tests run across all pairs.
    pub n_features_tested: usize,
    /// Shared features skipped for missing replicates.
    pub n_skipped_insufficient: usize,
    /// Shared features skipped for being all-zero on both sides.
    pub n_skipped_all_zero: usize,
    /// Significant calls across all pairs.
    pub n_significant: usize,
    /// Files written, result tables first per pair.
    pub outputs: Vec<PathBuf>,
}

impl RunSummary {
    fn new(n_tables: usize, n_pairs: usize) -> Self {
        Self {
            n_tables,
            n_pairs,
            n_features_tested: 0,
            n_skipped_insufficient: 0,
            n_skipped_all_zero: 0,
            n_significant: 0,
            outputs: Vec::new(),
        }
    }

    /// Write the summary as pretty-printed JSON.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pairwise run summary")?;
        writeln!(f, "  Tables discovered:    {}", self.n_tables)?;
        writeln!(f, "  Pairs compared:       {}", self.n_pairs)?;
        writeln!(f, "  Features tested:      {}", self.n_features_tested)?;
        writeln!(f, "  Skipped (replicates): {}", self.n_skipped_insufficient)?;
        writeln!(f, "  Skipped (all zero):   {}", self.n_skipped_all_zero)?;
        writeln!(f, "  Significant calls:    {}", self.n_significant)?;
        write!(f, "  Files written:        {}", self.outputs.len())
    }
}

/// Run every condition pair of a directory of annotated tables.
///
/// Tables are loaded once and reused across pairs. Each pair produces
/// one result file in `output_dir` (plus the two derived reports when
/// enabled); a `run_summary.json` is written at the end. Fewer than two
/// discovered tables is a warning, not an error. Any pair failure
/// aborts the run.
pub fn run_pairwise<P: AsRef<Path>, Q: AsRef<Path>>(
    input_dir: P,
    output_dir: Q,
    config: &RunConfig,
) -> Result<RunSummary> {
    config.validate()?;
    let output_dir = output_dir.as_ref();

    // Discovery errors (missing directory) surface before anything is
    // written.
    let table_paths = annotated_tables(input_dir.as_ref())?;
    let n_tables = table_paths.len();
    if n_tables < 2 {
        warn!(
            "found {} annotated table(s) in {}, nothing to compare",
            n_tables,
            input_dir.as_ref().display()
        );
    }

    let mut tables = Vec::with_capacity(n_tables);
    for path in &table_paths {
        let table = AbundanceTable::from_tsv(path)?;
        info!(
            "loaded {} ({} features, {} samples)",
            table.label(),
            table.n_features(),
            table.n_samples()
        );
        tables.push(table);
    }

    let pairs = pair_indices(n_tables, config.pair_order);
    fs::create_dir_all(output_dir)?;
    let mut summary = RunSummary::new(n_tables, pairs.len());

    for (k, &(i, j)) in pairs.iter().enumerate() {
        let a = &tables[i];
        let b = &tables[j];
        info!(
            "[{}/{}] comparing {} vs {}",
            k + 1,
            pairs.len(),
            a.label(),
            b.label()
        );

        let comparison = compare_tables(a, b, config.test)?;
        summary.n_features_tested += comparison.len();
        summary.n_skipped_insufficient += comparison.n_skipped_insufficient;
        summary.n_skipped_all_zero += comparison.n_skipped_all_zero;

        let corrected = config.correction.apply(&comparison.p_values());
        let set = comparison.into_result_set(&corrected, config.test, config.correction, config.alpha);
        let pair_summary = set.summary();
        summary.n_significant += pair_summary.n_significant;

        let result_path = output_dir.join(format!("{}.txt", set.file_stem()));
        set.to_tsv(&result_path)?;
        info!(
            "wrote {} ({} features, {} significant)",
            result_path.display(),
            pair_summary.n_features,
            pair_summary.n_significant
        );
        summary.outputs.push(result_path.clone());

        if config.reports {
            summary.outputs.push(write_volcano_points(&result_path, output_dir)?);
            summary.outputs.push(write_significant_lists(&result_path, output_dir)?);
        }
    }

    summary.write_json(output_dir.join("run_summary.json"))?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_yaml_round_trip() {
        let config = RunConfig {
            test: TestKind::Welch,
            correction: Correction::FdrBh,
            alpha: 0.01,
            pair_order: PairOrder::Mirrored,
            reports: false,
        };
        let yaml = config.to_yaml().unwrap();
        let parsed = RunConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = RunConfig::from_yaml("test: mann-whitney\ncorrection: holm\n").unwrap();
        assert_eq!(config.test, TestKind::MannWhitney);
        assert_eq!(config.correction, Correction::Holm);
        assert_eq!(config.alpha, 0.05);
        assert_eq!(config.pair_order, PairOrder::Unordered);
        assert!(config.reports);
    }

    #[test]
    fn test_unknown_yaml_value_is_error() {
        assert!(RunConfig::from_yaml("test: anova\n").is_err());
    }

    #[test]
    fn test_alpha_validation() {
        let mut config = RunConfig::default();
        config.alpha = 0.0;
        let dir = tempfile::tempdir().unwrap();
        assert!(run_pairwise(dir.path(), dir.path().join("out"), &config).is_err());
        config.alpha = 1.5;
        assert!(run_pairwise(dir.path(), dir.path().join("out"), &config).is_err());
    }

    #[test]
    fn test_run_with_too_few_tables() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("results");
        let summary = run_pairwise(dir.path(), &out, &RunConfig::default()).unwrap();
        assert_eq!(summary.n_tables, 0);
        assert_eq!(summary.n_pairs, 0);
        assert!(out.join("run_summary.json").exists());
    }

    #[test]
    fn test_summary_display() {
        let summary = RunSummary::new(3, 3);
        let text = format!("{summary}");
        assert!(text.contains("Tables discovered:    3"));
        assert!(text.contains("Files written:        0"));
    }
}
