//! protdiff - Pairwise Differential Abundance Testing CLI
//!
//! Command-line interface for comparing annotated protein abundance
//! tables in all pairwise combinations.

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use protdiff::annotate::{annotate_directory, AnnotationMap};
use protdiff::compare::compare_tables;
use protdiff::correct::Correction;
use protdiff::data::AbundanceTable;
use protdiff::discover::PairOrder;
use protdiff::error::{ProtdiffError, Result};
use protdiff::pipeline::{run_pairwise, RunConfig};
use protdiff::report::{write_significant_lists, write_volcano_points};
use protdiff::test::TestKind;
use std::path::PathBuf;

/// CLI-friendly pair enumeration order
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliPairOrder {
    /// Each unordered pair once (A vs B)
    Unordered,
    /// Both orientations of every pair (A vs B and B vs A)
    Mirrored,
}

impl From<CliPairOrder> for PairOrder {
    fn from(order: CliPairOrder) -> Self {
        match order {
            CliPairOrder::Unordered => PairOrder::Unordered,
            CliPairOrder::Mirrored => PairOrder::Mirrored,
        }
    }
}

/// Pairwise Differential Abundance Testing
#[derive(Parser)]
#[command(name = "protdiff")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare every pair of annotated tables in a directory
    Run {
        /// Directory containing *_annotated.txt tables
        directory: PathBuf,

        /// Output directory for result tables and reports
        #[arg(short, long, default_value = "results")]
        output_dir: PathBuf,

        /// Test to apply: t-test, welch, or mann-whitney
        #[arg(short, long, default_value = "t-test")]
        test: String,

        /// Correction method: none, bonferroni, holm, sidak, fdr_bh, or fdr_by
        #[arg(short, long, default_value = "none")]
        correction: String,

        /// Significance level for the corrected p-values
        #[arg(short, long, default_value = "0.05")]
        alpha: f64,

        /// Pair enumeration order
        #[arg(long, value_enum, default_value = "unordered")]
        pair_order: CliPairOrder,

        /// YAML run configuration (overrides the statistical flags)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Skip the volcano and significant-feature reports
        #[arg(long)]
        no_reports: bool,
    },

    /// Compare two annotated tables
    Compare {
        /// First abundance table
        file_a: PathBuf,

        /// Second abundance table
        file_b: PathBuf,

        /// Output directory for the result table
        #[arg(short, long, default_value = "results")]
        output_dir: PathBuf,

        /// Test to apply: t-test, welch, or mann-whitney
        #[arg(short, long, default_value = "t-test")]
        test: String,

        /// Correction method: none, bonferroni, holm, sidak, fdr_bh, or fdr_by
        #[arg(short, long, default_value = "none")]
        correction: String,

        /// Significance level for the corrected p-values
        #[arg(short, long, default_value = "0.05")]
        alpha: f64,
    },

    /// Fill the annotation column of *_formatted.txt tables from a lookup file
    Annotate {
        /// Two-column lookup TSV (feature id, annotation)
        lookup: PathBuf,

        /// Directory containing *_formatted.txt tables
        directory: PathBuf,
    },

    /// Classify the points of a result table for a volcano plot
    Volcano {
        /// Result table written by run or compare
        result_file: PathBuf,

        /// Output directory
        #[arg(default_value = "results")]
        output_dir: PathBuf,
    },

    /// List the significant features of a result table
    Significant {
        /// Result table written by run or compare
        result_file: PathBuf,

        /// Output directory
        #[arg(default_value = "results")]
        output_dir: PathBuf,
    },

    /// Generate an example run configuration
    Example {
        /// Output path for the example YAML
        #[arg(short, long, default_value = "run.yaml")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Commands::Run {
            directory,
            output_dir,
            test,
            correction,
            alpha,
            pair_order,
            config,
            no_reports,
        } => cmd_run(
            &directory,
            &output_dir,
            &test,
            &correction,
            alpha,
            pair_order,
            config.as_ref(),
            no_reports,
        ),

        Commands::Compare {
            file_a,
            file_b,
            output_dir,
            test,
            correction,
            alpha,
        } => cmd_compare(&file_a, &file_b, &output_dir, &test, &correction, alpha),

        Commands::Annotate { lookup, directory } => cmd_annotate(&lookup, &directory),

        Commands::Volcano {
            result_file,
            output_dir,
        } => cmd_volcano(&result_file, &output_dir),

        Commands::Significant {
            result_file,
            output_dir,
        } => cmd_significant(&result_file, &output_dir),

        Commands::Example { output } => cmd_example(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_run(
    directory: &PathBuf,
    output_dir: &PathBuf,
    test: &str,
    correction: &str,
    alpha: f64,
    pair_order: CliPairOrder,
    config_path: Option<&PathBuf>,
    no_reports: bool,
) -> Result<()> {
    // Parse the statistical options before touching the filesystem so
    // a typo fails loudly instead of after a long run.
    let mut config = match config_path {
        Some(path) => {
            eprintln!("Loading run configuration from {:?}...", path);
            RunConfig::load(path)?
        }
        None => RunConfig {
            test: test.parse()?,
            correction: correction.parse()?,
            alpha,
            pair_order: pair_order.into(),
            reports: true,
        },
    };
    if no_reports {
        config.reports = false;
    }

    eprintln!(
        "Comparing annotated tables in {:?} ({}, {})...",
        directory,
        config.test.name(),
        config.correction.name()
    );
    let summary = run_pairwise(directory, output_dir, &config)?;

    eprintln!("Done! {} pairs compared", summary.n_pairs);
    eprintln!("{}", summary);
    Ok(())
}

fn cmd_compare(
    file_a: &PathBuf,
    file_b: &PathBuf,
    output_dir: &PathBuf,
    test: &str,
    correction: &str,
    alpha: f64,
) -> Result<()> {
    let test: TestKind = test.parse()?;
    let correction: Correction = correction.parse()?;
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(ProtdiffError::InvalidParameter(format!(
            "alpha must be in (0, 1), got {}",
            alpha
        )));
    }

    eprintln!("Loading tables...");
    let a = AbundanceTable::from_tsv(file_a)?;
    let b = AbundanceTable::from_tsv(file_b)?;
    eprintln!(
        "  {}: {} features x {} samples, {}: {} features x {} samples",
        a.label(),
        a.n_features(),
        a.n_samples(),
        b.label(),
        b.n_features(),
        b.n_samples()
    );

    let comparison = compare_tables(&a, &b, test)?;
    let corrected = correction.apply(&comparison.p_values());
    let set = comparison.into_result_set(&corrected, test, correction, alpha);

    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!("{}.txt", set.file_stem()));
    set.to_tsv(&path)?;

    eprintln!("Done! {} features tested", set.len());
    eprintln!("{}", set.summary());
    eprintln!("Wrote {:?}", path);
    Ok(())
}

fn cmd_annotate(lookup: &PathBuf, directory: &PathBuf) -> Result<()> {
    eprintln!("Loading lookup from {:?}...", lookup);
    let map = AnnotationMap::from_tsv(lookup)?;
    eprintln!("  {} entries", map.len());

    let outputs = annotate_directory(directory, &map)?;
    eprintln!("Done! {} tables annotated", outputs.len());
    Ok(())
}

fn cmd_volcano(result_file: &PathBuf, output_dir: &PathBuf) -> Result<()> {
    let output = write_volcano_points(result_file, output_dir)?;
    eprintln!("Wrote {:?}", output);
    Ok(())
}

fn cmd_significant(result_file: &PathBuf, output_dir: &PathBuf) -> Result<()> {
    let output = write_significant_lists(result_file, output_dir)?;
    eprintln!("Wrote {:?}", output);
    Ok(())
}

fn cmd_example(output_path: &PathBuf) -> Result<()> {
    let config = RunConfig::default();
    let yaml = config.to_yaml()?;

    std::fs::write(output_path, &yaml)?;
    eprintln!("Wrote example run configuration to {:?}", output_path);
    eprintln!();
    eprintln!("Contents:");
    println!("{}", yaml);

    Ok(())
}
