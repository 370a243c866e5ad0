//! ksdrift CLI Module
//!
//! Command-line front end: run a drift test between two CSV files, or
//! inspect a data file.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use crate::drift::{DetectorConfig, DriftType, KSDrift, PredictionResult};
use crate::stats::{Alternative, Correction, KsMode};
use crate::utils::DataLoader;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }
fn alert(s: &str) -> ColoredString  { s.truecolor(240, 110, 100) }

fn step_run(msg: &str) {
    eprint!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    eprintln!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn kv(key: &str, val: &str) {
    println!("  {:<18} {}", muted(key), val.white());
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "ksdrift")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Feature-wise Kolmogorov-Smirnov drift detection")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Test a batch for drift against a reference file
    Detect {
        /// Reference data (CSV)
        #[arg(short, long)]
        reference: PathBuf,

        /// Test batch (CSV)
        #[arg(short, long)]
        test: PathBuf,

        /// Columns to test (default: all)
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,

        /// Detector configuration (JSON); flags below override it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Significance threshold
        #[arg(long)]
        p_val: Option<f64>,

        /// Correction for batch verdicts (bonferroni, fdr)
        #[arg(long)]
        correction: Option<String>,

        /// Alternative hypothesis (two-sided, less, greater)
        #[arg(long)]
        alternative: Option<String>,

        /// P-value computation (auto, exact, asymptotic)
        #[arg(long)]
        mode: Option<String>,

        /// Verdict level (batch, feature)
        #[arg(long, default_value = "batch")]
        drift_type: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show shape and columns of a data file
    Info {
        /// Data file (CSV)
        #[arg(short, long)]
        data: PathBuf,
    },
}

/// Merge the optional config file with command-line overrides
pub fn build_config(
    config_path: Option<&PathBuf>,
    p_val: Option<f64>,
    correction: Option<&str>,
    alternative: Option<&str>,
    mode: Option<&str>,
) -> anyhow::Result<DetectorConfig> {
    let mut config = match config_path {
        Some(path) => DetectorConfig::from_json_file(path)?,
        None => DetectorConfig::default(),
    };
    if let Some(p) = p_val {
        config = config.with_p_val(p);
    }
    if let Some(c) = correction {
        config = config.with_correction(c.parse::<Correction>()?);
    }
    if let Some(a) = alternative {
        config = config.with_alternative(a.parse::<Alternative>()?);
    }
    if let Some(m) = mode {
        config = config.with_mode(m.parse::<KsMode>()?);
    }
    config.validate()?;
    Ok(config)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub fn cmd_detect(
    reference_path: &PathBuf,
    test_path: &PathBuf,
    columns: Option<&[String]>,
    config_path: Option<&PathBuf>,
    p_val: Option<f64>,
    correction: Option<&str>,
    alternative: Option<&str>,
    mode: Option<&str>,
    drift_type: &str,
    json: bool,
) -> anyhow::Result<PredictionResult> {
    let drift_type: DriftType = drift_type.parse()?;
    let mut config = build_config(config_path, p_val, correction, alternative, mode)?;

    let loader = DataLoader::new();

    step_run("Loading reference");
    let start = Instant::now();
    let reference = loader.load_matrix(reference_path, columns)?;
    step_done(&format!(
        "{} rows × {} cols in {:?}",
        reference.data.nrows(),
        reference.data.ncols(),
        start.elapsed()
    ));

    step_run("Loading test batch");
    let test = loader.load_matrix(test_path, Some(reference.columns.as_slice()))?;
    step_done(&format!("{} rows", test.data.nrows()));

    if config.feature_names.is_none() {
        config = config.with_feature_names(reference.columns.clone());
    }

    step_run("Running KS tests");
    let start = Instant::now();
    let mut detector = KSDrift::new(reference.data, config)?;
    let result = detector.predict(test.data.view(), drift_type, true, true)?;
    step_done(&format!("{:?}", start.elapsed()));

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    Ok(result)
}

fn print_result(result: &PredictionResult) {
    section("Drift");
    kv("Alternative", &result.meta.alternative.to_string());
    kv("Correction", &result.meta.correction.to_string());
    kv("Drift type", &result.data.drift_type.to_string());
    kv("Threshold", &format!("{:.6}", result.data.threshold));

    let verdict = if result.is_drift() {
        alert("drift detected").bold()
    } else {
        ok("no drift").bold()
    };
    println!("  {:<18} {}", muted("Verdict"), verdict);

    let drifted = result.drifted_features();
    if let (Some(p_vals), Some(distances)) = (&result.data.p_val, &result.data.distance) {
        section("Features");
        let names = result.feature_names.clone().unwrap_or_default();
        for (i, (p, d)) in p_vals.iter().zip(distances).enumerate() {
            let name = names.get(i).cloned().unwrap_or_else(|| format!("feature_{}", i));
            let marker = if drifted.contains(&i) { alert("●") } else { dim("○") };
            println!(
                "  {} {:<24} {} {}",
                marker,
                name,
                muted(&format!("p={:.4e}", p)),
                muted(&format!("distance={:.4}", d)),
            );
        }
    }
    println!();
}

pub fn cmd_info(data_path: &PathBuf) -> anyhow::Result<()> {
    section("Info");

    let df = DataLoader::new().load_csv(data_path)?;
    kv("File", &data_path.display().to_string());
    kv("Rows", &df.height().to_string());
    kv("Columns", &df.width().to_string());

    section("Schema");
    for column in df.get_columns() {
        println!(
            "  {:<24} {}",
            column.name().to_string(),
            muted(&column.dtype().to_string())
        );
    }
    println!();
    Ok(())
}
