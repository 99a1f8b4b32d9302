//! Command-line interface
//!
//! Argument parsing plus the `run` command that drives the whole
//! benchmark: ingest, preprocess, split, evaluate both task catalogues
//! and export the report.

use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::BenchConfig;
use crate::error::Result;
use crate::evaluation::{select_classifiers, select_regressors, EvaluationHarness};
use crate::ingest::DataIngestor;
use crate::preprocessing::Preprocessor;
use crate::report::{export_report, ResultsReport};
use crate::split::split_tasks;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString {
    s.truecolor(100, 100, 100)
}

fn accent(s: &str) -> ColoredString {
    s.truecolor(120, 170, 255)
}

fn ok(s: &str) -> ColoredString {
    s.truecolor(100, 210, 120)
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn header(title: &str) {
    println!();
    println!("  {}", accent(title));
    println!("  {}", dim(&"─".repeat(title.len().max(24))));
}

// ─── Arguments ─────────────────────────────────────────────────────────────────

/// Delivery-delay model benchmark
#[derive(Parser, Debug)]
#[command(name = "delaybench", version, about = "Benchmark a catalogue of models on a delivery-orders dataset")]
pub struct Cli {
    /// Input CSV file
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Output JSON file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// JSON configuration file; CLI flags override its fields
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Random seed for splitting and every stochastic model
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fraction of rows held out for testing
    #[arg(long)]
    pub test_fraction: Option<f64>,

    /// Restrict the classifier roster, comma separated
    #[arg(long, value_delimiter = ',')]
    pub classifiers: Vec<String>,

    /// Restrict the regressor roster, comma separated
    #[arg(long, value_delimiter = ',')]
    pub regressors: Vec<String>,
}

impl Cli {
    /// Resolve the effective configuration: file values first, then CLI
    /// overrides on top
    pub fn into_config(self) -> Result<BenchConfig> {
        let mut config = match &self.config {
            Some(path) => BenchConfig::from_file(path)?,
            None => BenchConfig::default(),
        };
        if let Some(data) = self.data {
            config.input = data;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(fraction) = self.test_fraction {
            config.test_fraction = fraction;
        }
        if !self.classifiers.is_empty() {
            config.classifiers = self.classifiers;
        }
        if !self.regressors.is_empty() {
            config.regressors = self.regressors;
        }
        config.validate()?;
        Ok(config)
    }
}

// ─── Run command ───────────────────────────────────────────────────────────────

/// Execute the full benchmark described by `config`
pub fn cmd_run(config: &BenchConfig) -> Result<ResultsReport> {
    let started = Instant::now();
    header("Delivery delay benchmark");
    println!("  {} {}", dim("input"), config.input.display());
    println!("  {} {}", dim("output"), config.output.display());
    println!(
        "  {} seed={} test_fraction={}",
        dim("params"),
        config.seed,
        config.test_fraction
    );

    // Roster lookup happens before any heavy work so a typo in a model
    // name fails immediately
    let classifiers = select_classifiers(&config.classifiers)?;
    let regressors = select_regressors(&config.regressors)?;

    let ingestor = DataIngestor::new();
    let df = ingestor.load(&config.input)?;
    ingestor.missing_columns(&df, &config.columns);
    step_ok(&format!("loaded {} rows, {} columns", df.height(), df.width()));

    let preprocessor = Preprocessor::new(config.columns.clone(), config.seed);
    let prepared = preprocessor.run(&df)?;
    step_ok(&format!(
        "prepared {} features: {}",
        prepared.feature_names.len(),
        prepared.feature_names.join(", ")
    ));

    let split = split_tasks(
        &prepared.features,
        &prepared.class_target,
        &prepared.reg_target,
        config.test_fraction,
        config.seed,
    )?;
    step_ok(&format!(
        "split {} train / {} test",
        split.n_train(),
        split.n_test()
    ));

    let harness = EvaluationHarness::new(config.seed);
    let classification = harness.run_classification(&classifiers, &split);
    step_ok(&format!(
        "classification: {}/{} models scored",
        classification.len(),
        classifiers.len()
    ));
    let regression = harness.run_regression(&regressors, &split);
    step_ok(&format!(
        "regression: {}/{} models scored",
        regression.len(),
        regressors.len()
    ));

    for result in &classification {
        let marker = if result.is_best { ok("★") } else { dim(" ") };
        println!(
            "    {} {:<22} acc={:<7} f1={:<7} auc={}",
            marker, result.model, result.accuracy, result.f1, result.auc
        );
    }
    for result in &regression {
        let marker = if result.is_best { ok("★") } else { dim(" ") };
        println!(
            "    {} {:<22} r2={:<8} mae={:<8} rmse={}",
            marker, result.model, result.r2, result.mae, result.rmse
        );
    }

    let report = ResultsReport {
        classification,
        regression,
        synthetic_classification_target: prepared.synthetic_class_target,
        synthetic_regression_target: prepared.synthetic_reg_target,
    };
    export_report(&report, &config.output)?;
    step_ok(&format!(
        "report written to {} in {:.2}s",
        config.output.display(),
        started.elapsed().as_secs_f64()
    ));

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_take_precedence() {
        let cli = Cli {
            data: Some(PathBuf::from("orders.csv")),
            output: Some(PathBuf::from("out.json")),
            config: None,
            seed: Some(7),
            test_fraction: Some(0.3),
            classifiers: vec!["KNN".to_string()],
            regressors: Vec::new(),
        };
        let config = cli.into_config().unwrap();
        assert_eq!(config.seed, 7);
        assert!((config.test_fraction - 0.3).abs() < 1e-12);
        assert_eq!(config.classifiers, vec!["KNN".to_string()]);
        assert_eq!(config.regressors.len(), 8);
    }

    #[test]
    fn test_missing_input_rejected() {
        let cli = Cli {
            data: None,
            output: None,
            config: None,
            seed: None,
            test_fraction: None,
            classifiers: Vec::new(),
            regressors: Vec::new(),
        };
        assert!(cli.into_config().is_err());
    }
}
