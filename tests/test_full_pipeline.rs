//! End-to-end run: CSV on disk in, JSON report out

use delaybench::cli::cmd_run;
use delaybench::config::BenchConfig;
use delaybench::report::load_report;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// 500 delivery orders with a learnable delay pattern and some holes
fn write_orders_csv(path: &Path) {
    let mut csv = String::from(
        "order_id,date_commande,date_expedition,date_livraison,transporteur,region,montant,quantite,retard,delai_livraison,ecart_delai,delai_prevu\n",
    );
    let carriers = ["dhl", "ups", "fedex", "colissimo"];
    let regions = ["nord", "sud", "est", "ouest"];
    for i in 0..500 {
        let month = (i % 12) + 1;
        let day = (i % 28) + 1;
        let slow = i % 3 == 0;
        let delay_days = if slow { 6.0 + (i % 5) as f64 } else { 1.0 + (i % 3) as f64 };
        let late = u8::from(slow);
        let amount = if i % 17 == 0 {
            String::new() // missing value
        } else {
            format!("{:.2}", 20.0 + (i % 40) as f64 * 2.5 + if slow { 50.0 } else { 0.0 })
        };
        writeln!(
            csv,
            "o-{i},2024-{month:02}-{day:02},2024-{month:02}-{day:02},2024-{month:02}-{day:02},{},{},{},{},{},{},{},{}",
            carriers[if slow { i % 2 } else { 2 + i % 2 }],
            regions[i % 4],
            amount,
            1 + i % 6,
            late,
            delay_days,
            delay_days - 2.0,
            2.0,
        )
        .unwrap();
    }
    std::fs::write(path, csv).unwrap();
}

fn run_config(input: PathBuf, output: PathBuf) -> BenchConfig {
    BenchConfig {
        input,
        output,
        ..Default::default()
    }
}

#[test]
fn test_end_to_end_produces_complete_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("orders.csv");
    let output = dir.path().join("results").join("training_results.json");
    write_orders_csv(&input);

    let report = cmd_run(&run_config(input, output.clone())).unwrap();

    assert_eq!(report.classification.len(), 8);
    assert_eq!(report.regression.len(), 8);
    assert_eq!(report.classification.iter().filter(|r| r.is_best).count(), 1);
    assert_eq!(report.regression.iter().filter(|r| r.is_best).count(), 1);
    assert!(!report.synthetic_classification_target);
    assert!(!report.synthetic_regression_target);

    // The file on disk round-trips to the in-memory report
    assert_eq!(load_report(&output).unwrap(), report);
}

#[test]
fn test_report_json_shape() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("orders.csv");
    let output = dir.path().join("training_results.json");
    write_orders_csv(&input);

    cmd_run(&run_config(input, output.clone())).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let first = &raw["classification"][0];
    for key in ["model", "accuracy", "f1", "auc", "isBest"] {
        assert!(!first[key].is_null(), "missing key {key}");
    }
    let first = &raw["regression"][0];
    for key in ["model", "r2", "mae", "rmse", "isBest"] {
        assert!(!first[key].is_null(), "missing key {key}");
    }
}

#[test]
fn test_reruns_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("orders.csv");
    write_orders_csv(&input);

    let out_a = dir.path().join("a.json");
    let out_b = dir.path().join("b.json");
    cmd_run(&run_config(input.clone(), out_a.clone())).unwrap();
    cmd_run(&run_config(input, out_b.clone())).unwrap();

    assert_eq!(
        std::fs::read(&out_a).unwrap(),
        std::fs::read(&out_b).unwrap()
    );
}

#[test]
fn test_learnable_pattern_is_learned() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("orders.csv");
    let output = dir.path().join("out.json");
    write_orders_csv(&input);

    let report = cmd_run(&run_config(input, output)).unwrap();
    let best = report.classification.iter().find(|r| r.is_best).unwrap();
    // Delay is a near-deterministic function of carrier and amount
    assert!(best.accuracy > 0.8, "{}: accuracy {}", best.model, best.accuracy);
}

#[test]
fn test_missing_input_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = run_config(
        dir.path().join("does_not_exist.csv"),
        dir.path().join("out.json"),
    );
    let err = cmd_run(&config).unwrap_err();
    assert!(matches!(err, delaybench::BenchError::Ingestion(_)));
    assert!(!dir.path().join("out.json").exists());
}

#[test]
fn test_missing_targets_fall_back_to_synthetic() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("orders.csv");
    let output = dir.path().join("out.json");

    let mut csv = String::from("order_id,montant,quantite\n");
    for i in 0..200 {
        writeln!(csv, "o-{i},{:.2},{}", 10.0 + i as f64, 1 + i % 5).unwrap();
    }
    std::fs::write(&input, csv).unwrap();

    let report = cmd_run(&run_config(input, output)).unwrap();
    assert!(report.synthetic_classification_target);
    assert!(report.synthetic_regression_target);
    assert_eq!(report.classification.len(), 8);
    assert_eq!(report.regression.len(), 8);
}

#[test]
fn test_restricted_rosters() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("orders.csv");
    let output = dir.path().join("out.json");
    write_orders_csv(&input);

    let mut config = run_config(input, output);
    config.classifiers = vec!["KNN".to_string(), "Decision Tree".to_string()];
    config.regressors = vec!["Linear Regression".to_string()];

    let report = cmd_run(&config).unwrap();
    assert_eq!(report.classification.len(), 2);
    assert_eq!(report.regression.len(), 1);
    assert!(report.regression[0].is_best);
}
