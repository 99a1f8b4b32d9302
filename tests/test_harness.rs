//! Integration tests for the evaluation harness and model catalogue

use delaybench::evaluation::{
    classifier_catalogue, regressor_catalogue, EvaluationHarness,
};
use delaybench::split::split_tasks;
use ndarray::{Array1, Array2};

/// Learnable synthetic tasks: the class flips and the regression target
/// jumps with the first feature
fn learnable_split(n: usize) -> delaybench::split::TaskSplit {
    let x = Array2::from_shape_fn((n, 3), |(i, j)| {
        let signal = if i < n / 2 { 0.0 } else { 4.0 };
        signal + ((i * 5 + j * 11) % 13) as f64 * 0.05
    });
    let y_class: Array1<f64> = (0..n).map(|i| if i < n / 2 { 0.0 } else { 1.0 }).collect();
    let y_reg: Array1<f64> = (0..n)
        .map(|i| if i < n / 2 { 2.0 } else { 8.0 } + (i % 4) as f64 * 0.1)
        .collect();
    split_tasks(&x, &y_class, &y_reg, 0.2, 42).unwrap()
}

#[test]
fn test_full_catalogue_runs_and_reports_all_models() {
    let split = learnable_split(100);
    let harness = EvaluationHarness::new(42);

    let clf = harness.run_classification(&classifier_catalogue(), &split);
    let reg = harness.run_regression(&regressor_catalogue(), &split);

    let clf_names: Vec<&str> = clf.iter().map(|r| r.model.as_str()).collect();
    assert_eq!(
        clf_names,
        vec![
            "Random Forest",
            "XGBoost",
            "SVM",
            "Logistic Regression",
            "KNN",
            "Decision Tree",
            "Naive Bayes",
            "Gradient Boosting"
        ]
    );

    let reg_names: Vec<&str> = reg.iter().map(|r| r.model.as_str()).collect();
    assert_eq!(
        reg_names,
        vec![
            "Random Forest",
            "Gradient Boosting",
            "Linear Regression",
            "Ridge Regression",
            "Lasso",
            "SVR",
            "XGBoost Regressor",
            "Decision Tree Reg"
        ]
    );
}

#[test]
fn test_exactly_one_best_per_task() {
    let split = learnable_split(100);
    let harness = EvaluationHarness::new(42);

    let clf = harness.run_classification(&classifier_catalogue(), &split);
    let reg = harness.run_regression(&regressor_catalogue(), &split);

    assert_eq!(clf.iter().filter(|r| r.is_best).count(), 1);
    assert_eq!(reg.iter().filter(|r| r.is_best).count(), 1);

    // The flag agrees with an independent argmax / argmin
    let best_f1 = clf.iter().map(|r| r.f1).fold(f64::NEG_INFINITY, f64::max);
    let flagged = clf.iter().find(|r| r.is_best).unwrap();
    assert_eq!(flagged.f1, best_f1);

    let best_rmse = reg.iter().map(|r| r.rmse).fold(f64::INFINITY, f64::min);
    let flagged = reg.iter().find(|r| r.is_best).unwrap();
    assert_eq!(flagged.rmse, best_rmse);
}

#[test]
fn test_separable_task_scores_high() {
    let split = learnable_split(100);
    let harness = EvaluationHarness::new(42);
    let clf = harness.run_classification(&classifier_catalogue(), &split);

    // The task is trivially separable, so the winner should be close
    // to perfect
    let best = clf.iter().find(|r| r.is_best).unwrap();
    assert!(best.accuracy > 0.9, "{}: accuracy {}", best.model, best.accuracy);
    assert!(best.f1 > 0.9);
}

#[test]
fn test_svm_reports_zero_auc() {
    let split = learnable_split(60);
    let harness = EvaluationHarness::new(42);
    let clf = harness.run_classification(&classifier_catalogue(), &split);

    // No probability estimates means a zero score vector, and a constant
    // score vector is no ranking at all
    let svm = clf.iter().find(|r| r.model == "SVM").unwrap();
    assert_eq!(svm.auc, 0.5);
}

#[test]
fn test_metrics_rounded_to_four_decimals() {
    let split = learnable_split(80);
    let harness = EvaluationHarness::new(42);

    for r in harness.run_classification(&classifier_catalogue(), &split) {
        for v in [r.accuracy, r.f1, r.auc] {
            assert_eq!((v * 10_000.0).round() / 10_000.0, v);
        }
    }
    for r in harness.run_regression(&regressor_catalogue(), &split) {
        for v in [r.r2, r.mae, r.rmse] {
            assert_eq!((v * 10_000.0).round() / 10_000.0, v);
        }
    }
}

#[test]
fn test_same_seed_reproduces_results() {
    let split = learnable_split(80);
    let a = EvaluationHarness::new(7).run_classification(&classifier_catalogue(), &split);
    let b = EvaluationHarness::new(7).run_classification(&classifier_catalogue(), &split);
    assert_eq!(a, b);
}
