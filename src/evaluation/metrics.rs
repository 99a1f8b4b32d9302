//! Classification and regression metrics
//!
//! All metrics take plain f64 arrays: classification labels are 0.0/1.0,
//! probabilities are positive-class scores. Degenerate inputs (single
//! observed class, zero target variance) fall back to 0.0 rather than NaN.

use ndarray::Array1;
use std::collections::BTreeMap;

/// Fraction of exactly matching labels
pub fn accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| (**t - **p).abs() < 1e-12)
        .count();
    correct as f64 / y_true.len() as f64
}

/// F1 averaged over the classes observed in `y_true`, weighted by support
pub fn weighted_f1(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }

    // BTreeMap keys on the label bit pattern for a stable class order
    let mut support: BTreeMap<u64, usize> = BTreeMap::new();
    for &t in y_true.iter() {
        *support.entry(t.to_bits()).or_insert(0) += 1;
    }

    let n = y_true.len() as f64;
    let mut total = 0.0;
    for (&bits, &count) in &support {
        let class = f64::from_bits(bits);
        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut fn_ = 0usize;
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            let t_is = (t - class).abs() < 1e-12;
            let p_is = (p - class).abs() < 1e-12;
            match (t_is, p_is) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
                (false, false) => {}
            }
        }
        let precision = if tp + fp > 0 {
            tp as f64 / (tp + fp) as f64
        } else {
            0.0
        };
        let recall = if tp + fn_ > 0 {
            tp as f64 / (tp + fn_) as f64
        } else {
            0.0
        };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        total += f1 * count as f64 / n;
    }
    total
}

/// Area under the ROC curve via the rank-sum formulation, with tied
/// scores receiving their average rank. Returns 0.0 when only one class
/// is present.
pub fn roc_auc(y_true: &Array1<f64>, y_score: &Array1<f64>) -> f64 {
    let n_pos = y_true.iter().filter(|&&t| t > 0.5).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return 0.0;
    }

    let mut order: Vec<usize> = (0..y_true.len()).collect();
    order.sort_by(|&a, &b| {
        y_score[a]
            .partial_cmp(&y_score[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Average ranks within tied score groups
    let mut ranks = vec![0.0f64; y_true.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && y_score[order[j + 1]] == y_score[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        i = j + 1;
    }

    let pos_rank_sum: f64 = y_true
        .iter()
        .zip(ranks.iter())
        .filter(|(&t, _)| t > 0.5)
        .map(|(_, &r)| r)
        .sum();
    let u = pos_rank_sum - (n_pos * (n_pos + 1)) as f64 / 2.0;
    u / (n_pos * n_neg) as f64
}

/// Coefficient of determination; 0.0 when the target has zero variance
pub fn r2(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let mean = y_true.mean().unwrap_or(0.0);
    let ss_tot: f64 = y_true.iter().map(|&t| (t - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return 0.0;
    }
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(&t, &p)| (t - p).powi(2))
        .sum();
    1.0 - ss_res / ss_tot
}

/// Mean absolute error
pub fn mae(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(&t, &p)| (t - p).abs())
        .sum::<f64>()
        / y_true.len() as f64
}

/// Root mean squared error
pub fn rmse(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let mse = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(&t, &p)| (t - p).powi(2))
        .sum::<f64>()
        / y_true.len() as f64;
    mse.sqrt()
}

/// Round to four decimal places for reporting
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
