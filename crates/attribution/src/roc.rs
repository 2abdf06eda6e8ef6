//! ROC curve construction and AUC.

use insight_core::{InsightError, InsightResult, OutcomeLabel};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct RocPoint {
    pub fpr: f64,
    pub tpr: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RocCurve {
    /// Points ordered from the (0,0) corner (threshold above every score)
    /// down to (1,1); FPR and TPR are each non-decreasing along the curve.
    pub points: Vec<RocPoint>,
    /// Trapezoidal area under the curve, in [0, 1].
    pub auc: f64,
}

/// Sweep every distinct predicted probability as a classification threshold
/// and compute the (FPR, TPR) operating points, plus the trapezoidal AUC.
///
/// Fails with [`InsightError::DegenerateLabels`] when the labels are
/// constant: with no positives or no negatives one of the rates is
/// undefined and any curve would be misleading.
pub fn roc(labels: &[OutcomeLabel], probabilities: &[f64]) -> InsightResult<RocCurve> {
    debug_assert_eq!(labels.len(), probabilities.len());

    let positives = labels.iter().filter(|l| l.is_won()).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(InsightError::DegenerateLabels(format!(
            "{positives} positive and {negatives} negative labels"
        )));
    }

    let mut scored: Vec<(f64, bool)> = probabilities
        .iter()
        .copied()
        .zip(labels.iter().map(|l| l.is_won()))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut points = vec![RocPoint {
        fpr: 0.0,
        tpr: 0.0,
        threshold: f64::INFINITY,
    }];
    let mut auc = 0.0;
    let (mut tp, mut fp) = (0usize, 0usize);
    let mut index = 0;

    // Tied scores move together: one operating point per distinct threshold.
    while index < scored.len() {
        let threshold = scored[index].0;
        while index < scored.len() && scored[index].0 == threshold {
            if scored[index].1 {
                tp += 1;
            } else {
                fp += 1;
            }
            index += 1;
        }

        let previous = &points[points.len() - 1];
        let fpr = fp as f64 / negatives as f64;
        let tpr = tp as f64 / positives as f64;
        auc += (fpr - previous.fpr) * (tpr + previous.tpr) / 2.0;
        points.push(RocPoint { fpr, tpr, threshold });
    }

    Ok(RocCurve {
        points,
        auc: auc.clamp(0.0, 1.0),
    })
}
