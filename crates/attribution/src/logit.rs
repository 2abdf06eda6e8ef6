//! Logistic regression fit via iteratively reweighted least squares.

use crate::stats::{sigmoid, wald_p_value};
use insight_core::{InsightError, InsightResult, OutcomeLabel};
use ndarray::{Array1, Array2};
use tracing::{debug, info};

pub const INTERCEPT_TERM: &str = "(intercept)";

/// Probabilities are clamped away from 0/1 so the IRLS weights stay finite.
const MU_FLOOR: f64 = 1e-10;

/// Coefficient magnitude beyond which an indicator-predictor fit is treated
/// as separated: |beta| = 30 corresponds to odds ratios past 1e13, far
/// outside anything a real conversion dataset produces.
const BLOWUP_LIMIT: f64 = 30.0;

/// A fitted logistic regression. Created fresh per fit call, never mutated.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FittedModel {
    /// Term names, intercept first, then the design-matrix columns in order.
    pub terms: Vec<String>,
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<f64>,
    /// Two-sided Wald p-values, aligned with `terms`.
    pub p_values: Vec<f64>,
    pub iterations: usize,
}

/// Fit `labels ~ intercept + data` by maximum likelihood.
///
/// Newton-type IRLS with a relative convergence tolerance. Fails with
/// [`InsightError::Separation`] when the MLE does not exist or the solver
/// does not converge within `max_iterations`: empty input, constant labels,
/// perfect separation in the filtered subset, or a singular information
/// matrix. Callers surface that as "no model available".
pub fn fit(
    data: &Array2<f64>,
    columns: &[String],
    labels: &[OutcomeLabel],
    max_iterations: usize,
    tolerance: f64,
) -> InsightResult<FittedModel> {
    let n = data.nrows();
    let k = data.ncols() + 1;
    if n == 0 {
        return Err(InsightError::Separation("no rows to fit".to_string()));
    }
    if n < k {
        return Err(InsightError::Separation(format!(
            "{} predictors but only {n} rows",
            k - 1
        )));
    }
    let won = labels.iter().filter(|l| l.is_won()).count();
    if won == 0 || won == n {
        return Err(InsightError::Separation(
            "outcome is constant in the filtered subset".to_string(),
        ));
    }

    // Design matrix with the intercept column prepended.
    let mut x = Array2::ones((n, k));
    x.slice_mut(ndarray::s![.., 1..]).assign(data);
    let y: Array1<f64> = labels.iter().map(|l| l.as_f64()).collect();

    let mut beta = Array1::<f64>::zeros(k);
    let mut information = Array2::<f64>::zeros((k, k));
    let mut converged_at = None;

    for iteration in 1..=max_iterations {
        let eta = x.dot(&beta);
        let mu = eta.mapv(|e| sigmoid(e).clamp(MU_FLOOR, 1.0 - MU_FLOOR));
        let weights = mu.mapv(|m| m * (1.0 - m));

        // Working response z = eta + (y - mu) / w, then solve the weighted
        // normal equations (X'WX) beta = X'Wz.
        let z = &eta + &((&y - &mu) / &weights);

        for r in 0..k {
            for c in 0..k {
                information[[r, c]] = (0..n).map(|i| x[[i, r]] * weights[i] * x[[i, c]]).sum();
            }
        }
        let rhs: Array1<f64> = (0..k)
            .map(|r| (0..n).map(|i| x[[i, r]] * weights[i] * z[i]).sum())
            .collect();

        let inverse = invert(&information).ok_or_else(|| {
            InsightError::Separation("singular information matrix".to_string())
        })?;
        let updated = inverse.dot(&rhs);

        let step = (&updated - &beta)
            .iter()
            .fold(0.0f64, |acc, d| acc.max(d.abs()));
        let scale = 1.0 + beta.iter().fold(0.0f64, |acc, b| acc.max(b.abs()));
        beta = updated;

        if step < tolerance * scale {
            converged_at = Some(iteration);
            break;
        }
    }

    let iterations = converged_at.ok_or_else(|| {
        InsightError::Separation(format!("no convergence after {max_iterations} iterations"))
    })?;

    if beta.iter().any(|b| b.abs() > BLOWUP_LIMIT) {
        return Err(InsightError::Separation(
            "coefficient blow-up suggests perfect separation".to_string(),
        ));
    }

    // Standard errors from the inverse information matrix at the optimum.
    let covariance = invert(&information)
        .ok_or_else(|| InsightError::Separation("singular information matrix".to_string()))?;
    let std_errors: Vec<f64> = (0..k).map(|j| covariance[[j, j]].max(0.0).sqrt()).collect();
    let p_values: Vec<f64> = beta
        .iter()
        .zip(&std_errors)
        .map(|(b, se)| {
            if *se > 0.0 {
                wald_p_value(b / se)
            } else {
                1.0
            }
        })
        .collect();

    let mut terms = Vec::with_capacity(k);
    terms.push(INTERCEPT_TERM.to_string());
    terms.extend(columns.iter().cloned());

    info!(rows = n, predictors = k - 1, iterations, "logistic fit converged");
    debug!(?terms, coefficients = ?beta.to_vec(), "fitted coefficients");

    Ok(FittedModel {
        terms,
        coefficients: beta.to_vec(),
        std_errors,
        p_values,
        iterations,
    })
}

/// Predicted win probability for each row: the logistic link applied to the
/// linear predictor.
pub fn predict_probabilities(model: &FittedModel, data: &Array2<f64>) -> InsightResult<Vec<f64>> {
    if data.ncols() + 1 != model.coefficients.len() {
        return Err(InsightError::Internal(anyhow::anyhow!(
            "matrix has {} columns but the model was fit on {}",
            data.ncols(),
            model.coefficients.len() - 1
        )));
    }
    Ok(data
        .rows()
        .into_iter()
        .map(|row| {
            let eta = model.coefficients[0]
                + row
                    .iter()
                    .zip(&model.coefficients[1..])
                    .map(|(x, b)| x * b)
                    .sum::<f64>();
            sigmoid(eta)
        })
        .collect())
}

/// Gauss-Jordan inversion with partial pivoting. Returns `None` when the
/// matrix is singular to working precision. Fine for the handful of
/// indicator predictors this model sees.
fn invert(a: &Array2<f64>) -> Option<Array2<f64>> {
    let k = a.nrows();
    let mut work = a.clone();
    let mut inv = Array2::<f64>::eye(k);

    for col in 0..k {
        let pivot_row = (col..k).max_by(|&r1, &r2| {
            work[[r1, col]]
                .abs()
                .partial_cmp(&work[[r2, col]].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if work[[pivot_row, col]].abs() < 1e-12 {
            return None;
        }
        if pivot_row != col {
            for j in 0..k {
                work.swap([pivot_row, j], [col, j]);
                inv.swap([pivot_row, j], [col, j]);
            }
        }

        let pivot = work[[col, col]];
        for j in 0..k {
            work[[col, j]] /= pivot;
            inv[[col, j]] /= pivot;
        }
        for row in 0..k {
            if row == col {
                continue;
            }
            let factor = work[[row, col]];
            if factor == 0.0 {
                continue;
            }
            for j in 0..k {
                work[[row, j]] -= factor * work[[col, j]];
                inv[[row, j]] -= factor * inv[[col, j]];
            }
        }
    }
    Some(inv)
}
