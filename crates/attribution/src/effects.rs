//! Significance filtering of fitted coefficients.

use crate::logit::{FittedModel, INTERCEPT_TERM};
use serde::Serialize;

/// A predictor whose Wald p-value cleared the significance level.
#[derive(Debug, Clone, Serialize)]
pub struct SignificantEffect {
    pub predictor: String,
    pub coefficient: f64,
    pub p_value: f64,
}

/// Coefficients with two-sided p-value below `alpha`, intercept excluded,
/// sorted ascending by coefficient value. An empty result is a valid
/// outcome, not an error.
pub fn significant_effects(model: &FittedModel, alpha: f64) -> Vec<SignificantEffect> {
    let mut effects: Vec<SignificantEffect> = model
        .terms
        .iter()
        .zip(model.coefficients.iter().zip(&model.p_values))
        .filter(|(term, (_, p))| term.as_str() != INTERCEPT_TERM && **p < alpha)
        .map(|(term, (coefficient, p_value))| SignificantEffect {
            predictor: term.clone(),
            coefficient: *coefficient,
            p_value: *p_value,
        })
        .collect();
    effects.sort_by(|a, b| {
        a.coefficient
            .partial_cmp(&b.coefficient)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    effects
}

/// Ad hoc inspection of a single predictor, significant or not.
pub fn coefficient_lookup(model: &FittedModel, predictor: &str) -> Option<SignificantEffect> {
    model
        .terms
        .iter()
        .position(|t| t == predictor)
        .map(|i| SignificantEffect {
            predictor: predictor.to_string(),
            coefficient: model.coefficients[i],
            p_value: model.p_values[i],
        })
}
