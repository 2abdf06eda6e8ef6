//! Binary-outcome attribution model — logistic regression over one-hot
//! indicators, Wald significance filtering, and ROC/AUC discrimination
//! metrics. Pure and stateless: every fit starts from the caller's current
//! filtered dataset and nothing is retained between runs.

pub mod effects;
pub mod logit;
pub mod roc;
mod stats;

pub use effects::{coefficient_lookup, significant_effects, SignificantEffect};
pub use logit::{fit, predict_probabilities, FittedModel};
pub use roc::{roc, RocCurve, RocPoint};
