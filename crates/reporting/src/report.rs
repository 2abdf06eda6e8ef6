//! Assembly of the full dashboard report with per-section degradation.

use crate::metrics::{self, GeneralMetrics, OutcomeBreakdown, SourceCount};
use crate::trend::{self, MonthlySourceCount};
use insight_attribution::{
    coefficient_lookup, fit, predict_probabilities, roc, significant_effects, RocCurve,
    SignificantEffect,
};
use insight_core::config::ModelConfig;
use insight_core::{InsightError, InsightResult, OpportunityRecord, OutcomeLabel};
use insight_dataprep::{encode_categoricals, filter_by_business_unit, EncodedFeatureMatrix};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// A report section that is either present or explains its absence. Load
/// and schema failures abort the whole run; everything that can go wrong
/// after filtering ends up here instead of in an `Err`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SectionOutcome<T> {
    Available { data: T },
    Unavailable { reason: String },
}

impl<T> SectionOutcome<T> {
    pub fn available(data: T) -> Self {
        SectionOutcome::Available { data }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        SectionOutcome::Unavailable { reason: reason.into() }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, SectionOutcome::Available { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelSection {
    pub effects: SectionOutcome<Vec<SignificantEffect>>,
    pub roc: SectionOutcome<RocCurve>,
    /// Ad hoc single-predictor inspection, when one was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inspected: Option<SectionOutcome<SignificantEffect>>,
}

/// Everything the presentation layer consumes for one filter state.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub selected_units: Vec<String>,
    pub metrics: GeneralMetrics,
    pub outcomes: OutcomeBreakdown,
    pub sources: Vec<SourceCount>,
    pub monthly_trend: SectionOutcome<Vec<MonthlySourceCount>>,
    /// Dropped reference level per encoded field; coefficients in the model
    /// section read as "relative to" these.
    pub reference_levels: BTreeMap<String, String>,
    pub model: ModelSection,
}

/// Run the full pipeline for one filter state: encode, filter, fit, and
/// assemble the report. Stateless; every call recomputes from the records.
pub fn build_report(
    records: &[OpportunityRecord],
    labels: &[OutcomeLabel],
    selected_units: &BTreeSet<String>,
    model_config: &ModelConfig,
    inspect: Option<&str>,
) -> InsightResult<DashboardReport> {
    let matrix = encode_categoricals(records);
    let (filtered, filtered_labels) = filter_by_business_unit(&matrix, labels, selected_units)?;

    let metrics = metrics::general_metrics(&filtered_labels);
    let outcomes = metrics::outcome_breakdown(&filtered_labels);
    let sources = metrics::source_breakdown(&filtered.row_sources);

    let trend = trend::monthly_trend(records, selected_units);
    let monthly_trend = if trend.is_empty() {
        SectionOutcome::unavailable("no parseable creation dates in the selection")
    } else {
        SectionOutcome::available(trend)
    };

    let model = model_section(&filtered, &filtered_labels, model_config, inspect)?;

    info!(
        rows = metrics.total_opportunities,
        effects_available = model.effects.is_available(),
        roc_available = model.roc.is_available(),
        "dashboard report assembled"
    );

    Ok(DashboardReport {
        selected_units: selected_units.iter().cloned().collect(),
        metrics,
        outcomes,
        sources,
        monthly_trend,
        reference_levels: filtered.reference_levels,
        model,
    })
}

fn model_section(
    filtered: &EncodedFeatureMatrix,
    labels: &[OutcomeLabel],
    config: &ModelConfig,
    inspect: Option<&str>,
) -> InsightResult<ModelSection> {
    // Indicators left constant by the filter (a lone business unit's own
    // column, most commonly) carry no signal and would make the
    // information matrix singular.
    let matrix = filtered.drop_constant_columns();
    let fitted = match fit(
        &matrix.data,
        &matrix.columns,
        labels,
        config.max_iterations,
        config.tolerance,
    ) {
        Ok(model) => model,
        Err(InsightError::Separation(reason)) => {
            warn!(%reason, "no attribution model for this selection");
            return Ok(ModelSection {
                effects: SectionOutcome::unavailable(format!("no model available: {reason}")),
                roc: SectionOutcome::unavailable(format!("no model available: {reason}")),
                inspected: inspect
                    .map(|_| SectionOutcome::unavailable("no model available")),
            });
        }
        Err(other) => return Err(other),
    };

    let effects = SectionOutcome::available(significant_effects(&fitted, config.alpha));

    let probabilities = predict_probabilities(&fitted, &matrix.data)?;
    let roc = match roc(labels, &probabilities) {
        Ok(curve) => SectionOutcome::available(curve),
        Err(InsightError::DegenerateLabels(reason)) => {
            warn!(%reason, "ROC omitted");
            SectionOutcome::unavailable(format!("ROC undefined: {reason}"))
        }
        Err(other) => return Err(other),
    };

    let inspected = inspect.map(|predictor| match coefficient_lookup(&fitted, predictor) {
        Some(effect) => SectionOutcome::available(effect),
        None => SectionOutcome::unavailable(format!("unknown predictor '{predictor}'")),
    });

    Ok(ModelSection { effects, roc, inspected })
}
