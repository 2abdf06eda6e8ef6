//! Month-bucketed per-source time series (the line chart's input).

use insight_core::OpportunityRecord;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MonthlySourceCount {
    /// Calendar month, `YYYY-MM`.
    pub month: String,
    pub source: String,
    pub count: usize,
}

/// Count opportunities per (month, traffic source) over the records whose
/// business unit is selected. Records without a parseable creation date are
/// skipped; callers treat an empty result as "section unavailable".
pub fn monthly_trend(
    records: &[OpportunityRecord],
    selected_units: &BTreeSet<String>,
) -> Vec<MonthlySourceCount> {
    let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
    for record in records {
        if !selected_units.contains(&record.business_unit) {
            continue;
        }
        let Some(date) = record.created else { continue };
        let key = (date.format("%Y-%m").to_string(), record.traffic_source.clone());
        *counts.entry(key).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|((month, source), count)| MonthlySourceCount { month, source, count })
        .collect()
}
