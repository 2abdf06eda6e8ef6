//! Headline metrics and categorical breakdowns.

use insight_core::OutcomeLabel;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct GeneralMetrics {
    pub total_opportunities: usize,
    pub won_opportunities: usize,
    /// Won / total × 100; 0.0 when there are no opportunities.
    pub conversion_rate_pct: f64,
}

/// Won vs not-won counts (the outcome pie chart's input).
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeBreakdown {
    pub won: usize,
    pub not_won: usize,
}

/// Opportunities per traffic source (the bar chart's input).
#[derive(Debug, Clone, Serialize)]
pub struct SourceCount {
    pub source: String,
    pub count: usize,
}

pub fn general_metrics(labels: &[OutcomeLabel]) -> GeneralMetrics {
    let total = labels.len();
    let won = labels.iter().filter(|l| l.is_won()).count();
    let conversion_rate_pct = if total > 0 {
        won as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    GeneralMetrics {
        total_opportunities: total,
        won_opportunities: won,
        conversion_rate_pct,
    }
}

pub fn outcome_breakdown(labels: &[OutcomeLabel]) -> OutcomeBreakdown {
    let won = labels.iter().filter(|l| l.is_won()).count();
    OutcomeBreakdown {
        won,
        not_won: labels.len() - won,
    }
}

/// Per-source counts over the filtered rows, sorted by source name.
pub fn source_breakdown(row_sources: &[String]) -> Vec<SourceCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for source in row_sources {
        *counts.entry(source).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(source, count)| SourceCount {
            source: source.to_string(),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_rate() {
        let labels = vec![OutcomeLabel::Won, OutcomeLabel::NotWon, OutcomeLabel::Won, OutcomeLabel::NotWon];
        let metrics = general_metrics(&labels);
        assert_eq!(metrics.total_opportunities, 4);
        assert_eq!(metrics.won_opportunities, 2);
        assert!((metrics.conversion_rate_pct - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_conversion_rate_is_zero_when_empty() {
        let metrics = general_metrics(&[]);
        assert_eq!(metrics.total_opportunities, 0);
        assert_eq!(metrics.conversion_rate_pct, 0.0);
    }

    #[test]
    fn test_outcome_breakdown_partitions_labels() {
        let labels = vec![OutcomeLabel::Won, OutcomeLabel::NotWon, OutcomeLabel::NotWon];
        let breakdown = outcome_breakdown(&labels);
        assert_eq!(breakdown.won, 1);
        assert_eq!(breakdown.not_won, 2);
    }

    #[test]
    fn test_source_breakdown_counts_and_sorts() {
        let sources: Vec<String> = ["Web", "Email", "Web", "Referral", "Web"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let breakdown = source_breakdown(&sources);
        let pairs: Vec<(&str, usize)> = breakdown.iter().map(|s| (s.source.as_str(), s.count)).collect();
        assert_eq!(pairs, vec![("Email", 1), ("Referral", 1), ("Web", 3)]);
    }
}
