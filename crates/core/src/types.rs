use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One raw sales opportunity row. Immutable once loaded; fields the model
/// does not interpret are kept verbatim in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpportunityRecord {
    /// Free-text pipeline stage ("Ganado" marks a won deal).
    pub stage: String,
    /// Origin channel of the opportunity.
    pub traffic_source: String,
    /// Organizational unit the opportunity is assigned to.
    pub business_unit: String,
    /// Creation date; `None` when the source value does not parse.
    pub created: Option<NaiveDate>,
    #[serde(default)]
    pub extra: HashMap<String, String>,
}

/// Binary outcome derived from the stage field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeLabel {
    Won,
    NotWon,
}

impl OutcomeLabel {
    /// Derive the label from a raw stage value. The comparison is
    /// case-insensitive and whitespace-trimmed.
    pub fn from_stage(stage: &str, won_marker: &str) -> Self {
        if stage.trim().to_lowercase() == won_marker.trim().to_lowercase() {
            OutcomeLabel::Won
        } else {
            OutcomeLabel::NotWon
        }
    }

    pub fn is_won(self) -> bool {
        matches!(self, OutcomeLabel::Won)
    }

    pub fn as_f64(self) -> f64 {
        if self.is_won() {
            1.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_matches_case_and_whitespace_variants() {
        for stage in ["ganado", "Ganado", "GANADO ", " Ganado", "  gAnAdO  "] {
            assert_eq!(
                OutcomeLabel::from_stage(stage, "ganado"),
                OutcomeLabel::Won,
                "stage {stage:?} should be won"
            );
        }
    }

    #[test]
    fn test_label_rejects_other_stages() {
        for stage in ["Perdido", "En curso", "", "ganados", "no ganado"] {
            assert_eq!(OutcomeLabel::from_stage(stage, "ganado"), OutcomeLabel::NotWon);
        }
    }

    #[test]
    fn test_label_as_f64() {
        assert_eq!(OutcomeLabel::Won.as_f64(), 1.0);
        assert_eq!(OutcomeLabel::NotWon.as_f64(), 0.0);
    }
}
