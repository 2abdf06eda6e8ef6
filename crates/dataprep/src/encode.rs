//! One-hot encoding of categorical predictors.

use insight_core::OpportunityRecord;
use ndarray::Array2;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Logical field names used for encoded column labels. Coefficients are
/// reported against these, never against the raw CSV headers.
pub const TRAFFIC_SOURCE_FIELD: &str = "traffic_source";
pub const BUSINESS_UNIT_FIELD: &str = "business_unit";

/// Design matrix of one-hot indicator columns, one block per categorical
/// field, with the lexicographically-first level of each field dropped as
/// the reference category.
#[derive(Debug, Clone)]
pub struct EncodedFeatureMatrix {
    /// Column labels, `<field>_<level>`, aligned with `data` columns.
    pub columns: Vec<String>,
    pub data: Array2<f64>,
    /// Dropped reference level per field; coefficients on the remaining
    /// indicators are relative to these.
    pub reference_levels: BTreeMap<String, String>,
    /// Raw business-unit value per row, kept for filtering.
    pub row_units: Vec<String>,
    /// Raw traffic-source value per row, kept for reporting breakdowns.
    pub row_sources: Vec<String>,
}

impl EncodedFeatureMatrix {
    pub fn n_rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    /// Drop indicator columns with no variance across the current rows.
    /// After filtering to a single business unit its own indicator is
    /// constant, which would make the fit's information matrix singular;
    /// a constant indicator carries no attribution signal anyway.
    pub fn drop_constant_columns(&self) -> EncodedFeatureMatrix {
        let keep: Vec<usize> = (0..self.data.ncols())
            .filter(|&c| {
                let column = self.data.column(c);
                column.iter().any(|&v| v != 0.0) && column.iter().any(|&v| v != 1.0)
            })
            .collect();

        let mut data = Array2::zeros((self.n_rows(), keep.len()));
        for (out_col, &in_col) in keep.iter().enumerate() {
            data.column_mut(out_col).assign(&self.data.column(in_col));
        }

        EncodedFeatureMatrix {
            columns: keep.iter().map(|&c| self.columns[c].clone()).collect(),
            data,
            reference_levels: self.reference_levels.clone(),
            row_units: self.row_units.clone(),
            row_sources: self.row_sources.clone(),
        }
    }
}

fn traffic_source(record: &OpportunityRecord) -> &str {
    &record.traffic_source
}

fn business_unit(record: &OpportunityRecord) -> &str {
    &record.business_unit
}

fn sorted_levels<'a>(
    records: &'a [OpportunityRecord],
    value: impl Fn(&'a OpportunityRecord) -> &'a str,
) -> Vec<&'a str> {
    records.iter().map(value).collect::<BTreeSet<_>>().into_iter().collect()
}

/// One-hot-encode the traffic-source and business-unit fields.
///
/// For each field the distinct levels are sorted and the first becomes the
/// reference category: it gets no column, and rows holding it are all-zero
/// across that field's block. A field with fewer than two distinct levels
/// contributes no columns at all.
pub fn encode_categoricals(records: &[OpportunityRecord]) -> EncodedFeatureMatrix {
    let fields: [(&str, fn(&OpportunityRecord) -> &str); 2] = [
        (TRAFFIC_SOURCE_FIELD, traffic_source),
        (BUSINESS_UNIT_FIELD, business_unit),
    ];

    let mut columns = Vec::new();
    let mut reference_levels = BTreeMap::new();
    // (field accessor, level, column index) for the fill pass
    let mut encoded_levels: Vec<(fn(&OpportunityRecord) -> &str, String, usize)> = Vec::new();

    for (field, value) in fields {
        let levels = sorted_levels(records, value);
        if let Some((reference, rest)) = levels.split_first() {
            reference_levels.insert(field.to_string(), reference.to_string());
            for level in rest {
                encoded_levels.push((value, level.to_string(), columns.len()));
                columns.push(format!("{field}_{level}"));
            }
        }
    }

    let mut data = Array2::zeros((records.len(), columns.len()));
    for (row, record) in records.iter().enumerate() {
        for (value, level, col) in &encoded_levels {
            if value(record) == level.as_str() {
                data[[row, *col]] = 1.0;
            }
        }
    }

    debug!(
        rows = records.len(),
        columns = columns.len(),
        "encoded categorical predictors"
    );

    EncodedFeatureMatrix {
        columns,
        data,
        reference_levels,
        row_units: records.iter().map(|r| r.business_unit.clone()).collect(),
        row_sources: records.iter().map(|r| r.traffic_source.clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(source: &str, unit: &str) -> OpportunityRecord {
        OpportunityRecord {
            stage: "Perdido".to_string(),
            traffic_source: source.to_string(),
            business_unit: unit.to_string(),
            created: None,
            extra: Default::default(),
        }
    }

    #[test]
    fn test_drops_lexicographically_first_level() {
        let records = vec![
            record("Web", "Enterprise Solutions"),
            record("Referral", "Cloud & AI Solutions"),
            record("Email", "Enterprise Solutions"),
        ];
        let matrix = encode_categoricals(&records);

        // "Email" and "Cloud & AI Solutions" sort first and become references.
        assert_eq!(matrix.reference_levels["traffic_source"], "Email");
        assert_eq!(matrix.reference_levels["business_unit"], "Cloud & AI Solutions");
        assert_eq!(
            matrix.columns,
            vec![
                "traffic_source_Referral",
                "traffic_source_Web",
                "business_unit_Enterprise Solutions",
            ]
        );
    }

    #[test]
    fn test_indicator_sum_per_field_is_at_most_one() {
        let records = vec![
            record("Web", "Enterprise Solutions"),
            record("Referral", "Cloud & AI Solutions"),
            record("Email", "Enterprise Solutions"),
            record("Web", "Cloud & AI Solutions"),
        ];
        let matrix = encode_categoricals(&records);

        for row in 0..matrix.n_rows() {
            for field in [TRAFFIC_SOURCE_FIELD, BUSINESS_UNIT_FIELD] {
                let prefix = format!("{field}_");
                let sum: f64 = matrix
                    .columns
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| c.starts_with(&prefix))
                    .map(|(i, _)| matrix.data[[row, i]])
                    .sum();
                assert!(sum == 0.0 || sum == 1.0, "row {row} field {field} sum {sum}");
            }
        }
    }

    #[test]
    fn test_reference_rows_are_all_zero_in_their_block() {
        let records = vec![record("Email", "Cloud & AI Solutions"), record("Web", "Enterprise Solutions")];
        let matrix = encode_categoricals(&records);

        // Row 0 holds both reference levels, so it is entirely zero.
        assert!(matrix.data.row(0).iter().all(|&v| v == 0.0));
        assert!(matrix.data.row(1).iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_drop_constant_columns_removes_degenerate_indicators() {
        let records = vec![
            record("Web", "Enterprise Solutions"),
            record("Email", "Enterprise Solutions"),
            record("Web", "Cloud & AI Solutions"),
        ];
        let mut matrix = encode_categoricals(&records);
        // Force the unit indicator constant, as filtering to one unit does.
        matrix.data[[2, 1]] = 1.0;

        let reduced = matrix.drop_constant_columns();
        assert!(reduced.columns.contains(&"traffic_source_Web".to_string()));
        assert!(!reduced
            .columns
            .iter()
            .any(|c| c == "business_unit_Enterprise Solutions"));
        assert_eq!(reduced.n_rows(), 3);
    }

    #[test]
    fn test_single_level_field_contributes_no_columns() {
        let records = vec![record("Web", "Enterprise Solutions"), record("Web", "Enterprise Solutions")];
        let matrix = encode_categoricals(&records);
        assert!(matrix.columns.is_empty());
        assert_eq!(matrix.n_rows(), 2);
    }
}
