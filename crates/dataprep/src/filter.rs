//! Business-unit filtering of the encoded dataset.

use crate::encode::EncodedFeatureMatrix;
use insight_core::{InsightError, InsightResult, OutcomeLabel};
use ndarray::Array2;
use std::collections::BTreeSet;
use tracing::debug;

/// Retain only rows whose business unit is in `selected`, keeping labels
/// aligned. An empty selection yields an empty dataset; downstream sections
/// are expected to degrade, not error. Errors only when `labels` and the
/// matrix rows disagree in length.
pub fn filter_by_business_unit(
    matrix: &EncodedFeatureMatrix,
    labels: &[OutcomeLabel],
    selected: &BTreeSet<String>,
) -> InsightResult<(EncodedFeatureMatrix, Vec<OutcomeLabel>)> {
    if matrix.n_rows() != labels.len() {
        return Err(InsightError::Internal(anyhow::anyhow!(
            "matrix has {} rows but {} labels were supplied",
            matrix.n_rows(),
            labels.len()
        )));
    }

    let keep: Vec<usize> = matrix
        .row_units
        .iter()
        .enumerate()
        .filter(|(_, unit)| selected.contains(*unit))
        .map(|(i, _)| i)
        .collect();

    let mut data = Array2::zeros((keep.len(), matrix.data.ncols()));
    for (out_row, &in_row) in keep.iter().enumerate() {
        data.row_mut(out_row).assign(&matrix.data.row(in_row));
    }

    debug!(kept = keep.len(), total = matrix.n_rows(), "applied business-unit filter");

    Ok((
        EncodedFeatureMatrix {
            columns: matrix.columns.clone(),
            data,
            reference_levels: matrix.reference_levels.clone(),
            row_units: keep.iter().map(|&i| matrix.row_units[i].clone()).collect(),
            row_sources: keep.iter().map(|&i| matrix.row_sources[i].clone()).collect(),
        },
        keep.iter().map(|&i| labels[i]).collect(),
    ))
}
