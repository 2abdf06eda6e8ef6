//! CSV loading with Latin-1 decoding and outcome-label derivation.

use chrono::{NaiveDate, NaiveDateTime};
use insight_core::config::ColumnsConfig;
use insight_core::{InsightError, InsightResult, OpportunityRecord, OutcomeLabel};
use std::path::Path;
use tracing::{debug, info, warn};

/// Decode a Latin-1 (ISO-8859-1) byte stream into a `String`. Every byte
/// maps 1:1 onto the Unicode code point with the same value, so the decode
/// cannot fail; this keeps accented characters in the CRM export intact.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Date formats seen in CRM exports, tried in order. Unparsable values
/// become `None` rather than failing the load.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%d/%m/%Y %H:%M"];

fn parse_creation_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Load opportunity records from a Latin-1 encoded delimited file.
///
/// Fails with [`InsightError::DataLoad`] when the file is missing or a row
/// is structurally malformed, and with [`InsightError::Schema`] when a
/// required column is absent from the header.
pub fn load_records(
    path: impl AsRef<Path>,
    columns: &ColumnsConfig,
) -> InsightResult<Vec<OpportunityRecord>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| InsightError::DataLoad(format!("cannot read {}: {e}", path.display())))?;
    let decoded = decode_latin1(&bytes);

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(decoded.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| InsightError::DataLoad(format!("unreadable header: {e}")))?
        .clone();

    let col_index = |name: &str| headers.iter().position(|h| h == name);
    let stage_idx = col_index(&columns.stage).ok_or_else(|| InsightError::Schema(columns.stage.clone()))?;
    let source_idx = col_index(&columns.traffic_source)
        .ok_or_else(|| InsightError::Schema(columns.traffic_source.clone()))?;
    let unit_idx = col_index(&columns.business_unit)
        .ok_or_else(|| InsightError::Schema(columns.business_unit.clone()))?;
    let created_idx = col_index(&columns.created);
    if created_idx.is_none() {
        debug!(column = %columns.created, "creation-date column absent, time series will be empty");
    }

    let mut records = Vec::new();
    let mut unparsed_dates = 0usize;
    for (row, result) in reader.records().enumerate() {
        let record = result
            .map_err(|e| InsightError::DataLoad(format!("malformed row {}: {e}", row + 2)))?;

        let created = created_idx.and_then(|i| record.get(i)).and_then(|raw| {
            let parsed = parse_creation_date(raw);
            if parsed.is_none() && !raw.trim().is_empty() {
                unparsed_dates += 1;
            }
            parsed
        });

        let interpreted = [stage_idx, source_idx, unit_idx];
        let extra = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !interpreted.contains(i) && Some(*i) != created_idx)
            .filter_map(|(i, h)| record.get(i).map(|v| (h.to_string(), v.to_string())))
            .collect();

        records.push(OpportunityRecord {
            stage: record.get(stage_idx).unwrap_or_default().to_string(),
            traffic_source: record.get(source_idx).unwrap_or_default().to_string(),
            business_unit: record.get(unit_idx).unwrap_or_default().to_string(),
            created,
            extra,
        });
    }

    if unparsed_dates > 0 {
        warn!(count = unparsed_dates, "creation dates failed to parse and were treated as missing");
    }
    info!(path = %path.display(), rows = records.len(), "loaded opportunity records");
    Ok(records)
}

/// Derive the binary outcome label for every record.
pub fn derive_outcomes(records: &[OpportunityRecord], won_marker: &str) -> Vec<OutcomeLabel> {
    records
        .iter()
        .map(|r| OutcomeLabel::from_stage(&r.stage, won_marker))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use insight_core::config::ColumnsConfig;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_fixture(name: &str, bytes: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("insight-loader-{name}-{}.csv", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    fn spanish_columns() -> ColumnsConfig {
        ColumnsConfig::default()
    }

    // 1. Latin-1 decoding --------------------------------------------------

    #[test]
    fn test_loads_latin1_accented_values() {
        // "Promoción" with ó as the Latin-1 byte 0xF3.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"etapa,Fuente original de trafico,Unidad de negocio asignada,Fecha de creacion\n");
        bytes.extend_from_slice(b"Ganado,Promoci\xf3n,Cloud & AI Solutions,2024-03-01\n");
        let path = write_fixture("latin1", &bytes);

        let records = load_records(&path, &spanish_columns()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].traffic_source, "Promoción");
        assert_eq!(records[0].created, Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
    }

    // 2. Schema and load failures ------------------------------------------

    #[test]
    fn test_missing_stage_column_is_schema_error() {
        let path = write_fixture(
            "noschema",
            b"Fuente original de trafico,Unidad de negocio asignada\nWeb,Enterprise Solutions\n",
        );
        let err = load_records(&path, &spanish_columns()).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, InsightError::Schema(ref c) if c == "etapa"));
    }

    #[test]
    fn test_missing_file_is_data_load_error() {
        let err = load_records("/nonexistent/insight.csv", &spanish_columns()).unwrap_err();
        assert!(matches!(err, InsightError::DataLoad(_)));
    }

    #[test]
    fn test_ragged_row_is_data_load_error() {
        let path = write_fixture(
            "ragged",
            b"etapa,Fuente original de trafico,Unidad de negocio asignada\nGanado,Web\n",
        );
        let err = load_records(&path, &spanish_columns()).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, InsightError::DataLoad(_)));
    }

    // 3. Date handling ------------------------------------------------------

    #[test]
    fn test_unparsable_date_becomes_none() {
        let path = write_fixture(
            "baddate",
            b"etapa,Fuente original de trafico,Unidad de negocio asignada,Fecha de creacion\n\
              Perdido,Web,Enterprise Solutions,not-a-date\n\
              Ganado,Web,Enterprise Solutions,15/02/2024\n",
        );
        let records = load_records(&path, &spanish_columns()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(records[0].created, None);
        assert_eq!(records[1].created, Some(NaiveDate::from_ymd_opt(2024, 2, 15).unwrap()));
    }

    // 4. Outcome derivation --------------------------------------------------

    #[test]
    fn test_derive_outcomes_matches_won_marker() {
        let path = write_fixture(
            "outcomes",
            b"etapa,Fuente original de trafico,Unidad de negocio asignada\n\
              GANADO ,Web,Enterprise Solutions\n\
              Perdido,Web,Enterprise Solutions\n",
        );
        let records = load_records(&path, &spanish_columns()).unwrap();
        std::fs::remove_file(&path).ok();

        let labels = derive_outcomes(&records, "ganado");
        assert_eq!(labels, vec![OutcomeLabel::Won, OutcomeLabel::NotWon]);
    }
}
