//! Optional memoizing loader keyed on (path, modification time).
//!
//! Nothing in the pipeline requires caching; this exists so an interactive
//! caller re-running the pipeline on every filter change does not re-read
//! an unchanged source file. Explicitly constructed, never process-global.

use crate::loader::load_records;
use dashmap::DashMap;
use insight_core::config::ColumnsConfig;
use insight_core::{InsightResult, OpportunityRecord};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

struct CacheEntry {
    modified: SystemTime,
    records: Arc<Vec<OpportunityRecord>>,
}

pub struct CachedLoader {
    entries: DashMap<PathBuf, CacheEntry>,
}

impl CachedLoader {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Load records, reusing the cached parse when the file's modification
    /// time is unchanged since the last load.
    pub fn load(
        &self,
        path: impl AsRef<Path>,
        columns: &ColumnsConfig,
    ) -> InsightResult<Arc<Vec<OpportunityRecord>>> {
        let path = path.as_ref();
        let modified = std::fs::metadata(path).and_then(|m| m.modified()).map_err(|e| {
            insight_core::InsightError::DataLoad(format!("cannot stat {}: {e}", path.display()))
        })?;

        if let Some(entry) = self.entries.get(path) {
            if entry.modified == modified {
                debug!(path = %path.display(), "load cache hit");
                return Ok(Arc::clone(&entry.records));
            }
        }

        let records = Arc::new(load_records(path, columns)?);
        self.entries.insert(
            path.to_path_buf(),
            CacheEntry {
                modified,
                records: Arc::clone(&records),
            },
        );
        Ok(records)
    }
}

impl Default for CachedLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSV: &[u8] =
        b"etapa,Fuente original de trafico,Unidad de negocio asignada\nGanado,Web,Enterprise Solutions\n";

    #[test]
    fn test_second_load_reuses_cached_records() {
        let path = std::env::temp_dir().join(format!("insight-cache-{}.csv", std::process::id()));
        std::fs::File::create(&path).unwrap().write_all(CSV).unwrap();

        let loader = CachedLoader::new();
        let columns = ColumnsConfig::default();
        let first = loader.load(&path, &columns).unwrap();
        let second = loader.load(&path, &columns).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn test_stale_mtime_triggers_reload() {
        let path = std::env::temp_dir().join(format!("insight-cache-stale-{}.csv", std::process::id()));
        std::fs::File::create(&path).unwrap().write_all(CSV).unwrap();

        let loader = CachedLoader::new();
        let columns = ColumnsConfig::default();
        let first = loader.load(&path, &columns).unwrap();

        // Force the cached entry stale instead of racing filesystem mtime
        // granularity.
        loader
            .entries
            .get_mut(&path)
            .unwrap()
            .modified = SystemTime::UNIX_EPOCH;

        let second = loader.load(&path, &columns).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_missing_file_is_data_load_error() {
        let loader = CachedLoader::new();
        let err = loader.load("/nonexistent/insight.csv", &ColumnsConfig::default()).unwrap_err();
        assert!(matches!(err, insight_core::InsightError::DataLoad(_)));
    }
}
