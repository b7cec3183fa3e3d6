use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::entry::LogEntry;
use crate::error::StoreError;

/// Key under which entries are stored
pub const LOGS_KEY: &str = "exchangeLogs";

/// Key used by browser-extension exports, read as a fallback
pub const LEGACY_LOGS_KEY: &str = "chatgptLogs";

/// Persistence for the exchange log
pub trait LogStore {
    fn load(&self) -> Result<Vec<LogEntry>, StoreError>;
    fn save(&mut self, entries: &[LogEntry]) -> Result<(), StoreError>;
}

/// Volatile store, mainly for tests and one-shot runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Vec<LogEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogStore for MemoryStore {
    fn load(&self) -> Result<Vec<LogEntry>, StoreError> {
        Ok(self.entries.clone())
    }

    fn save(&mut self, entries: &[LogEntry]) -> Result<(), StoreError> {
        self.entries = entries.to_vec();
        Ok(())
    }
}

#[derive(Serialize)]
struct StoreDocument<'a> {
    #[serde(rename = "exchangeLogs")]
    logs: &'a [LogEntry],
    version: String,
}

/// JSON document on disk: `{ "exchangeLogs": [...], "version": "..." }`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_document(&self, entries: &[LogEntry]) -> Result<(), StoreError> {
        let doc = StoreDocument {
            logs: entries,
            version: env!("CARGO_PKG_VERSION").to_string(),
        };
        let json = serde_json::to_string_pretty(&doc)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl LogStore for JsonFileStore {
    fn load(&self) -> Result<Vec<LogEntry>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No log store at {}, starting fresh", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut doc: Value = serde_json::from_str(&contents)?;
        let logs = match doc.get_mut(LOGS_KEY) {
            Some(logs) => logs.take(),
            None => doc.get_mut(LEGACY_LOGS_KEY).map(Value::take).unwrap_or(Value::Null),
        };

        if !logs.is_array() {
            log::warn!(
                "Invalid logs format in {}, repairing with an empty log",
                self.path.display()
            );
            self.write_document(&[])?;
            return Ok(Vec::new());
        }

        let entries: Vec<LogEntry> = serde_json::from_value(logs)?;
        log::info!("Loaded {} logs from {}", entries.len(), self.path.display());
        Ok(entries)
    }

    fn save(&mut self, entries: &[LogEntry]) -> Result<(), StoreError> {
        self.write_document(entries)?;
        log::debug!("Saved {} logs to {}", entries.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::EstimateResult;
    use crate::exchange::Exchange;

    fn sample_entries() -> Vec<LogEntry> {
        vec![
            LogEntry::new(&Exchange::new("one", "first"), 1, EstimateResult {
                total_energy_wh: 0.5,
                ..Default::default()
            }),
            LogEntry::new(&Exchange::new("two", "second"), 2, EstimateResult {
                total_energy_wh: 0.25,
                ..Default::default()
            }),
        ]
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert!(store.load().unwrap().is_empty());
        store.save(&sample_entries()).unwrap();
        assert_eq!(store.load().unwrap(), sample_entries());
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("logs.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("nested").join("logs.json"));
        store.save(&sample_entries()).unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert!(raw[LOGS_KEY].is_array());
        assert_eq!(raw["version"], env!("CARGO_PKG_VERSION"));

        assert_eq!(store.load().unwrap(), sample_entries());
    }

    #[test]
    fn test_file_store_repairs_invalid_logs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.json");
        fs::write(&path, r#"{"exchangeLogs": {"not": "an array"}}"#).unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.load().unwrap().is_empty());

        let repaired: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(repaired[LOGS_KEY], Value::Array(Vec::new()));
    }

    #[test]
    fn test_file_store_reads_extension_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        fs::write(
            &path,
            r#"{"chatgptLogs": [{"timestamp": 1, "userMessage": "hi", "energyUsage": 0.01}],
                "extensionVersion": "1.4"}"#,
        )
        .unwrap();

        let entries = JsonFileStore::new(&path).load().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].energy_wh(), 0.01);
    }

    #[test]
    fn test_file_store_tolerates_entry_without_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.json");
        fs::write(
            &path,
            r#"{"exchangeLogs": [{"timestamp": 7, "energyUsage": 0.2}, {"userMessage": "no time", "energyUsage": 0.3}]}"#,
        )
        .unwrap();

        let entries = JsonFileStore::new(&path).load().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].timestamp, 0);
        assert_eq!(entries[1].energy_wh(), 0.3);
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(JsonFileStore::new(&path).load(), Err(StoreError::Json(_))));
    }
}
