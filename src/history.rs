//! Test History
//!
//! Completed tests are appended to a JSON list stored under a single
//! key-value entry. Reads treat a missing key as an empty list.

use crate::error::{LingoError, LingoResult};
use crate::session::test::{percentage, TestMode, TestQuestion};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Storage key for the result list
pub const HISTORY_KEY: &str = "lingochamp.testResults";

/// Where an unreadable result list is kept before a new one is started
pub const HISTORY_BACKUP_KEY: &str = "lingochamp.testResults.corrupt";

/// One completed test. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub mode: TestMode,
    pub questions: Vec<TestQuestion>,
    pub score: u32,
    pub max_score: u32,
    pub percentage: u32,
    pub completed_at: DateTime<Utc>,
}

impl TestResult {
    pub fn new(
        mode: TestMode,
        questions: Vec<TestQuestion>,
        score: u32,
        max_score: u32,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            mode,
            questions,
            score,
            max_score,
            percentage: percentage(score, max_score),
            completed_at,
        }
    }
}

/// Minimal string key-value store
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> LingoResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> LingoResult<()>;
}

/// Stores each key as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> LingoResult<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(LingoError::Storage(format!("invalid key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> LingoResult<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> LingoResult<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;

        // Write then rename so a crash never leaves a half-written list
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> LingoResult<Option<String>> {
        Ok(self.entries.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> LingoResult<()> {
        self.entries.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Persisted list of test results
pub struct History<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> History<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All stored results, oldest first
    pub fn load(&self) -> LingoResult<Vec<TestResult>> {
        match self.store.get(HISTORY_KEY)? {
            None => Ok(Vec::new()),
            Some(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Some(raw) => Ok(serde_json::from_str(&raw)?),
        }
    }

    /// Read-modify-write append. An unreadable list is copied to
    /// [`HISTORY_BACKUP_KEY`] and a new list is started.
    pub fn append(&self, result: &TestResult) -> LingoResult<usize> {
        let mut results: Vec<TestResult> = match self.store.get(HISTORY_KEY)? {
            None => Vec::new(),
            Some(raw) if raw.trim().is_empty() => Vec::new(),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(results) => results,
                Err(e) => {
                    warn!(
                        "⚠️ Test history unreadable, backing it up and starting a new list: {}",
                        e
                    );
                    self.store.set(HISTORY_BACKUP_KEY, &raw)?;
                    Vec::new()
                }
            },
        };
        results.push(result.clone());
        let raw = serde_json::to_string(&results)?;
        self.store.set(HISTORY_KEY, &raw)?;
        info!(
            "💾 Saved {} test result ({}%), {} total",
            result.mode,
            result.percentage,
            results.len()
        );
        Ok(results.len())
    }

    /// Most recent result, if any
    pub fn latest(&self) -> LingoResult<Option<TestResult>> {
        let results = self.load()?;
        debug!("History holds {} results", results.len());
        Ok(results.into_iter().last())
    }
}
