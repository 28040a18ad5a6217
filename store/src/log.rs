//! In-memory history backed by daily JSON files.

use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use tracing::{error, info, warn};

use rlusd_types::params::LOG_CAPACITY;

use crate::error::StoreError;
use crate::record::{RecordConfig, RecordKind, TransactionRecord};

/// Daily files read back on startup.
pub const RECENT_DAYS: usize = 7;
/// Records returned by a query with no explicit limit.
pub const DEFAULT_QUERY_LIMIT: usize = 50;

const FILE_SUFFIX: &str = "-transactions.json";

/// Filter for [`TransactionLog::query`].
#[derive(Clone, Debug)]
pub struct LogQuery {
    /// Exact record type, compared as text so unknown names match nothing.
    pub kind: Option<String>,
    /// Prefix of the RFC 3339 timestamp, usually `YYYY-MM-DD`.
    pub date: Option<String>,
    pub limit: usize,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            kind: None,
            date: None,
            limit: DEFAULT_QUERY_LIMIT,
        }
    }
}

pub struct TransactionLog {
    logs_dir: PathBuf,
    capacity: usize,
    history: Mutex<VecDeque<TransactionRecord>>,
    last_id: AtomicI64,
    file_lock: tokio::sync::Mutex<()>,
}

impl TransactionLog {
    pub fn new(logs_dir: impl Into<PathBuf>) -> Self {
        Self::with_capacity(logs_dir, LOG_CAPACITY)
    }

    pub fn with_capacity(logs_dir: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            logs_dir: logs_dir.into(),
            capacity,
            history: Mutex::new(VecDeque::with_capacity(capacity)),
            last_id: AtomicI64::new(0),
            file_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    /// Append a record to the history and to today's file.
    ///
    /// The record is returned even when the file could not be written.
    pub async fn record(
        &self,
        kind: RecordKind,
        config: RecordConfig,
        details: Map<String, Value>,
        success: bool,
    ) -> TransactionRecord {
        let timestamp = Utc::now();
        let record = TransactionRecord {
            id: self.next_id(timestamp.timestamp_millis()).to_string(),
            timestamp,
            kind,
            success,
            config,
            details,
        };

        {
            let mut history = self.lock_history();
            history.push_front(record.clone());
            history.truncate(self.capacity);
        }

        if let Err(e) = self.append_to_file(&record).await {
            error!(error = %e, record = %record.id, "failed to write transaction log file");
        }
        record
    }

    /// Ids are millisecond timestamps, bumped to stay strictly increasing.
    fn next_id(&self, millis: i64) -> i64 {
        let mut current = self.last_id.load(Ordering::Relaxed);
        loop {
            let next = millis.max(current + 1);
            match self
                .last_id
                .compare_exchange(current, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => current = actual,
            }
        }
    }

    fn file_for(&self, day: &str) -> PathBuf {
        self.logs_dir.join(format!("{day}{FILE_SUFFIX}"))
    }

    async fn append_to_file(&self, record: &TransactionRecord) -> Result<(), StoreError> {
        let _guard = self.file_lock.lock().await;
        tokio::fs::create_dir_all(&self.logs_dir)
            .await
            .map_err(|e| StoreError::io(&self.logs_dir, e))?;
        let path = self.file_for(&record.day());
        let mut daily: Vec<Value> = match tokio::fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(daily) => daily,
                Err(e) => {
                    self.set_aside(&path, &e).await?;
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        daily.push(serde_json::to_value(record)?);
        let body = serde_json::to_string_pretty(&daily)?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| StoreError::io(&path, e))
    }

    /// Move an unparseable daily file out of the way so the day starts fresh.
    /// The new name no longer ends in the daily suffix, so loading skips it.
    async fn set_aside(&self, path: &Path, cause: &serde_json::Error) -> Result<(), StoreError> {
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%3fZ");
        let mut aside = path.as_os_str().to_owned();
        aside.push(format!(".corrupt-{stamp}"));
        let aside = PathBuf::from(aside);
        tokio::fs::rename(path, &aside)
            .await
            .map_err(|e| StoreError::io(path, e))?;
        warn!(
            file = %path.display(),
            moved_to = %aside.display(),
            error = %cause,
            "daily log file is corrupt; starting a new one"
        );
        Ok(())
    }

    /// Replace the history with the newest records of the last `days` files.
    ///
    /// Unreadable files are skipped with a warning. A missing directory
    /// yields an empty history.
    pub async fn load_recent(&self, days: usize) -> Result<usize, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.logs_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(StoreError::io(&self.logs_dir, e)),
        };
        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&self.logs_dir, e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(FILE_SUFFIX) {
                files.push(name);
            }
        }
        files.sort();
        let start = files.len().saturating_sub(days);

        let mut loaded = Vec::new();
        for name in &files[start..] {
            let path = self.logs_dir.join(name);
            let parsed = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| StoreError::io(&path, e))
                .and_then(|content| {
                    serde_json::from_str::<Vec<TransactionRecord>>(&content).map_err(Into::into)
                });
            match parsed {
                Ok(records) => loaded.extend(records),
                Err(e) => warn!(file = %name, error = %e, "skipping unreadable log file"),
            }
        }
        loaded.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        loaded.truncate(self.capacity);

        if let Some(newest) = loaded.iter().filter_map(|r| r.id.parse::<i64>().ok()).max() {
            self.last_id.fetch_max(newest, Ordering::Relaxed);
        }
        let count = loaded.len();
        *self.lock_history() = loaded.into();
        info!(count, dir = %self.logs_dir.display(), "loaded historical logs");
        Ok(count)
    }

    /// Records matching `query`, newest first.
    pub fn query(&self, query: &LogQuery) -> Vec<TransactionRecord> {
        self.lock_history()
            .iter()
            .filter(|r| query.kind.as_deref().map_or(true, |k| r.kind.as_str() == k))
            .filter(|r| {
                query
                    .date
                    .as_deref()
                    .map_or(true, |d| r.timestamp_text().starts_with(d))
            })
            .take(query.limit)
            .cloned()
            .collect()
    }

    /// Every record in memory, newest first.
    pub fn snapshot(&self) -> Vec<TransactionRecord> {
        self.lock_history().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock_history().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_history(&self) -> std::sync::MutexGuard<'_, VecDeque<TransactionRecord>> {
        self.history.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
