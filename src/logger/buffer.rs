//! Recent-log buffer module
//!
//! Bounded in-memory buffer of recent log records whose JSON snapshot
//! backs the debug logs endpoint. The buffer guards itself with a mutex;
//! appends drop the oldest record once the capacity is reached.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::Local;
use serde::Serialize;

/// One retained log record.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    /// RFC 3339 local timestamp
    pub time: String,
    /// Log level tag (INFO, WARN, ERROR)
    pub level: String,
    pub message: String,
}

/// Bounded buffer of the most recent log records.
pub struct DebugAppender {
    capacity: usize,
    records: Mutex<VecDeque<LogRecord>>,
}

impl DebugAppender {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Retain a record, evicting the oldest when full.
    pub fn append(&self, level: &str, message: &str) {
        let record = LogRecord {
            time: Local::now().to_rfc3339(),
            level: level.to_string(),
            message: message.to_string(),
        };
        if let Ok(mut records) = self.records.lock() {
            if records.len() == self.capacity {
                records.pop_front();
            }
            records.push_back(record);
        }
    }

    /// Snapshot the buffered records as a JSON array string.
    #[must_use]
    pub fn snapshot_json(&self) -> String {
        let records: Vec<LogRecord> = match self.records.lock() {
            Ok(records) => records.iter().cloned().collect(),
            Err(_) => Vec::new(),
        };
        serde_json::to_string(&records).unwrap_or_else(|_| "[]".to_string())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().map_or(0, |records| records.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
