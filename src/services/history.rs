use crate::models::SearchRecord;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Fire-and-forget sink for search history
///
/// Failures on the sink side must never affect the search response, so
/// the contract has no error channel.
pub trait HistorySink: Send + Sync {
    fn record(&self, record: SearchRecord);
}

/// Bounded in-memory history, newest first on read
pub struct InMemoryHistory {
    entries: Mutex<VecDeque<SearchRecord>>,
    capacity: usize,
}

impl InMemoryHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Latest records, most recent first
    pub fn recent(&self, limit: usize) -> Vec<SearchRecord> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.iter().rev().take(limit).cloned().collect()
    }
}

impl HistorySink for InMemoryHistory {
    fn record(&self, record: SearchRecord) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(record);
    }
}
