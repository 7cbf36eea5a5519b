use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::debug;

use super::raw_table::RawTable;
use super::source::SourceDescriptor;

/// A fetched table and when it was fetched.
#[derive(Debug, Clone)]
pub struct CachedTable {
    pub table: Arc<RawTable>,
    pub fetched_at: Instant,
}

/// Short-lived cache of fetched raw tables, keyed by source descriptor.
///
/// Entries older than the TTL are stale and trigger a refetch. Concurrent
/// misses for the same source may both fetch; the last store wins.
#[derive(Debug)]
pub struct FetchCache {
    ttl: Duration,
    entries: Mutex<HashMap<SourceDescriptor, CachedTable>>,
}

impl FetchCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// A cache that never serves an entry.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached table for `source` if it is still fresh at `now`.
    pub fn get_fresh(&self, source: &SourceDescriptor, now: Instant) -> Option<Arc<RawTable>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let entry = entries.get(source)?;
        let age = now.saturating_duration_since(entry.fetched_at);
        if age < self.ttl {
            Some(Arc::clone(&entry.table))
        } else {
            debug!(feed = %source.name, age_ms = age.as_millis() as u64, "cached table is stale");
            None
        }
    }

    pub fn store(&self, source: &SourceDescriptor, table: Arc<RawTable>, fetched_at: Instant) {
        if self.ttl.is_zero() {
            return;
        }
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(source.clone(), CachedTable { table, fetched_at });
    }

    pub fn invalidate(&self, source: &SourceDescriptor) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(source);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
