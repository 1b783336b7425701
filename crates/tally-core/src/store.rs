//! Concurrent named-counter store.
//!
//! Counts live in a sharded `DashMap`; every per-key read-modify-write runs
//! under the owning shard's lock, so concurrent increments on one key never
//! lose an update and readers never observe a half-written entry. The global
//! request counter is a separate atomic bumped once per counted call.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::error::{Result, TallyError};

/// Runtime knobs evaluated on every key-bearing call.
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// Upper bound on key length in characters. `None` = unbounded.
    pub max_key_length: Option<usize>,
}

/// Key -> count map plus the process-wide request tally.
///
/// Construct once and share via `Arc` between the request layer and the
/// health reporter.
#[derive(Debug, Default)]
pub struct CounterStore {
    counts: DashMap<String, u64>,
    requests: AtomicU64,
    opts: StoreOptions,
}

impl CounterStore {
    pub fn new(opts: StoreOptions) -> Self {
        Self {
            counts: DashMap::new(),
            requests: AtomicU64::new(0),
            opts,
        }
    }

    pub fn options(&self) -> &StoreOptions {
        &self.opts
    }

    /// Add one to `key`, creating it at 1 if absent. Returns the new count.
    pub fn increment(&self, key: &str) -> Result<u64> {
        self.count_request();
        self.validate(key)?;

        // Fast path: existing key, no allocation.
        if let Some(mut count) = self.counts.get_mut(key) {
            *count += 1;
            return Ok(*count);
        }

        let count = {
            let mut count = self.counts.entry(key.to_owned()).or_insert(0);
            *count += 1;
            *count
        };
        if count == 1 {
            tracing::trace!(key = %key, "counter created");
        }
        Ok(count)
    }

    pub fn get(&self, key: &str) -> Result<u64> {
        self.count_request();
        self.validate(key)?;

        self.counts
            .get(key)
            .map(|count| *count.value())
            .ok_or_else(|| TallyError::NotFound(key.to_owned()))
    }

    /// Copy of every (key, count) pair. Order is unspecified.
    pub fn list(&self) -> Vec<(String, u64)> {
        self.count_request();
        self.counts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    pub fn delete(&self, key: &str) -> Result<()> {
        self.count_request();
        self.validate(key)?;

        self.counts
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| TallyError::NotFound(key.to_owned()))
    }

    /// Total counted calls so far. Not itself counted.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Number of live keys. Not counted.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    fn count_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    fn validate(&self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(TallyError::InvalidKey("key must not be empty".into()));
        }
        if let Some(max) = self.opts.max_key_length {
            let len = key.chars().count();
            if len > max {
                return Err(TallyError::InvalidKey(format!(
                    "key length {len} exceeds max_key_length {max}"
                )));
            }
        }
        Ok(())
    }
}
