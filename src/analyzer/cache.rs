//! Compute-once-per-generation cache for whole-module results.
//!
//! Hosts (IDE threads, build drivers) may ask for the same result
//! concurrently. The compute path runs under a mutex: at most one
//! computation per modification count, and callers that arrive meanwhile
//! block and reuse its result.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::trace;

/// Counter bumped on every change that invalidates cached results.
#[derive(Debug, Default)]
pub struct ModificationTracker {
    count: AtomicU64,
}

impl ModificationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a modification; returns the new count.
    pub fn increment(&self) -> u64 {
        self.count.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn current(&self) -> u64 {
        self.count.load(Ordering::Acquire)
    }
}

/// A single cached value tagged with the modification count it was
/// computed for.
#[derive(Debug)]
pub struct DeclarationsCache<T> {
    slot: Mutex<Option<(u64, Arc<T>)>>,
}

impl<T> Default for DeclarationsCache<T> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl<T> DeclarationsCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The value for `count`, computing it if the cached one is missing or
    /// stale. The lock is held while `compute` runs.
    pub fn get_or_compute(&self, count: u64, compute: impl FnOnce() -> T) -> Arc<T> {
        let mut slot = self.slot.lock();
        if let Some((cached_count, value)) = slot.as_ref() {
            if *cached_count == count {
                return value.clone();
            }
        }
        trace!("[CACHE] computing for modification count {count}");
        let value = Arc::new(compute());
        *slot = Some((count, value.clone()));
        value
    }

    /// Fallible variant: an error leaves the previous entry in place.
    pub fn try_get_or_compute<E>(
        &self,
        count: u64,
        compute: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, E> {
        let mut slot = self.slot.lock();
        if let Some((cached_count, value)) = slot.as_ref() {
            if *cached_count == count {
                return Ok(value.clone());
            }
        }
        trace!("[CACHE] computing for modification count {count}");
        let value = Arc::new(compute()?);
        *slot = Some((count, value.clone()));
        Ok(value)
    }

    /// Count of the cached value, if any.
    pub fn cached_count(&self) -> Option<u64> {
        self.slot.lock().as_ref().map(|(count, _)| *count)
    }

    pub fn invalidate(&self) {
        *self.slot.lock() = None;
    }
}
