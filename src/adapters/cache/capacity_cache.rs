use std::num::NonZeroUsize;
use std::sync::RwLock;

use chrono::NaiveDate;
use lru::LruCache;

use crate::domain::occupancy::DayCapacity;
use crate::ports::capacity_cache::CapacityCache;

const FALLBACK_ENTRIES: NonZeroUsize = NonZeroUsize::new(100).unwrap();

/// LRU of computed day capacities keyed by `(snapshot generation, date)`.
///
/// Entries never expire; every installed snapshot carries a fresh generation,
/// so stale entries are simply never asked for again and age out.
pub struct LruCapacityCache {
    inner: RwLock<LruCache<(u64, NaiveDate), DayCapacity>>,
}

impl LruCapacityCache {
    pub fn new(max_entries: usize) -> Self {
        let cap = NonZeroUsize::new(max_entries).unwrap_or_else(|| {
            tracing::warn!("Cache max_entries was 0, defaulting to 100");
            FALLBACK_ENTRIES
        });
        Self {
            inner: RwLock::new(LruCache::new(cap)),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().map_or(0, |cache| cache.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CapacityCache for LruCapacityCache {
    fn get(&self, generation: u64, date: NaiveDate) -> Option<DayCapacity> {
        let mut cache = self.inner.write().map_or_else(
            |_| {
                tracing::error!(%date, "Capacity cache lock poisoned on get, returning miss");
                None
            },
            Some,
        )?;
        cache.get(&(generation, date)).cloned()
    }

    fn set(&self, generation: u64, date: NaiveDate, capacity: &DayCapacity) {
        if let Ok(mut cache) = self.inner.write() {
            cache.put((generation, date), capacity.clone());
        } else {
            tracing::error!(%date, "Capacity cache lock poisoned on set, skipping write");
        }
    }
}
