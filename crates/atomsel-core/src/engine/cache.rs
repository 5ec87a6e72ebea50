use super::mask::Mask;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Default)]
struct CacheState {
    version: Option<u64>,
    entries: HashMap<String, Mask>,
}

/// Hit and miss counters of a [`SelectionCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Masks keyed by (canonical sub-expression, system version).
///
/// The cache holds entries for one version at a time: touching it with a
/// different version drops every entry first. It is advisory, so evaluation
/// gives identical results with or without it. Concurrent inserts of one key
/// are idempotent since every writer computed the same mask.
#[derive(Debug, Default)]
pub struct SelectionCache {
    state: RwLock<CacheState>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SelectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached mask for `key` at `version`, if any.
    pub fn get(&self, key: &str, version: u64) -> Option<Mask> {
        let found = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            if state.version == Some(version) {
                Some(state.entries.get(key).cloned())
            } else {
                None
            }
        };
        match found {
            Some(Some(mask)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(mask)
            }
            Some(None) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.reset_to(version);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn insert(&self, key: String, version: u64, mask: Mask) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.version != Some(version) {
            state.entries.clear();
            state.version = Some(version);
        }
        state.entries.insert(key, mask);
    }

    fn reset_to(&self, version: u64) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.version != Some(version) {
            state.entries.clear();
            state.version = Some(version);
        }
    }

    pub fn clear(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.entries.clear();
        state.version = None;
    }

    /// Version the current entries belong to.
    pub fn version(&self) -> Option<u64> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .version
    }

    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
