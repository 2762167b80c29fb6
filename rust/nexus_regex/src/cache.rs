//! Compiled-pattern cache.
//!
//! Hosts that compile the same handful of patterns over and over (the usual
//! case for a scripting-language binding) share one [`PatternCache`]. Entries
//! are `Arc<CompiledPattern>`, so an evicted pattern stays alive until its last
//! user drops it and the engine allocation is still freed exactly once.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use crate::compile::{CompiledPattern, PatternBuilder};
use crate::error::Result;

/// Default number of cached patterns.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    pattern: Vec<u8>,
    builder: PatternBuilder,
}

/// Hit/miss counters and current size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub capacity: usize,
}

/// Thread-safe LRU cache of compiled patterns.
pub struct PatternCache {
    entries: Mutex<LruCache<CacheKey, Arc<CompiledPattern>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl PatternCache {
    /// Cache holding at most `capacity` patterns (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cached pattern for (`pattern`, `builder` settings), compiling on miss.
    ///
    /// Compilation runs outside the lock; two threads missing on the same key
    /// both compile and the later insert wins. Compile errors are not cached.
    pub fn get_or_compile(
        &self,
        builder: &PatternBuilder,
        pattern: &[u8],
    ) -> Result<Arc<CompiledPattern>> {
        let key = CacheKey {
            pattern: pattern.to_vec(),
            builder: *builder,
        };
        if let Some(hit) = self.entries.lock().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(hit));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let compiled = Arc::new(builder.build(pattern)?);
        if let Some((evicted, _)) = self
            .entries
            .lock()
            .push(key, Arc::clone(&compiled))
            .filter(|(k, _)| k.pattern != pattern || k.builder != *builder)
        {
            tracing::trace!(pattern_len = evicted.pattern.len(), "evicted cached pattern");
        }
        Ok(compiled)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            len: entries.len(),
            capacity: entries.cap().get(),
        }
    }
}
