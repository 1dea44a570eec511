use crate::cache::entry::ImageCacheEntry;
use crate::cache::key::FrameKey;
use crate::cache::params::FrameParams;
use crate::foundation::error::FramevaultResult;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Cache budget configuration.
#[derive(Debug, Clone, Copy)]
pub struct FrameCacheOpts {
    /// Maximum payload bytes retained across all entries. Eviction
    /// runs on insert until the total is back under this budget.
    pub max_bytes: u64,
}

impl Default for FrameCacheOpts {
    fn default() -> Self {
        Self {
            max_bytes: 1024 * 1024 * 1024,
        }
    }
}

/// Cache counters, observable at any time.
#[derive(Debug, Default, Clone)]
pub struct FrameCacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that found nothing (or mismatched keys).
    pub misses: u64,
    /// Entries dropped by the eviction loop.
    pub evictions: u64,
    /// Entries currently retained.
    pub retained_entries: usize,
    /// Payload bytes currently retained.
    pub retained_bytes: u64,
}

/// One cached frame: its value metadata plus the tiled pixel payload.
#[derive(Debug)]
pub struct CachedFrame {
    params: FrameParams,
    image: Mutex<ImageCacheEntry>,
}

impl CachedFrame {
    /// Pair params with their pixel payload.
    pub fn new(params: FrameParams, image: ImageCacheEntry) -> Self {
        Self {
            params,
            image: Mutex::new(image),
        }
    }

    /// Value metadata of the entry.
    pub fn params(&self) -> &FrameParams {
        &self.params
    }

    /// The pixel payload. Locked per access; population and reads
    /// happen tile-wise through [`ImageCacheEntry`].
    pub fn image(&self) -> &Mutex<ImageCacheEntry> {
        &self.image
    }
}

struct StoredEntry {
    key: FrameKey,
    bytes: u64,
    cost: i64,
    last_access: u64,
    frame: Arc<CachedFrame>,
}

#[derive(Default)]
struct CacheState {
    stats: FrameCacheStats,
    access_counter: u64,
    total_bytes: u64,
    // Hash buckets; a bucket with more than one entry is a 64-bit
    // collision, resolved by full key equality.
    buckets: HashMap<u64, SmallVec<[StoredEntry; 1]>>,
}

/// In-memory index of cached frames, addressed by [`FrameKey`].
///
/// The key's 64-bit hash is the index; identity is decided by full
/// key equality, so colliding keys coexist in one bucket. Eviction
/// drops the cheapest (`cost`, then least recently used) entries
/// until the byte budget holds, using the params' hints.
pub struct FrameCache {
    opts: FrameCacheOpts,
    state: Mutex<CacheState>,
}

impl FrameCache {
    /// Empty cache with the given budget.
    pub fn new(opts: FrameCacheOpts) -> Self {
        Self {
            opts,
            state: Mutex::new(CacheState::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheState> {
        self.state.lock().expect("frame cache poisoned")
    }

    fn entry_bytes(frame: &CachedFrame) -> u64 {
        frame.params().base().elements_count()
            * frame.params().bit_depth().component_bytes() as u64
    }

    fn find_in_bucket(st: &mut CacheState, hash: u64, key: &FrameKey) -> Option<Arc<CachedFrame>> {
        st.access_counter += 1;
        let counter = st.access_counter;
        let bucket = st.buckets.get_mut(&hash)?;
        let entry = bucket.iter_mut().find(|e| e.key == *key)?;
        entry.last_access = counter;
        Some(entry.frame.clone())
    }

    fn evict_over_budget(&self, st: &mut CacheState) {
        while st.total_bytes > self.opts.max_bytes {
            let victim = st
                .buckets
                .iter()
                .flat_map(|(h, bucket)| bucket.iter().map(move |e| (*h, e)))
                .min_by_key(|(_, e)| (e.cost, e.last_access))
                .map(|(h, e)| (h, e.key.clone()));
            let Some((hash, key)) = victim else { break };
            if let Some(bucket) = st.buckets.get_mut(&hash) {
                if let Some(pos) = bucket.iter().position(|e| e.key == key) {
                    let removed = bucket.swap_remove(pos);
                    st.total_bytes = st.total_bytes.saturating_sub(removed.bytes);
                    st.stats.evictions += 1;
                    st.stats.retained_entries -= 1;
                    tracing::debug!(
                        bytes = removed.bytes,
                        cost = removed.cost,
                        total_bytes = st.total_bytes,
                        "evicted cache entry"
                    );
                }
                if bucket.is_empty() {
                    st.buckets.remove(&hash);
                }
            }
        }
        st.stats.retained_bytes = st.total_bytes;
    }

    fn insert_locked(
        &self,
        st: &mut CacheState,
        hash: u64,
        key: FrameKey,
        frame: Arc<CachedFrame>,
    ) {
        let bytes = Self::entry_bytes(&frame);
        let cost = frame.params().base().cost();
        st.access_counter += 1;
        let entry = StoredEntry {
            key,
            bytes,
            cost,
            last_access: st.access_counter,
            frame,
        };
        let bucket = st.buckets.entry(hash).or_default();
        if let Some(pos) = bucket.iter().position(|e| e.key == entry.key) {
            let old = std::mem::replace(&mut bucket[pos], entry);
            st.total_bytes = st.total_bytes.saturating_sub(old.bytes);
        } else {
            bucket.push(entry);
            st.stats.retained_entries += 1;
        }
        st.total_bytes += bytes;
        self.evict_over_budget(st);
    }

    /// Look up a frame, bumping its recency on a hit.
    pub fn get(&self, key: &FrameKey) -> Option<Arc<CachedFrame>> {
        let hash = key.hash();
        let mut st = self.lock();
        match Self::find_in_bucket(&mut st, hash, key) {
            Some(frame) => {
                st.stats.hits += 1;
                Some(frame)
            }
            None => {
                st.stats.misses += 1;
                None
            }
        }
    }

    /// Insert (or replace) the frame stored under `key`, then evict
    /// until the byte budget holds.
    pub fn insert(&self, key: FrameKey, frame: Arc<CachedFrame>) {
        let hash = key.hash();
        let mut st = self.lock();
        self.insert_locked(&mut st, hash, key, frame);
    }

    /// Find-or-create under one critical section: concurrent callers
    /// with the same key converge on one stored frame.
    pub fn get_or_insert_with(
        &self,
        key: &FrameKey,
        create: impl FnOnce() -> FramevaultResult<CachedFrame>,
    ) -> FramevaultResult<Arc<CachedFrame>> {
        let hash = key.hash();
        let mut st = self.lock();
        if let Some(frame) = Self::find_in_bucket(&mut st, hash, key) {
            st.stats.hits += 1;
            return Ok(frame);
        }
        st.stats.misses += 1;
        let frame = Arc::new(create()?);
        self.insert_locked(&mut st, hash, key.clone(), frame.clone());
        Ok(frame)
    }

    /// Drop the entry stored under `key`, returning it.
    pub fn remove(&self, key: &FrameKey) -> Option<Arc<CachedFrame>> {
        let hash = key.hash();
        let mut st = self.lock();
        let bucket = st.buckets.get_mut(&hash)?;
        let pos = bucket.iter().position(|e| e.key == *key)?;
        let removed = bucket.swap_remove(pos);
        if bucket.is_empty() {
            st.buckets.remove(&hash);
        }
        st.total_bytes = st.total_bytes.saturating_sub(removed.bytes);
        st.stats.retained_entries -= 1;
        st.stats.retained_bytes = st.total_bytes;
        Some(removed.frame)
    }

    /// Drop every entry, keeping the hit/miss counters.
    pub fn clear(&self) {
        let mut st = self.lock();
        st.buckets.clear();
        st.total_bytes = 0;
        st.stats.retained_entries = 0;
        st.stats.retained_bytes = 0;
    }

    /// Current counters.
    pub fn stats(&self) -> FrameCacheStats {
        let mut st = self.lock();
        st.stats.retained_bytes = st.total_bytes;
        st.stats.clone()
    }
}
