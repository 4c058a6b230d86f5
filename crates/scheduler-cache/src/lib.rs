//! Sharded, bounded LRU cache mapping `task_id` to its recorded [`TaskResult`].
//!
//! Ported from the sharded-mutex idiom used throughout this codebase for
//! independently-lockable partitions (see the task manager's blocking-pool dispatch):
//! `N` shards, each an exclusive-locked LRU map, selected by `hash(key) mod N`. No
//! cross-shard atomicity is needed because every operation only ever touches one key.

use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use rustc_hash::FxHasher;
use scheduler_types::TaskResult;
use tracing::trace;

/// Recommended total capacity (spec.md §6: "several thousand entries").
pub const DEFAULT_CAPACITY: usize = 4096;
/// Recommended shard count (spec.md §6: "shards >= 8").
pub const DEFAULT_SHARDS: usize = 16;

/// Read-only introspection snapshot. Never consulted for eviction or dependency-check
/// decisions; exists purely for logging/diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub shards: usize,
    pub capacity: usize,
    pub len: usize,
}

#[derive(Debug)]
struct Shard {
    entries: Mutex<LruCache<String, TaskResult>>,
}

/// Bounded, sharded, LRU-evicted store of recent task outcomes.
///
/// Cheap to clone: internally an `Arc`, so every RPC handler can hold its own `ResultCache`
/// without the execution core needing to thread a reference through.
#[derive(Debug, Clone)]
pub struct ResultCache {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    shards: Vec<Shard>,
    capacity: usize,
}

impl ResultCache {
    /// Creates a cache with the given total capacity spread evenly across `shard_count`
    /// shards. `shard_count` is expected to be a small power of two so that `hash mod N`
    /// collapses to a cheap mask, though any nonzero value works.
    pub fn new(capacity: usize, shard_count: usize) -> Self {
        let shard_count = shard_count.max(1);
        let per_shard = (capacity / shard_count).max(1);
        let per_shard_cap =
            NonZeroUsize::new(per_shard).expect("per-shard capacity must be nonzero");

        let shards = (0..shard_count)
            .map(|_| Shard { entries: Mutex::new(LruCache::new(per_shard_cap)) })
            .collect();

        Self { inner: Arc::new(Inner { shards, capacity }) }
    }

    /// Builds a cache using the spec's recommended defaults.
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_SHARDS)
    }

    fn shard_for(&self, task_id: &str) -> &Shard {
        let mut hasher = FxHasher::default();
        task_id.hash(&mut hasher);
        let index = (hasher.finish() as usize) % self.inner.shards.len();
        &self.inner.shards[index]
    }

    /// Returns the cached result for `task_id`, if any. Updates LRU recency on hit.
    pub fn get(&self, task_id: &str) -> Option<TaskResult> {
        let shard = self.shard_for(task_id);
        let result = shard.entries.lock().get(task_id).cloned();
        trace!(target: "scheduler::cache", %task_id, hit = result.is_some(), "cache get");
        result
    }

    /// Inserts or overwrites the result for `task_id`, promoting it to most-recently-used.
    /// If the owning shard is full, evicts its least-recently-used entry first.
    pub fn put(&self, task_id: String, result: TaskResult) {
        let shard = self.shard_for(&task_id);
        shard.entries.lock().put(task_id, result);
    }

    /// Returns true iff every id in `deps` currently resides in the cache.
    ///
    /// Uses `peek`, never `get`: a dependency probe must never promote an entry's LRU
    /// recency (invariant 6), or dependency checks could keep cold data alive
    /// indefinitely by repeatedly refreshing entries nobody else still needs.
    pub fn contains_all<'a, I>(&self, deps: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        deps.into_iter().all(|id| {
            let shard = self.shard_for(id);
            shard.entries.lock().peek(id).is_some()
        })
    }

    /// Read-only snapshot of cache occupancy, for logging only.
    pub fn stats(&self) -> CacheStats {
        let len = self.inner.shards.iter().map(|s| s.entries.lock().len()).sum();
        CacheStats { shards: self.inner.shards.len(), capacity: self.inner.capacity, len }
    }
}

#[cfg(test)]
mod tests {
    use scheduler_types::TaskResult;

    use super::*;

    #[test]
    fn put_then_get_roundtrips() {
        let cache = ResultCache::new(64, 4);
        cache.put("t1".into(), TaskResult::success("55"));
        assert_eq!(cache.get("t1"), Some(TaskResult::success("55")));
    }

    #[test]
    fn miss_returns_none() {
        let cache = ResultCache::new(64, 4);
        assert_eq!(cache.get("never-submitted"), None);
    }

    #[test]
    fn put_overwrites_existing_key() {
        let cache = ResultCache::new(64, 4);
        cache.put("t1".into(), TaskResult::success("first"));
        cache.put("t1".into(), TaskResult::failed("second"));
        assert_eq!(cache.get("t1"), Some(TaskResult::failed("second")));
    }

    #[test]
    fn contains_all_true_only_when_every_dep_present() {
        let cache = ResultCache::new(64, 4);
        cache.put("a".into(), TaskResult::success("1"));
        cache.put("b".into(), TaskResult::success("2"));

        assert!(cache.contains_all([&"a".to_string(), &"b".to_string()]));
        assert!(!cache.contains_all([&"a".to_string(), &"missing".to_string()]));
        assert!(cache.contains_all(Vec::<&String>::new()));
    }

    #[test]
    fn contains_all_does_not_promote_lru_recency() {
        // Single shard so probing doesn't shuffle things across shards, and a capacity
        // of 1 so any promotion would be immediately observable via eviction order.
        let cache = ResultCache::new(1, 1);
        cache.put("old".into(), TaskResult::success("old"));

        // Repeatedly probe "old" as a dependency. If this incorrectly promoted it, it
        // would never be evicted no matter how much newer data arrives.
        for _ in 0..10 {
            assert!(cache.contains_all([&"old".to_string()]));
        }

        cache.put("new".into(), TaskResult::success("new"));

        // "old" must have been evicted despite the probes, proving peek never promoted it.
        assert_eq!(cache.get("old"), None);
        assert_eq!(cache.get("new"), Some(TaskResult::success("new")));
    }

    #[test]
    fn eviction_is_strictly_lru_within_a_shard() {
        let cache = ResultCache::new(2, 1);
        cache.put("a".into(), TaskResult::success("1"));
        cache.put("b".into(), TaskResult::success("2"));
        // touch "a" so "b" becomes least-recently-used
        let _ = cache.get("a");
        cache.put("c".into(), TaskResult::success("3"));

        assert_eq!(cache.get("b"), None);
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn stats_reports_occupancy_without_mutating_state() {
        let cache = ResultCache::new(64, 4);
        cache.put("a".into(), TaskResult::success("1"));
        let stats = cache.stats();
        assert_eq!(stats.len, 1);
        assert_eq!(stats.shards, 4);
    }
}
