use std::{
    num::NonZeroUsize,
    sync::RwLock,
    time::{Duration, Instant},
};

use lru::LruCache;

use super::{CachedPage, Clock, PageCache, SystemClock};

struct Entry {
    expires_at: Instant,
    page: CachedPage,
}

/// Process-local LRU store with a per-entry deadline.
///
/// Once `capacity` pages are held, storing another evicts the least recently
/// used one. Expired pages are dropped on lookup and, from the cold end of
/// the list, on every store.
pub struct InMemoryPageCache<C = SystemClock> {
    clock: C,
    entries: RwLock<LruCache<String, Entry>>,
}

impl InMemoryPageCache<SystemClock> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self::with_clock(SystemClock, capacity)
    }
}

impl<C: Clock> InMemoryPageCache<C> {
    pub fn with_clock(clock: C, capacity: NonZeroUsize) -> Self {
        Self {
            clock,
            entries: RwLock::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<C: Clock> PageCache for InMemoryPageCache<C> {
    fn get(&self, key: &str) -> Option<CachedPage> {
        let now = self.clock.now();
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => return Some(entry.page.clone()),
            Some(_) => {}
            None => return None,
        }
        entries.pop(key);
        None
    }

    fn set(&self, key: &str, page: CachedPage, ttl: Duration) {
        let now = self.clock.now();
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        while entries
            .peek_lru()
            .is_some_and(|(_, entry)| entry.expires_at <= now)
        {
            entries.pop_lru();
        }
        entries.put(
            key.to_string(),
            Entry {
                expires_at: now + ttl,
                page,
            },
        );
    }

    fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

/// Never stores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPageCache;

impl PageCache for NoopPageCache {
    fn get(&self, _key: &str) -> Option<CachedPage> {
        None
    }

    fn set(&self, _key: &str, _page: CachedPage, _ttl: Duration) {}

    fn clear(&self) {}
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Bytes;

    use super::*;
    use crate::page_cache::ManualClock;

    fn capacity(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn page(body: &'static str) -> CachedPage {
        CachedPage {
            status: 200,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    #[test]
    fn entry_lives_for_its_ttl() {
        let clock = Arc::new(ManualClock::default());
        let cache = InMemoryPageCache::with_clock(clock.clone(), capacity(16));
        cache.set("index_page:/", page("first"), Duration::from_secs(20));

        clock.advance(Duration::from_secs(19));
        assert_eq!(cache.get("index_page:/"), Some(page("first")));

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get("index_page:/"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_drops_everything() {
        let cache = InMemoryPageCache::new(capacity(16));
        cache.set("a", page("a"), Duration::from_secs(60));
        cache.set("b", page("b"), Duration::from_secs(60));
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert_eq!(cache.get("a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn set_replaces_and_restarts_the_window() {
        let clock = Arc::new(ManualClock::default());
        let cache = InMemoryPageCache::with_clock(clock.clone(), capacity(16));
        cache.set("k", page("old"), Duration::from_secs(20));
        clock.advance(Duration::from_secs(15));
        cache.set("k", page("new"), Duration::from_secs(20));
        clock.advance(Duration::from_secs(15));
        assert_eq!(cache.get("k"), Some(page("new")));
    }

    #[test]
    fn distinct_queries_cannot_grow_past_capacity() {
        let clock = Arc::new(ManualClock::default());
        let cache = InMemoryPageCache::with_clock(clock.clone(), capacity(100));
        for i in 0..5_000 {
            cache.set(
                &format!("index_page:/?junk={i}"),
                page("junk"),
                Duration::from_secs(20),
            );
        }
        assert_eq!(cache.len(), 100);
        assert_eq!(cache.get("index_page:/?junk=0"), None);
        assert_eq!(cache.get("index_page:/?junk=4999"), Some(page("junk")));

        clock.advance(Duration::from_secs(3600));
        cache.set("index_page:/", page("fresh"), Duration::from_secs(20));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("index_page:/"), Some(page("fresh")));
    }

    #[test]
    fn recently_read_pages_survive_eviction() {
        let cache = InMemoryPageCache::new(capacity(2));
        cache.set("a", page("a"), Duration::from_secs(60));
        cache.set("b", page("b"), Duration::from_secs(60));
        assert!(cache.get("a").is_some());
        cache.set("c", page("c"), Duration::from_secs(60));
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a"), Some(page("a")));
        assert_eq!(cache.get("c"), Some(page("c")));
    }

    #[test]
    fn noop_cache_never_hits() {
        let cache = NoopPageCache;
        cache.set("k", page("x"), Duration::from_secs(20));
        assert_eq!(cache.get("k"), None);
    }
}
