//! Time-boxed cache of rendered pages.
//!
//! Handlers never see it: the middleware in [`middleware`] sits in front of the
//! list feed and replays stored bytes until the entry expires or someone calls
//! [`PageCache::clear`].

mod middleware;
mod store;

use std::{
    sync::Mutex,
    time::{Duration, Instant},
};

use axum::body::Bytes;

pub use middleware::{index_page_cache, PageCacheState};
pub use store::{InMemoryPageCache, NoopPageCache};

/// A rendered response as it went out the first time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPage {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

pub trait PageCache: Send + Sync {
    fn get(&self, key: &str) -> Option<CachedPage>;
    fn set(&self, key: &str, page: CachedPage, ttl: Duration);
    fn clear(&self);
}

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}
