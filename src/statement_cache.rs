//! Single-flight, LRU-bounded memo table for per-ticker pipeline results
//!
//! The first caller for a key starts the load; concurrent callers for the
//! same key await that same in-flight load. Successful results are kept
//! until evicted by capacity, failures are dropped so a later call can run
//! the load again.

use futures::future::{BoxFuture, FutureExt, Shared};
use lru::LruCache;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

type SharedLoad<V, E> = Shared<BoxFuture<'static, Result<Arc<V>, E>>>;

enum Slot<V, E> {
    Ready(Arc<V>),
    Loading(SharedLoad<V, E>),
}

impl<V, E> Clone for Slot<V, E> {
    fn clone(&self) -> Self {
        match self {
            Slot::Ready(value) => Slot::Ready(Arc::clone(value)),
            Slot::Loading(load) => Slot::Loading(load.clone()),
        }
    }
}

pub struct StatementCache<V, E> {
    slots: Mutex<LruCache<String, Slot<V, E>>>,
}

impl<V, E> StatementCache<V, E>
where
    V: Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create a cache retaining up to `capacity` keys (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            slots: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, Slot<V, E>>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Return the cached value for `key`, running `load` only if no value
    /// is cached and no load for `key` is already in flight.
    pub async fn get_or_load<F, Fut>(&self, key: &str, load: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let pending = {
            let mut slots = self.lock();
            let existing = slots.get(key).cloned();
            match existing {
                Some(Slot::Ready(value)) => {
                    debug!("Cache hit for {}", key);
                    return Ok(value);
                }
                Some(Slot::Loading(pending)) => {
                    debug!("Joining in-flight load for {}", key);
                    pending
                }
                None => {
                    debug!("Cache miss for {}, starting load", key);
                    let pending = load().map(|result| result.map(Arc::new)).boxed().shared();
                    slots.put(key.to_string(), Slot::Loading(pending.clone()));
                    pending
                }
            }
        };

        // A polled-to-completion `Shared` no longer compares equal, keep an unpolled handle
        let joined = pending.clone();
        let result = pending.await;

        let mut slots = self.lock();
        let owns_slot = match slots.peek(key) {
            Some(Slot::Loading(current)) => current.ptr_eq(&joined),
            Some(Slot::Ready(_)) => false,
            None => true,
        };
        if owns_slot {
            match &result {
                Ok(value) => {
                    slots.put(key.to_string(), Slot::Ready(Arc::clone(value)));
                }
                Err(_) => {
                    slots.pop(key);
                }
            }
        }

        result
    }

    /// Cached value for `key` without triggering a load
    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        match self.lock().get(key) {
            Some(Slot::Ready(value)) => Some(Arc::clone(value)),
            _ => None,
        }
    }

    /// Number of keys with a completed value
    pub fn len(&self) -> usize {
        self.lock()
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Ready(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }
}
