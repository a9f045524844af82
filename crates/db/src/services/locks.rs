//! Per-key async locking.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

/// One async read-write lock per key, created on first use and dropped
/// again once the last guard for it goes.
///
/// Operations on different keys never contend.
#[derive(Debug)]
pub struct KeyedLocks<K: Eq + Hash> {
    locks: DashMap<K, Arc<RwLock<()>>>,
}

#[derive(Debug)]
enum Held {
    Exclusive(OwnedRwLockWriteGuard<()>),
    Shared(OwnedRwLockReadGuard<()>),
}

/// Access to one key. Releasing it forgets the key if nobody else holds or
/// waits on it.
#[derive(Debug)]
pub struct KeyGuard<K: Eq + Hash> {
    held: Option<Held>,
    table: Arc<KeyedLocks<K>>,
    key: K,
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Waits for exclusive access to `key`.
    pub async fn lock(self: &Arc<Self>, key: K) -> KeyGuard<K> {
        let lock = self.entry(&key);
        let held = Held::Exclusive(lock.write_owned().await);
        self.guard(key, held)
    }

    /// Waits for shared access to `key`. Shared holders only exclude
    /// [`lock`](Self::lock).
    pub async fn share(self: &Arc<Self>, key: K) -> KeyGuard<K> {
        let lock = self.entry(&key);
        let held = Held::Shared(lock.read_owned().await);
        self.guard(key, held)
    }

    /// Number of keys with a live lock.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// True if no key has a live lock.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    fn entry(&self, key: &K) -> Arc<RwLock<()>> {
        // The map entry must not be held across the await.
        Arc::clone(self.locks.entry(key.clone()).or_default().value())
    }

    fn guard(self: &Arc<Self>, key: K, held: Held) -> KeyGuard<K> {
        KeyGuard {
            held: Some(held),
            table: Arc::clone(self),
            key,
        }
    }
}

impl<K: Eq + Hash> KeyedLocks<K> {
    /// Drops the lock for `key` if nobody holds or waits on it.
    pub fn forget(&self, key: &K) {
        self.locks
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> Drop for KeyGuard<K> {
    fn drop(&mut self) {
        // Release first so the table holds the only reference.
        self.held.take();
        self.table.forget(&self.key);
    }
}
