//! In-memory [`Cache`] with time-limited entries.

use std::{collections::HashMap, hash::Hash, sync::Arc, time::Duration};

use derive_more::Debug;
use tokio::{sync::RwLock, time::Instant};

/// In-memory key-value cache, whose entries expire after some time.
///
/// Expired entries are never returned. They are dropped lazily on access, or
/// all at once via [`Cache::sweep()`].
#[derive(Debug)]
pub struct Cache<K, V> {
    /// Default time-to-live of the entries in this [`Cache`].
    ttl: Duration,

    /// Entries stored in this [`Cache`].
    #[debug(skip)]
    entries: Arc<RwLock<HashMap<K, Entry<V>>>>,
}

/// Value stored in a [`Cache`] along with its expiration moment.
#[derive(Clone, Debug)]
struct Entry<V> {
    /// Stored value.
    value: V,

    /// [`Instant`] after which the value is not valid anymore.
    expires_at: Instant,
}

impl<V> Entry<V> {
    /// Indicates whether this [`Entry`] is expired at the provided [`Instant`].
    fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

impl<K, V> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Self {
            ttl: self.ttl,
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K, V> Cache<K, V> {
    /// Creates a new empty [`Cache`] with the provided default `ttl` of its
    /// entries.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the default time-to-live of the entries in this [`Cache`].
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the number of entries currently stored in this [`Cache`],
    /// including the expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Indicates whether this [`Cache`] stores no entries at all.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Returns the non-expired value stored under the provided `key`, if any.
    pub async fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return None,
                Some(e) if !e.is_expired_at(now) => {
                    return Some(e.value.clone());
                }
                Some(_) => {}
            }
        }

        // The entry may have been replaced with a fresh one meanwhile.
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| e.is_expired_at(now)) {
            drop(entries.remove(key));
        }
        None
    }

    /// Stores the provided `value` under the provided `key` for the default
    /// [`Cache::ttl()`], replacing any previous one.
    pub async fn insert(&self, key: K, value: V) {
        self.insert_for(key, value, self.ttl).await;
    }

    /// Stores the provided `value` under the provided `key` for the provided
    /// `ttl`, but never longer than the default [`Cache::ttl()`].
    ///
    /// Does nothing if the resulting time-to-live is zero.
    pub async fn insert_for(&self, key: K, value: V, ttl: Duration) {
        let ttl = ttl.min(self.ttl);
        if ttl.is_zero() {
            return;
        }
        let expires_at = Instant::now() + ttl;
        drop(
            self.entries
                .write()
                .await
                .insert(key, Entry { value, expires_at }),
        );
    }

    /// Drops all the expired entries of this [`Cache`].
    ///
    /// Returns the number of the dropped entries.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired_at(now));
        before - entries.len()
    }
}
