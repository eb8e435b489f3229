//! In-Memory TTL Cache
//!
//! Thread-safe hashmap with per-entry expiration. Expired entries are
//! reported absent by lookups and physically removed by `delete_expired`,
//! either on demand or from the background reaper.

use bytes::Bytes;
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{trace, warn};

use super::entry::{Entry, Ttl};
use super::reaper::{Reaper, Sweep};
use crate::config::Config;
use crate::error::{CacheError, Result};

/// Cache keyed and valued by raw bytes
pub type ByteCache = Cache<Bytes, Bytes>;

struct Shared<K, V> {
    entries: RwLock<HashMap<K, Entry<V>>>,
}

impl<K: Eq + Hash, V> Shared<K, V> {
    // The whole scan runs under the write lock
    fn remove_expired(&self) -> usize {
        let mut map = self.entries.write();
        if map.is_empty() {
            return 0;
        }
        let now = Instant::now();
        let before = map.len();
        map.retain(|_, entry| !entry.is_expired_at(now));
        before - map.len()
    }
}

impl<K, V> Sweep for Shared<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn sweep(&self) -> usize {
        self.remove_expired()
    }
}

/// Thread-safe in-memory cache with TTL expiration
///
/// Share it between threads behind an `Arc`. Dropping the cache (or calling
/// [`Cache::close`]) stops its reaper.
pub struct Cache<K, V> {
    shared: Arc<Shared<K, V>>,
    default_ttl: Duration,
    sweep_interval: Duration,
    reaper: Option<Reaper>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Create an empty cache. A zero `sweep_interval` starts no reaper.
    pub fn new(default_ttl: Duration, sweep_interval: Duration) -> Self {
        Self::with_config(Config::new(default_ttl, sweep_interval))
    }

    /// Create a cache seeded with `entries`
    pub fn new_from<I>(default_ttl: Duration, sweep_interval: Duration, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Entry<V>)>,
    {
        Self::with_config_from(Config::new(default_ttl, sweep_interval), entries)
    }

    pub fn with_config(config: Config) -> Self {
        Self::build(config, HashMap::new())
    }

    pub fn with_config_from<I>(config: Config, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Entry<V>)>,
    {
        Self::build(config, entries.into_iter().collect())
    }

    fn build(config: Config, entries: HashMap<K, Entry<V>>) -> Self {
        let shared = Arc::new(Shared {
            entries: RwLock::new(entries),
        });

        let reaper = if config.reaper_enabled() {
            let target: Arc<dyn Sweep> = shared.clone();
            match &config.runtime {
                Some(handle) => Some(Reaper::spawn_on(handle, target, config.sweep_interval)),
                None => match Reaper::spawn(target, config.sweep_interval) {
                    Ok(reaper) => Some(reaper),
                    Err(e) => {
                        // Lazy expiry still holds; only background sweeping is lost
                        warn!("Failed to start reaper thread: {}", e);
                        None
                    }
                },
            }
        } else {
            None
        };

        Self {
            shared,
            default_ttl: config.default_ttl,
            sweep_interval: config.sweep_interval,
            reaper,
        }
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash,
{
    /// Insert or replace the entry for `key`
    pub fn set(&self, key: K, value: V, ttl: impl Into<Ttl>) {
        let entry = Entry::new(value, ttl.into().resolve(self.default_ttl));
        let mut map = self.shared.entries.write();
        map.insert(key, entry);
    }

    /// Get value by key, returns None if key doesn't exist or is expired
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.get_entry(key).map(Entry::into_value)
    }

    /// Get a live entry with its metadata
    pub fn get_entry<Q>(&self, key: &Q) -> Option<Entry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let map = self.shared.entries.read();
        map.get(key)
            .filter(|entry| !entry.is_expired())
            .cloned()
    }

    /// Remove `key`, returning its value. Fails if the key is not present.
    ///
    /// Expired entries that have not been swept yet are still present.
    pub fn delete<Q>(&self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut map = self.shared.entries.write();
        map.remove(key)
            .map(Entry::into_value)
            .ok_or(CacheError::NotFound)
    }

    /// Check if key exists and is not expired
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let map = self.shared.entries.read();
        map.get(key).map(|e| !e.is_expired()).unwrap_or(false)
    }

    /// Get the number of entries (including expired ones not yet swept)
    pub fn count(&self) -> usize {
        self.shared.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Keys of all live entries
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        let map = self.shared.entries.read();
        let now = Instant::now();
        map.iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Drop every entry
    pub fn flush(&self) {
        let old = std::mem::take(&mut *self.shared.entries.write());
        trace!(flushed = old.len(), "Flushed cache");
    }

    /// Remove expired entries, returns count of removed entries
    pub fn delete_expired(&self) -> usize {
        self.shared.remove_expired()
    }
}

impl<K, V> Cache<K, V> {
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// Whether a background reaper is still running
    pub fn has_reaper(&self) -> bool {
        self.reaper.as_ref().map(Reaper::is_running).unwrap_or(false)
    }

    /// Stop the background reaper. Safe to call more than once; the cache
    /// stays usable and expired entries can still be removed by hand.
    ///
    /// A thread reaper is joined, so a sweep in progress finishes first. A
    /// reaper on a tokio runtime is only signalled and may finish a running
    /// sweep after this returns; it starts no new ones.
    pub fn close(&self) {
        if let Some(reaper) = &self.reaper {
            reaper.stop();
        }
    }
}

impl<K, V> Drop for Cache<K, V> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<K, V> std::fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("entries", &self.shared.entries.read().len())
            .field("default_ttl", &self.default_ttl)
            .field("sweep_interval", &self.sweep_interval)
            .field("reaper", &self.reaper)
            .finish()
    }
}
