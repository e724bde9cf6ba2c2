//! Fixed-capacity concurrent map with recency-based eviction.
//!
//! Every insert or explicit touch stamps the entry with a fresh tick; when
//! the map is over capacity the entry with the oldest tick is evicted.
//! Callers must not rely on the exact eviction order, only on the bound.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use tokio::sync::RwLock;

struct Slot<V> {
    value: V,
    tick: u64,
}

/// Entries of a [`BoundedCache`], accessed under its lock.
pub struct CacheSlots<K, V> {
    capacity: usize,
    entries: HashMap<K, Slot<V>>,
    recency: BTreeMap<u64, K>,
    next_tick: u64,
}

impl<K, V> CacheSlots<K, V>
where
    K: Eq + Hash + Clone,
{
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            recency: BTreeMap::new(),
            next_tick: 0,
        }
    }

    fn stamp(&mut self) -> u64 {
        let tick = self.next_tick;
        self.next_tick += 1;
        tick
    }

    /// Insert or replace an entry, marking it most recent.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let tick = self.stamp();
        let previous = self.entries.insert(key.clone(), Slot { value, tick });
        if let Some(ref old) = previous {
            self.recency.remove(&old.tick);
        }
        self.recency.insert(tick, key);

        while self.entries.len() > self.capacity {
            let Some((_, evicted)) = self.recency.pop_first() else {
                break;
            };
            self.entries.remove(&evicted);
            tracing::trace!(capacity = self.capacity, "cache entry evicted");
        }

        previous.map(|slot| slot.value)
    }

    /// Mark an entry most recent. Returns false when it is not cached.
    pub fn touch(&mut self, key: &K) -> bool {
        let tick = self.stamp();
        let Some(slot) = self.entries.get_mut(key) else {
            return false;
        };
        self.recency.remove(&slot.tick);
        slot.tick = tick;
        self.recency.insert(tick, key.clone());
        true
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|slot| &slot.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(key, slot)| (key, &slot.value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Thread-safe bounded cache shared between the engine-streaming path and
/// query callers.
pub struct BoundedCache<K, V> {
    slots: RwLock<CacheSlots<K, V>>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: RwLock::new(CacheSlots::new(capacity.max(1))),
        }
    }

    pub async fn insert(&self, key: K, value: V) -> Option<V> {
        self.slots.write().await.insert(key, value)
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        self.slots.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }

    pub async fn capacity(&self) -> usize {
        self.slots.read().await.capacity
    }

    /// Run a query under the read lock.
    pub async fn read<R>(&self, query: impl FnOnce(&CacheSlots<K, V>) -> R) -> R {
        query(&*self.slots.read().await)
    }

    /// Run a read-modify-write under the write lock.
    pub async fn write<R>(&self, update: impl FnOnce(&mut CacheSlots<K, V>) -> R) -> R {
        update(&mut *self.slots.write().await)
    }
}
