//! Bounded, thread-safe memoization of topology and distance queries.
//!
//! Neighbour sets and vertex distances are pure functions of an immutable
//! mesh, so one cache can serve every search issued against it, from any
//! number of threads. [`BoundedCache`] stripes its entries over
//! `parking_lot` mutexes; each stripe keeps a "hot" and a "cold" generation
//! and retires the cold one wholesale once the hot one fills up. Recently
//! used entries survive (a cold hit is promoted back to hot) while the
//! stripe never holds more than its share of the capacity.
//!
//! Every key carries the [`MeshId`] so that entries of distinct meshes can
//! never be confused.

use std::hash::{BuildHasher, Hash};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;
use hashbrown::hash_map::DefaultHashBuilder;
use parking_lot::Mutex;

use crate::algs::cost_search::SearchConfig;
use crate::geometry::distance::{DistanceResolution, vertex_distance};
use crate::mesh_error::MeshReachError;
use crate::topology::mesh::{MeshId, SurfaceMesh};
use crate::topology::neighbors::graph_neighbors;
use crate::topology::vertex::VertexId;

/// Anything that caches derived topology should implement this.
pub trait InvalidateCache {
    /// Invalidate *all* internal caches so future queries recompute correctly.
    fn invalidate_cache(&mut self);
}

// Blanket impl for Box<T>
impl<T: InvalidateCache + ?Sized> InvalidateCache for Box<T> {
    #[inline]
    fn invalidate_cache(&mut self) {
        (**self).invalidate_cache();
    }
}

/// Snapshot of a cache's counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to compute the value.
    pub misses: u64,
    /// Entries currently held.
    pub entries: usize,
    /// Maximum number of entries.
    pub capacity: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache, `0.0` before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Generations<K, V> {
    capacity: usize,
    hot: HashMap<K, V>,
    cold: HashMap<K, V>,
}

impl<K: Hash + Eq, V: Clone> Generations<K, V> {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            hot: HashMap::new(),
            cold: HashMap::new(),
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.hot.len() + self.cold.len()
    }

    fn get(&mut self, key: &K) -> Option<V> {
        if let Some(v) = self.hot.get(key) {
            return Some(v.clone());
        }
        let (key, v) = self.cold.remove_entry(key)?;
        self.insert(key, v.clone());
        Some(v)
    }

    fn insert(&mut self, key: K, value: V) {
        if let Some(slot) = self.hot.get_mut(&key) {
            *slot = value;
            return;
        }
        self.cold.remove(&key);
        let hot_limit = (self.capacity / 2).max(1);
        if self.hot.len() >= hot_limit {
            self.cold = std::mem::take(&mut self.hot);
            if self.cold.len() >= self.capacity {
                self.cold.clear();
            }
        }
        self.hot.insert(key, value);
    }

    fn clear(&mut self) {
        self.hot.clear();
        self.cold.clear();
    }
}

/// Fixed-capacity concurrent memo table.
pub struct BoundedCache<K, V> {
    shards: Box<[Mutex<Generations<K, V>>]>,
    hasher: DefaultHashBuilder,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> BoundedCache<K, V>
where
    K: Hash + Eq,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries spread over up to
    /// `shards` independently locked stripes.
    ///
    /// # Errors
    /// [`MeshReachError::InvalidConfig`] if `capacity` or `shards` is zero.
    pub fn new(capacity: usize, shards: usize) -> Result<Self, MeshReachError> {
        if capacity == 0 {
            return Err(MeshReachError::InvalidConfig("cache capacity must be positive"));
        }
        if shards == 0 {
            return Err(MeshReachError::InvalidConfig("cache shard count must be positive"));
        }
        let shards = shards.min(capacity);
        let base = capacity / shards;
        let extra = capacity % shards;
        let shards = (0..shards)
            .map(|i| Mutex::new(Generations::new(base + usize::from(i < extra))))
            .collect();
        Ok(Self {
            shards,
            hasher: DefaultHashBuilder::default(),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    #[inline]
    fn shard(&self, key: &K) -> &Mutex<Generations<K, V>> {
        let h = self.hasher.hash_one(key);
        &self.shards[(h % self.shards.len() as u64) as usize]
    }

    /// Look up `key`, counting a hit or a miss.
    pub fn get(&self, key: &K) -> Option<V> {
        let found = self.shard(key).lock().get(key);
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Store `value` under `key`, possibly retiring older entries.
    pub fn insert(&self, key: K, value: V) {
        self.shard(&key).lock().insert(key, value);
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    ///
    /// `compute` runs without any lock held; concurrent misses on the same
    /// key may both compute, which is harmless for pure functions. Errors
    /// are returned as-is and never stored.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(v) = self.get(&key) {
            return Ok(v);
        }
        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.lock().len()).sum()
    }

    /// `true` if no entries are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&self) {
        for shard in self.shards.iter() {
            shard.lock().clear();
        }
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
            capacity: self.capacity,
        }
    }
}

impl<K, V> std::fmt::Debug for BoundedCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedCache")
            .field("capacity", &self.capacity)
            .field("shards", &self.shards.len())
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish()
    }
}

type NeighborKey = (MeshId, VertexId);
type DistanceKey = (MeshId, VertexId, VertexId);

/// The memoized neighbour and distance functions used by a search engine.
///
/// Shared by every clone of a [`CostSearch`](crate::algs::cost_search::CostSearch).
#[derive(Debug)]
pub struct SearchCaches {
    sea_level: f64,
    resolution: DistanceResolution,
    neighbors: BoundedCache<NeighborKey, Arc<[VertexId]>>,
    distances: BoundedCache<DistanceKey, f64>,
}

impl SearchCaches {
    /// Build empty caches sized by `config`.
    pub fn from_config(config: &SearchConfig) -> Result<Self, MeshReachError> {
        Ok(Self {
            sea_level: config.sea_level,
            resolution: config.distance_resolution,
            neighbors: BoundedCache::new(config.neighbor_cache_capacity, config.cache_shards)?,
            distances: BoundedCache::new(config.distance_cache_capacity, config.cache_shards)?,
        })
    }

    /// Memoized [`graph_neighbors`] at the configured sea level.
    pub fn neighbors<M>(&self, mesh: &M, v: VertexId) -> Result<Arc<[VertexId]>, MeshReachError>
    where
        M: SurfaceMesh + ?Sized,
    {
        self.neighbors
            .get_or_try_insert_with((mesh.mesh_id(), v), || {
                graph_neighbors(mesh, v, self.sea_level).map(Arc::from)
            })
    }

    /// Memoized [`vertex_distance`] at the configured resolution.
    ///
    /// Keys are ordered: `(a, b)` and `(b, a)` are cached separately.
    pub fn distance<M>(&self, mesh: &M, a: VertexId, b: VertexId) -> Result<f64, MeshReachError>
    where
        M: SurfaceMesh + ?Sized,
    {
        self.distances
            .get_or_try_insert_with((mesh.mesh_id(), a, b), || {
                vertex_distance(mesh, a, b, self.resolution)
            })
    }

    /// Counters of the neighbour cache.
    pub fn neighbor_stats(&self) -> CacheStats {
        self.neighbors.stats()
    }

    /// Counters of the distance cache.
    pub fn distance_stats(&self) -> CacheStats {
        self.distances.stats()
    }

    /// Drop all cached entries.
    pub fn clear(&self) {
        self.neighbors.clear();
        self.distances.clear();
    }
}

impl InvalidateCache for SearchCaches {
    fn invalidate_cache(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::mesh::TriMesh;

    #[test]
    fn never_exceeds_capacity() {
        for capacity in [1usize, 2, 3, 7, 64] {
            let cache: BoundedCache<u32, u32> = BoundedCache::new(capacity, 4).unwrap();
            for k in 0..500u32 {
                cache.insert(k, k * 2);
                assert!(cache.len() <= capacity, "capacity {capacity} exceeded");
            }
        }
    }

    #[test]
    fn recent_entries_survive_eviction() {
        let cache: BoundedCache<u32, u32> = BoundedCache::new(8, 1).unwrap();
        for k in 0..100u32 {
            cache.insert(k, k);
            assert_eq!(cache.get(&k), Some(k));
        }
        assert_eq!(cache.get(&99), Some(99));
        assert_eq!(cache.get(&0), None);
    }

    #[test]
    fn cold_hit_is_promoted() {
        let cache: BoundedCache<u32, u32> = BoundedCache::new(4, 1).unwrap();
        cache.insert(1, 1);
        cache.insert(2, 2);
        // Generation flip: {1, 2} go cold.
        cache.insert(3, 3);
        assert_eq!(cache.get(&1), Some(1));
        // Flip again: 2 is retired, the promoted 1 survives.
        cache.insert(4, 4);
        cache.insert(5, 5);
        assert_eq!(cache.get(&1), Some(1));
        assert_eq!(cache.get(&2), None);
    }

    #[test]
    fn errors_are_not_cached() {
        let cache: BoundedCache<u32, u32> = BoundedCache::new(4, 1).unwrap();
        let r: Result<u32, &str> = cache.get_or_try_insert_with(1, || Err("boom"));
        assert!(r.is_err());
        assert!(cache.is_empty());
        let r: Result<u32, &str> = cache.get_or_try_insert_with(1, || Ok(7));
        assert_eq!(r, Ok(7));
        let r: Result<u32, &str> = cache.get_or_try_insert_with(1, || Err("unused"));
        assert_eq!(r, Ok(7));
    }

    #[test]
    fn stats_count_hits_and_misses() {
        let cache: BoundedCache<u32, u32> = BoundedCache::new(4, 2).unwrap();
        assert_eq!(cache.get(&1), None);
        cache.insert(1, 10);
        assert_eq!(cache.get(&1), Some(10));
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
        assert_eq!(stats.hit_rate(), 0.5);
        cache.clear();
        assert_eq!(cache.stats(), CacheStats { capacity: 4, ..CacheStats::default() });
    }

    #[test]
    fn zero_capacity_rejected() {
        assert!(BoundedCache::<u32, u32>::new(0, 1).is_err());
        assert!(BoundedCache::<u32, u32>::new(1, 0).is_err());
    }

    #[test]
    fn mesh_identity_separates_entries() {
        let points = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let a = TriMesh::try_new(points.clone(), [[0u32, 1, 2]], vec![0.0; 3]).unwrap();
        let b = TriMesh::try_new(points, [[0u32, 1, 2]], vec![0.0, -1.0, 0.0]).unwrap();
        let caches = SearchCaches::from_config(&SearchConfig::default()).unwrap();
        let v0 = VertexId::new(0);
        assert_eq!(
            caches.neighbors(&a, v0).unwrap().as_ref(),
            &[VertexId::new(1), VertexId::new(2)]
        );
        assert_eq!(caches.neighbors(&b, v0).unwrap().as_ref(), &[VertexId::new(2)]);
        assert_eq!(caches.neighbor_stats().misses, 2);
        assert_eq!(caches.neighbors(&a, v0).unwrap().len(), 2);
        assert_eq!(caches.neighbor_stats().hits, 1);
    }

    #[test]
    fn failed_lookup_leaves_cache_untouched() {
        let mesh = TriMesh::try_new(vec![[0.0; 3]; 3], [[0u32, 1, 2]], vec![0.0; 3]).unwrap();
        let mut caches = SearchCaches::from_config(&SearchConfig::default()).unwrap();
        assert!(caches.neighbors(&mesh, VertexId::new(9)).is_err());
        assert!(caches.distance(&mesh, VertexId::new(0), VertexId::new(9)).is_err());
        assert_eq!(caches.neighbor_stats().entries, 0);
        assert_eq!(caches.distance_stats().entries, 0);

        caches.distance(&mesh, VertexId::new(0), VertexId::new(1)).unwrap();
        assert_eq!(caches.distance_stats().entries, 1);
        caches.invalidate_cache();
        assert_eq!(caches.distance_stats().entries, 0);
    }
}
