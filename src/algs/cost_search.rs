//! Budget-limited least-cost search over a surface mesh.
//!
//! [`CostSearch`] runs a Dijkstra-style relaxation from a start vertex over
//! the elevation-filtered vertex graph. A vertex is admitted only while its
//! cumulative travel cost stays within the fuel budget; geometric distance
//! is accumulated alongside but never limits the search.
//!
//! The frontier is a binary heap that may hold several entries for the same
//! vertex. Entries whose priority exceeds the vertex's recorded cost are
//! stale and skipped on extraction. Ties on cost are broken by insertion
//! order, so results are reproducible run to run.
//!
//! Neighbour sets and edge distances go through the engine's
//! [`SearchCaches`]. Cloning a `CostSearch` shares those caches, which are
//! safe to use from many threads at once.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::sync::Arc;

use crate::algs::frontier::frontier_set;
use crate::algs::travel_cost::TravelCost;
use crate::geometry::distance::DistanceResolution;
use crate::mesh_error::MeshReachError;
use crate::topology::cache::{CacheStats, SearchCaches};
use crate::topology::mesh::SurfaceMesh;
use crate::topology::vertex::VertexId;

/// Budget used by the convenience wrappers when none is given.
pub const DEFAULT_MAX_FUEL: f64 = 1000.0;

/// Options for building a [`CostSearch`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Neighbours with elevation below this value are never entered.
    pub sea_level: f64,
    /// Precision of accumulated distances.
    pub distance_resolution: DistanceResolution,
    /// Maximum number of memoized neighbour sets.
    pub neighbor_cache_capacity: usize,
    /// Maximum number of memoized vertex-pair distances.
    pub distance_cache_capacity: usize,
    /// Number of independently locked cache stripes.
    pub cache_shards: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            sea_level: 0.0,
            distance_resolution: DistanceResolution::Truncated,
            neighbor_cache_capacity: 183_646,
            distance_cache_capacity: 32_768,
            cache_shards: 16,
        }
    }
}

impl SearchConfig {
    pub fn with_sea_level(mut self, sea_level: f64) -> Self {
        self.sea_level = sea_level;
        self
    }
    pub fn with_distance_resolution(mut self, resolution: DistanceResolution) -> Self {
        self.distance_resolution = resolution;
        self
    }
    pub fn with_cache_capacities(mut self, neighbors: usize, distances: usize) -> Self {
        self.neighbor_cache_capacity = neighbors;
        self.distance_cache_capacity = distances;
        self
    }
    pub fn with_cache_shards(mut self, shards: usize) -> Self {
        self.cache_shards = shards;
        self
    }

    /// Check that every option is usable.
    pub fn validate(&self) -> Result<(), MeshReachError> {
        if !self.sea_level.is_finite() {
            return Err(MeshReachError::InvalidConfig("sea level must be finite"));
        }
        if self.neighbor_cache_capacity == 0 || self.distance_cache_capacity == 0 {
            return Err(MeshReachError::InvalidConfig("cache capacity must be positive"));
        }
        if self.cache_shards == 0 {
            return Err(MeshReachError::InvalidConfig("cache shard count must be positive"));
        }
        Ok(())
    }
}

/// Everything a single search learned, keyed by vertex.
///
/// Invariants:
/// - the three maps have identical key sets (the visited vertices);
/// - `predecessor[start] == None` and the start's cost and distance are `0`;
/// - every cost is `<= max_fuel`.
#[derive(Clone, Debug)]
pub struct SearchResult {
    start: VertexId,
    /// Vertex each visited vertex was optimally reached from.
    pub predecessor: HashMap<VertexId, Option<VertexId>>,
    /// Least cumulative travel cost found for each visited vertex.
    pub cumulative_cost: HashMap<VertexId, f64>,
    /// Cumulative distance along the path that achieved `cumulative_cost`.
    pub cumulative_distance: HashMap<VertexId, f64>,
}

impl SearchResult {
    fn seeded(start: VertexId) -> Self {
        Self {
            start,
            predecessor: HashMap::from([(start, None)]),
            cumulative_cost: HashMap::from([(start, 0.0)]),
            cumulative_distance: HashMap::from([(start, 0.0)]),
        }
    }

    /// The vertex the search started from.
    #[inline]
    pub fn start(&self) -> VertexId {
        self.start
    }

    /// Number of visited vertices (always at least one).
    #[inline]
    pub fn len(&self) -> usize {
        self.predecessor.len()
    }

    /// Always `false`: the start vertex is visited.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.predecessor.is_empty()
    }

    /// `true` if `v` was reached within budget.
    #[inline]
    pub fn contains(&self, v: VertexId) -> bool {
        self.predecessor.contains_key(&v)
    }

    /// Visited vertices in ascending order.
    pub fn visited(&self) -> Vec<VertexId> {
        let mut out: Vec<VertexId> = self.predecessor.keys().copied().collect();
        out.sort_unstable();
        out
    }

    /// Vertices that are a predecessor of some visited vertex.
    pub fn interior(&self) -> HashSet<VertexId> {
        self.predecessor.values().flatten().copied().collect()
    }

    /// Visited vertices that are nobody's predecessor, ascending.
    pub fn frontier(&self) -> Vec<VertexId> {
        frontier_set(self)
    }
}

/// Heap entry; ordered so that `BinaryHeap` pops the cheapest, oldest entry.
#[derive(Clone, Copy, Debug)]
struct State {
    cost: f64,
    seq: u64,
    vertex: VertexId,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed on both keys: BinaryHeap is a max-heap.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Budget-limited least-cost search engine with shared memoization.
#[derive(Clone, Debug)]
pub struct CostSearch {
    config: Arc<SearchConfig>,
    caches: Arc<SearchCaches>,
}

impl CostSearch {
    /// Build an engine with fresh caches sized by `config`.
    pub fn new(config: SearchConfig) -> Result<Self, MeshReachError> {
        config.validate()?;
        let caches = SearchCaches::from_config(&config)?;
        Ok(Self {
            config: Arc::new(config),
            caches: Arc::new(caches),
        })
    }

    /// The engine's configuration.
    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The memoization layer shared by every clone of this engine.
    #[inline]
    pub fn caches(&self) -> &SearchCaches {
        &self.caches
    }

    /// `(neighbour, distance)` cache counters.
    pub fn cache_stats(&self) -> (CacheStats, CacheStats) {
        (self.caches.neighbor_stats(), self.caches.distance_stats())
    }

    /// Drop every memoized entry, e.g. after replacing a mesh in place.
    pub fn clear_caches(&self) {
        self.caches.clear();
    }

    /// Explore `mesh` from `start`, admitting vertices whose cumulative
    /// travel cost stays `<= max_fuel`.
    ///
    /// # Errors
    /// * [`MeshReachError::InvalidBudget`] if `max_fuel` is negative or not finite.
    /// * [`MeshReachError::InvalidVertex`] if `start` is not in the mesh, or the
    ///   mesh fails a lookup during the search.
    /// * [`MeshReachError::InvalidTravelCost`] at the first edge whose cost is
    ///   negative or not finite.
    pub fn search<M, C>(
        &self,
        mesh: &M,
        start: VertexId,
        travel_cost: &C,
        max_fuel: f64,
    ) -> Result<SearchResult, MeshReachError>
    where
        M: SurfaceMesh + ?Sized,
        C: TravelCost<M> + ?Sized,
    {
        if !(max_fuel.is_finite() && max_fuel >= 0.0) {
            return Err(MeshReachError::InvalidBudget(max_fuel));
        }
        if mesh.elevation(start)? < self.config.sea_level {
            log::warn!(
                "search on mesh {} starts at vertex {start} below sea level",
                mesh.mesh_id().get()
            );
        }

        let mut result = SearchResult::seeded(start);
        let mut heap = BinaryHeap::new();
        let mut seq = 0u64;
        heap.push(State {
            cost: 0.0,
            seq,
            vertex: start,
        });

        while let Some(State {
            cost,
            vertex: current,
            ..
        }) = heap.pop()
        {
            let Some(&current_cost) = result.cumulative_cost.get(&current) else {
                continue;
            };
            if cost > current_cost {
                continue;
            }
            let current_distance = result
                .cumulative_distance
                .get(&current)
                .copied()
                .unwrap_or_default();

            for &next in self.caches.neighbors(mesh, current)?.iter() {
                let step = travel_cost.cost(mesh, current, next);
                if !(step.is_finite() && step >= 0.0) {
                    return Err(MeshReachError::InvalidTravelCost {
                        from: current,
                        to: next,
                        cost: step,
                    });
                }
                let new_cost = current_cost + step;
                let improves = result
                    .cumulative_cost
                    .get(&next)
                    .is_none_or(|&known| new_cost < known);
                if improves && new_cost <= max_fuel {
                    let new_distance =
                        current_distance + self.caches.distance(mesh, current, next)?;
                    result.cumulative_cost.insert(next, new_cost);
                    result.cumulative_distance.insert(next, new_distance);
                    result.predecessor.insert(next, Some(current));
                    seq += 1;
                    heap.push(State {
                        cost: new_cost,
                        seq,
                        vertex: next,
                    });
                }
            }
        }

        log::debug!(
            "search from {start} on mesh {}: {} vertices within fuel {max_fuel}",
            mesh.mesh_id().get(),
            result.len()
        );
        let (neighbors, distances) = self.cache_stats();
        log::trace!(
            "cache hit rates: neighbors {:.3} ({} entries), distances {:.3} ({} entries)",
            neighbors.hit_rate(),
            neighbors.entries,
            distances.hit_rate(),
            distances.entries
        );
        Ok(result)
    }
}

impl Default for CostSearch {
    fn default() -> Self {
        let config = SearchConfig::default();
        // Default capacities and shard count are non-zero, so cache construction cannot fail.
        let caches = SearchCaches::from_config(&config)
            .unwrap_or_else(|e| unreachable!("default search config rejected: {e}"));
        Self {
            config: Arc::new(config),
            caches: Arc::new(caches),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::travel_cost::UnitCost;
    use crate::topology::mesh::TriMesh;

    fn v(i: u32) -> VertexId {
        VertexId::new(i)
    }

    fn two_triangles(elevation: Vec<f64>) -> TriMesh {
        TriMesh::try_new(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [1.0, 1.0, 0.0],
            ],
            [[0u32, 1, 2], [1, 2, 3]],
            elevation,
        )
        .unwrap()
    }

    #[test]
    fn heap_pops_cheapest_then_oldest() {
        let mut heap = BinaryHeap::new();
        heap.push(State { cost: 2.0, seq: 0, vertex: v(0) });
        heap.push(State { cost: 1.0, seq: 2, vertex: v(1) });
        heap.push(State { cost: 1.0, seq: 1, vertex: v(2) });
        let order: Vec<_> = std::iter::from_fn(|| heap.pop().map(|s| s.vertex)).collect();
        assert_eq!(order, vec![v(2), v(1), v(0)]);
    }

    #[test]
    fn unit_cost_budget_one() {
        let mesh = two_triangles(vec![0.0; 4]);
        let engine = CostSearch::default();
        let r = engine.search(&mesh, v(0), &UnitCost, 1.0).unwrap();
        assert_eq!(r.visited(), vec![v(0), v(1), v(2)]);
        assert_eq!(r.cumulative_cost[&v(0)], 0.0);
        assert_eq!(r.cumulative_cost[&v(1)], 1.0);
        assert_eq!(r.cumulative_cost[&v(2)], 1.0);
        assert_eq!(r.predecessor[&v(0)], None);
        assert_eq!(r.predecessor[&v(1)], Some(v(0)));
        assert!(!r.contains(v(3)));
    }

    #[test]
    fn cheaper_detour_replaces_direct_edge() {
        let mesh = two_triangles(vec![0.0; 4]);
        // Direct 0 -> 2 is expensive; 0 -> 1 -> 2 is cheap.
        let cost = |_: &TriMesh, a: VertexId, b: VertexId| match (a.get(), b.get()) {
            (0, 2) | (2, 0) => 10.0,
            _ => 1.0,
        };
        let r = CostSearch::default().search(&mesh, v(0), &cost, 100.0).unwrap();
        assert_eq!(r.cumulative_cost[&v(2)], 2.0);
        assert_eq!(r.predecessor[&v(2)], Some(v(1)));
        // Distance follows the cheapest path, not the shortest one: 1 + trunc(sqrt 2).
        assert_eq!(r.cumulative_distance[&v(2)], 2.0);
    }

    #[test]
    fn negative_cost_rejected() {
        let mesh = two_triangles(vec![0.0; 4]);
        let cost = |_: &TriMesh, _: VertexId, _: VertexId| -1.0;
        let err = CostSearch::default()
            .search(&mesh, v(0), &cost, 10.0)
            .unwrap_err();
        assert!(matches!(err, MeshReachError::InvalidTravelCost { cost, .. } if cost == -1.0));
    }

    #[test]
    fn invalid_budget_and_start_rejected() {
        let mesh = two_triangles(vec![0.0; 4]);
        let engine = CostSearch::default();
        assert_eq!(
            engine.search(&mesh, v(0), &UnitCost, -1.0).unwrap_err(),
            MeshReachError::InvalidBudget(-1.0)
        );
        assert!(engine.search(&mesh, v(0), &UnitCost, f64::NAN).is_err());
        assert!(matches!(
            engine.search(&mesh, v(7), &UnitCost, 1.0).unwrap_err(),
            MeshReachError::InvalidVertex { .. }
        ));
    }

    #[test]
    fn config_validation() {
        assert!(SearchConfig::default().validate().is_ok());
        assert!(SearchConfig::default().with_cache_shards(0).validate().is_err());
        assert!(SearchConfig::default().with_cache_capacities(0, 1).validate().is_err());
        assert!(SearchConfig::default().with_sea_level(f64::INFINITY).validate().is_err());
        assert!(CostSearch::new(SearchConfig::default().with_cache_shards(0)).is_err());
    }

    #[test]
    fn config_json_roundtrip_and_defaults() {
        let cfg = SearchConfig::default()
            .with_sea_level(-2.5)
            .with_distance_resolution(DistanceResolution::Full);
        let s = serde_json::to_string(&cfg).unwrap();
        let back: SearchConfig = serde_json::from_str(&s).unwrap();
        assert_eq!(back, cfg);

        let partial: SearchConfig = serde_json::from_str(r#"{"sea_level": 1.0}"#).unwrap();
        assert_eq!(partial, SearchConfig::default().with_sea_level(1.0));
    }
}
