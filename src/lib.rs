#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-reach
//!
//! mesh-reach computes least-cost reachability over irregular triangulated surface meshes. Given a start vertex, a per-edge travel-cost function and a fuel budget, it finds every vertex reachable within budget, the cheapest cumulative cost to reach each, and the distance travelled along that cheapest path. The per-vertex results are then folded into one scalar per start point, so candidate start points can be compared by how expensive or far-reaching their neighbourhoods are.
//!
//! ## Features
//! - Vertex adjacency derived on the fly from cell topology, filtered by elevation (sea level)
//! - Budget-limited Dijkstra search with deterministic tie-breaking
//! - Frontier aggregation over the tips of the explored region
//! - Bounded, thread-safe memoization shared by every search against the same mesh
//! - Optional Rayon batch queries (`rayon` feature)
//!
//! ## Determinism
//!
//! Neighbour lists are sorted, heap ties are broken by insertion order and frontier sums
//! run in ascending vertex order, so repeated queries return bit-identical results.
//!
//! ## Usage
//!
//! ```rust
//! use mesh_reach::prelude::*;
//!
//! let mesh = TriMesh::try_new(
//!     vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
//!     [[0u32, 1, 2], [1, 2, 3]],
//!     vec![0.0; 4],
//! )?;
//! let engine = CostSearch::new(SearchConfig::default())?;
//! let (point, total) = query(VertexId::new(0), &mesh, &engine, &UnitCost, 1.0, Metric::Cost)?;
//! assert_eq!((point.get(), total), (0, 2.0));
//! # Ok::<(), MeshReachError>(())
//! ```
//!
//! ## Caching
//! Cache keys always include the mesh's [`MeshId`](topology::mesh::MeshId). Meshes must not be
//! mutated while searches run against them; call [`CostSearch::clear_caches`](algs::CostSearch::clear_caches)
//! if a mesh is rebuilt in place under the same id.

pub mod algs;
pub mod geometry;
pub mod mesh_error;
pub mod topology;

pub use mesh_error::MeshReachError;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    #[cfg(feature = "rayon")]
    pub use crate::algs::query::query_batch;
    pub use crate::algs::cost_search::{CostSearch, DEFAULT_MAX_FUEL, SearchConfig, SearchResult};
    pub use crate::algs::frontier::{FrontierTotals, aggregate, frontier_set};
    pub use crate::algs::query::{
        Metric, query, query_batch_serial, query_from_cell, total_cost_for_point,
        total_distance_for_point,
    };
    pub use crate::algs::travel_cost::{TravelCost, UnitCost};
    pub use crate::geometry::distance::DistanceResolution;
    pub use crate::mesh_error::MeshReachError;
    pub use crate::topology::cache::{CacheStats, InvalidateCache};
    pub use crate::topology::mesh::{MeshId, SurfaceMesh, TriMesh};
    pub use crate::topology::vertex::VertexId;
}
