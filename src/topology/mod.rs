//! Top-level module for mesh topology abstractions.
//!
//! This module provides the read-only view of a surface mesh that the search
//! engine works against. It includes:
//! - `VertexId`, the strong vertex handle
//! - the `SurfaceMesh` trait and the in-memory `TriMesh`
//! - elevation-filtered vertex adjacency derived from cells
//! - the bounded, thread-safe caches that memoize adjacency and distances

pub mod cache;
pub mod mesh;
pub mod neighbors;
pub mod vertex;

pub use cache::{BoundedCache, CacheStats, InvalidateCache, SearchCaches};
pub use mesh::{MeshId, SurfaceMesh, TriMesh};
pub use neighbors::graph_neighbors;
pub use vertex::VertexId;
