//! Vertex adjacency derived on demand from cell topology.
//!
//! Two vertices are neighbours when some cell references both. Neighbours
//! lying below the reference elevation are dropped, so the search never
//! steps onto submerged ground.
//!
//! Determinism:
//! - Neighbour lists are always sorted ascending and deduplicated.

use itertools::Itertools;

use crate::mesh_error::MeshReachError;
use crate::topology::mesh::SurfaceMesh;
use crate::topology::vertex::VertexId;

/// Neighbours of `v` through shared cells whose elevation is `>= sea_level`.
///
/// A vertex with no incident cells, or whose neighbours are all below
/// `sea_level`, yields an empty list. The elevation of `v` itself is not
/// consulted.
pub fn graph_neighbors<M>(
    mesh: &M,
    v: VertexId,
    sea_level: f64,
) -> Result<Vec<VertexId>, MeshReachError>
where
    M: SurfaceMesh + ?Sized,
{
    let cells = mesh.incident_cells(v)?;
    let candidates = cells
        .iter()
        .filter_map(|&c| mesh.cell(c))
        .flatten()
        .copied()
        .filter(|&u| u != v)
        .sorted_unstable()
        .dedup();

    let mut out = Vec::new();
    for u in candidates {
        if mesh.elevation(u)? >= sea_level {
            out.push(u);
        }
    }
    Ok(out)
}
