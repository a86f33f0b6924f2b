//! Per-point queries: one search plus one frontier aggregate.
//!
//! Each query is self-contained given an immutable mesh, so callers can
//! fan them out over as many workers as they like. The only state shared
//! between queries is the engine's memoization layer.

use crate::algs::cost_search::CostSearch;
use crate::algs::frontier::aggregate;
use crate::algs::travel_cost::TravelCost;
use crate::mesh_error::MeshReachError;
use crate::topology::mesh::SurfaceMesh;
use crate::topology::vertex::VertexId;

/// Which frontier total a query reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Metric {
    /// Sum of cumulative travel cost over the frontier.
    #[default]
    Cost,
    /// Sum of cumulative distance over the frontier.
    Distance,
}

/// Search from `point` and return `(point, frontier total)` for `metric`.
pub fn query<M, C>(
    point: VertexId,
    mesh: &M,
    engine: &CostSearch,
    travel_cost: &C,
    max_fuel: f64,
    metric: Metric,
) -> Result<(VertexId, f64), MeshReachError>
where
    M: SurfaceMesh + ?Sized,
    C: TravelCost<M> + ?Sized,
{
    let result = engine.search(mesh, point, travel_cost, max_fuel)?;
    let totals = aggregate(&result);
    let value = match metric {
        Metric::Cost => totals.total_cost,
        Metric::Distance => totals.total_distance,
    };
    Ok((point, value))
}

/// Total frontier cost reachable from `point`.
pub fn total_cost_for_point<M, C>(
    point: VertexId,
    mesh: &M,
    engine: &CostSearch,
    travel_cost: &C,
    max_fuel: f64,
) -> Result<f64, MeshReachError>
where
    M: SurfaceMesh + ?Sized,
    C: TravelCost<M> + ?Sized,
{
    query(point, mesh, engine, travel_cost, max_fuel, Metric::Cost).map(|(_, total)| total)
}

/// Total frontier distance reachable from `point`.
pub fn total_distance_for_point<M, C>(
    point: VertexId,
    mesh: &M,
    engine: &CostSearch,
    travel_cost: &C,
    max_fuel: f64,
) -> Result<f64, MeshReachError>
where
    M: SurfaceMesh + ?Sized,
    C: TravelCost<M> + ?Sized,
{
    query(point, mesh, engine, travel_cost, max_fuel, Metric::Distance).map(|(_, total)| total)
}

/// Query seeded from a cell: the search starts at the cell's second vertex.
pub fn query_from_cell<M, C>(
    cell: usize,
    mesh: &M,
    engine: &CostSearch,
    travel_cost: &C,
    max_fuel: f64,
    metric: Metric,
) -> Result<(VertexId, f64), MeshReachError>
where
    M: SurfaceMesh + ?Sized,
    C: TravelCost<M> + ?Sized,
{
    let verts = mesh.cell(cell).ok_or(MeshReachError::InvalidCell {
        cell,
        reason: "no such cell",
    })?;
    let start = *verts.get(1).ok_or(MeshReachError::InvalidCell {
        cell,
        reason: "fewer than two vertices",
    })?;
    query(start, mesh, engine, travel_cost, max_fuel, metric)
}

/// Run [`query`] for every point in order, on the calling thread.
pub fn query_batch_serial<M, C>(
    points: &[VertexId],
    mesh: &M,
    engine: &CostSearch,
    travel_cost: &C,
    max_fuel: f64,
    metric: Metric,
) -> Vec<Result<(VertexId, f64), MeshReachError>>
where
    M: SurfaceMesh + ?Sized,
    C: TravelCost<M> + ?Sized,
{
    points
        .iter()
        .map(|&p| query(p, mesh, engine, travel_cost, max_fuel, metric))
        .collect()
}

/// Run [`query`] for every point on the Rayon pool; output order matches `points`.
#[cfg(feature = "rayon")]
pub fn query_batch<M, C>(
    points: &[VertexId],
    mesh: &M,
    engine: &CostSearch,
    travel_cost: &C,
    max_fuel: f64,
    metric: Metric,
) -> Vec<Result<(VertexId, f64), MeshReachError>>
where
    M: SurfaceMesh + Sync + ?Sized,
    C: TravelCost<M> + Sync + ?Sized,
{
    use rayon::prelude::*;

    points
        .par_iter()
        .map(|&p| query(p, mesh, engine, travel_cost, max_fuel, metric))
        .collect()
}
