//! Per-edge travel costs.
//!
//! The cost model is supplied by the caller. Any
//! `Fn(&M, VertexId, VertexId) -> f64` closure works directly; [`UnitCost`]
//! counts hops. Costs must be finite and non-negative, and the search
//! rejects the first edge that violates this.

use crate::topology::vertex::VertexId;

/// Cost of stepping from one vertex to an adjacent one.
pub trait TravelCost<M: ?Sized> {
    /// Cost of the edge `from -> to`. Must be deterministic.
    fn cost(&self, mesh: &M, from: VertexId, to: VertexId) -> f64;
}

impl<M: ?Sized, F> TravelCost<M> for F
where
    F: Fn(&M, VertexId, VertexId) -> f64,
{
    #[inline]
    fn cost(&self, mesh: &M, from: VertexId, to: VertexId) -> f64 {
        self(mesh, from, to)
    }
}

/// Every edge costs `1.0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnitCost;

impl<M: ?Sized> TravelCost<M> for UnitCost {
    #[inline]
    fn cost(&self, _mesh: &M, _from: VertexId, _to: VertexId) -> f64 {
        1.0
    }
}
