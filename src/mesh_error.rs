//! MeshReachError: Unified error type for mesh-reach public APIs
//!
//! Every fallible operation in the crate returns this error instead of
//! panicking. Errors are never cached, so a failed query leaves the shared
//! memoization layer exactly as it found it.

use thiserror::Error;

use crate::topology::vertex::VertexId;

/// Unified error type for mesh-reach operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshReachError {
    /// A vertex id does not resolve in the mesh's vertex arrays.
    #[error("invalid vertex {vertex} (mesh has {vertex_count} vertices)")]
    InvalidVertex {
        /// The offending vertex id.
        vertex: VertexId,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },
    /// A cell index is unknown, or the cell is too small for the requested use.
    #[error("invalid cell {cell}: {reason}")]
    InvalidCell {
        /// Cell index into the mesh's cell table.
        cell: usize,
        /// What was wrong with it.
        reason: &'static str,
    },
    /// A cell references a vertex that is not part of the mesh.
    #[error("cell {cell} references vertex {vertex}, but mesh has {vertex_count} vertices")]
    CellOutOfRange {
        /// Cell index into the mesh's cell table.
        cell: usize,
        /// The out-of-range vertex.
        vertex: VertexId,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },
    /// Mesh arrays are inconsistent or contain non-finite values.
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),
    /// The fuel budget is negative or not finite.
    #[error("invalid fuel budget {0}: must be finite and non-negative")]
    InvalidBudget(f64),
    /// The travel-cost function produced a negative or non-finite cost.
    #[error("travel cost {cost} from {from} to {to} is not a finite non-negative value")]
    InvalidTravelCost {
        /// Edge origin.
        from: VertexId,
        /// Edge destination.
        to: VertexId,
        /// The rejected cost.
        cost: f64,
    },
    /// A search configuration value is out of range.
    #[error("invalid search configuration: {0}")]
    InvalidConfig(&'static str),
}
