//! Straight-line distances between mesh vertices.
//!
//! Distances feed the cumulative-distance map of a search. By default they
//! are truncated to whole units, which is what the frontier statistics were
//! calibrated against; [`DistanceResolution::Full`] keeps full precision.

use crate::mesh_error::MeshReachError;
use crate::topology::mesh::SurfaceMesh;
use crate::topology::vertex::VertexId;

/// Precision of reported vertex-to-vertex distances.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DistanceResolution {
    /// Truncate the Euclidean norm toward zero (whole units).
    #[default]
    Truncated,
    /// Keep the Euclidean norm as computed.
    Full,
}

impl DistanceResolution {
    #[inline]
    fn apply(self, d: f64) -> f64 {
        match self {
            DistanceResolution::Truncated => d.trunc(),
            DistanceResolution::Full => d,
        }
    }
}

#[inline]
fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Euclidean norm of `a - b`.
#[inline]
pub fn euclidean(a: [f64; 3], b: [f64; 3]) -> f64 {
    let d = sub(a, b);
    dot(d, d).sqrt()
}

/// Distance between vertices `a` and `b` of `mesh`.
///
/// Zero when `a == b`. Both ids must belong to the mesh.
pub fn vertex_distance<M>(
    mesh: &M,
    a: VertexId,
    b: VertexId,
    resolution: DistanceResolution,
) -> Result<f64, MeshReachError>
where
    M: SurfaceMesh + ?Sized,
{
    if a == b {
        mesh.check_vertex(a)?;
        return Ok(0.0);
    }
    let pa = mesh.position(a)?;
    let pb = mesh.position(b)?;
    Ok(resolution.apply(euclidean(pa, pb)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::mesh::TriMesh;

    fn mesh() -> TriMesh {
        TriMesh::try_new(
            vec![[0.0, 0.0, 0.0], [3.0, 4.0, 0.0], [1.5, 1.5, 1.5]],
            [[0u32, 1, 2]],
            vec![0.0; 3],
        )
        .unwrap()
    }

    #[test]
    fn self_distance_is_zero() {
        let m = mesh();
        for raw in 0..3 {
            let v = VertexId::new(raw);
            assert_eq!(vertex_distance(&m, v, v, DistanceResolution::Full).unwrap(), 0.0);
        }
    }

    #[test]
    fn truncation_drops_fraction() {
        let m = mesh();
        let (a, c) = (VertexId::new(0), VertexId::new(2));
        let full = vertex_distance(&m, a, c, DistanceResolution::Full).unwrap();
        assert!((full - (3.0f64 * 1.5 * 1.5).sqrt()).abs() < 1e-12);
        assert_eq!(
            vertex_distance(&m, a, c, DistanceResolution::Truncated).unwrap(),
            2.0
        );
        assert_eq!(
            vertex_distance(&m, a, VertexId::new(1), DistanceResolution::Truncated).unwrap(),
            5.0
        );
    }

    #[test]
    fn unknown_vertex_propagates() {
        let m = mesh();
        let bad = VertexId::new(3);
        assert!(vertex_distance(&m, bad, bad, DistanceResolution::Full).is_err());
        assert!(vertex_distance(&m, VertexId::new(0), bad, DistanceResolution::Full).is_err());
    }
}
