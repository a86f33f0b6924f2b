//! Read-only surface mesh access.
//!
//! The search engine only needs four things from a mesh: a stable identity
//! for cache keys, vertex positions, a per-vertex elevation field, and a
//! cell table it can query by vertex. [`SurfaceMesh`] captures exactly that,
//! so meshes loaded by external readers can plug in directly.
//!
//! [`TriMesh`] is the in-memory implementation shipped with the crate. It
//! owns flat CSR-style cell storage and lazily builds a vertex-to-cell
//! incidence index the first time a neighbour query needs it.

use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};

use once_cell::sync::OnceCell;

use crate::mesh_error::MeshReachError;
use crate::topology::vertex::VertexId;

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a mesh, part of every cache key.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct MeshId(u64);

impl MeshId {
    /// Hand out an id no other call in this process has returned.
    pub fn fresh() -> Self {
        MeshId(NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value, for logging.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Immutable surface mesh as seen by the reachability engine.
///
/// Implementors must keep every answer stable for as long as searches run
/// against the mesh: cached neighbour sets and distances are keyed on
/// [`SurfaceMesh::mesh_id`] and are never invalidated.
pub trait SurfaceMesh {
    /// Identity used to keep cache entries of distinct meshes apart.
    fn mesh_id(&self) -> MeshId;

    /// Number of vertices (length of the position and elevation arrays).
    fn vertex_count(&self) -> usize;

    /// 3D position of `v`.
    fn position(&self, v: VertexId) -> Result<[f64; 3], MeshReachError>;

    /// Scalar elevation of `v`.
    fn elevation(&self, v: VertexId) -> Result<f64, MeshReachError>;

    /// Number of cells in the cell table.
    fn cell_count(&self) -> usize;

    /// Vertex ids forming cell `c`, or `None` if `c` is out of range.
    fn cell(&self, c: usize) -> Option<&[VertexId]>;

    /// Error unless `v` indexes a vertex of this mesh.
    fn check_vertex(&self, v: VertexId) -> Result<(), MeshReachError> {
        if v.index() < self.vertex_count() {
            Ok(())
        } else {
            Err(MeshReachError::InvalidVertex {
                vertex: v,
                vertex_count: self.vertex_count(),
            })
        }
    }

    /// Indices of every cell that references `v`.
    ///
    /// The default implementation scans the whole cell table.
    fn incident_cells(&self, v: VertexId) -> Result<Cow<'_, [usize]>, MeshReachError> {
        self.check_vertex(v)?;
        let cells: Vec<usize> = (0..self.cell_count())
            .filter(|&c| self.cell(c).is_some_and(|verts| verts.contains(&v)))
            .collect();
        Ok(Cow::Owned(cells))
    }
}

/// CSR vertex-to-cell incidence.
#[derive(Clone, Debug)]
struct Incidence {
    xadj: Vec<usize>,
    adjncy: Vec<usize>,
}

impl Incidence {
    fn build(vertex_count: usize, cell_offsets: &[usize], cell_vertices: &[VertexId]) -> Self {
        let cells = || {
            cell_offsets
                .windows(2)
                .map(|w| &cell_vertices[w[0]..w[1]])
                .enumerate()
        };

        let mut degree = vec![0usize; vertex_count];
        for (_, verts) in cells() {
            for (i, v) in verts.iter().enumerate() {
                if !verts[..i].contains(v) {
                    degree[v.index()] += 1;
                }
            }
        }

        let mut xadj = Vec::with_capacity(vertex_count + 1);
        xadj.push(0);
        for d in &degree {
            let last = xadj[xadj.len() - 1];
            xadj.push(last + d);
        }

        let mut fill = xadj[..vertex_count].to_vec();
        let mut adjncy = vec![0usize; xadj[vertex_count]];
        for (c, verts) in cells() {
            for (i, v) in verts.iter().enumerate() {
                if !verts[..i].contains(v) {
                    adjncy[fill[v.index()]] = c;
                    fill[v.index()] += 1;
                }
            }
        }

        Self { xadj, adjncy }
    }

    #[inline]
    fn cells_of(&self, v: VertexId) -> &[usize] {
        &self.adjncy[self.xadj[v.index()]..self.xadj[v.index() + 1]]
    }
}

/// In-memory triangulated (or polygonal) surface mesh.
///
/// Cells are stored flat: cell `c` spans
/// `cell_vertices[cell_offsets[c]..cell_offsets[c + 1]]`.
#[derive(Clone, Debug)]
pub struct TriMesh {
    id: MeshId,
    points: Vec<[f64; 3]>,
    elevation: Vec<f64>,
    cell_offsets: Vec<usize>,
    cell_vertices: Vec<VertexId>,
    incidence: OnceCell<Incidence>,
}

impl TriMesh {
    /// Build a mesh from positions, cells and a per-vertex elevation field.
    ///
    /// # Errors
    /// * [`MeshReachError::InvalidMesh`] if `points` and `elevation` differ in
    ///   length, a cell has fewer than three vertices, or any coordinate or
    ///   elevation is not finite.
    /// * [`MeshReachError::CellOutOfRange`] if a cell names a missing vertex.
    pub fn try_new<C>(
        points: Vec<[f64; 3]>,
        cells: impl IntoIterator<Item = C>,
        elevation: Vec<f64>,
    ) -> Result<Self, MeshReachError>
    where
        C: AsRef<[u32]>,
    {
        let vertex_count = points.len();
        if elevation.len() != vertex_count {
            return Err(MeshReachError::InvalidMesh(format!(
                "{} points but {} elevation values",
                vertex_count,
                elevation.len()
            )));
        }
        if VertexId::from_index(vertex_count).is_none() {
            return Err(MeshReachError::InvalidMesh(format!(
                "{vertex_count} vertices exceed the u32 id space"
            )));
        }
        if let Some(i) = points.iter().position(|p| p.iter().any(|x| !x.is_finite())) {
            return Err(MeshReachError::InvalidMesh(format!(
                "vertex {i} has a non-finite coordinate"
            )));
        }
        if let Some(i) = elevation.iter().position(|z| !z.is_finite()) {
            return Err(MeshReachError::InvalidMesh(format!(
                "vertex {i} has a non-finite elevation"
            )));
        }

        let mut cell_offsets = vec![0usize];
        let mut cell_vertices = Vec::new();
        for (c, cell) in cells.into_iter().enumerate() {
            let cell = cell.as_ref();
            if cell.len() < 3 {
                return Err(MeshReachError::InvalidMesh(format!(
                    "cell {c} has {} vertices, need at least 3",
                    cell.len()
                )));
            }
            for &raw in cell {
                let v = VertexId::new(raw);
                if v.index() >= vertex_count {
                    return Err(MeshReachError::CellOutOfRange {
                        cell: c,
                        vertex: v,
                        vertex_count,
                    });
                }
                cell_vertices.push(v);
            }
            cell_offsets.push(cell_vertices.len());
        }

        let mesh = Self {
            id: MeshId::fresh(),
            points,
            elevation,
            cell_offsets,
            cell_vertices,
            incidence: OnceCell::new(),
        };
        log::debug!(
            "built mesh {}: {} vertices, {} cells",
            mesh.id.get(),
            mesh.vertex_count(),
            mesh.cell_count()
        );
        Ok(mesh)
    }

    /// Build a mesh whose elevation field is the z coordinate of each point.
    pub fn try_with_z_elevation<C>(
        points: Vec<[f64; 3]>,
        cells: impl IntoIterator<Item = C>,
    ) -> Result<Self, MeshReachError>
    where
        C: AsRef<[u32]>,
    {
        let elevation = points.iter().map(|p| p[2]).collect();
        Self::try_new(points, cells, elevation)
    }

    /// All vertex positions.
    #[inline]
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    /// The per-vertex elevation field.
    #[inline]
    pub fn elevations(&self) -> &[f64] {
        &self.elevation
    }

    /// Iterate over cells in table order.
    pub fn cells(&self) -> impl Iterator<Item = &[VertexId]> + '_ {
        self.cell_offsets
            .windows(2)
            .map(move |w| &self.cell_vertices[w[0]..w[1]])
    }

    fn incidence(&self) -> &Incidence {
        self.incidence.get_or_init(|| {
            Incidence::build(self.vertex_count(), &self.cell_offsets, &self.cell_vertices)
        })
    }
}

impl SurfaceMesh for TriMesh {
    #[inline]
    fn mesh_id(&self) -> MeshId {
        self.id
    }

    #[inline]
    fn vertex_count(&self) -> usize {
        self.points.len()
    }

    fn position(&self, v: VertexId) -> Result<[f64; 3], MeshReachError> {
        self.points
            .get(v.index())
            .copied()
            .ok_or(MeshReachError::InvalidVertex {
                vertex: v,
                vertex_count: self.points.len(),
            })
    }

    fn elevation(&self, v: VertexId) -> Result<f64, MeshReachError> {
        self.elevation
            .get(v.index())
            .copied()
            .ok_or(MeshReachError::InvalidVertex {
                vertex: v,
                vertex_count: self.points.len(),
            })
    }

    #[inline]
    fn cell_count(&self) -> usize {
        self.cell_offsets.len() - 1
    }

    fn cell(&self, c: usize) -> Option<&[VertexId]> {
        let start = *self.cell_offsets.get(c)?;
        let end = *self.cell_offsets.get(c + 1)?;
        Some(&self.cell_vertices[start..end])
    }

    fn incident_cells(&self, v: VertexId) -> Result<Cow<'_, [usize]>, MeshReachError> {
        self.check_vertex(v)?;
        Ok(Cow::Borrowed(self.incidence().cells_of(v)))
    }
}
