#![allow(dead_code)]
use mesh_reach::topology::mesh::TriMesh;
use mesh_reach::topology::vertex::VertexId;

pub fn v(u: u32) -> VertexId {
    VertexId::new(u)
}

/// Two triangles (0,1,2) and (1,2,3) on the unit square.
pub fn two_triangles(elevation: Vec<f64>) -> TriMesh {
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

/// Vertex id of grid node (i, j) in an `nx`-wide grid.
pub fn grid_vertex(nx: u32, i: u32, j: u32) -> VertexId {
    VertexId::new(j * nx + i)
}

/// `nx` x `ny` grid with unit spacing, each square split into two triangles.
pub fn grid_mesh(nx: u32, ny: u32, elevation: impl Fn(u32, u32) -> f64) -> TriMesh {
    let mut points = Vec::new();
    let mut elev = Vec::new();
    for j in 0..ny {
        for i in 0..nx {
            points.push([f64::from(i), f64::from(j), 0.0]);
            elev.push(elevation(i, j));
        }
    }
    let mut cells = Vec::new();
    for j in 0..ny.saturating_sub(1) {
        for i in 0..nx.saturating_sub(1) {
            let a = j * nx + i;
            let b = a + 1;
            let c = a + nx;
            let d = c + 1;
            cells.push([a, b, d]);
            cells.push([a, d, c]);
        }
    }
    TriMesh::try_new(points, cells, elev).unwrap()
}

/// Assert vec is a permutation of another vec (order-agnostic).
pub fn assert_permutation<T: Ord + Copy + std::fmt::Debug>(got: &[T], want: &[T]) {
    let mut a = got.to_vec();
    a.sort_unstable();
    let mut b = want.to_vec();
    b.sort_unstable();
    assert_eq!(a, b, "not a permutation\n got={:?}\nwant={:?}", got, want);
}
