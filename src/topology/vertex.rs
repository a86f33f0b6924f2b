//! `VertexId`: a strong, zero-cost handle for mesh vertices
//!
//! Every vertex of a surface mesh is addressed by its position in the
//! mesh's vertex arrays (points and elevation). `VertexId` wraps that
//! index as a `u32` so it cannot be confused with a cell index or a raw
//! array offset, while remaining `Copy` and hashable for use as a map key.
//!
//! Unlike sieve point ids, `0` is a perfectly valid vertex: ids are plain
//! array indices.

use std::fmt;

/// Opaque index of a vertex in a mesh's vertex arrays.
///
/// # Memory layout
/// This type is `repr(transparent)` and has the same size and alignment
/// as `u32`.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct VertexId(u32);

impl VertexId {
    /// Creates a new `VertexId` from a raw index.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use mesh_reach::topology::vertex::VertexId;
    /// let v = VertexId::new(3);
    /// assert_eq!(v.get(), 3);
    /// assert_eq!(v.index(), 3usize);
    /// ```
    #[inline]
    pub const fn new(raw: u32) -> Self {
        VertexId(raw)
    }

    /// Builds a `VertexId` from an array index, if it fits in `u32`.
    #[inline]
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(VertexId)
    }

    /// Returns the raw `u32` value.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns the id as an index into the mesh's vertex arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for VertexId {
    #[inline]
    fn from(raw: u32) -> Self {
        VertexId(raw)
    }
}

impl fmt::Debug for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VertexId").field(&self.0).finish()
    }
}

/// Prints only the raw index.
impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
