//! Geometry utilities for mesh-reach.
//!
//! This module provides vertex-to-vertex distances on mesh positions.

pub mod distance;

pub use distance::{DistanceResolution, euclidean, vertex_distance};
