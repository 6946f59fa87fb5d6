//! Mesh construction and I/O errors
//!
//! Slicing and cutting never fail: malformed facets and unclosable loops are
//! recovered locally and reported through `tracing`. Errors only arise when a
//! mesh is built from raw data or read from a file.

use crate::float_types::Real;
use nalgebra::Point3;

/// All the possible problems we might encounter while building a mesh
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    /// A facet references a vertex that does not exist
    #[error("(IndexOutOfRange) Facet {facet} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        facet: usize,
        index: usize,
        vertex_count: usize,
    },
    /// The coordinate has a NaN or infinite component
    #[error("(InvalidCoordinate) Vertex {index} ({point}) has a NaN or infinite coordinate")]
    InvalidCoordinate { index: usize, point: Point3<Real> },
    /// A triangle soup whose length is not a multiple of three
    #[error("(TriangleSoup) Expected a multiple of 3 points, got {0}")]
    TriangleSoup(usize),
    /// Error bubbled up while reading or writing a mesh file
    #[error("std::io::Error: {0}")]
    Io(#[from] std::io::Error),
}
