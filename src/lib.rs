//! Slicing of **triangle meshes** into per-layer polygons, and **plane cutting**
//! of a mesh into two watertight halves.
//!
//! A shared-vertex [`TriangleMesh`] is intersected with horizontal planes. Each
//! facet yields at most one segment per plane, tagged with the mesh vertex or
//! edge it passes through; the segments of a layer are chained by those ids
//! into closed loops, and the loops are nested into contours with holes
//! ([`ExPolygon`]). [`cut_mesh`] reuses the same machinery to cap the two halves
//! of a split mesh.
//!
//! ```
//! use meshslice::{TriangleMesh, TriangleMeshSlicer};
//!
//! let cube = TriangleMesh::cube(1.0, 1.0, 1.0);
//! let slicer = TriangleMeshSlicer::new(&cube);
//!
//! let layers = slicer.slice_ex(&[0.5]);
//! assert_eq!(layers[0].len(), 1);
//!
//! let (upper, lower) = slicer.cut(0.5);
//! assert!((upper.volume() - 0.5).abs() < 1e-12);
//! assert!(upper.is_manifold() && lower.is_manifold());
//! ```
//!
//! # Features
//! #### Default
//! - **offset**: use `geo-buf` for the safety offset, closing radius and extra
//!   offset of the nesting resolver
//! - [**stl-io**](https://en.wikipedia.org/wiki/STL_(file_format)): `.stl` import/export
//! - **svg-io**: render sliced layers as SVG
//!
//! #### Optional
//! - **parallel**: use rayon for multithreading

#![forbid(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod config;
pub mod cut;
pub mod errors;
pub mod float_types;
pub mod io;
pub mod mesh;
pub mod polygon;
pub mod slice;

pub use config::{SlicerConfig, SlicingMode};
pub use cut::cut_mesh;
pub use errors::MeshError;
pub use mesh::{EdgeAdjacency, Facet, TriangleMesh};
pub use polygon::{ExPolygon, Polygon};
pub use slice::{TriangleMeshSlicer, slice_mesh, slice_mesh_ex};
