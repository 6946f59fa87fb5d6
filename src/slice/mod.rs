//! Slicing a [`TriangleMesh`] with horizontal planes.
//!
//! The pipeline runs in four stages:
//! 1. [`intersect`]: one facet against one plane gives at most one
//!    [`IntersectionLine`], tagged with the vertex or edge ids it touches
//! 2. [`collect`]: every facet against every plane it spans, pruned by a binary
//!    search over the sorted heights
//! 3. [`loops`]: the lines of one layer are chained into closed [`Polygon`]s
//! 4. [`nesting`]: the loops are combined into contours with holes
//!
//! Every stage is a pure function of the mesh, its [`EdgeAdjacency`] and the
//! heights. Malformed geometry never fails a call; it only loses the affected
//! loops and is reported through `tracing`.

use crate::config::{SlicerConfig, SlicingMode};
use crate::float_types::Real;
use crate::mesh::{EdgeAdjacency, TriangleMesh};
use crate::polygon::{ExPolygon, Polygon};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub mod collect;
pub mod intersect;
pub mod loops;
pub mod nesting;

pub use collect::collect_layer_lines;
pub use intersect::{FacetEdgeType, IntersectionLine, IntersectionPoint, slice_facet};
pub use loops::make_loops;
pub use nesting::{make_expolygons, make_expolygons_simple};

/// Sort `heights` for the collector.
///
/// Returns the ascending finite heights and, for every input height, its
/// position among them (`None` for NaN and infinities).
fn sort_heights(heights: &[Real]) -> (Vec<Real>, Vec<Option<usize>>) {
    let mut order: Vec<usize> = (0..heights.len()).filter(|&i| heights[i].is_finite()).collect();
    order.sort_by(|&a, &b| heights[a].total_cmp(&heights[b]));

    let mut position = vec![None; heights.len()];
    for (k, &i) in order.iter().enumerate() {
        position[i] = Some(k);
    }
    (order.iter().map(|&i| heights[i]).collect(), position)
}

/// Run `build` on the slice lines of every height, returning one result per
/// height in the caller's order.
fn map_layers<T, F>(mesh: &TriangleMesh, adjacency: &EdgeAdjacency, heights: &[Real], build: F) -> Vec<T>
where
    T: Default + Send,
    F: Fn(&[IntersectionLine]) -> T + Sync,
{
    let (sorted, position) = sort_heights(heights);
    let lines = collect_layer_lines(mesh, adjacency, &sorted);

    #[cfg(feature = "parallel")]
    let mut layers: Vec<T> = lines.par_iter().map(|layer| build(layer)).collect();

    #[cfg(not(feature = "parallel"))]
    let mut layers: Vec<T> = lines.iter().map(|layer| build(layer)).collect();

    position
        .into_iter()
        .map(|p| p.map(|k| std::mem::take(&mut layers[k])).unwrap_or_default())
        .collect()
}

/// Slice `mesh` at every height in `heights` and return the closed loops of
/// each layer, one entry per height in the order given.
///
/// Heights need not be sorted. A height outside the mesh, or one that is not
/// finite, gives an empty layer.
pub fn slice_mesh(
    mesh: &TriangleMesh,
    adjacency: &EdgeAdjacency,
    heights: &[Real],
    config: &SlicerConfig,
) -> Vec<Vec<Polygon>> {
    tracing::debug!(facets = mesh.facet_count(), layers = heights.len(), "slicing mesh");
    let layers = map_layers(mesh, adjacency, heights, |lines| make_loops(lines, config));
    tracing::debug!(
        loops = layers.iter().map(Vec::len).sum::<usize>(),
        "sliced mesh"
    );
    layers
}

/// Like [`slice_mesh`], with every layer nested into contours and holes by
/// [`make_expolygons`].
pub fn slice_mesh_ex(
    mesh: &TriangleMesh,
    adjacency: &EdgeAdjacency,
    heights: &[Real],
    config: &SlicerConfig,
) -> Vec<Vec<ExPolygon>> {
    tracing::debug!(facets = mesh.facet_count(), layers = heights.len(), "slicing mesh");
    // The largest region is picked after nesting, so every loop has to survive
    let loop_config = match config.mode {
        SlicingMode::PositiveLargestContour => config.clone().with_mode(SlicingMode::Positive),
        _ => config.clone(),
    };
    let layers = map_layers(mesh, adjacency, heights, |lines| {
        make_expolygons(&make_loops(lines, &loop_config), config)
    });
    tracing::debug!(
        expolygons = layers.iter().map(Vec::len).sum::<usize>(),
        "sliced mesh"
    );
    layers
}

/// A mesh prepared for repeated slicing and cutting.
///
/// The edge adjacency is built once on construction and reused by every call.
///
/// ```
/// use meshslice::{TriangleMesh, TriangleMeshSlicer};
///
/// let cube = TriangleMesh::cube(10.0, 10.0, 10.0);
/// let slicer = TriangleMeshSlicer::new(&cube);
/// let layers = slicer.slice(&[2.5, 5.0, 7.5]);
/// assert!(layers.iter().all(|layer| layer.len() == 1));
/// ```
#[derive(Debug, Clone)]
pub struct TriangleMeshSlicer<'a> {
    mesh: &'a TriangleMesh,
    adjacency: EdgeAdjacency,
    config: SlicerConfig,
}

impl<'a> TriangleMeshSlicer<'a> {
    pub fn new(mesh: &'a TriangleMesh) -> Self {
        Self::with_config(mesh, SlicerConfig::default())
    }

    pub fn with_config(mesh: &'a TriangleMesh, config: SlicerConfig) -> Self {
        Self {
            mesh,
            adjacency: EdgeAdjacency::build(mesh),
            config,
        }
    }

    pub const fn mesh(&self) -> &'a TriangleMesh {
        self.mesh
    }

    pub const fn adjacency(&self) -> &EdgeAdjacency {
        &self.adjacency
    }

    pub const fn config(&self) -> &SlicerConfig {
        &self.config
    }

    /// Closed loops per height. See [`slice_mesh`].
    pub fn slice(&self, heights: &[Real]) -> Vec<Vec<Polygon>> {
        slice_mesh(self.mesh, &self.adjacency, heights, &self.config)
    }

    /// Contours with holes per height. See [`slice_mesh_ex`].
    pub fn slice_ex(&self, heights: &[Real]) -> Vec<Vec<ExPolygon>> {
        slice_mesh_ex(self.mesh, &self.adjacency, heights, &self.config)
    }

    /// Split the mesh at `z` into `(upper, lower)`, capped unless
    /// [`SlicerConfig::triangulate_caps`] is off. See [`crate::cut::cut_mesh`].
    pub fn cut(&self, z: Real) -> (TriangleMesh, TriangleMesh) {
        crate::cut::cut_mesh(self.mesh, &self.adjacency, z, self.config.triangulate_caps)
    }
}
