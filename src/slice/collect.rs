//! Dispatch of the facet intersector over a list of plane heights.

use crate::float_types::Real;
use crate::mesh::{EdgeAdjacency, TriangleMesh};
use crate::slice::intersect::{FacetEdgeType, IntersectionLine, horizontal_facet_lines, slice_facet};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Range of indices into the ascending `heights` that fall inside `[min_z, max_z]`.
fn layer_range(heights: &[Real], min_z: Real, max_z: Real) -> std::ops::Range<usize> {
    let first = heights.partition_point(|&h| h < min_z);
    let last = heights.partition_point(|&h| h <= max_z);
    first..last.max(first)
}

/// Every slice line a single facet contributes, tagged with its layer index.
fn facet_lines(
    mesh: &TriangleMesh,
    adjacency: &EdgeAdjacency,
    facet_idx: usize,
    heights: &[Real],
) -> Vec<(usize, IntersectionLine)> {
    let (min_z, max_z) = mesh.facet_z_range(facet_idx);
    let mut out = Vec::new();
    for layer in layer_range(heights, min_z, max_z) {
        let Some(line) = slice_facet(mesh, adjacency, facet_idx, heights[layer], min_z, max_z) else {
            continue;
        };
        if line.edge_type == FacetEdgeType::Horizontal {
            out.extend(horizontal_facet_lines(mesh, facet_idx).map(|l| (layer, l)));
        } else {
            out.push((layer, line));
        }
    }
    out
}

/// Intersect every facet with every plane it spans.
///
/// `heights` must be ascending. Returns one line list per height, in the same
/// order; within a layer the lines follow facet order.
pub fn collect_layer_lines(
    mesh: &TriangleMesh,
    adjacency: &EdgeAdjacency,
    heights: &[Real],
) -> Vec<Vec<IntersectionLine>> {
    let mut layers: Vec<Vec<IntersectionLine>> = vec![Vec::new(); heights.len()];
    if heights.is_empty() {
        return layers;
    }

    #[cfg(feature = "parallel")]
    let per_facet: Vec<Vec<(usize, IntersectionLine)>> = (0..mesh.facet_count())
        .into_par_iter()
        .map(|facet_idx| facet_lines(mesh, adjacency, facet_idx, heights))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let per_facet: Vec<Vec<(usize, IntersectionLine)>> = (0..mesh.facet_count())
        .map(|facet_idx| facet_lines(mesh, adjacency, facet_idx, heights))
        .collect();

    for (layer, line) in per_facet.into_iter().flatten() {
        layers[layer].push(line);
    }

    tracing::debug!(
        facets = mesh.facet_count(),
        layers = heights.len(),
        lines = layers.iter().map(Vec::len).sum::<usize>(),
        "collected slice lines"
    );
    layers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_range_is_inclusive() {
        let heights = [0.0, 0.5, 1.0, 1.5];
        assert_eq!(layer_range(&heights, 0.5, 1.0), 1..3);
        assert_eq!(layer_range(&heights, 0.2, 0.3), 1..1);
        assert_eq!(layer_range(&heights, -1.0, 5.0), 0..4);
        assert_eq!(layer_range(&heights, 2.0, 3.0), 4..4);
    }

    #[test]
    fn test_layers_follow_heights() {
        let cube = TriangleMesh::cube(1.0, 1.0, 1.0);
        let adjacency = EdgeAdjacency::build(&cube);
        let layers = collect_layer_lines(&cube, &adjacency, &[-1.0, 0.25, 0.75, 2.0]);
        assert_eq!(layers.len(), 4);
        assert!(layers[0].is_empty());
        assert_eq!(layers[1].len(), 8);
        assert_eq!(layers[2].len(), 8);
        assert!(layers[3].is_empty());
    }

    #[test]
    fn test_horizontal_facet_expands_to_three_edges() {
        let cube = TriangleMesh::cube(1.0, 1.0, 1.0);
        let adjacency = EdgeAdjacency::build(&cube);
        let layers = collect_layer_lines(&cube, &adjacency, &[1.0]);
        let horizontal = layers[0]
            .iter()
            .filter(|l| l.edge_type == FacetEdgeType::Horizontal)
            .count();
        assert_eq!(horizontal, 6);
    }
}
