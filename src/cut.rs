//! Splitting a mesh into two closed halves along a horizontal plane.

use crate::config::SlicerConfig;
use crate::float_types::Real;
use crate::mesh::{EdgeAdjacency, TriangleMesh, VertexWelder};
use crate::polygon::ExPolygon;
use crate::slice::intersect::{FacetEdgeType, edge_crossing, slice_facet};
use crate::slice::{make_expolygons_simple, make_loops};
use nalgebra::Point3;

/// Accumulates triangles for one side of the cut, welding their corners by
/// exact coordinates.
#[derive(Debug, Default)]
struct HalfMesh {
    welder: VertexWelder,
    indices: Vec<[usize; 3]>,
}

impl HalfMesh {
    fn push(&mut self, triangle: [Point3<Real>; 3]) {
        let tri = triangle.map(|p| self.welder.weld(p));
        // A split edge ending on the plane collapses one corner
        if tri[0] == tri[1] || tri[1] == tri[2] || tri[2] == tri[0] {
            return;
        }
        self.indices.push(tri);
    }

    /// Triangulate `caps` at height `z`, facing up or down.
    fn push_caps(&mut self, caps: &[ExPolygon], z: Real, facing_up: bool) {
        for cap in caps {
            for [a, b, c] in cap.triangulate() {
                let [a, b, c] = [a, b, c].map(|p| Point3::new(p.x, p.y, z));
                if facing_up {
                    self.push([a, b, c]);
                } else {
                    self.push([a, c, b]);
                }
            }
        }
    }

    fn finish(self) -> TriangleMesh {
        TriangleMesh::from_generated(self.welder.into_vertices(), &self.indices)
    }
}

/// The point where the edge between shared vertices `i` and `j` meets `z`,
/// snapped to an endpoint lying on the plane.
fn split_point(mesh: &TriangleMesh, i: usize, j: usize, z: Real) -> Point3<Real> {
    if mesh.vertices[i].z == z {
        mesh.vertices[i]
    } else if mesh.vertices[j].z == z {
        mesh.vertices[j]
    } else {
        edge_crossing(mesh, i, j, z)
    }
}

/// Cut `mesh` with the plane at height `z`, returning `(upper, lower)`.
///
/// Facets above the plane go to `upper` and facets below it to `lower`;
/// facets crossing it are split into a triangle and a quad. With
/// `triangulate_caps` the opening left on each side is closed with a flat cap:
/// facing down on `upper`, facing up on `lower`. Facets lying in the plane are
/// dropped either way.
///
/// With caps, both halves are closed if `mesh` is. Either one is empty when
/// the plane misses the mesh.
pub fn cut_mesh(
    mesh: &TriangleMesh,
    adjacency: &EdgeAdjacency,
    z: Real,
    triangulate_caps: bool,
) -> (TriangleMesh, TriangleMesh) {
    tracing::debug!(facets = mesh.facet_count(), z, "cutting mesh");
    let mut upper = HalfMesh::default();
    let mut lower = HalfMesh::default();
    let mut upper_lines = Vec::new();
    let mut lower_lines = Vec::new();

    for facet_idx in 0..mesh.facet_count() {
        let (min_z, max_z) = mesh.facet_z_range(facet_idx);

        if min_z <= z && z <= max_z {
            if let Some(line) = slice_facet(mesh, adjacency, facet_idx, z, min_z, max_z) {
                match line.edge_type {
                    FacetEdgeType::Top => lower_lines.push(line),
                    FacetEdgeType::Bottom => upper_lines.push(line),
                    FacetEdgeType::None => {
                        upper_lines.push(line);
                        lower_lines.push(line);
                    }
                    FacetEdgeType::Horizontal => {}
                }
            }
        }

        let ids = mesh.facets[facet_idx].vertices;
        let points = mesh.facet_points(facet_idx);
        if min_z > z || (min_z == z && max_z > z) {
            upper.push(points);
        } else if max_z < z || (max_z == z && min_z < z) {
            lower.push(points);
        } else if min_z < z && z < max_z {
            // The corner alone on its side of the plane
            let above = points.map(|p| p.z > z);
            let isolated = if above[0] == above[1] {
                2
            } else if above[1] == above[2] {
                0
            } else {
                1
            };
            let (i0, i1, i2) = (isolated, (isolated + 1) % 3, (isolated + 2) % 3);
            let (v0, v1, v2) = (points[i0], points[i1], points[i2]);
            let v0v1 = split_point(mesh, ids[i0], ids[i1], z);
            let v2v0 = split_point(mesh, ids[i2], ids[i0], z);

            let (tip_side, quad_side) = if above[i0] {
                (&mut upper, &mut lower)
            } else {
                (&mut lower, &mut upper)
            };
            tip_side.push([v0, v0v1, v2v0]);
            quad_side.push([v1, v2, v0v1]);
            quad_side.push([v2, v2v0, v0v1]);
        }
    }

    let (upper_caps, lower_caps) = if triangulate_caps {
        // Caps must reuse the split coordinates exactly, so no offsetting here
        let config = SlicerConfig::exact();
        (
            make_expolygons_simple(&make_loops(&upper_lines, &config)),
            make_expolygons_simple(&make_loops(&lower_lines, &config)),
        )
    } else {
        (Vec::new(), Vec::new())
    };
    upper.push_caps(&upper_caps, z, false);
    lower.push_caps(&lower_caps, z, true);

    let (upper, lower) = (upper.finish(), lower.finish());
    tracing::debug!(
        upper_facets = upper.facet_count(),
        lower_facets = lower.facet_count(),
        upper_caps = upper_caps.len(),
        lower_caps = lower_caps.len(),
        "cut mesh"
    );
    (upper, lower)
}
