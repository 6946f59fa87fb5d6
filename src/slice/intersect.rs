//! Intersection of a single facet with a horizontal plane.

use crate::float_types::Real;
use crate::mesh::{EdgeAdjacency, TriangleMesh};
use nalgebra::{Point2, Point3};

/// A point of a slice line, tagged with the mesh feature it lies on so that
/// lines from neighbouring facets can be chained by identity instead of by
/// coordinate comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionPoint {
    pub point: Point2<Real>,
    /// Set when the point coincides with a shared mesh vertex.
    pub vertex_id: Option<usize>,
    /// Set when the point lies strictly inside a mesh edge.
    pub edge_id: Option<usize>,
}

impl IntersectionPoint {
    pub(crate) fn at_vertex(mesh: &TriangleMesh, vertex_id: usize) -> Self {
        let v = mesh.vertices[vertex_id];
        Self {
            point: Point2::new(v.x, v.y),
            vertex_id: Some(vertex_id),
            edge_id: None,
        }
    }

    pub(crate) fn on_edge(point: Point2<Real>, edge_id: usize) -> Self {
        Self {
            point,
            vertex_id: None,
            edge_id: Some(edge_id),
        }
    }
}

/// How a slice line relates to the facet it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FacetEdgeType {
    /// The plane crosses the facet interior.
    #[default]
    None,
    /// A facet edge lies in the plane and the facet is below it.
    Top,
    /// A facet edge lies in the plane and the facet is above it.
    Bottom,
    /// The whole facet lies in the plane.
    Horizontal,
}

/// A directed slice segment `a -> b`. Walking every line of a closed layer
/// keeps the material on the left, so outer loops come out counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionLine {
    pub a: IntersectionPoint,
    pub b: IntersectionPoint,
    pub edge_type: FacetEdgeType,
}

impl IntersectionLine {
    /// A line between two shared vertices, used for in-plane facet edges.
    pub(crate) fn between_vertices(mesh: &TriangleMesh, a_id: usize, b_id: usize, edge_type: FacetEdgeType) -> Self {
        Self {
            a: IntersectionPoint::at_vertex(mesh, a_id),
            b: IntersectionPoint::at_vertex(mesh, b_id),
            edge_type,
        }
    }

    pub fn a_id(&self) -> Option<usize> {
        self.a.vertex_id
    }

    pub fn b_id(&self) -> Option<usize> {
        self.b.vertex_id
    }

    pub fn edge_a_id(&self) -> Option<usize> {
        self.a.edge_id
    }

    pub fn edge_b_id(&self) -> Option<usize> {
        self.b.edge_id
    }

    pub fn reversed(&self) -> Self {
        Self {
            a: self.b,
            b: self.a,
            edge_type: self.edge_type,
        }
    }
}

/// Point where the edge between shared vertices `i` and `j` crosses `z`.
///
/// The endpoints are ordered by vertex index before interpolating, so every
/// facet sharing the edge gets the same bits back.
pub(crate) fn edge_crossing(mesh: &TriangleMesh, i: usize, j: usize, z: Real) -> Point3<Real> {
    let (a, b) = if i < j {
        (mesh.vertices[j], mesh.vertices[i])
    } else {
        (mesh.vertices[i], mesh.vertices[j])
    };
    let t = (z - b.z) / (a.z - b.z);
    Point3::new(b.x + (a.x - b.x) * t, b.y + (a.y - b.y) * t, z)
}

/// Intersect facet `facet_idx` with the plane at height `z`.
///
/// `min_z` and `max_z` are the facet's vertical extent, with
/// `min_z <= z <= max_z`. Heights are compared exactly.
///
/// Returns `None` when the facet only touches the plane at one vertex. A facet
/// lying in the plane yields a single [`FacetEdgeType::Horizontal`] line; an
/// edge lying in the plane yields a `Top` or `Bottom` line.
pub fn slice_facet(
    mesh: &TriangleMesh,
    adjacency: &EdgeAdjacency,
    facet_idx: usize,
    z: Real,
    min_z: Real,
    max_z: Real,
) -> Option<IntersectionLine> {
    let facet = &mesh.facets[facet_idx];
    let ids = facet.vertices;
    let pts = mesh.facet_points(facet_idx);

    // Start at the lowest vertex for a deterministic point order
    let start = if pts[1].z == min_z {
        1
    } else if pts[2].z == min_z {
        2
    } else {
        0
    };

    let mut points: Vec<IntersectionPoint> = Vec::with_capacity(3);
    let mut touches: Vec<usize> = Vec::with_capacity(2);

    for j in start..start + 3 {
        let (ia, ib) = (j % 3, (j + 1) % 3);
        let (a_id, b_id) = (ids[ia], ids[ib]);
        let (a, b) = (pts[ia], pts[ib]);

        if a.z == z && b.z == z {
            let edge_type = if min_z == max_z {
                FacetEdgeType::Horizontal
            } else if pts.iter().any(|p| p.z < z) {
                FacetEdgeType::Top
            } else {
                FacetEdgeType::Bottom
            };
            let reverse = match edge_type {
                FacetEdgeType::Horizontal => facet.normal.z < 0.0,
                FacetEdgeType::Top => true,
                _ => false,
            };
            let line = IntersectionLine::between_vertices(mesh, a_id, b_id, edge_type);
            return Some(if reverse { line.reversed() } else { line });
        } else if a.z == z {
            touches.push(points.len());
            points.push(IntersectionPoint::at_vertex(mesh, a_id));
        } else if b.z == z {
            touches.push(points.len());
            points.push(IntersectionPoint::at_vertex(mesh, b_id));
        } else if (a.z < z && b.z > z) || (b.z < z && a.z > z) {
            let p = edge_crossing(mesh, a_id, b_id, z);
            points.push(IntersectionPoint::on_edge(
                Point2::new(p.x, p.y),
                adjacency.edge_id(facet_idx, ia),
            ));
        }
    }

    if !touches.is_empty() {
        // A touched vertex is reached by both of its edges
        let consistent = touches.len() == 2 && points[touches[0]].vertex_id == points[touches[1]].vertex_id;
        if !consistent {
            tracing::trace!(
                facet = facet_idx,
                z,
                touches = touches.len(),
                "inconsistent vertex touches, facet skipped"
            );
            return None;
        }
        if points.len() < 3 {
            // Tangent at a single vertex
            return None;
        }
        points.remove(touches[1]);
    }

    if points.len() != 2 {
        return None;
    }
    Some(IntersectionLine {
        a: points[1],
        b: points[0],
        edge_type: FacetEdgeType::None,
    })
}

/// The three boundary edges of a facet lying in the plane, wound so that the
/// facet interior is on the left when seen from above.
pub fn horizontal_facet_lines(mesh: &TriangleMesh, facet_idx: usize) -> [IntersectionLine; 3] {
    let facet = &mesh.facets[facet_idx];
    let v = facet.vertices;
    let reverse = facet.normal.z < 0.0;
    [0, 1, 2].map(|j| {
        let (mut a_id, mut b_id) = (v[j], v[(j + 1) % 3]);
        if reverse {
            std::mem::swap(&mut a_id, &mut b_id);
        }
        IntersectionLine::between_vertices(mesh, a_id, b_id, FacetEdgeType::Horizontal)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slice_all(mesh: &TriangleMesh, z: Real) -> Vec<IntersectionLine> {
        let adjacency = EdgeAdjacency::build(mesh);
        (0..mesh.facet_count())
            .filter_map(|i| {
                let (lo, hi) = mesh.facet_z_range(i);
                if lo <= z && z <= hi {
                    slice_facet(mesh, &adjacency, i, z, lo, hi)
                } else {
                    None
                }
            })
            .collect()
    }

    #[test]
    fn test_crossing_facet_gives_untyped_line() {
        let cube = TriangleMesh::cube(1.0, 1.0, 1.0);
        let lines = slice_all(&cube, 0.5);
        // 8 side facets cross the plane, top and bottom do not reach it
        assert_eq!(lines.len(), 8);
        for line in &lines {
            assert_eq!(line.edge_type, FacetEdgeType::None);
            assert!(line.edge_a_id().is_some() && line.edge_b_id().is_some());
        }
    }

    #[test]
    fn test_shared_edge_crossings_are_bit_identical() {
        let cube = TriangleMesh::cube(1.0, 1.0, 1.0);
        let z = 1.0 / 3.0;
        let lines = slice_all(&cube, z);
        for line in &lines {
            let partner = lines
                .iter()
                .find(|other| other.edge_a_id() == line.edge_b_id())
                .expect("every crossing continues into a neighbour");
            assert_eq!(partner.a.point, line.b.point);
        }
    }

    #[test]
    fn test_bottom_plane_classification() {
        let cube = TriangleMesh::cube(1.0, 1.0, 1.0);
        let lines = slice_all(&cube, 0.0);
        let horizontal = lines.iter().filter(|l| l.edge_type == FacetEdgeType::Horizontal).count();
        let bottom = lines.iter().filter(|l| l.edge_type == FacetEdgeType::Bottom).count();
        assert_eq!(horizontal, 2);
        // 4 side faces each contribute their lower edge once
        assert_eq!(bottom, 4);
        assert!(lines.iter().all(|l| l.edge_type != FacetEdgeType::None && l.edge_type != FacetEdgeType::Top));
    }

    #[test]
    fn test_top_edge_is_reversed() {
        let cube = TriangleMesh::cube(1.0, 1.0, 1.0);
        let lines = slice_all(&cube, 1.0);
        let tops: Vec<_> = lines.iter().filter(|l| l.edge_type == FacetEdgeType::Top).collect();
        assert_eq!(tops.len(), 4);
        // Seen from above, the material lies to the left of a counter-clockwise walk
        let area: Real = tops
            .iter()
            .map(|l| l.a.point.x * l.b.point.y - l.b.point.x * l.a.point.y)
            .sum();
        assert!(area > 0.0);
    }

    #[test]
    fn test_single_vertex_touch_is_noop() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let mesh = TriangleMesh::new(vertices, &[[0, 1, 2]]).unwrap();
        let adjacency = EdgeAdjacency::build(&mesh);
        assert_eq!(slice_facet(&mesh, &adjacency, 0, 0.0, 0.0, 1.0), None);
    }

    #[test]
    fn test_vertex_and_crossing_keep_vertex_identity() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 2.0),
        ];
        let mesh = TriangleMesh::new(vertices, &[[0, 1, 2]]).unwrap();
        let adjacency = EdgeAdjacency::build(&mesh);
        let line = slice_facet(&mesh, &adjacency, 0, 1.0, 0.0, 2.0).unwrap();
        let ids = [line.a_id(), line.b_id()];
        assert!(ids.contains(&Some(1)));
        let crossing = if line.a_id().is_some() { line.b } else { line.a };
        assert_eq!(crossing.edge_id, Some(adjacency.edge_id(0, 2)));
        assert_eq!(crossing.point, Point2::new(0.0, 0.5));
    }

    #[test]
    fn test_horizontal_facet_lines_follow_normal() {
        let cube = TriangleMesh::cube(1.0, 1.0, 1.0);
        // facet 0 is on the bottom with a downward normal
        let lines = horizontal_facet_lines(&cube, 0);
        let area: Real = lines
            .iter()
            .map(|l| l.a.point.x * l.b.point.y - l.b.point.x * l.a.point.y)
            .sum();
        assert!(area > 0.0);
    }
}
