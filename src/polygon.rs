//! 2D layer geometry: closed [`Polygon`] loops and contour-with-holes [`ExPolygon`]s.
//!
//! Both types are thin owned wrappers over `nalgebra` points. Boolean operations
//! and containment are delegated to `geo`, so both convert to and from `geo`
//! polygons. Triangulation goes through `spade` directly so that no boundary
//! point is snapped or dropped.

use crate::float_types::{Real, tolerance};
use geo::{Contains, Coord, LineString, Polygon as GeoPolygon};
use nalgebra::Point2;
use spade::{ConstrainedDelaunayTriangulation, Triangulation};
use std::collections::VecDeque;

/// A closed loop of 2D points. The closing point is implicit: the last point
/// connects back to the first. Positive signed area means counter-clockwise.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    pub points: Vec<Point2<Real>>,
}

impl Polygon {
    pub const fn new(points: Vec<Point2<Real>>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Signed area by the shoelace formula, positive for counter-clockwise loops.
    pub fn area(&self) -> Real {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut twice_area = 0.0;
        let mut j = n - 1;
        for i in 0..n {
            let (pj, pi) = (&self.points[j], &self.points[i]);
            twice_area += (pj.x + pi.x) * (pi.y - pj.y);
            j = i;
        }
        twice_area * 0.5
    }

    pub fn is_counter_clockwise(&self) -> bool {
        self.area() > 0.0
    }

    /// Fewer than three points, or an area too small to carry a winding.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 3 || self.area().abs() <= tolerance() * tolerance()
    }

    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    pub fn reversed(&self) -> Self {
        let mut out = self.clone();
        out.reverse();
        out
    }

    /// Closed `geo` ring of this loop.
    pub fn to_line_string(&self) -> LineString<Real> {
        let mut coords: Vec<Coord<Real>> = self
            .points
            .iter()
            .map(|p| Coord { x: p.x, y: p.y })
            .collect();
        if let Some(&first) = coords.first() {
            coords.push(first);
        }
        LineString::new(coords)
    }

    /// Inverse of [`Polygon::to_line_string`]: the closing coordinate is dropped.
    pub fn from_line_string(ring: &LineString<Real>) -> Self {
        let mut points: Vec<Point2<Real>> = ring.0.iter().map(|c| Point2::new(c.x, c.y)).collect();
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Self { points }
    }

    /// Whether `point` lies strictly inside this loop, regardless of winding.
    pub fn contains_point(&self, point: &Point2<Real>) -> bool {
        if self.points.len() < 3 {
            return false;
        }
        let ring = GeoPolygon::new(self.to_line_string(), vec![]);
        ring.contains(&geo::Point::new(point.x, point.y))
    }
}

/// One outer contour plus the holes directly inside it.
///
/// The contour winds counter-clockwise (positive area) and every hole winds
/// clockwise (negative area).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExPolygon {
    pub contour: Polygon,
    pub holes: Vec<Polygon>,
}

impl ExPolygon {
    pub const fn new(contour: Polygon) -> Self {
        Self {
            contour,
            holes: Vec::new(),
        }
    }

    /// Net area: the contour area plus the (negative) hole areas.
    pub fn area(&self) -> Real {
        self.contour.area() + self.holes.iter().map(Polygon::area).sum::<Real>()
    }

    pub fn to_geo(&self) -> GeoPolygon<Real> {
        GeoPolygon::new(
            self.contour.to_line_string(),
            self.holes.iter().map(Polygon::to_line_string).collect(),
        )
    }

    /// Build from a `geo` polygon, forcing the contour counter-clockwise and
    /// the holes clockwise.
    pub fn from_geo(polygon: &GeoPolygon<Real>) -> Self {
        let mut contour = Polygon::from_line_string(polygon.exterior());
        if contour.area() < 0.0 {
            contour.reverse();
        }
        let holes = polygon
            .interiors()
            .iter()
            .map(|ring| {
                let mut hole = Polygon::from_line_string(ring);
                if hole.area() > 0.0 {
                    hole.reverse();
                }
                hole
            })
            .collect();
        Self { contour, holes }
    }

    /// Whether `point` lies inside the contour and outside every hole.
    pub fn contains_point(&self, point: &Point2<Real>) -> bool {
        self.to_geo().contains(&geo::Point::new(point.x, point.y))
    }

    /// Triangulate the region into counter-clockwise triangles that reuse the
    /// input coordinates. See [`triangulate_2d`].
    pub fn triangulate(&self) -> Vec<[Point2<Real>; 3]> {
        let holes: Vec<&[Point2<Real>]> = self.holes.iter().map(|h| h.points.as_slice()).collect();
        triangulate_2d(&self.contour.points, &holes)
    }
}

/// Constrained Delaunay triangulation of an outer ring and hole rings (closing
/// point implicit).
///
/// Every ring vertex is kept with its exact input coordinates and every ring
/// edge is a triangle edge, unless a ring vertex lies exactly on another ring
/// edge, which then gets split at it. Faces are kept by even-odd crossing depth
/// across the rings, so hole winding does not matter. Triangles come out
/// counter-clockwise.
pub fn triangulate_2d(outer: &[Point2<Real>], holes: &[&[Point2<Real>]]) -> Vec<[Point2<Real>; 3]> {
    let mut cdt = ConstrainedDelaunayTriangulation::<spade::Point2<Real>>::new();
    let mut conflicts = 0usize;
    for ring in std::iter::once(outer).chain(holes.iter().copied()) {
        let mut handles = Vec::with_capacity(ring.len());
        for p in ring {
            match cdt.insert(spade::Point2::new(p.x, p.y)) {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    tracing::warn!(%err, x = p.x, y = p.y, "vertex rejected by the triangulator, region left uncovered");
                    return Vec::new();
                }
            }
        }
        for (k, &from) in handles.iter().enumerate() {
            let to = handles[(k + 1) % handles.len()];
            if from != to && !cdt.exists_constraint(from, to) && cdt.try_add_constraint(from, to).is_empty() {
                conflicts += 1;
            }
        }
    }
    if conflicts > 0 {
        tracing::warn!(conflicts, "crossing ring edges left unconstrained");
    }

    // 0-1 breadth first walk from the outer face; crossing a ring edge adds one
    let mut depth = vec![usize::MAX; cdt.num_all_faces()];
    let mut queue = VecDeque::new();
    for face in cdt.inner_faces() {
        for edge in face.adjacent_edges() {
            if !edge.rev().face().is_outer() {
                continue;
            }
            let d = usize::from(edge.is_constraint_edge());
            let slot = &mut depth[face.index()];
            if d < *slot {
                *slot = d;
                if d == 0 {
                    queue.push_front(face);
                } else {
                    queue.push_back(face);
                }
            }
        }
    }
    while let Some(face) = queue.pop_front() {
        let d = depth[face.index()];
        for edge in face.adjacent_edges() {
            let Some(next) = edge.rev().face().as_inner() else {
                continue;
            };
            let step = usize::from(edge.is_constraint_edge());
            let slot = &mut depth[next.index()];
            if d + step < *slot {
                *slot = d + step;
                if step == 0 {
                    queue.push_front(next);
                } else {
                    queue.push_back(next);
                }
            }
        }
    }

    cdt.inner_faces()
        .filter(|face| {
            let d = depth[face.index()];
            d != usize::MAX && d % 2 == 1
        })
        .map(|face| face.positions().map(|p| Point2::new(p.x, p.y)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: Real) -> Polygon {
        Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(size, 0.0),
            Point2::new(size, size),
            Point2::new(0.0, size),
        ])
    }

    #[test]
    fn test_signed_area_follows_winding() {
        let ccw = square(2.0);
        assert_eq!(ccw.area(), 4.0);
        assert!(ccw.is_counter_clockwise());
        assert_eq!(ccw.reversed().area(), -4.0);
    }

    #[test]
    fn test_line_string_round_trip_drops_closing_point() {
        let poly = square(1.0);
        let ring = poly.to_line_string();
        assert_eq!(ring.0.len(), 5);
        assert_eq!(Polygon::from_line_string(&ring), poly);
    }

    #[test]
    fn test_degenerate_loops() {
        let two = Polygon::new(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)]);
        assert!(two.is_degenerate());
        let collinear = Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ]);
        assert!(collinear.is_degenerate());
        assert!(!square(1.0).is_degenerate());
    }

    #[test]
    fn test_expolygon_area_and_containment() {
        let mut ex = ExPolygon::new(square(4.0));
        let hole = Polygon::new(vec![
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 3.0),
            Point2::new(3.0, 3.0),
            Point2::new(3.0, 1.0),
        ]);
        assert!(hole.area() < 0.0);
        ex.holes.push(hole);

        assert_eq!(ex.area(), 12.0);
        assert!(ex.contains_point(&Point2::new(0.5, 0.5)));
        assert!(!ex.contains_point(&Point2::new(2.0, 2.0)));
    }

    #[test]
    fn test_from_geo_normalizes_orientation() {
        let cw = square(1.0).reversed();
        let geo_poly = GeoPolygon::new(cw.to_line_string(), vec![]);
        let ex = ExPolygon::from_geo(&geo_poly);
        assert!(ex.contour.is_counter_clockwise());
    }

    #[test]
    fn test_triangulate_covers_area_with_ccw_triangles() {
        let mut ex = ExPolygon::new(square(4.0));
        ex.holes.push(
            Polygon::new(vec![
                Point2::new(1.0, 1.0),
                Point2::new(3.0, 1.0),
                Point2::new(3.0, 3.0),
                Point2::new(1.0, 3.0),
            ])
            .reversed(),
        );
        let tris = ex.triangulate();
        // n + 2h - 2 for 8 ring vertices and one hole
        assert_eq!(tris.len(), 8);
        let mut total = 0.0;
        for [a, b, c] in &tris {
            let twice = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
            assert!(twice > 0.0, "triangle must be counter-clockwise");
            total += twice * 0.5;
        }
        assert!((total - 12.0).abs() < 1e-9, "triangulated area {total}");
    }

    #[test]
    fn test_triangulation_keeps_near_collinear_ring() {
        // A 64-gon with every edge split at its interpolated midpoint
        let n = 64;
        let corners: Vec<Point2<Real>> = (0..n)
            .map(|i| {
                let (s, c) = (crate::float_types::TAU * i as Real / n as Real).sin_cos();
                Point2::new(c, s)
            })
            .collect();
        let mut points = Vec::with_capacity(2 * n);
        for i in 0..n {
            let (a, b) = (corners[i], corners[(i + 1) % n]);
            points.push(a);
            points.push(Point2::new(a.x + (b.x - a.x) * 0.5, a.y + (b.y - a.y) * 0.5));
        }
        let ring = Polygon::new(points.clone());
        let tris = ExPolygon::new(ring.clone()).triangulate();
        assert_eq!(tris.len(), points.len() - 2);

        let area: Real = tris
            .iter()
            .map(|[a, b, c]| 0.5 * ((b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)))
            .sum();
        assert!((area - ring.area()).abs() < 1e-9);

        // Every ring edge is used once, in ring direction
        for k in 0..points.len() {
            let (from, to) = (points[k], points[(k + 1) % points.len()]);
            let uses = tris
                .iter()
                .filter(|t| (0..3).any(|j| t[j] == from && t[(j + 1) % 3] == to))
                .count();
            assert_eq!(uses, 1, "ring edge {k}");
        }
    }
}
