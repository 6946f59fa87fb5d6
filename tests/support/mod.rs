//! Test support library
//! Provides mesh fixtures and float helpers shared by the integration tests.
#![allow(dead_code)]

use meshslice::{TriangleMesh, float_types::Real};
use nalgebra::Point3;

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Two triangles for a quad given counter-clockwise as seen from outside.
fn quad(out: &mut Vec<Point3<Real>>, a: Point3<Real>, b: Point3<Real>, c: Point3<Real>, d: Point3<Real>) {
    out.extend([a, b, c, a, c, d]);
}

/// A square tube around the Z axis: outer half-width `outer`, hole half-width
/// `inner`, from `z = 0` to `z = height`.
pub fn square_tube(outer: Real, inner: Real, height: Real) -> TriangleMesh {
    let ring = |r: Real, z: Real| {
        [
            Point3::new(-r, -r, z),
            Point3::new(r, -r, z),
            Point3::new(r, r, z),
            Point3::new(-r, r, z),
        ]
    };
    let (ob, ot) = (ring(outer, 0.0), ring(outer, height));
    let (ib, it) = (ring(inner, 0.0), ring(inner, height));

    let mut soup = Vec::new();
    for k in 0..4 {
        let n = (k + 1) % 4;
        quad(&mut soup, ob[k], ob[n], ot[n], ot[k]);
        quad(&mut soup, ib[n], ib[k], it[k], it[n]);
        quad(&mut soup, ot[k], ot[n], it[n], it[k]);
        quad(&mut soup, ob[n], ob[k], ib[k], ib[n]);
    }
    TriangleMesh::from_triangles(&soup).expect("tube soup is well formed")
}

/// A tetrahedron standing on its apex at the origin, base at `z = 1`.
pub fn tetrahedron_on_apex() -> TriangleMesh {
    let mut vertices = vec![Point3::origin()];
    for k in 0..3 {
        let angle = meshslice::float_types::TAU * k as Real / 3.0;
        vertices.push(Point3::new(angle.cos(), angle.sin(), 1.0));
    }
    TriangleMesh::new(vertices, &[[1, 2, 3], [0, 2, 1], [0, 3, 2], [0, 1, 3]]).expect("valid indices")
}

/// A 4×4×1 block centered on the Z axis with a 2×2×1 tower standing on it,
/// so the block's top is an annulus of horizontal facets at `z = 1`.
pub fn stepped_block() -> TriangleMesh {
    let ring = |r: Real, z: Real| {
        [
            Point3::new(-r, -r, z),
            Point3::new(r, -r, z),
            Point3::new(r, r, z),
            Point3::new(-r, r, z),
        ]
    };
    let (base_bottom, base_top) = (ring(2.0, 0.0), ring(2.0, 1.0));
    let (tower_bottom, tower_top) = (ring(1.0, 1.0), ring(1.0, 2.0));

    let mut soup = Vec::new();
    quad(&mut soup, base_bottom[0], base_bottom[3], base_bottom[2], base_bottom[1]);
    for k in 0..4 {
        let n = (k + 1) % 4;
        quad(&mut soup, base_bottom[k], base_bottom[n], base_top[n], base_top[k]);
    }
    for k in 0..4 {
        let n = (k + 1) % 4;
        quad(&mut soup, base_top[k], base_top[n], tower_bottom[n], tower_bottom[k]);
    }
    for k in 0..4 {
        let n = (k + 1) % 4;
        quad(&mut soup, tower_bottom[k], tower_bottom[n], tower_top[n], tower_top[k]);
    }
    quad(&mut soup, tower_top[0], tower_top[1], tower_top[2], tower_top[3]);
    TriangleMesh::from_triangles(&soup).expect("stepped block soup is well formed")
}

/// A unit cube with an extra fin facet hanging off one vertical edge, so that
/// edge is shared by three facets.
pub fn cube_with_fin() -> TriangleMesh {
    let cube = TriangleMesh::cube(1.0, 1.0, 1.0);
    let mut vertices = cube.vertices().to_vec();
    vertices.push(Point3::new(2.0, -1.0, 0.5));
    let mut indices: Vec<[usize; 3]> = cube.facets().iter().map(|f| f.vertices).collect();
    // vertices 1 and 7 span the edge at x = 1, y = 0
    indices.push([1, 8, 7]);
    TriangleMesh::new(vertices, &indices).expect("valid indices")
}

/// Area of a regular `n`-gon inscribed in a circle of radius `r`.
pub fn regular_polygon_area(r: Real, n: usize) -> Real {
    0.5 * n as Real * r * r * (meshslice::float_types::TAU / n as Real).sin()
}
