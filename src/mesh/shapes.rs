//! Primitive closed meshes, all manifold and wound counter-clockwise from outside.

use crate::float_types::{PI, Real, TAU};
use crate::mesh::TriangleMesh;
use nalgebra::Point3;

impl TriangleMesh {
    /// Axis-aligned box spanning `[0, x] × [0, y] × [0, z]`: 8 vertices, 12 facets.
    ///
    /// ```text
    ///     5-------4
    ///    /|      /|
    ///   6-------7 |
    ///   | 3-----|-0
    ///   |/      |/
    ///   2-------1
    /// ```
    pub fn cube(x: Real, y: Real, z: Real) -> TriangleMesh {
        let vertices = vec![
            Point3::new(x, y, 0.0),
            Point3::new(x, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, y, 0.0),
            Point3::new(x, y, z),
            Point3::new(0.0, y, z),
            Point3::new(0.0, 0.0, z),
            Point3::new(x, 0.0, z),
        ];
        let indices = [
            [0, 1, 2], // bottom
            [0, 2, 3],
            [4, 5, 6], // top
            [4, 6, 7],
            [0, 4, 7], // +x
            [0, 7, 1],
            [1, 7, 6], // -y
            [1, 6, 2],
            [2, 6, 5], // -x
            [2, 5, 3],
            [4, 0, 3], // +y
            [4, 3, 5],
        ];
        Self::from_generated(vertices, &indices)
    }

    /// Cylinder of radius `r` around the Z axis from `z = 0` to `z = h`, with a
    /// regular `segments`-gon cross-section (at least 3).
    pub fn cylinder(r: Real, h: Real, segments: usize) -> TriangleMesh {
        let n = segments.max(3);
        let mut vertices = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, h)];
        for i in 0..n {
            let theta = TAU * i as Real / n as Real;
            let (s, c) = theta.sin_cos();
            vertices.push(Point3::new(r * c, r * s, 0.0));
            vertices.push(Point3::new(r * c, r * s, h));
        }
        let bottom = |i: usize| 2 + 2 * (i % n);
        let top = |i: usize| 3 + 2 * (i % n);

        let mut indices = Vec::with_capacity(4 * n);
        for i in 0..n {
            indices.push([0, bottom(i + 1), bottom(i)]);
            indices.push([1, top(i), top(i + 1)]);
            indices.push([bottom(i), bottom(i + 1), top(i + 1)]);
            indices.push([bottom(i), top(i + 1), top(i)]);
        }
        Self::from_generated(vertices, &indices)
    }

    /// UV sphere of radius `r` centered at the origin with shared pole vertices.
    ///
    /// * `segments` – divisions around the Z axis (at least 3)
    /// * `stacks` – divisions from pole to pole (at least 2)
    pub fn sphere(r: Real, segments: usize, stacks: usize) -> TriangleMesh {
        let n = segments.max(3);
        let stacks = stacks.max(2);
        let mut vertices = vec![Point3::new(0.0, 0.0, -r), Point3::new(0.0, 0.0, r)];
        for k in 1..stacks {
            let phi = -PI / 2.0 + PI * k as Real / stacks as Real;
            let (z, ring_r) = (r * phi.sin(), r * phi.cos());
            for i in 0..n {
                let (s, c) = (TAU * i as Real / n as Real).sin_cos();
                vertices.push(Point3::new(ring_r * c, ring_r * s, z));
            }
        }
        let ring = |k: usize, i: usize| 2 + (k - 1) * n + i % n;

        let mut indices = Vec::new();
        for i in 0..n {
            indices.push([0, ring(1, i + 1), ring(1, i)]);
            indices.push([1, ring(stacks - 1, i), ring(stacks - 1, i + 1)]);
        }
        for k in 1..stacks - 1 {
            for i in 0..n {
                indices.push([ring(k, i), ring(k, i + 1), ring(k + 1, i + 1)]);
                indices.push([ring(k, i), ring(k + 1, i + 1), ring(k + 1, i)]);
            }
        }
        Self::from_generated(vertices, &indices)
    }

    /// Torus around the Z axis, centered at the origin.
    ///
    /// * `major_r` – distance from center to tube center (R)
    /// * `minor_r` – tube radius (r)
    /// * `segments_major` – number of segments around the donut
    /// * `segments_minor` – segments of the tube cross-section
    pub fn torus(
        major_r: Real,
        minor_r: Real,
        segments_major: usize,
        segments_minor: usize,
    ) -> TriangleMesh {
        let (big, small) = (segments_major.max(3), segments_minor.max(3));
        let mut vertices = Vec::with_capacity(big * small);
        for j in 0..big {
            let (st, ct) = (TAU * j as Real / big as Real).sin_cos();
            for k in 0..small {
                let (sp, cp) = (TAU * k as Real / small as Real).sin_cos();
                let ring_r = major_r + minor_r * cp;
                vertices.push(Point3::new(ring_r * ct, ring_r * st, minor_r * sp));
            }
        }
        let v = |j: usize, k: usize| (j % big) * small + k % small;

        let mut indices = Vec::with_capacity(2 * big * small);
        for j in 0..big {
            for k in 0..small {
                indices.push([v(j, k), v(j + 1, k), v(j + 1, k + 1)]);
                indices.push([v(j, k), v(j + 1, k + 1), v(j, k + 1)]);
            }
        }
        Self::from_generated(vertices, &indices)
    }
}
