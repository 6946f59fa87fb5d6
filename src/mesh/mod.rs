//! `TriangleMesh`: a shared-vertex triangle mesh, the input of slicing and
//! the output of cutting.

use crate::errors::MeshError;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use hashbrown::HashMap;
use nalgebra::{Matrix4, Point3, Vector3, partial_max, partial_min};

pub mod adjacency;
pub mod manifold;
pub mod shapes;

pub use adjacency::EdgeAdjacency;

/// A triangle referencing three shared vertices, wound counter-clockwise when
/// seen from outside, together with its outward unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facet {
    pub vertices: [usize; 3],
    pub normal: Vector3<Real>,
}

impl Facet {
    /// Build a facet whose normal follows from the winding of `positions`.
    /// The indices must be in range.
    pub(crate) fn new(vertices: [usize; 3], positions: &[Point3<Real>]) -> Self {
        let [a, b, c] = vertices.map(|i| positions[i]);
        Self {
            vertices,
            normal: Self::normal_of(&a, &b, &c),
        }
    }

    /// Unit normal of a counter-clockwise triangle, zero for a degenerate one.
    pub fn normal_of(a: &Point3<Real>, b: &Point3<Real>, c: &Point3<Real>) -> Vector3<Real> {
        (b - a).cross(&(c - a)).try_normalize(0.0).unwrap_or_else(Vector3::zeros)
    }
}

/// Deduplicated vertices plus triangular facets indexing into them.
///
/// Slicing assumes the mesh is manifold and consistently wound; this type only
/// guarantees that every index is in range and every coordinate is finite.
/// The fields are private so that every mesh goes through a validating
/// constructor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    pub(crate) vertices: Vec<Point3<Real>>,
    pub(crate) facets: Vec<Facet>,
}

impl TriangleMesh {
    /// Build a mesh from shared vertices and vertex-index triples; normals are
    /// computed from the winding.
    pub fn new(vertices: Vec<Point3<Real>>, indices: &[[usize; 3]]) -> Result<Self, MeshError> {
        Self::validate(&vertices, indices.iter())?;
        let facets = indices.iter().map(|&tri| Facet::new(tri, &vertices)).collect();
        Ok(Self { vertices, facets })
    }

    /// Build a mesh from shared vertices and facets carrying their own normals.
    pub fn from_parts(vertices: Vec<Point3<Real>>, facets: Vec<Facet>) -> Result<Self, MeshError> {
        Self::validate(&vertices, facets.iter().map(|f| &f.vertices))?;
        Ok(Self { vertices, facets })
    }

    /// Build a shared-vertex mesh from a triangle soup (every three points form
    /// one counter-clockwise facet), welding points with identical coordinates.
    pub fn from_triangles(points: &[Point3<Real>]) -> Result<Self, MeshError> {
        if points.len() % 3 != 0 {
            return Err(MeshError::TriangleSoup(points.len()));
        }
        let mut welder = VertexWelder::default();
        let mut indices = Vec::with_capacity(points.len() / 3);
        for tri in points.chunks_exact(3) {
            indices.push([welder.weld(tri[0]), welder.weld(tri[1]), welder.weld(tri[2])]);
        }
        Self::new(welder.into_vertices(), &indices)
    }

    /// For indices produced inside the crate, which are in range by construction.
    pub(crate) fn from_generated(vertices: Vec<Point3<Real>>, indices: &[[usize; 3]]) -> TriangleMesh {
        let facets = indices.iter().map(|&tri| Facet::new(tri, &vertices)).collect();
        TriangleMesh { vertices, facets }
    }

    fn validate<'a>(
        vertices: &[Point3<Real>],
        indices: impl Iterator<Item = &'a [usize; 3]>,
    ) -> Result<(), MeshError> {
        if let Some((index, point)) = vertices
            .iter()
            .enumerate()
            .find(|(_, p)| !p.coords.iter().all(|c| c.is_finite()))
        {
            return Err(MeshError::InvalidCoordinate { index, point: *point });
        }
        for (facet, tri) in indices.enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i >= vertices.len()) {
                return Err(MeshError::IndexOutOfRange {
                    facet,
                    index,
                    vertex_count: vertices.len(),
                });
            }
        }
        Ok(())
    }

    pub fn vertices(&self) -> &[Point3<Real>] {
        &self.vertices
    }

    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    /// Take the mesh apart into its vertices and facets.
    pub fn into_parts(self) -> (Vec<Point3<Real>>, Vec<Facet>) {
        (self.vertices, self.facets)
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    pub fn facet_count(&self) -> usize {
        self.facets.len()
    }

    /// The three corner positions of facet `idx`.
    pub fn facet_points(&self, idx: usize) -> [Point3<Real>; 3] {
        self.facets[idx].vertices.map(|i| self.vertices[i])
    }

    /// Lowest and highest Z of facet `idx`.
    pub fn facet_z_range(&self, idx: usize) -> (Real, Real) {
        let [a, b, c] = self.facet_points(idx);
        (a.z.min(b.z).min(c.z), a.z.max(b.z).max(c.z))
    }

    /// Axis aligned bounding box of the referenced vertices.
    pub fn bounding_box(&self) -> Aabb {
        let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
        let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);
        for p in &self.vertices {
            mins.x = *partial_min(&mins.x, &p.x).unwrap_or(&mins.x);
            mins.y = *partial_min(&mins.y, &p.y).unwrap_or(&mins.y);
            mins.z = *partial_min(&mins.z, &p.z).unwrap_or(&mins.z);
            maxs.x = *partial_max(&maxs.x, &p.x).unwrap_or(&maxs.x);
            maxs.y = *partial_max(&maxs.y, &p.y).unwrap_or(&maxs.y);
            maxs.z = *partial_max(&maxs.z, &p.z).unwrap_or(&maxs.z);
        }
        // Empty mesh: collapse to the origin instead of an inverted box
        if mins.x > maxs.x {
            mins = Point3::origin();
            maxs = Point3::origin();
        }
        Aabb::new(mins, maxs)
    }

    /// Enclosed volume by the divergence theorem (sum of signed tetrahedra).
    /// Only meaningful for closed, consistently wound meshes.
    pub fn volume(&self) -> Real {
        self.facets
            .iter()
            .map(|f| {
                let [a, b, c] = f.vertices.map(|i| self.vertices[i].coords);
                a.dot(&b.cross(&c))
            })
            .sum::<Real>()
            / 6.0
    }

    /// Apply an affine transform to all vertices and recompute facet normals.
    pub fn transform(&self, mat: &Matrix4<Real>) -> TriangleMesh {
        let vertices: Vec<Point3<Real>> = self
            .vertices
            .iter()
            .map(|p| mat.transform_point(p))
            .collect();
        // A mirroring transform flips the winding
        let flip = mat.fixed_view::<3, 3>(0, 0).determinant() < 0.0;
        let facets = self
            .facets
            .iter()
            .map(|f| {
                let mut tri = f.vertices;
                if flip {
                    tri.swap(1, 2);
                }
                Facet::new(tri, &vertices)
            })
            .collect();
        TriangleMesh { vertices, facets }
    }

    pub fn translate(&self, x: Real, y: Real, z: Real) -> TriangleMesh {
        self.transform(&Matrix4::new_translation(&Vector3::new(x, y, z)))
    }

    pub fn scale(&self, sx: Real, sy: Real, sz: Real) -> TriangleMesh {
        self.transform(&Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz)))
    }
}

/// Assigns one index per distinct coordinate triple, comparing exactly.
#[derive(Debug, Default)]
pub(crate) struct VertexWelder {
    lookup: HashMap<[u64; 3], usize>,
    vertices: Vec<Point3<Real>>,
}

impl VertexWelder {
    pub(crate) fn weld(&mut self, p: Point3<Real>) -> usize {
        // Adding 0.0 folds -0.0 into +0.0 so both hash alike
        let key = [(p.x + 0.0).to_bits(), (p.y + 0.0).to_bits(), (p.z + 0.0).to_bits()];
        let next = self.vertices.len();
        *self.lookup.entry(key).or_insert_with(|| {
            self.vertices.push(p);
            next
        })
    }

    pub(crate) fn into_vertices(self) -> Vec<Point3<Real>> {
        self.vertices
    }
}
