use crate::errors::MeshError;
use crate::float_types::Real;
use crate::mesh::TriangleMesh;
use nalgebra::Point3;
use std::io::Cursor;

impl TriangleMesh {
    /// Convert this mesh to an **ASCII STL** string with the given `name`.
    ///
    /// ```rust
    /// # use meshslice::TriangleMesh;
    /// let cube = TriangleMesh::cube(1.0, 1.0, 1.0);
    /// let text = cube.to_stl_ascii("cube");
    /// assert!(text.starts_with("solid cube"));
    /// assert_eq!(text.matches("facet normal").count(), 12);
    /// ```
    pub fn to_stl_ascii(&self, name: &str) -> String {
        let mut out = String::new();
        out.push_str(&format!("solid {name}\n"));
        for (idx, facet) in self.facets.iter().enumerate() {
            let n = facet.normal;
            out.push_str(&format!("  facet normal {:.6} {:.6} {:.6}\n", n.x, n.y, n.z));
            out.push_str("    outer loop\n");
            for p in self.facet_points(idx) {
                out.push_str(&format!("      vertex {:.6} {:.6} {:.6}\n", p.x, p.y, p.z));
            }
            out.push_str("    endloop\n");
            out.push_str("  endfacet\n");
        }
        out.push_str(&format!("endsolid {name}\n"));
        out
    }

    /// Convert this mesh to a **binary STL** byte vector. Coordinates are
    /// narrowed to `f32` as the format requires.
    pub fn to_stl_binary(&self) -> std::io::Result<Vec<u8>> {
        use stl_io::{Normal, Triangle, Vertex, write_stl};

        let triangles: Vec<Triangle> = (0..self.facets.len())
            .map(|idx| {
                let n = self.facets[idx].normal;
                Triangle {
                    normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                    vertices: self
                        .facet_points(idx)
                        .map(|p| Vertex::new([p.x as f32, p.y as f32, p.z as f32])),
                }
            })
            .collect();

        let mut cursor = Cursor::new(Vec::new());
        write_stl(&mut cursor, triangles.iter())?;
        Ok(cursor.into_inner())
    }

    /// Read an ASCII or binary STL into a shared-vertex mesh.
    ///
    /// Identical corners are merged by the reader; normals are recomputed from
    /// the winding rather than trusted from the file.
    pub fn from_stl(data: &[u8]) -> Result<TriangleMesh, MeshError> {
        let mut cursor = Cursor::new(data);
        let indexed = stl_io::read_stl(&mut cursor)?;

        let vertices: Vec<Point3<Real>> = indexed
            .vertices
            .iter()
            .map(|v| Point3::new(v[0] as Real, v[1] as Real, v[2] as Real))
            .collect();
        let indices: Vec<[usize; 3]> = indexed.faces.iter().map(|f| f.vertices).collect();

        tracing::debug!(vertices = vertices.len(), facets = indices.len(), "read STL");
        TriangleMesh::new(vertices, &indices)
    }
}
