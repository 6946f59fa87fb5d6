use crate::mesh::TriangleMesh;
use hashbrown::HashMap;

impl TriangleMesh {
    /// Checks if the mesh is a closed, consistently oriented 2-manifold
    ///
    /// ### Returns
    /// Returns `true` if every undirected edge is used by exactly 2 facets,
    /// once in each direction
    ///
    /// ### Notes:
    /// - Works on vertex indices, so vertices must already be shared
    /// - Facets with a repeated vertex index make the mesh non-manifold
    pub fn is_manifold(&self) -> bool {
        if self.facets.is_empty() {
            return false;
        }

        // (low, high) -> (uses low->high, uses high->low)
        let mut edge_counts: HashMap<(usize, usize), (u32, u32)> = HashMap::new();

        for facet in &self.facets {
            let v = facet.vertices;
            if v[0] == v[1] || v[1] == v[2] || v[2] == v[0] {
                return false;
            }
            for &(i0, i1) in &[(0, 1), (1, 2), (2, 0)] {
                let (a, b) = (v[i0], v[i1]);
                let entry = edge_counts.entry((a.min(b), a.max(b))).or_insert((0, 0));
                if a < b {
                    entry.0 += 1;
                } else {
                    entry.1 += 1;
                }
            }
        }

        // For a perfectly closed manifold surface (with no boundary),
        // each edge should be walked once forwards and once backwards.
        edge_counts.values().all(|&counts| counts == (1, 1))
    }
}
