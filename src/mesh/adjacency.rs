//! Edge ids shared between facet corners.

use crate::mesh::TriangleMesh;
use hashbrown::HashMap;

/// For every facet corner, the id of the undirected edge it starts.
///
/// Corner `i` of a facet is the edge from its vertex `i` to vertex `(i + 1) % 3`.
/// Two corners carry the same id iff they join the same unordered pair of
/// shared vertices. More than two corners may share an id when upstream repair
/// left an over-valent edge; this is tolerated, not rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeAdjacency {
    facet_edges: Vec<[usize; 3]>,
    edge_count: usize,
}

impl EdgeAdjacency {
    /// Build the table for `mesh`. Edge ids are assigned in order of first
    /// encounter, so the table is stable for a given mesh.
    pub fn build(mesh: &TriangleMesh) -> Self {
        let mut ids: HashMap<(usize, usize), usize> = HashMap::with_capacity(mesh.facets.len() * 3 / 2);
        let facet_edges = mesh
            .facets
            .iter()
            .map(|facet| {
                let v = facet.vertices;
                [0, 1, 2].map(|corner| {
                    let (a, b) = (v[corner], v[(corner + 1) % 3]);
                    let key = if a < b { (a, b) } else { (b, a) };
                    let next = ids.len();
                    *ids.entry(key).or_insert(next)
                })
            })
            .collect();

        let adjacency = Self {
            facet_edges,
            edge_count: ids.len(),
        };
        let over_valent = adjacency.over_valent_edges();
        if over_valent > 0 {
            tracing::warn!(over_valent, "edges shared by more than two facets, slicing is best-effort there");
        }
        tracing::debug!(
            facets = mesh.facets.len(),
            edges = adjacency.edge_count,
            "built edge adjacency"
        );
        adjacency
    }

    /// Edge id of `corner` (0..3) of facet `facet`.
    pub fn edge_id(&self, facet: usize, corner: usize) -> usize {
        self.facet_edges[facet][corner]
    }

    /// The three edge ids of facet `facet`.
    pub fn facet_edges(&self, facet: usize) -> [usize; 3] {
        self.facet_edges[facet]
    }

    /// Number of distinct edges.
    pub const fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn facet_count(&self) -> usize {
        self.facet_edges.len()
    }

    /// How many facet corners reference each edge id.
    pub fn edge_valence(&self) -> Vec<usize> {
        let mut valence = vec![0; self.edge_count];
        for edges in &self.facet_edges {
            for &e in edges {
                valence[e] += 1;
            }
        }
        valence
    }

    /// Number of edges referenced by more than two facet corners.
    pub fn over_valent_edges(&self) -> usize {
        self.edge_valence().into_iter().filter(|&v| v > 2).count()
    }
}
