//! Undirected adjacency index used by [`GraphStore`](super::GraphStore).
//!
//! Incident edges are stored CSR-style: one flat vector of edge indices plus per-node offsets,
//! so `edges_of` is a slice lookup and costs O(degree).

#[derive(Debug, Clone, Default)]
pub(in crate::store) struct AdjacencyIndex {
    offsets: Vec<usize>,
    edges: Vec<usize>,
}

impl AdjacencyIndex {
    /// `endpoints[i]` holds the node indices of edge `i`.
    pub(in crate::store) fn build(node_count: usize, endpoints: &[(usize, usize)]) -> Self {
        let mut degree = vec![0usize; node_count];
        for &(v, w) in endpoints {
            degree[v] += 1;
            if v != w {
                degree[w] += 1;
            }
        }

        let mut offsets = Vec::with_capacity(node_count + 1);
        let mut acc = 0usize;
        offsets.push(0);
        for d in &degree {
            acc += d;
            offsets.push(acc);
        }

        let mut cursor = offsets[..node_count].to_vec();
        let mut edges = vec![0usize; acc];
        for (edge_ix, &(v, w)) in endpoints.iter().enumerate() {
            edges[cursor[v]] = edge_ix;
            cursor[v] += 1;
            if v != w {
                edges[cursor[w]] = edge_ix;
                cursor[w] += 1;
            }
        }

        Self { offsets, edges }
    }

    pub(in crate::store) fn edges(&self, v_ix: usize) -> &[usize] {
        let start = self.offsets[v_ix];
        let end = self.offsets[v_ix + 1];
        &self.edges[start..end]
    }

    pub(in crate::store) fn degree(&self, v_ix: usize) -> usize {
        self.offsets[v_ix + 1] - self.offsets[v_ix]
    }
}
