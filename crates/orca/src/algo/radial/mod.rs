use crate::algo::RadialOptions;
use crate::error::{Error, Result};
use crate::graph::{Graph, LayoutResult, Point};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::f64::consts::TAU;

mod seed;

pub fn layout(graph: &Graph, focal: Option<&str>, opts: &RadialOptions) -> Result<LayoutResult> {
    if graph.is_empty() {
        return Ok(LayoutResult::default());
    }

    let sim = SimGraph::from_graph(graph)?;
    let focal_ix = sim.pick_focal(focal);
    let shells = sim.bfs_shells(focal_ix);
    let outer: Vec<usize> = sim.unreachable(&shells);

    let jitter = opts.effective_jitter();
    let base = opts.base_radius;
    let mut positions: BTreeMap<String, Point> = BTreeMap::new();
    positions.insert(sim.ids[focal_ix].to_string(), Point::ORIGIN);

    for (k, shell) in shells.iter().enumerate().skip(1) {
        place_ring(&sim, shell, k, base, jitter, opts.random_seed, &mut positions);
    }
    if !outer.is_empty() {
        place_ring(
            &sim,
            &outer,
            shells.len(),
            base,
            jitter,
            opts.random_seed,
            &mut positions,
        );
    }
    assert_eq!(
        positions.len(),
        sim.ids.len(),
        "radial layout must place every node exactly once"
    );

    tracing::debug!(
        nodes = sim.ids.len(),
        edges = graph.edges.len(),
        focal = sim.ids[focal_ix],
        shells = shells.len(),
        outer = outer.len(),
        "radial layout computed"
    );

    let to_ids = |ixs: &[usize]| -> Vec<String> {
        ixs.iter().map(|&ix| sim.ids[ix].to_string()).collect()
    };
    Ok(LayoutResult {
        positions,
        focal: Some(sim.ids[focal_ix].to_string()),
        shells: shells.iter().map(|s| to_ids(s)).collect(),
        outer_ring: to_ids(&outer),
    })
}

/// Places `ring` on the circle of shell index `k` at equal angular intervals, starting at angle 0.
fn place_ring(
    sim: &SimGraph<'_>,
    ring: &[usize],
    k: usize,
    base: f64,
    jitter: f64,
    random_seed: u64,
    out: &mut BTreeMap<String, Point>,
) {
    let radius = base * (1.0 + k as f64);
    let spacing = TAU / ring.len() as f64;
    for (i, &ix) in ring.iter().enumerate() {
        let id = sim.ids[ix];
        let (na, nr) = seed::node_noise(id, random_seed);
        let angle = i as f64 * spacing + na * jitter * spacing;
        let r = radius + nr * jitter * base;
        out.insert(id.to_string(), Point::new(r * angle.cos(), r * angle.sin()));
    }
}

/// Index-based view of the input, with nodes sorted by id.
struct SimGraph<'a> {
    ids: Vec<&'a str>,
    /// Neighbors per node, heaviest link first, then by id.
    adj: Vec<Vec<usize>>,
    degree: Vec<usize>,
}

impl<'a> SimGraph<'a> {
    fn from_graph(graph: &'a Graph) -> Result<Self> {
        let mut ids: Vec<&'a str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        ids.sort_unstable();
        if let Some(dup) = ids.windows(2).find(|w| w[0] == w[1]) {
            return Err(Error::DuplicateNode {
                node_id: dup[0].to_string(),
            });
        }

        let mut index: FxHashMap<&str, usize> = FxHashMap::default();
        index.reserve(ids.len());
        for (ix, &id) in ids.iter().enumerate() {
            index.insert(id, ix);
        }

        let mut weighted: Vec<Vec<(usize, f64)>> = vec![Vec::new(); ids.len()];
        let mut degree = vec![0usize; ids.len()];
        for e in &graph.edges {
            let (Some(&v), Some(&w)) = (index.get(e.source.as_str()), index.get(e.target.as_str()))
            else {
                return Err(Error::MissingEndpoint {
                    edge_id: e.id.clone(),
                });
            };
            degree[v] += 1;
            if v == w {
                continue;
            }
            degree[w] += 1;
            weighted[v].push((w, e.weight));
            weighted[w].push((v, e.weight));
        }

        let adj = weighted
            .into_iter()
            .map(|mut list| {
                list.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
                list.into_iter().map(|(w, _)| w).collect()
            })
            .collect();

        Ok(Self { ids, adj, degree })
    }

    fn pick_focal(&self, requested: Option<&str>) -> usize {
        if let Some(id) = requested {
            if let Ok(ix) = self.ids.binary_search_by(|v| (*v).cmp(id)) {
                return ix;
            }
            tracing::debug!(focal = id, "requested focal node not in layout input");
        }
        // Highest degree, ties to the smallest id.
        (0..self.ids.len())
            .max_by_key(|&ix| (self.degree[ix], std::cmp::Reverse(ix)))
            .unwrap_or(0)
    }

    fn bfs_shells(&self, focal: usize) -> Vec<Vec<usize>> {
        let mut visited = vec![false; self.ids.len()];
        visited[focal] = true;
        let mut shells: Vec<Vec<usize>> = vec![vec![focal]];
        loop {
            let mut next: Vec<usize> = Vec::new();
            if let Some(frontier) = shells.last() {
                for &v in frontier {
                    for &w in &self.adj[v] {
                        if !visited[w] {
                            visited[w] = true;
                            next.push(w);
                        }
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            shells.push(next);
        }
        shells
    }

    fn unreachable(&self, shells: &[Vec<usize>]) -> Vec<usize> {
        let mut reached = vec![false; self.ids.len()];
        for &ix in shells.iter().flatten() {
            reached[ix] = true;
        }
        (0..self.ids.len()).filter(|&ix| !reached[ix]).collect()
    }
}
