//! Fruchterman-Reingold force-directed layout in two dimensions.
//!
//! Nodes repel each other with `k² / d`, edges pull their ends together with
//! `w · d² / k`, and a weak gravity towards the origin keeps disconnected
//! pieces from drifting off. Steps are capped by a temperature that cools
//! linearly to zero.
//!
//! Graphs below [`SPARSE_THRESHOLD`] nodes are solved on a full pairwise
//! tensor. Larger graphs go row by row over an adjacency list. The two paths
//! run the same arithmetic in the same order and differ only in the minimum
//! distance clamp (0.001 vs 0.01), so identical inputs give identical
//! layouts unless two nodes come closer than 0.01.

use crate::libs::network::graph::CloneGraph;
use crate::libs::network::NetworkError;
use indexmap::IndexMap;
use petgraph::visit::EdgeRef;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;

pub type Layout = IndexMap<String, [f64; 2]>;

/// Node count at which the sparse solver takes over
pub const SPARSE_THRESHOLD: usize = 500;

const DENSE_MIN_DIST: f64 = 0.001;
const SPARSE_MIN_DIST: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    /// Optimal distance between nodes; `1/sqrt(n)` when unset
    pub k: Option<f64>,
    /// Initial positions; nodes not listed start at random
    pub pos: Option<IndexMap<String, [f64; 2]>>,
    /// Nodes that keep their initial position. Disables rescaling.
    pub fixed: Option<Vec<String>>,
    pub iterations: usize,
    /// Stop once the mean displacement of an iteration falls below this
    pub threshold: f64,
    /// Use edge weights as spring strength; otherwise every edge counts 1
    pub weighted: bool,
    /// Rescale to `[-scale, scale]`; `None` keeps raw coordinates
    pub scale: Option<f64>,
    pub center: [f64; 2],
    pub seed: u64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            k: None,
            pos: None,
            fixed: None,
            iterations: 50,
            threshold: 1e-4,
            weighted: false,
            scale: Some(1.0),
            center: [0.0, 0.0],
            seed: 7,
        }
    }
}

/// Lays out every node of `graph`, keyed by node name in node order.
pub fn fruchterman_reingold(graph: &CloneGraph, opts: &LayoutOptions) -> Result<Layout, NetworkError> {
    let names: Vec<String> = graph.node_indices().map(|n| graph[n].clone()).collect();
    let n = names.len();

    let mut fixed = vec![false; n];
    if let Some(fixed_nodes) = &opts.fixed {
        for node in fixed_nodes {
            let has_pos = opts.pos.as_ref().is_some_and(|p| p.contains_key(node));
            if !has_pos {
                return Err(NetworkError::FixedWithoutPosition(node.clone()));
            }
            if let Some(i) = names.iter().position(|x| x == node) {
                fixed[i] = true;
            }
        }
    }

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let (mut pos, dom_size) = initial_positions(&names, opts, &mut rng);

    if n == 0 {
        return Ok(Layout::new());
    }
    if n == 1 {
        return Ok(IndexMap::from([(names[0].clone(), opts.center)]));
    }

    let mut adjacency: Vec<Vec<(usize, f64)>> = vec![vec![]; n];
    for e in graph.edge_references() {
        let (s, t) = (e.source().index(), e.target().index());
        if s == t {
            continue;
        }
        let w = if opts.weighted { *e.weight() } else { 1.0 };
        adjacency[s].push((t, w));
        adjacency[t].push((s, w));
    }
    for row in adjacency.iter_mut() {
        row.sort_by_key(|&(j, _)| j);
    }

    let k = match opts.k {
        Some(k) => k,
        // adjust k by domain size for layouts not near 1x1
        None if opts.fixed.is_some() => dom_size / (n as f64).sqrt(),
        None => (1.0 / n as f64).sqrt(),
    };

    let params = Params {
        k,
        iterations: opts.iterations,
        threshold: opts.threshold,
    };
    if n < SPARSE_THRESHOLD {
        tracing::debug!("Dense layout of {} nodes", n);
        dense_layout(&adjacency, &mut pos, &fixed, &params);
    } else {
        tracing::debug!("Sparse layout of {} nodes", n);
        sparse_layout(&adjacency, &mut pos, &fixed, &params);
    }

    if opts.fixed.is_none() {
        if let Some(scale) = opts.scale {
            rescale_layout(&mut pos, scale);
            for p in pos.iter_mut() {
                p[0] += opts.center[0];
                p[1] += opts.center[1];
            }
        }
    }

    Ok(names.into_iter().zip(pos).collect())
}

/// Random positions in `[0, dom_size)` around `center`, overridden by any
/// given position. `dom_size` is the largest given coordinate, or 1.
fn initial_positions(names: &[String], opts: &LayoutOptions, rng: &mut StdRng) -> (Vec<[f64; 2]>, f64) {
    let dom_size = match &opts.pos {
        Some(given) => {
            let max = given
                .values()
                .flat_map(|p| p.iter().copied())
                .fold(f64::NEG_INFINITY, f64::max);
            if max == 0.0 || !max.is_finite() {
                1.0
            } else {
                max
            }
        }
        None => 1.0,
    };
    let offset = if opts.pos.is_some() { opts.center } else { [0.0, 0.0] };

    let pos = names
        .iter()
        .map(|name| {
            let random = [
                rng.gen::<f64>() * dom_size + offset[0],
                rng.gen::<f64>() * dom_size + offset[1],
            ];
            opts.pos
                .as_ref()
                .and_then(|p| p.get(name).copied())
                .unwrap_or(random)
        })
        .collect();

    (pos, dom_size)
}

struct Params {
    k: f64,
    iterations: usize,
    threshold: f64,
}

/// Temperature is a tenth of the larger side of the bounding box
fn initial_temperature(pos: &[[f64; 2]]) -> f64 {
    let extent = |axis: usize| {
        let (lo, hi) = pos.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p[axis]), hi.max(p[axis]))
        });
        hi - lo
    };
    extent(0).max(extent(1)) * 0.1
}

/// Pairwise contribution of node `j` to the displacement of node `i`
#[inline]
fn force(delta: [f64; 2], distance: f64, a: f64, k: f64) -> [f64; 2] {
    let f = k * k / (distance * distance) - a * distance / k;
    [delta[0] * f, delta[1] * f]
}

/// Adds gravity, caps steps at `t`, moves the free nodes. Returns the
/// iteration error: the norm of all steps over the node count.
fn apply_displacement(
    displacement: &[[f64; 2]],
    pos: &mut [[f64; 2]],
    fixed: &[bool],
    k: f64,
    t: f64,
) -> f64 {
    let n = pos.len();
    let gravity = k * (n as f64).sqrt();
    let mut sq_sum = 0.0;
    for i in 0..n {
        let d = [
            displacement[i][0] - pos[i][0] / gravity,
            displacement[i][1] - pos[i][1] / gravity,
        ];
        let mut length = (d[0] * d[0] + d[1] * d[1]).sqrt();
        if length < 0.01 {
            length = 0.1;
        }
        if fixed[i] {
            continue;
        }
        let step = [d[0] * t / length, d[1] * t / length];
        pos[i][0] += step[0];
        pos[i][1] += step[1];
        sq_sum += step[0] * step[0] + step[1] * step[1];
    }
    sq_sum.sqrt() / n as f64
}

fn dense_layout(adjacency: &[Vec<(usize, f64)>], pos: &mut [[f64; 2]], fixed: &[bool], params: &Params) {
    let n = pos.len();
    let mut a = vec![0.0; n * n];
    for (i, row) in adjacency.iter().enumerate() {
        for &(j, w) in row {
            a[i * n + j] = w;
        }
    }

    let k = params.k;
    let mut t = initial_temperature(pos);
    let dt = t / (params.iterations as f64 + 1.0);

    let mut delta = vec![[0.0; 2]; n * n];
    let mut distance = vec![0.0; n * n];
    for iteration in 0..params.iterations {
        for i in 0..n {
            for j in 0..n {
                let d = [pos[i][0] - pos[j][0], pos[i][1] - pos[j][1]];
                delta[i * n + j] = d;
                distance[i * n + j] = (d[0] * d[0] + d[1] * d[1]).sqrt().max(DENSE_MIN_DIST);
            }
        }

        let mut displacement = vec![[0.0; 2]; n];
        for i in 0..n {
            for j in 0..n {
                let f = force(delta[i * n + j], distance[i * n + j], a[i * n + j], k);
                displacement[i][0] += f[0];
                displacement[i][1] += f[1];
            }
        }

        let err = apply_displacement(&displacement, pos, fixed, k, t);
        t -= dt;
        if err < params.threshold {
            tracing::debug!("Layout converged after {} iterations", iteration + 1);
            break;
        }
    }
}

fn sparse_layout(adjacency: &[Vec<(usize, f64)>], pos: &mut [[f64; 2]], fixed: &[bool], params: &Params) {
    let n = pos.len();
    let k = params.k;
    let mut t = initial_temperature(pos);
    let dt = t / (params.iterations as f64 + 1.0);

    let mut displacement = vec![[0.0; 2]; n];
    for iteration in 0..params.iterations {
        for i in 0..n {
            displacement[i] = [0.0, 0.0];
            if fixed[i] {
                continue;
            }
            // adjacency rows are sorted, walk them alongside j
            let mut neighbors = adjacency[i].iter().peekable();
            for j in 0..n {
                let d = [pos[i][0] - pos[j][0], pos[i][1] - pos[j][1]];
                let distance = (d[0] * d[0] + d[1] * d[1]).sqrt().max(SPARSE_MIN_DIST);
                let a = match neighbors.peek() {
                    Some(&&(nb, w)) if nb == j => {
                        neighbors.next();
                        w
                    }
                    _ => 0.0,
                };
                let f = force(d, distance, a, k);
                displacement[i][0] += f[0];
                displacement[i][1] += f[1];
            }
        }

        let err = apply_displacement(&displacement, pos, fixed, k, t);
        t -= dt;
        if err < params.threshold {
            tracing::debug!("Layout converged after {} iterations", iteration + 1);
            break;
        }
    }
}

/// Centers every axis on its mean, then scales all coordinates by the same
/// factor so the largest magnitude equals `scale`. A layout of coinciding
/// points is only centered.
pub fn rescale_layout(pos: &mut [[f64; 2]], scale: f64) {
    if pos.is_empty() {
        return;
    }
    let n = pos.len() as f64;
    let mut lim: f64 = 0.0;
    for axis in 0..2 {
        let mean = pos.iter().map(|p| p[axis]).sum::<f64>() / n;
        for p in pos.iter_mut() {
            p[axis] -= mean;
            lim = lim.max(p[axis].abs());
        }
    }
    if lim > 0.0 {
        for p in pos.iter_mut() {
            p[0] *= scale / lim;
            p[1] *= scale / lim;
        }
    }
}

pub fn write_layout(writer: &mut dyn Write, layout: &Layout) -> anyhow::Result<()> {
    writer.write_fmt(format_args!("node\tx\ty\n"))?;
    for (node, p) in layout {
        writer.write_fmt(format_args!("{}\t{:.6}\t{:.6}\n", node, p[0], p[1]))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::network::edges::Edge;
    use crate::libs::network::graph::build_graph;
    use approx::assert_abs_diff_eq;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("n{}", i)).collect()
    }

    fn ring(n: usize) -> CloneGraph {
        let vertices = names(n);
        let edges: Vec<Edge> = (0..n)
            .map(|i| Edge {
                source: vertices[i].clone(),
                target: vertices[(i + 1) % n].clone(),
                weight: 1.0,
            })
            .collect();
        build_graph(&vertices, &edges)
    }

    fn coords(layout: &Layout) -> Vec<[f64; 2]> {
        layout.values().copied().collect()
    }

    #[test]
    fn test_rescale_layout() {
        let mut pos = vec![[1.0, 2.0], [3.0, 2.5], [5.0, 8.0]];
        rescale_layout(&mut pos, 1.0);

        for axis in 0..2 {
            let mean: f64 = pos.iter().map(|p| p[axis]).sum::<f64>() / 3.0;
            assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-12);
        }
        let lim = pos.iter().flat_map(|p| p.iter()).fold(0.0_f64, |m, x| m.max(x.abs()));
        assert_abs_diff_eq!(lim, 1.0, epsilon = 1e-12);
        // aspect ratio preserved: x spread 4, y spread 6 before scaling
        let ratio = (pos[2][0] - pos[0][0]) / (pos[2][1] - pos[0][1]);
        assert_abs_diff_eq!(ratio, 4.0 / 6.0, epsilon = 1e-12);

        let mut pos = vec![[2.0, 2.0], [2.0, 2.0]];
        rescale_layout(&mut pos, 1.0);
        assert_eq!(pos, vec![[0.0, 0.0], [0.0, 0.0]]);
    }

    #[test]
    fn test_degenerate_graphs() {
        let opts = LayoutOptions::default();
        let empty = build_graph(&[], &[]);
        assert!(fruchterman_reingold(&empty, &opts).unwrap().is_empty());

        let single = build_graph(&names(1), &[]);
        let layout = fruchterman_reingold(&single, &opts).unwrap();
        assert_eq!(layout.len(), 1);
        assert_eq!(layout["n0"], [0.0, 0.0]);
    }

    #[test]
    fn test_layout_rescaled() {
        let layout = fruchterman_reingold(&ring(8), &LayoutOptions::default()).unwrap();
        assert_eq!(layout.len(), 8);

        let pos = coords(&layout);
        let lim = pos.iter().flat_map(|p| p.iter()).fold(0.0_f64, |m, x| m.max(x.abs()));
        assert_abs_diff_eq!(lim, 1.0, epsilon = 1e-9);
        for axis in 0..2 {
            let mean: f64 = pos.iter().map(|p| p[axis]).sum::<f64>() / 8.0;
            assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_layout_reproducible() {
        let graph = ring(10);
        let opts = LayoutOptions::default();
        let first = fruchterman_reingold(&graph, &opts).unwrap();
        let second = fruchterman_reingold(&graph, &opts).unwrap();
        assert_eq!(first, second);

        let other = fruchterman_reingold(&graph, &LayoutOptions { seed: 8, ..opts }).unwrap();
        assert_ne!(first, other);
    }

    #[test]
    fn test_layout_no_rescale() {
        let opts = LayoutOptions {
            scale: None,
            ..Default::default()
        };
        let layout = fruchterman_reingold(&ring(5), &opts).unwrap();
        assert_eq!(layout.len(), 5);
        assert!(coords(&layout).iter().all(|p| p[0].is_finite() && p[1].is_finite()));
    }

    #[test]
    fn test_layout_fixed() {
        let graph = ring(4);
        let pos = IndexMap::from([("n0".to_string(), [0.5, 0.5]), ("n1".to_string(), [2.0, 0.0])]);
        let opts = LayoutOptions {
            pos: Some(pos),
            fixed: Some(vec!["n0".to_string(), "n1".to_string()]),
            ..Default::default()
        };
        let layout = fruchterman_reingold(&graph, &opts).unwrap();
        assert_eq!(layout["n0"], [0.5, 0.5]);
        assert_eq!(layout["n1"], [2.0, 0.0]);
        assert_ne!(layout["n2"], layout["n3"]);
    }

    #[test]
    fn test_layout_fixed_without_pos() {
        let graph = ring(4);
        let opts = LayoutOptions {
            fixed: Some(vec!["n0".to_string()]),
            ..Default::default()
        };
        assert_eq!(
            fruchterman_reingold(&graph, &opts).unwrap_err(),
            NetworkError::FixedWithoutPosition("n0".to_string())
        );

        let opts = LayoutOptions {
            pos: Some(IndexMap::from([("n0".to_string(), [0.0, 0.0])])),
            fixed: Some(vec!["n0".to_string(), "n2".to_string()]),
            ..Default::default()
        };
        assert_eq!(
            fruchterman_reingold(&graph, &opts).unwrap_err(),
            NetworkError::FixedWithoutPosition("n2".to_string())
        );
    }

    #[test]
    fn test_connected_nodes_closer() {
        // two separate pairs
        let vertices = names(4);
        let edges = vec![
            Edge { source: "n0".into(), target: "n1".into(), weight: 1.0 },
            Edge { source: "n2".into(), target: "n3".into(), weight: 1.0 },
        ];
        let graph = build_graph(&vertices, &edges);
        let layout = fruchterman_reingold(&graph, &LayoutOptions::default()).unwrap();

        let dist = |a: &str, b: &str| {
            let (p, q) = (layout[a], layout[b]);
            ((p[0] - q[0]).powi(2) + (p[1] - q[1]).powi(2)).sqrt()
        };
        assert!(dist("n0", "n1") < dist("n0", "n2"));
        assert!(dist("n2", "n3") < dist("n1", "n3"));
    }

    #[test]
    fn test_dense_sparse_agree() {
        let graph = ring(12);
        let n = graph.node_count();
        let mut adjacency: Vec<Vec<(usize, f64)>> = vec![vec![]; n];
        for e in graph.edge_references() {
            adjacency[e.source().index()].push((e.target().index(), 1.0));
            adjacency[e.target().index()].push((e.source().index(), 1.0));
        }
        for row in adjacency.iter_mut() {
            row.sort_by_key(|&(j, _)| j);
        }

        let mut rng = StdRng::seed_from_u64(7);
        let (start, _) = initial_positions(&names(n), &LayoutOptions::default(), &mut rng);
        let params = Params {
            k: (1.0 / n as f64).sqrt(),
            iterations: 50,
            threshold: 1e-4,
        };
        let fixed = vec![false; n];

        let mut dense = start.clone();
        dense_layout(&adjacency, &mut dense, &fixed, &params);
        let mut sparse = start.clone();
        sparse_layout(&adjacency, &mut sparse, &fixed, &params);

        for (p, q) in dense.iter().zip(sparse.iter()) {
            assert_abs_diff_eq!(p[0], q[0], epsilon = 1e-9);
            assert_abs_diff_eq!(p[1], q[1], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_sparse_path_large_graph() {
        let graph = ring(SPARSE_THRESHOLD);
        let opts = LayoutOptions {
            iterations: 3,
            ..Default::default()
        };
        let layout = fruchterman_reingold(&graph, &opts).unwrap();
        assert_eq!(layout.len(), SPARSE_THRESHOLD);

        let lim = coords(&layout)
            .iter()
            .flat_map(|p| p.iter())
            .fold(0.0_f64, |m, x| m.max(x.abs()));
        assert_abs_diff_eq!(lim, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_write_layout() {
        let layout = IndexMap::from([("a".to_string(), [0.5, -1.0])]);
        let mut buf: Vec<u8> = vec![];
        write_layout(&mut buf, &layout).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "node\tx\ty\na\t0.500000\t-1.000000\n");
    }
}
