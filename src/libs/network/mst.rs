use crate::libs::network::distance::DistanceMatrix;
use itertools::Itertools;
use petgraph::unionfind::UnionFind;

/// Minimum spanning tree (or forest) of a cluster's distance sub-matrix.
///
/// Kruskal over the strict upper triangle. Candidate edges are visited in
/// row-major order and sorted stably by weight, so among equal weights the
/// first encountered edge wins. A zero distance is not an edge: identical
/// members stay unlinked here and are joined by [`fallback_pairs`].
///
/// Returns `(i, j, weight)` with `i < j`, local to the sub-matrix.
pub fn minimum_spanning_tree(mat: &DistanceMatrix) -> Vec<(usize, usize, f64)> {
    let n = mat.size();
    let mut candidates: Vec<(usize, usize, f64)> = (0..n)
        .tuple_combinations()
        .map(|(i, j)| (i, j, mat.get(i, j)))
        .filter(|&(_, _, w)| w > 0.0)
        .collect();
    candidates.sort_by(|a, b| a.2.total_cmp(&b.2));

    let mut uf = UnionFind::new(n);
    let mut tree = Vec::with_capacity(n.saturating_sub(1));
    for (i, j, w) in candidates {
        if uf.union(i, j) {
            tree.push((i, j, w));
            if tree.len() + 1 == n {
                break;
            }
        }
    }
    tree
}

/// Every `(i, j)` pair with `i < j` among `n` members, in member order.
///
/// Distances play no part here; these pairs keep members that the spanning
/// tree left disconnected inside the final edge list.
pub fn fallback_pairs(n: usize) -> Vec<(usize, usize)> {
    (0..n).tuple_combinations().collect()
}
