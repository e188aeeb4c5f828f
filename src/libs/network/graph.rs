use crate::libs::network::edges::Edge;
use crate::libs::network::NetworkError;
use indexmap::IndexMap;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

/// Undirected graph with cell ids as nodes and distances as edge weights
pub type CloneGraph = UnGraph<String, f64>;

/// All `vertices` in order, then any edge endpoint not among them.
pub fn build_graph(vertices: &[String], edges: &[Edge]) -> CloneGraph {
    let mut graph = CloneGraph::with_capacity(vertices.len(), edges.len());
    let mut index_of: IndexMap<String, NodeIndex> = IndexMap::new();

    for v in vertices {
        if !index_of.contains_key(v) {
            index_of.insert(v.clone(), graph.add_node(v.clone()));
        }
    }
    for e in edges {
        let mut node = |name: &String| match index_of.get(name) {
            Some(&idx) => idx,
            None => {
                let idx = graph.add_node(name.clone());
                index_of.insert(name.clone(), idx);
                idx
            }
        };
        let s = node(&e.source);
        let t = node(&e.target);
        graph.update_edge(s, t, e.weight);
    }

    graph
}

/// The secondary, trimmed graph.
///
/// With `min_size == 2` isolated nodes are removed. With a larger
/// `min_size`, nodes whose degree *exceeds* it are removed, which trims
/// hubs rather than sparse nodes.
pub fn trim_graph(graph: &CloneGraph, min_size: usize) -> Result<CloneGraph, NetworkError> {
    if min_size < 2 {
        return Err(NetworkError::InvalidMinSize(min_size));
    }

    let degree = |n: NodeIndex| graph.edges(n).count();
    let trimmed = graph.filter_map(
        |n, name| {
            let d = degree(n);
            let keep = if min_size == 2 { d > 0 } else { d <= min_size };
            keep.then(|| name.clone())
        },
        |_, w| Some(*w),
    );
    tracing::debug!(
        "Trimmed graph keeps {} of {} nodes",
        trimmed.node_count(),
        graph.node_count()
    );

    Ok(trimmed)
}

/// Edge weights in edge order
pub fn edge_weights(graph: &CloneGraph) -> Vec<f64> {
    graph.edge_references().map(|e| *e.weight()).collect()
}

pub fn node_names(graph: &CloneGraph) -> Vec<String> {
    graph.node_indices().map(|n| graph[n].clone()).collect()
}
