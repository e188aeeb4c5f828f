//! Clone networks.
//!
//! Cells are linked by the edit distance of their heavy and light chains.
//! Inside every clone (or clone group) a minimum spanning tree keeps the
//! shortest links; every pair of cells sharing a clone is linked as well, so
//! no clone member is left out. The resulting graph, and a trimmed copy of
//! it, are laid out with a force-directed algorithm.
//!
//! ```
//! use clonenet::libs::airr::{Contig, NetworkInput};
//! use clonenet::libs::network::{generate_network, NetworkOptions};
//!
//! let contigs = vec![
//!     Contig::new("a_H", "a", "IGH", "AAA", "1"),
//!     Contig::new("b_H", "b", "IGH", "AAB", "1"),
//!     Contig::new("c_H", "c", "IGH", "CCC", "2"),
//! ];
//! let network = generate_network(NetworkInput::Table(contigs), &NetworkOptions::default()).unwrap();
//!
//! assert_eq!(network.edges.len(), 1);
//! assert_eq!(network.edges[0].weight, 1.0);
//! assert_eq!(network.layout.0.len(), 3);
//! assert_eq!(network.layout.1.len(), 2);
//! ```

pub mod degree;
pub mod distance;
pub mod edges;
pub mod error;
pub mod graph;
pub mod group;
pub mod layout;
pub mod mst;
pub mod seqs;

pub use distance::{DistanceMatrix, DistanceMode, SparseMatrix};
pub use edges::Edge;
pub use error::NetworkError;
pub use graph::CloneGraph;
pub use group::{ClonesSep, ClusterKey};
pub use layout::{Layout, LayoutOptions};
pub use seqs::SeqType;

use crate::libs::airr::{CloneData, NetworkInput};
use indexmap::IndexMap;

/// Layout algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutKind {
    #[default]
    FruchtermanReingold,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkOptions {
    pub distance_mode: DistanceMode,
    /// Trimming threshold of the secondary graph, at least 2
    pub min_size: usize,
    pub seq_type: SeqType,
    /// Column holding clone ids
    pub clone_key: String,
    /// Build trees per clone group instead of per clone
    pub construct_by_group: bool,
    /// Derives clone groups from clone ids when the table has no group column
    pub clones_sep: ClonesSep,
    /// Per-layer weights for [`DistanceMode::Weighted`]
    pub weights: Option<Vec<f64>>,
    pub layout: LayoutKind,
    /// Seed of the initial layout positions
    pub seed: u64,
}

impl Default for NetworkOptions {
    fn default() -> Self {
        Self {
            distance_mode: DistanceMode::Simple,
            min_size: 2,
            seq_type: SeqType::Aa,
            clone_key: "clone_id".to_string(),
            construct_by_group: false,
            clones_sep: ClonesSep::default(),
            weights: None,
            layout: LayoutKind::FruchtermanReingold,
            seed: 7,
        }
    }
}

/// Everything derived by [`generate_network`]
#[derive(Debug, Clone)]
pub struct Network {
    /// Graph vertices: every cell, in table order
    pub cells: Vec<String>,
    /// Per-layer distance matrices
    pub distance: IndexMap<String, SparseMatrix>,
    /// Combined distances, as used for edge weights
    pub total: DistanceMatrix,
    pub edges: Vec<Edge>,
    /// Full and trimmed layouts
    pub layout: (Layout, Layout),
    /// Full and trimmed graphs
    pub graph: (CloneGraph, CloneGraph),
}

impl Network {
    /// Edge weights of the full or the trimmed graph
    pub fn edge_weights(&self, full_graph: bool) -> Vec<f64> {
        if full_graph {
            graph::edge_weights(&self.graph.0)
        } else {
            graph::edge_weights(&self.graph.1)
        }
    }

    pub fn clone_degree(&self) -> Result<IndexMap<String, f64>, NetworkError> {
        degree::clone_degree(&self.cells, &self.distance)
    }
}

/// Per-layer and total distances of all cells
pub struct Distances {
    pub cells: Vec<String>,
    pub layers: IndexMap<String, DistanceMatrix>,
    pub total: DistanceMatrix,
}

pub fn build_distances(data: &CloneData, opts: &NetworkOptions) -> Result<Distances, NetworkError> {
    let layers = seqs::extract_layers(data, opts.seq_type);
    let dmat = distance::layer_distances(&layers);
    let matrices: Vec<&DistanceMatrix> = dmat.values().collect();
    let total = distance::combine(
        layers.cells.len(),
        &matrices,
        opts.distance_mode,
        opts.weights.as_deref(),
    )?;
    tracing::info!(
        "Distances of {} cells over {} layers",
        layers.cells.len(),
        dmat.len()
    );

    Ok(Distances {
        cells: layers.cells,
        layers: dmat,
        total,
    })
}

/// Spanning-tree and fallback edges, as global cell indices
pub fn cluster_edges(
    data: &CloneData,
    total: &DistanceMatrix,
    opts: &NetworkOptions,
) -> (Vec<(usize, usize)>, Vec<(usize, usize)>) {
    let key = if opts.construct_by_group {
        ClusterKey::Group
    } else {
        ClusterKey::Clone
    };

    let mut tree_edges = vec![];
    for (cx, members) in group::retained(group::clusters(data, key, &opts.clones_sep)) {
        let tree = mst::minimum_spanning_tree(&total.sub_matrix(&members));
        tracing::debug!("Cluster {}: {} cells, {} tree edges", cx, members.len(), tree.len());
        tree_edges.extend(tree.into_iter().map(|(i, j, _)| (members[i], members[j])));
    }

    // always per clone, whatever the tree clusters are
    let mut fallback = vec![];
    for members in group::clusters(data, ClusterKey::Clone, &opts.clones_sep).values() {
        fallback.extend(
            mst::fallback_pairs(members.len())
                .into_iter()
                .map(|(i, j)| (members[i], members[j])),
        );
    }

    (tree_edges, fallback)
}

/// Builds distances, edges, graphs and layouts from scratch.
///
/// Pure: the input is consumed and a new bundle returned; nothing is kept
/// between calls.
pub fn generate_network(input: NetworkInput, opts: &NetworkOptions) -> Result<Network, NetworkError> {
    if opts.min_size < 2 {
        return Err(NetworkError::InvalidMinSize(opts.min_size));
    }
    let data = input.into_clone_data();
    if opts.construct_by_group {
        tracing::debug!(
            "Clone groups from {}",
            if data.has_groups() { "the group column" } else { "clone ids" }
        );
    }
    tracing::info!("Generating network");

    let dist = build_distances(&data, opts)?;
    let (tree_edges, fallback) = cluster_edges(&data, &dist.total, opts);
    let edges = edges::merge_edges(&tree_edges, &fallback, &dist.total, &dist.cells);
    tracing::info!("{} edges", edges.len());

    let full = graph::build_graph(&dist.cells, &edges);
    let trimmed = graph::trim_graph(&full, opts.min_size)?;

    let layout_opts = LayoutOptions {
        seed: opts.seed,
        ..Default::default()
    };
    let layout = match opts.layout {
        LayoutKind::FruchtermanReingold => (
            layout::fruchterman_reingold(&full, &layout_opts)?,
            layout::fruchterman_reingold(&trimmed, &layout_opts)?,
        ),
    };

    let distance = dist
        .layers
        .iter()
        .map(|(name, mat)| (name.clone(), SparseMatrix::from_dense(mat)))
        .collect();
    tracing::info!("Finished network of {} cells", dist.cells.len());

    Ok(Network {
        cells: dist.cells,
        distance,
        total: dist.total,
        edges,
        layout,
        graph: (full, trimmed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::airr::Contig;
    use approx::assert_relative_eq;
    use petgraph::algo::connected_components;

    fn four_cells() -> Vec<Contig> {
        vec![
            Contig::new("c1_H", "c1", "IGH", "AAA", "A"),
            Contig::new("c1_K", "c1", "IGK", "QQQ", "A"),
            Contig::new("c2_H", "c2", "IGH", "AAB", "A"),
            Contig::new("c2_K", "c2", "IGK", "QQQ", "A"),
            Contig::new("c3_H", "c3", "IGH", "CCC", "B"),
            Contig::new("c3_K", "c3", "IGK", "QQQ", "B"),
            Contig::new("c4_H", "c4", "IGH", "CCD", "B"),
            Contig::new("c4_K", "c4", "IGK", "QQQ", "B"),
        ]
    }

    #[test]
    fn test_two_clusters() {
        let network =
            generate_network(NetworkInput::Table(four_cells()), &NetworkOptions::default()).unwrap();

        assert_eq!(network.cells, vec!["c1", "c2", "c3", "c4"]);
        assert_eq!(
            network.edges,
            vec![
                Edge { source: "c1".into(), target: "c2".into(), weight: 1.0 },
                Edge { source: "c3".into(), target: "c4".into(), weight: 1.0 },
            ]
        );
        assert_eq!(network.graph.0.node_count(), 4);
        assert_eq!(connected_components(&network.graph.0), 2);
        assert_eq!(network.layout.0.len(), 4);
        assert_eq!(network.layout.1.len(), 4);

        let keys: Vec<_> = network.distance.keys().cloned().collect();
        assert_eq!(keys, vec!["heavy", "light_0"]);
        assert_eq!(network.distance["light_0"].nnz(), 0);
        assert_eq!(network.edge_weights(true), vec![1.0, 1.0]);
    }

    #[test]
    fn test_singletons_only() {
        let contigs = vec![
            Contig::new("a_H", "a", "IGH", "AAA", "1"),
            Contig::new("b_H", "b", "IGH", "AAB", "2"),
            Contig::new("c_H", "c", "IGH", "CCC", ""),
        ];
        let network = generate_network(NetworkInput::Table(contigs), &NetworkOptions::default()).unwrap();

        assert!(network.edges.is_empty());
        assert_eq!(network.graph.0.node_count(), 3);
        assert_eq!(network.graph.1.node_count(), 0);
        assert_eq!(network.layout.0.len(), 3);
        assert!(network.layout.1.is_empty());
        // the light layer has no sequences at all
        assert_eq!(network.distance.len(), 1);
    }

    #[test]
    fn test_identical_cells_linked() {
        let contigs = vec![
            Contig::new("a_H", "a", "IGH", "AAA", "1"),
            Contig::new("b_H", "b", "IGH", "AAA", "1"),
            Contig::new("c_H", "c", "IGH", "AAC", "1"),
        ];
        let network = generate_network(NetworkInput::Table(contigs), &NetworkOptions::default()).unwrap();

        // tree: a-c, b-c; fallback adds a-b with distance 0
        assert_eq!(network.edges.len(), 3);
        assert_eq!(network.edges[0].source, "a");
        assert_eq!(network.edges[0].target, "c");
        let ab = network
            .edges
            .iter()
            .find(|e| e.source == "a" && e.target == "b")
            .unwrap();
        assert_eq!(ab.weight, 0.0);
    }

    #[test]
    fn test_edge_weights_from_total() {
        let opts = NetworkOptions {
            distance_mode: DistanceMode::Weighted,
            weights: Some(vec![0.3, 0.7]),
            ..Default::default()
        };
        let mut contigs = four_cells();
        contigs[3] = Contig::new("c2_K", "c2", "IGK", "QQE", "A");
        let network = generate_network(NetworkInput::Table(contigs), &opts).unwrap();

        let heavy = network.distance["heavy"].to_dense();
        let light = network.distance["light_0"].to_dense();
        assert_relative_eq!(network.total.get(0, 1), 0.3 * heavy.get(0, 1) + 0.7 * light.get(0, 1));
        assert_relative_eq!(network.edges[0].weight, 0.3 + 0.7);
        for e in &network.edges {
            let s = network.cells.iter().position(|c| *c == e.source).unwrap();
            let t = network.cells.iter().position(|c| *c == e.target).unwrap();
            assert_eq!(e.weight, network.total.get(s, t));
        }
    }

    #[test]
    fn test_weights_mismatch() {
        let opts = NetworkOptions {
            distance_mode: DistanceMode::Weighted,
            weights: Some(vec![0.2, 0.3, 0.5]),
            ..Default::default()
        };
        let err = generate_network(NetworkInput::Table(four_cells()), &opts).unwrap_err();
        assert_eq!(err, NetworkError::WeightsLength { expected: 2, found: 3 });
    }

    #[test]
    fn test_construct_by_group() {
        let contigs = vec![
            Contig::new("a_H", "a", "IGH", "AAAA", "X_1"),
            Contig::new("b_H", "b", "IGH", "AAAB", "X_1"),
            Contig::new("c_H", "c", "IGH", "AABB", "X_2"),
            Contig::new("d_H", "d", "IGH", "CCCC", "Y_1"),
        ];
        let by_clone = generate_network(
            NetworkInput::Table(contigs.clone()),
            &NetworkOptions::default(),
        )
        .unwrap();
        assert_eq!(by_clone.edges.len(), 1);

        let opts = NetworkOptions {
            construct_by_group: true,
            ..Default::default()
        };
        let by_group = generate_network(NetworkInput::Table(contigs), &opts).unwrap();
        // tree over group X links c to b
        assert_eq!(by_group.edges.len(), 2);
        assert_eq!(by_group.edges[1].source, "b");
        assert_eq!(by_group.edges[1].target, "c");
        assert_eq!(by_group.edges[1].weight, 1.0);
    }

    #[test]
    fn test_assembled_input() {
        let data = CloneData::from_contigs(four_cells());
        let a = generate_network(NetworkInput::Assembled(data), &NetworkOptions::default()).unwrap();
        let b = generate_network(NetworkInput::Table(four_cells()), &NetworkOptions::default()).unwrap();
        assert_eq!(a.edges, b.edges);
        assert_eq!(a.layout, b.layout);
    }

    #[test]
    fn test_clone_degree() {
        let network =
            generate_network(NetworkInput::Table(four_cells()), &NetworkOptions::default()).unwrap();
        let degree = network.clone_degree().unwrap();
        // heavy distances: AAA AAB CCC CCD
        assert_eq!(degree["c1"], 1.0 + 3.0 + 3.0);
        assert_eq!(degree["c4"], 3.0 + 3.0 + 1.0);
    }

    #[test]
    fn test_invalid_min_size() {
        let opts = NetworkOptions {
            min_size: 1,
            ..Default::default()
        };
        let err = generate_network(NetworkInput::Table(four_cells()), &opts).unwrap_err();
        assert_eq!(err, NetworkError::InvalidMinSize(1));
    }
}
