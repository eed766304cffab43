//! Connectivity analysis on the extracted similarity graph.
//!
//! - **Connected components** (count and largest size) via petgraph's
//!   union-find
//! - **Average local clustering coefficient**: triangles / possible triangles
//!   per node, averaged over all nodes (nodes with degree < 2 contribute 0)

use petgraph::algo::connected_components;
use petgraph::graph::NodeIndex;
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use std::collections::{BTreeSet, HashMap};

use super::extraction::ProteinGraph;
use super::models::ConnectivityReport;

/// Local clustering coefficient of every node, keyed by protein id.
pub fn clustering_coefficients(graph: &ProteinGraph) -> HashMap<String, f64> {
    let g = &graph.graph;
    let mut result = HashMap::with_capacity(g.node_count());

    for idx in g.node_indices() {
        let neighbors: Vec<NodeIndex> = g
            .neighbors(idx)
            .filter(|&n| n != idx)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let k = neighbors.len();
        let coeff = if k < 2 {
            0.0
        } else {
            let mut triangles = 0usize;
            for i in 0..k {
                for j in (i + 1)..k {
                    if g.contains_edge(neighbors[i], neighbors[j]) {
                        triangles += 1;
                    }
                }
            }
            triangles as f64 / (k * (k - 1) / 2) as f64
        };
        result.insert(g[idx].clone(), coeff);
    }

    result
}

/// Component count, largest component and mean clustering coefficient.
pub fn connectivity(graph: &ProteinGraph) -> ConnectivityReport {
    let g = &graph.graph;
    let n = g.node_count();
    if n == 0 {
        return ConnectivityReport::default();
    }

    let mut uf = UnionFind::<usize>::new(n);
    for edge in g.edge_references() {
        uf.union(edge.source().index(), edge.target().index());
    }
    let mut sizes: HashMap<usize, usize> = HashMap::new();
    for root in uf.into_labeling() {
        *sizes.entry(root).or_insert(0) += 1;
    }

    let coefficients = clustering_coefficients(graph);
    let average = coefficients.values().sum::<f64>() / n as f64;

    ConnectivityReport {
        component_count: connected_components(g),
        largest_component_size: sizes.values().copied().max().unwrap_or(0),
        average_clustering: Some(average),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_graph(edges: &[(&str, &str)], isolated: &[&str]) -> ProteinGraph {
        let mut graph = ProteinGraph::default();
        for (a, b) in edges {
            graph.add_edge(a, b);
        }
        for id in isolated {
            graph.add_node(id);
        }
        graph
    }

    #[test]
    fn test_triangle_all_one() {
        let graph = make_graph(&[("A", "B"), ("B", "C"), ("A", "C")], &[]);
        let coeffs = clustering_coefficients(&graph);
        assert!(coeffs.values().all(|&c| (c - 1.0).abs() < 1e-12));

        let report = connectivity(&graph);
        assert_eq!(report.component_count, 1);
        assert_eq!(report.largest_component_size, 3);
        assert_eq!(report.average_clustering, Some(1.0));
    }

    #[test]
    fn test_star_center_zero() {
        let graph = make_graph(&[("H", "A"), ("H", "B"), ("H", "C")], &[]);
        let coeffs = clustering_coefficients(&graph);
        assert_eq!(coeffs["H"], 0.0);
        assert_eq!(coeffs["A"], 0.0);
    }

    #[test]
    fn test_disconnected_components() {
        let graph = make_graph(&[("A", "B"), ("B", "C"), ("X", "Y")], &["Z"]);
        let report = connectivity(&graph);
        assert_eq!(report.component_count, 3);
        assert_eq!(report.largest_component_size, 3);
        assert_eq!(report.average_clustering, Some(0.0));
    }

    #[test]
    fn test_empty_graph() {
        let report = connectivity(&ProteinGraph::default());
        assert_eq!(report, ConnectivityReport::default());
        assert!(report.average_clustering.is_none());
    }
}
