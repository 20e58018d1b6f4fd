use crate::network::NetworkGraph;
use crate::NodeId;
use petgraph::algo::connected_components;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};

/// Summary statistics for `reach validate` (density/degree/connected components).
#[derive(Debug, Clone, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub line_count: usize,
    pub transformer_count: usize,
    pub connected_components: usize,
    pub min_degree: usize,
    pub avg_degree: f64,
    pub max_degree: usize,
    pub density: f64,
}

/// One connected group of nodes.
#[derive(Debug, Clone, Serialize)]
pub struct IslandSummary {
    pub island_id: usize,
    pub nodes: Vec<NodeId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IslandAnalysis {
    pub islands: Vec<IslandSummary>,
}

/// Degree distribution, density and component count. Parallel elements count
/// once per element towards a node's degree.
pub fn graph_stats(network: &NetworkGraph) -> GraphStats {
    let graph = network.graph();
    let node_count = graph.node_count();
    let edge_count = graph.edge_count();
    let degrees: Vec<usize> = graph
        .node_indices()
        .map(|node| graph.edges(node).count())
        .collect();
    let min_degree = degrees.iter().copied().min().unwrap_or(0);
    let max_degree = degrees.iter().copied().max().unwrap_or(0);
    let avg_degree = if node_count == 0 {
        0.0
    } else {
        degrees.iter().sum::<usize>() as f64 / node_count as f64
    };
    let density = if node_count < 2 {
        0.0
    } else {
        2.0 * edge_count as f64 / (node_count as f64 * (node_count as f64 - 1.0))
    };
    GraphStats {
        node_count,
        line_count: network.lines().len(),
        transformer_count: network.transformers().len(),
        connected_components: connected_components(graph),
        min_degree,
        avg_degree,
        max_degree,
        density,
    }
}

/// Labels connected components with a breadth-first search.
pub fn find_islands(network: &NetworkGraph) -> IslandAnalysis {
    let graph = network.graph();
    let mut visited = HashSet::new();
    let mut islands = Vec::new();
    for start in graph.node_indices() {
        if visited.contains(&start) {
            continue;
        }
        let mut queue = VecDeque::from([start]);
        let mut members = Vec::new();
        while let Some(node) = queue.pop_front() {
            if !visited.insert(node) {
                continue;
            }
            members.push(graph[node].clone());
            queue.extend(graph.neighbors(node).filter(|n| !visited.contains(n)));
        }
        members.sort();
        islands.push(IslandSummary {
            island_id: islands.len(),
            nodes: members,
        });
    }
    IslandAnalysis { islands }
}
