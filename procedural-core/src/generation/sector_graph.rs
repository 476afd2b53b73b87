//! Adjacency graph over partition sectors.
//!
//! Two sectors are linked when their boxes touch along a face with positive
//! overlap area. Sibling leaves of the BSP always do, so a graph built from
//! a full partition is connected.

use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashMap;

use crate::model::Sector;

pub struct SectorGraph {
    graph: UnGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
}

impl SectorGraph {
    pub fn build(sectors: &[Sector]) -> Self {
        let mut graph = UnGraph::with_capacity(sectors.len(), sectors.len() * 2);
        let mut index = HashMap::with_capacity(sectors.len());
        let nodes: Vec<NodeIndex> = sectors
            .iter()
            .map(|s| {
                let node = graph.add_node(s.id.clone());
                index.insert(s.id.clone(), node);
                node
            })
            .collect();

        for (i, a) in sectors.iter().enumerate() {
            for (j, b) in sectors.iter().enumerate().skip(i + 1) {
                if a.bounds.shares_face(&b.bounds) {
                    graph.add_edge(nodes[i], nodes[j], ());
                }
            }
        }

        tracing::debug!(
            sectors = graph.node_count(),
            links = graph.edge_count(),
            "sector graph built"
        );
        Self { graph, index }
    }

    pub fn sector_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Ids of sectors sharing a face with `id`, sorted
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        let Some(&node) = self.index.get(id) else {
            return Vec::new();
        };
        let mut ids: Vec<&str> = self
            .graph
            .neighbors(node)
            .map(|n| self.graph[n].as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// An empty graph counts as connected
    pub fn is_connected(&self) -> bool {
        connected_components(&self.graph) <= 1
    }
}
