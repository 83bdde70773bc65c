//! Graph construction module

use std::collections::HashMap;

use crate::error::{GraphError, GraphResult};
use crate::generator::GeneratedGraph;
use crate::graph::FollowGraph;

/// Builder for incrementally constructing a FollowGraph
pub struct GraphBuilder {
    /// Mapping from string IDs to node indices
    id_to_index: HashMap<String, u32>,

    /// Node string IDs
    node_ids: Vec<String>,

    /// (follower, followee) pairs seen so far, possibly repeated
    pairs: Vec<(u32, u32)>,
}

impl GraphBuilder {
    /// Create a new graph builder with the given capacity
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            id_to_index: HashMap::with_capacity(nodes),
            node_ids: Vec::with_capacity(nodes),
            pairs: Vec::with_capacity(edges),
        }
    }

    /// Register a node, returning its index; known ids keep their index
    pub fn add_node(&mut self, id: &str) -> u32 {
        if let Some(&idx) = self.id_to_index.get(id) {
            return idx;
        }

        let idx = self.node_ids.len() as u32;
        self.id_to_index.insert(id.to_string(), idx);
        self.node_ids.push(id.to_string());

        idx
    }

    /// Register a node that must not be known yet
    pub fn add_unique_node(&mut self, id: &str) -> GraphResult<u32> {
        if self.id_to_index.contains_key(id) {
            return Err(GraphError::Configuration(format!("duplicate node id {}", id)));
        }

        Ok(self.add_node(id))
    }

    /// Add a follow edge between two registered nodes.
    ///
    /// Unknown endpoints fail with `NotFound` and self-follows with
    /// `InvalidEdge`; repeated edges are accepted and collapse on build.
    pub fn add_edge(&mut self, follower: &str, followee: &str) -> GraphResult<()> {
        let src = self.index_of(follower)?;
        let dst = self.index_of(followee)?;

        if src == dst {
            return Err(GraphError::InvalidEdge {
                follower: follower.to_string(),
                followee: followee.to_string(),
            });
        }

        self.pairs.push((src, dst));
        Ok(())
    }

    fn index_of(&self, id: &str) -> GraphResult<u32> {
        self.id_to_index
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::NotFound(id.to_string()))
    }

    /// Build the follow graph
    pub fn build(self) -> GraphResult<FollowGraph> {
        log::debug!(
            "Building follow graph from {} nodes and {} raw edges",
            self.node_ids.len(),
            self.pairs.len()
        );
        FollowGraph::from_index_pairs(self.node_ids, self.pairs)
    }
}

impl FollowGraph {
    /// Index the output of a generation run
    pub fn from_generated(generated: &GeneratedGraph) -> GraphResult<Self> {
        Self::from_index_pairs(
            generated.node_ids.clone(),
            generated.edges.iter().copied().collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::FollowView;

    #[test]
    fn builds_from_ids() {
        let mut builder = GraphBuilder::with_capacity(3, 3);
        for id in ["0001", "0002", "0003"] {
            builder.add_node(id);
        }
        assert_eq!(builder.add_node("0002"), 1);

        builder.add_edge("0001", "0002").unwrap();
        builder.add_edge("0001", "0002").unwrap();
        builder.add_edge("0003", "0001").unwrap();

        let graph = builder.build().unwrap();
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.following(0), &[1]);
        assert_eq!(graph.followers(0), &[2]);
    }

    #[test]
    fn unique_registration_rejects_known_ids() {
        let mut builder = GraphBuilder::with_capacity(2, 0);
        assert_eq!(builder.add_unique_node("0001"), Ok(0));
        assert_eq!(builder.add_unique_node("0002"), Ok(1));
        assert_eq!(
            builder.add_unique_node("0001"),
            Err(GraphError::Configuration("duplicate node id 0001".into()))
        );
    }

    #[test]
    fn unknown_endpoint_is_not_found() {
        let mut builder = GraphBuilder::with_capacity(1, 1);
        builder.add_node("0001");
        assert_eq!(
            builder.add_edge("0001", "9999"),
            Err(GraphError::NotFound("9999".into()))
        );
    }

    #[test]
    fn self_follow_is_rejected() {
        let mut builder = GraphBuilder::with_capacity(1, 1);
        builder.add_node("0001");
        assert!(matches!(
            builder.add_edge("0001", "0001"),
            Err(GraphError::InvalidEdge { .. })
        ));
    }
}
