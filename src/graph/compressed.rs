//! Memory-efficient follow graph representation

use std::collections::HashMap;
use std::mem;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};
use crate::graph::FollowView;

/// Compressed sparse rows for one edge direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjacency {
    /// offsets[i] to offsets[i+1] defines the neighbor range for node i
    pub offsets: Vec<u32>,

    /// Concatenated, per-node sorted neighbor lists
    pub neighbors: Vec<u32>,
}

impl Adjacency {
    /// Build from pairs sorted by (row, column) with no duplicates
    fn from_sorted(node_count: usize, pairs: impl Iterator<Item = (u32, u32)>) -> Self {
        let mut counts = vec![0u32; node_count];
        let mut neighbors = Vec::new();

        for (row, col) in pairs {
            counts[row as usize] += 1;
            neighbors.push(col);
        }

        let mut offsets = Vec::with_capacity(node_count + 1);
        offsets.push(0);
        let mut offset = 0;
        for count in counts {
            offset += count;
            offsets.push(offset);
        }

        Self { offsets, neighbors }
    }

    /// Neighbors of a node
    pub fn neighbors(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.neighbors[start..end]
    }

    /// Check if `node` has `other` as a neighbor
    pub fn contains(&self, node: usize, other: u32) -> bool {
        self.neighbors(node).binary_search(&other).is_ok()
    }

    fn memory_usage(&self) -> usize {
        (self.offsets.capacity() + self.neighbors.capacity()) * mem::size_of::<u32>()
    }
}

/// Directed follow graph indexed in both directions.
///
/// Edges are unique and never self-loops; both adjacency views hold
/// sorted neighbor lists so membership checks are binary searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowGraph {
    /// Number of nodes in the graph
    pub node_count: usize,

    /// External id of every node
    node_ids: Vec<String>,

    /// Reverse lookup from external id to index
    id_to_index: HashMap<String, u32>,

    /// follower -> followees
    outgoing: Adjacency,

    /// followee -> followers
    incoming: Adjacency,
}

impl FollowGraph {
    /// Build from node ids and (follower, followee) index pairs.
    ///
    /// Duplicate pairs collapse. Self-loops and out-of-range indices are
    /// rejected, as are repeated node ids.
    pub fn from_index_pairs(node_ids: Vec<String>, mut pairs: Vec<(u32, u32)>) -> GraphResult<Self> {
        let node_count = node_ids.len();

        let mut id_to_index = HashMap::with_capacity(node_count);
        for (idx, id) in node_ids.iter().enumerate() {
            if id_to_index.insert(id.clone(), idx as u32).is_some() {
                return Err(GraphError::Configuration(format!("duplicate node id {}", id)));
            }
        }

        for &(src, dst) in &pairs {
            for end in [src, dst] {
                if end as usize >= node_count {
                    return Err(GraphError::NotFound(format!("node index {}", end)));
                }
            }
            if src == dst {
                return Err(GraphError::InvalidEdge {
                    follower: node_ids[src as usize].clone(),
                    followee: node_ids[dst as usize].clone(),
                });
            }
        }

        pairs.sort_unstable();
        pairs.dedup();
        let outgoing = Adjacency::from_sorted(node_count, pairs.iter().copied());

        let mut reversed: Vec<(u32, u32)> = pairs.iter().map(|&(src, dst)| (dst, src)).collect();
        reversed.sort_unstable();
        let incoming = Adjacency::from_sorted(node_count, reversed.into_iter());

        Ok(Self {
            node_count,
            node_ids,
            id_to_index,
            outgoing,
            incoming,
        })
    }

    /// Number of distinct follow edges
    pub fn edge_count(&self) -> usize {
        self.outgoing.neighbors.len()
    }

    /// All node ids in index order
    pub fn node_ids(&self) -> &[String] {
        &self.node_ids
    }

    /// Check if there's an edge from src to dst
    pub fn has_edge(&self, src: u32, dst: u32) -> bool {
        self.outgoing.contains(src as usize, dst)
    }

    /// Get out-degree of a node
    pub fn out_degree(&self, node: u32) -> usize {
        self.outgoing.neighbors(node as usize).len()
    }

    /// Get in-degree of a node
    pub fn in_degree(&self, node: u32) -> usize {
        self.incoming.neighbors(node as usize).len()
    }

    /// Edges as (follower index, followee index) in sorted order
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.node_count as u32).flat_map(move |src| {
            self.outgoing.neighbors(src as usize).iter().map(move |&dst| (src, dst))
        })
    }

    /// Estimate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        let base = mem::size_of::<Self>();
        let ids: usize = self.node_ids.iter().map(|s| s.capacity()).sum();
        // keys of the reverse map are copies of the ids
        let lookup = ids + self.id_to_index.capacity() * mem::size_of::<(String, u32)>();

        base + ids + lookup + self.outgoing.memory_usage() + self.incoming.memory_usage()
    }
}

impl FollowView for FollowGraph {
    fn node_count(&self) -> usize {
        self.node_count
    }

    fn node_index(&self, id: &str) -> Option<u32> {
        self.id_to_index.get(id).copied()
    }

    fn node_id(&self, node: u32) -> &str {
        &self.node_ids[node as usize]
    }

    fn following(&self, node: u32) -> &[u32] {
        self.outgoing.neighbors(node as usize)
    }

    fn followers(&self, node: u32) -> &[u32] {
        self.incoming.neighbors(node as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn duplicates_collapse_and_both_directions_agree() {
        let graph = FollowGraph::from_index_pairs(
            names(&["a", "b", "c"]),
            vec![(0, 1), (0, 2), (0, 1), (2, 1)],
        )
        .unwrap();

        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.following(0), &[1, 2]);
        assert_eq!(graph.followers(1), &[0, 2]);
        assert_eq!(graph.followers(0), &[] as &[u32]);
        assert!(graph.has_edge(2, 1));
        assert!(!graph.has_edge(1, 2));
        assert_eq!(graph.in_degree(1), 2);
        assert_eq!(graph.out_degree(0), 2);
        assert_eq!(graph.edges().collect::<Vec<_>>(), vec![(0, 1), (0, 2), (2, 1)]);
    }

    #[test]
    fn rejects_self_loops_and_bad_indices() {
        let err = FollowGraph::from_index_pairs(names(&["a", "b"]), vec![(1, 1)]).unwrap_err();
        assert_eq!(
            err,
            GraphError::InvalidEdge {
                follower: "b".into(),
                followee: "b".into()
            }
        );

        assert!(matches!(
            FollowGraph::from_index_pairs(names(&["a", "b"]), vec![(0, 5)]),
            Err(GraphError::NotFound(_))
        ));
    }

    #[test]
    fn resolves_ids_both_ways() {
        let graph = FollowGraph::from_index_pairs(names(&["0001", "0002"]), vec![]).unwrap();
        assert_eq!(graph.node_index("0002"), Some(1));
        assert_eq!(graph.node_index("0003"), None);
        assert_eq!(graph.node_id(0), "0001");
        assert!(graph.memory_usage() > 0);
    }
}
