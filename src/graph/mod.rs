//! Graph representation and analytics module

pub mod analytics;
pub mod builder;
pub mod compressed;

pub use builder::GraphBuilder;
pub use compressed::FollowGraph;

/// Read access to a follow graph.
///
/// Neighbor slices are sorted ascending, free of duplicates and never
/// contain the node itself. Implementations must answer every call from
/// one consistent snapshot.
pub trait FollowView {
    /// Number of known nodes
    fn node_count(&self) -> usize;

    /// Index of an external id, if the node is known
    fn node_index(&self, id: &str) -> Option<u32>;

    /// External id of an index
    fn node_id(&self, node: u32) -> &str;

    /// Nodes this node follows
    fn following(&self, node: u32) -> &[u32];

    /// Nodes following this node
    fn followers(&self, node: u32) -> &[u32];
}
