//! Error taxonomy for generation and graph queries

use thiserror::Error;

/// Errors raised by the generator and the analytics core
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Generation parameters are inconsistent with each other or the population
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A query referenced a node that is not part of the graph
    #[error("node not found: {0}")]
    NotFound(String),

    /// A node's out-degree could not be reached within the draw budget
    #[error("starvation sampling followees for {node}: wanted {wanted}, reached {reached} after {draws} draws")]
    Starvation {
        node: String,
        wanted: usize,
        reached: usize,
        draws: usize,
    },

    /// An edge violates the graph invariants (self-loop)
    #[error("invalid edge {follower} -> {followee}")]
    InvalidEdge { follower: String, followee: String },
}

/// Result alias for the core
pub type GraphResult<T> = std::result::Result<T, GraphError>;
