//! Data loading and processing module

pub mod tables;
pub mod users;

use std::path::Path;

use anyhow::{Context, Result};

use crate::graph::{FollowGraph, GraphBuilder};

/// Load the user and follows tables into an indexed follow graph.
///
/// The user table defines the known node set. A repeated user id, a follow
/// edge naming an unknown user or a self-follow fails the load.
pub fn load_graph<P: AsRef<Path>, Q: AsRef<Path>>(
    users_path: P,
    follows_path: Q,
) -> Result<FollowGraph> {
    let users = tables::read_users(users_path)?;
    let follows = tables::read_follows(follows_path)?;

    log::info!("Building follow graph...");
    let mut builder = GraphBuilder::with_capacity(users.len(), follows.len());
    for (row, user) in users.iter().enumerate() {
        builder
            .add_unique_node(&user.user_id)
            .with_context(|| format!("users table row {}", row + 1))?;
    }
    for (row, (follower, followee)) in follows.iter().enumerate() {
        builder
            .add_edge(follower, followee)
            .with_context(|| format!("follows table row {}", row + 1))?;
    }

    let graph = builder.build()?;
    log::info!(
        "Loaded graph with {} nodes and {} edges ({} bytes)",
        graph.node_count,
        graph.edge_count(),
        graph.memory_usage()
    );

    Ok(graph)
}
