//! Read-only queries over a follow graph
//!
//! Every query is a pure function of the supplied view. Unknown ids are
//! reported as `NotFound` rather than treated as nodes without edges.

use std::cmp::Reverse;
use std::collections::HashMap;

use itertools::{EitherOrBoth, Itertools};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};
use crate::graph::FollowView;

/// Follower and following counts of one node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegreeCounts {
    pub followers: usize,
    pub following: usize,
}

/// A friend-of-friend suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Candidate node id
    pub id: String,

    /// Number of distinct followees of the user that follow the candidate
    pub mutual_count: usize,
}

fn resolve<G: FollowView + ?Sized>(graph: &G, id: &str) -> GraphResult<u32> {
    graph
        .node_index(id)
        .ok_or_else(|| GraphError::NotFound(id.to_string()))
}

/// Count distinct followers and followees of a node
pub fn degree_counts<G: FollowView + ?Sized>(graph: &G, id: &str) -> GraphResult<DegreeCounts> {
    let node = resolve(graph, id)?;

    Ok(DegreeCounts {
        followers: graph.followers(node).len(),
        following: graph.following(node).len(),
    })
}

/// Ids following a node, ascending by id.
///
/// The graph carries no usernames, so ordering by a display name is left
/// to callers holding the user table.
pub fn followers<'g, G: FollowView + ?Sized>(graph: &'g G, id: &str) -> GraphResult<Vec<&'g str>> {
    let node = resolve(graph, id)?;
    Ok(sorted_ids(graph, graph.followers(node)))
}

/// Ids a node follows, ascending by id; see [`followers`] for the ordering
pub fn following<'g, G: FollowView + ?Sized>(graph: &'g G, id: &str) -> GraphResult<Vec<&'g str>> {
    let node = resolve(graph, id)?;
    Ok(sorted_ids(graph, graph.following(node)))
}

fn sorted_ids<'g, G: FollowView + ?Sized>(graph: &'g G, nodes: &[u32]) -> Vec<&'g str> {
    nodes.iter().map(|&n| graph.node_id(n)).sorted_unstable().collect()
}

/// Nodes followed by both `a` and `b`, excluding `a` and `b`, ascending by id
pub fn mutual_connections<'g, G: FollowView + ?Sized>(
    graph: &'g G,
    a: &str,
    b: &str,
) -> GraphResult<Vec<&'g str>> {
    let node_a = resolve(graph, a)?;
    let node_b = resolve(graph, b)?;

    let shared = graph
        .following(node_a)
        .iter()
        .merge_join_by(graph.following(node_b).iter(), |x, y| x.cmp(y))
        .filter_map(|pair| match pair {
            EitherOrBoth::Both(&x, _) => Some(x),
            _ => None,
        })
        .filter(|&n| n != node_a && n != node_b);

    Ok(sorted_ids(graph, &shared.collect::<Vec<_>>()))
}

/// Friend-of-friend recommendations, ranked by mutual count then id ascending
pub fn recommend<G: FollowView + ?Sized>(
    graph: &G,
    id: &str,
    limit: usize,
) -> GraphResult<Vec<Recommendation>> {
    recommend_by(graph, id, limit, |candidate| candidate.to_string())
}

/// Friend-of-friend recommendations with a caller-supplied tie-break key.
///
/// Candidates are followees of followees that the user does not follow
/// yet and that are not the user. Reverse or reciprocal follows do not
/// exclude a candidate. Sorted by mutual count descending, then by
/// `tie_key` ascending, truncated to `limit`.
pub fn recommend_by<G, K, F>(
    graph: &G,
    id: &str,
    limit: usize,
    tie_key: F,
) -> GraphResult<Vec<Recommendation>>
where
    G: FollowView + ?Sized,
    K: Ord,
    F: Fn(&str) -> K,
{
    let node = resolve(graph, id)?;
    let direct = graph.following(node);

    let mut counts: HashMap<u32, usize> = HashMap::new();
    for &middle in direct {
        for &candidate in graph.following(middle) {
            if candidate == node || direct.binary_search(&candidate).is_ok() {
                continue;
            }
            *counts.entry(candidate).or_insert(0) += 1;
        }
    }

    let ranked = counts
        .into_iter()
        .map(|(candidate, count)| {
            let id = graph.node_id(candidate);
            (Reverse(count), tie_key(id), id)
        })
        .sorted_unstable_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .take(limit)
        .map(|(Reverse(count), _, id)| Recommendation {
            id: id.to_string(),
            mutual_count: count,
        })
        .collect();

    Ok(ranked)
}

/// Recommendations for many users at once.
///
/// Each entry succeeds or fails on its own; results keep the input order.
pub fn recommend_batch<G, S>(
    graph: &G,
    ids: &[S],
    limit: usize,
) -> Vec<(String, GraphResult<Vec<Recommendation>>)>
where
    G: FollowView + Sync + ?Sized,
    S: AsRef<str> + Sync,
{
    ids.par_iter()
        .map(|id| {
            let id = id.as_ref();
            (id.to_string(), recommend(graph, id, limit))
        })
        .collect()
}

/// Most-followed nodes, by follower count descending then id ascending
pub fn popular<G: FollowView + ?Sized>(graph: &G, limit: usize) -> Vec<(&str, usize)> {
    (0..graph.node_count() as u32)
        .map(|node| (graph.node_id(node), graph.followers(node).len()))
        .sorted_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
        .take(limit)
        .collect()
}
