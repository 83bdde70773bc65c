//! Edge sampling for influencers and normal nodes

use std::collections::BTreeSet;

use rand::seq::index;
use rand::Rng;

use crate::config::GeneratorConfig;
use crate::error::{GraphError, GraphResult};
use crate::generator::partition::ClusterMap;
use crate::generator::roles::RoleTable;

/// Non-growing draws tolerated before falling back to a population-wide pick
pub const STALL_LIMIT: usize = 64;

/// Draws allowed for one normal node before giving up with `Starvation`
pub fn draw_budget(node_count: usize) -> usize {
    let log2 = (usize::BITS - node_count.leading_zeros()) as usize;
    STALL_LIMIT * node_count.max(1) * (log2 + 1)
}

/// Samples follower and followee sets against fixed clusters and roles
pub struct EdgeSampler<'a> {
    config: &'a GeneratorConfig,
    clusters: &'a ClusterMap,
    roles: &'a RoleTable,
    node_ids: &'a [String],

    /// Every non-ghost node in input order
    follower_pool: Vec<u32>,

    /// Draws allowed per normal node
    budget: usize,
}

impl<'a> EdgeSampler<'a> {
    pub fn new(
        config: &'a GeneratorConfig,
        clusters: &'a ClusterMap,
        roles: &'a RoleTable,
        node_ids: &'a [String],
    ) -> Self {
        let follower_pool = (0..roles.len() as u32)
            .filter(|&node| !roles.is_ghost(node))
            .collect();

        Self {
            config,
            clusters,
            roles,
            node_ids,
            follower_pool,
            budget: draw_budget(roles.len()),
        }
    }

    /// Replace the per-node draw budget
    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget;
        self
    }

    /// Draw a follower count in the influencer range and sample that many
    /// distinct non-ghost followers, never the influencer itself.
    pub fn influencer_followers<R: Rng + ?Sized>(&self, rng: &mut R, influencer: u32) -> Vec<u32> {
        let count = rng.gen_range(self.config.influencer_min..=self.config.influencer_max);

        let possible: Vec<u32> = self
            .follower_pool
            .iter()
            .copied()
            .filter(|&node| node != influencer)
            .collect();

        index::sample(rng, possible.len(), count)
            .into_iter()
            .map(|pos| possible[pos])
            .collect()
    }

    /// Sample the followees of a normal node.
    ///
    /// Only other normal nodes are accepted, so ghosts keep zero in-degree
    /// and influencers keep exactly their sampled follower count. The drawn
    /// out-degree is clamped to the number of eligible targets, and a run of
    /// `STALL_LIMIT` non-growing draws switches to uniform picks over the
    /// whole population until the set grows again.
    pub fn normal_followees<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        node: u32,
    ) -> GraphResult<BTreeSet<u32>> {
        let wanted = rng.gen_range(self.config.normal_min..=self.config.normal_max);
        let achievable = self.roles.normal_count().saturating_sub(1);
        let target = wanted.min(achievable);

        if target < wanted {
            log::debug!(
                "Clamping out-degree of {} from {} to {}",
                self.node_ids[node as usize],
                wanted,
                target
            );
        }

        let node_count = self.roles.len();
        let mut followees = BTreeSet::new();
        let mut stalled = 0;
        let mut draws = 0;

        while followees.len() < target {
            if draws == self.budget {
                return Err(GraphError::Starvation {
                    node: self.node_ids[node as usize].clone(),
                    wanted: target,
                    reached: followees.len(),
                    draws,
                });
            }
            draws += 1;

            let candidate = if stalled >= STALL_LIMIT {
                rng.gen_range(0..node_count) as u32
            } else {
                self.pick_candidate(rng, node)
            };

            if candidate != node && self.roles.is_normal(candidate) && followees.insert(candidate) {
                stalled = 0;
            } else {
                stalled += 1;
            }
        }

        Ok(followees)
    }

    /// One candidate: another cluster with the cross-cluster probability,
    /// otherwise the node's own cluster
    fn pick_candidate<R: Rng + ?Sized>(&self, rng: &mut R, node: u32) -> u32 {
        let own = self.clusters.cluster_of(node);
        let crossing = rng.gen::<f64>() < self.config.cross_cluster_prob;

        if crossing && self.clusters.len() > 1 {
            let other = self.clusters.pick_other(rng, own);
            self.clusters.pick_member(rng, other)
        } else {
            self.clusters.pick_member(rng, own)
        }
    }
}
