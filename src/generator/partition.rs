//! Positional cluster partition of the node population

use std::ops::Range;

use rand::Rng;

/// Contiguous, near-equal split of node indices into clusters.
///
/// Cluster `c` covers `c * size .. (c + 1) * size`; the last cluster also
/// takes the remainder. Membership is a flat array for O(1) lookup.
#[derive(Debug, Clone)]
pub struct ClusterMap {
    /// Cluster id of every node, indexed by node position
    cluster_of: Vec<u32>,

    /// Index range of each cluster
    bounds: Vec<Range<usize>>,
}

impl ClusterMap {
    /// Split `node_count` nodes into `num_clusters` groups.
    ///
    /// The caller guarantees `1 <= num_clusters <= node_count`, which keeps
    /// every group non-empty.
    pub fn partition(node_count: usize, num_clusters: usize) -> Self {
        let size = node_count / num_clusters;

        let bounds: Vec<Range<usize>> = (0..num_clusters)
            .map(|cid| {
                let start = cid * size;
                let end = if cid + 1 < num_clusters { start + size } else { node_count };
                start..end
            })
            .collect();

        let mut cluster_of = vec![0u32; node_count];
        for (cid, range) in bounds.iter().enumerate() {
            for slot in &mut cluster_of[range.clone()] {
                *slot = cid as u32;
            }
        }

        Self { cluster_of, bounds }
    }

    /// Number of clusters
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Cluster of a node
    pub fn cluster_of(&self, node: u32) -> usize {
        self.cluster_of[node as usize] as usize
    }

    /// Index range of a cluster
    pub fn members(&self, cluster: usize) -> Range<usize> {
        self.bounds[cluster].clone()
    }

    /// Uniformly random member of `cluster`
    pub fn pick_member<R: Rng + ?Sized>(&self, rng: &mut R, cluster: usize) -> u32 {
        rng.gen_range(self.members(cluster)) as u32
    }

    /// Uniformly random cluster other than `own`; requires at least two clusters
    pub fn pick_other<R: Rng + ?Sized>(&self, rng: &mut R, own: usize) -> usize {
        let other = rng.gen_range(0..self.len() - 1);
        if other >= own {
            other + 1
        } else {
            other
        }
    }

    /// Consume into the per-node cluster table
    pub fn into_assignments(self) -> Vec<u32> {
        self.cluster_of
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn last_cluster_absorbs_remainder() {
        let map = ClusterMap::partition(23, 4);
        assert_eq!(map.len(), 4);
        assert_eq!(map.members(0), 0..5);
        assert_eq!(map.members(2), 10..15);
        assert_eq!(map.members(3), 15..23);
        assert_eq!(map.cluster_of(4), 0);
        assert_eq!(map.cluster_of(5), 1);
        assert_eq!(map.cluster_of(22), 3);
    }

    #[test]
    fn every_node_has_exactly_one_cluster() {
        let map = ClusterMap::partition(101, 7);
        let covered: usize = (0..map.len()).map(|c| map.members(c).len()).sum();
        assert_eq!(covered, 101);
        for node in 0..101u32 {
            assert!(map.members(map.cluster_of(node)).contains(&(node as usize)));
        }
    }

    #[test]
    fn pick_other_never_returns_own_cluster() {
        let map = ClusterMap::partition(30, 3);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            let own = rng.gen_range(0..3);
            assert_ne!(map.pick_other(&mut rng, own), own);
        }
    }

    #[test]
    fn picked_members_stay_in_cluster() {
        let map = ClusterMap::partition(50, 5);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let member = map.pick_member(&mut rng, 2);
            assert_eq!(map.cluster_of(member), 2);
        }
    }
}
