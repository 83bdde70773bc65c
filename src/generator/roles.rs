//! Generation-time role assignment

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Role a node plays while edges are sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Receives a large follower set
    Influencer,
    /// Never touched by any generated edge
    Ghost,
    /// Follows a handful of nodes, mostly inside its own cluster
    Normal,
}

/// Per-node role array, computed once before any edge is sampled
#[derive(Debug, Clone)]
pub struct RoleTable {
    roles: Vec<Role>,
    normal_count: usize,
}

impl RoleTable {
    /// Draw influencers from the whole population, then ghosts from the rest.
    ///
    /// Consumes exactly two batches of draws from `rng`, in that order.
    pub fn assign<R: Rng + ?Sized>(
        rng: &mut R,
        node_count: usize,
        influencers: usize,
        ghosts: usize,
    ) -> Self {
        let mut roles = vec![Role::Normal; node_count];

        for idx in index::sample(rng, node_count, influencers).into_iter() {
            roles[idx] = Role::Influencer;
        }

        let remaining: Vec<usize> = (0..node_count)
            .filter(|&idx| roles[idx] != Role::Influencer)
            .collect();
        for pos in index::sample(rng, remaining.len(), ghosts).into_iter() {
            roles[remaining[pos]] = Role::Ghost;
        }

        let normal_count = node_count - influencers - ghosts;
        Self { roles, normal_count }
    }

    pub fn role(&self, node: u32) -> Role {
        self.roles[node as usize]
    }

    pub fn is_normal(&self, node: u32) -> bool {
        self.role(node) == Role::Normal
    }

    pub fn is_ghost(&self, node: u32) -> bool {
        self.role(node) == Role::Ghost
    }

    /// Nodes with the given role, in input order
    pub fn with_role(&self, role: Role) -> Vec<u32> {
        self.roles
            .iter()
            .enumerate()
            .filter(|(_, &r)| r == role)
            .map(|(idx, _)| idx as u32)
            .collect()
    }

    pub fn normal_count(&self) -> usize {
        self.normal_count
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn into_roles(self) -> Vec<Role> {
        self.roles
    }
}
