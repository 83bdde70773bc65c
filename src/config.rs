//! Configuration management for graph generation and queries

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};

/// Parameters shaping the synthetic follow graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of contiguous clusters the population is split into
    pub num_clusters: usize,

    /// Number of influencer nodes
    pub top_influencers: usize,

    /// Smallest follower count an influencer receives
    pub influencer_min: usize,

    /// Largest follower count an influencer receives
    pub influencer_max: usize,

    /// Number of ghost nodes (no edges in or out)
    pub ghost_accounts: usize,

    /// Smallest out-degree of a normal node
    pub normal_min: usize,

    /// Largest out-degree of a normal node
    pub normal_max: usize,

    /// Probability that a normal node's candidate comes from another cluster
    pub cross_cluster_prob: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_clusters: 20,
            top_influencers: 20,
            influencer_min: 1000,
            influencer_max: 3500,
            ghost_accounts: 800,
            normal_min: 3,
            normal_max: 50,
            cross_cluster_prob: 0.005,
        }
    }
}

impl GeneratorConfig {
    /// Check the parameters against a population of `population` nodes.
    ///
    /// Runs before any random draw, so a bad configuration never yields a
    /// partial edge set.
    pub fn validate(&self, population: usize) -> GraphResult<()> {
        let fail = |msg: String| Err(GraphError::Configuration(msg));

        if self.num_clusters == 0 {
            return fail("num_clusters must be at least 1".into());
        }
        if population < self.num_clusters {
            return fail(format!(
                "population of {} cannot fill {} clusters",
                population, self.num_clusters
            ));
        }
        if self.influencer_min > self.influencer_max {
            return fail(format!(
                "influencer range is empty: {} > {}",
                self.influencer_min, self.influencer_max
            ));
        }
        if self.normal_min > self.normal_max {
            return fail(format!(
                "normal range is empty: {} > {}",
                self.normal_min, self.normal_max
            ));
        }
        if self.top_influencers + self.ghost_accounts > population {
            return fail(format!(
                "{} influencers + {} ghosts exceed population of {}",
                self.top_influencers, self.ghost_accounts, population
            ));
        }
        if self.top_influencers > 0 {
            // followers are drawn from everyone except the influencer and the ghosts
            let pool = population - self.ghost_accounts - 1;
            if self.influencer_max > pool {
                return fail(format!(
                    "influencer_max of {} exceeds the {} eligible followers",
                    self.influencer_max, pool
                ));
            }
        }
        if !(0.0..=1.0).contains(&self.cross_cluster_prob) {
            return fail(format!(
                "cross_cluster_prob must lie in [0, 1], got {}",
                self.cross_cluster_prob
            ));
        }

        Ok(())
    }
}

/// Top-level configuration for the command line tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seed for every random draw
    pub seed: u64,

    /// Number of synthetic users to create
    pub user_count: usize,

    /// Generator parameters
    pub generator: GeneratorConfig,

    /// Default length of a recommendation list
    pub recommend_limit: usize,

    /// Default length of the popular users list
    pub popular_limit: usize,

    /// Default number of search hits
    pub search_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: 42,
            user_count: 5000,
            generator: GeneratorConfig::default(),
            recommend_limit: 10,
            popular_limit: 20,
            search_limit: 50,
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Reading configuration from {}", path.display());

        let text = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;

        Ok(config)
    }
}
