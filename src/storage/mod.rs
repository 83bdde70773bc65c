//! Results persistence module

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::Result;
use serde_json::{json, to_string_pretty, Value};
use statrs::statistics::Statistics;

use crate::generator::{GeneratedGraph, Role};
use crate::graph::analytics;
use crate::graph::{FollowGraph, FollowView};

/// Number of top accounts listed in summaries
const TOP_ACCOUNTS: usize = 20;

/// Save graph summary, statistics and a binary snapshot to `output_dir`
pub fn save_results<P: AsRef<Path>>(graph: &FollowGraph, output_dir: P) -> Result<()> {
    let output_dir = output_dir.as_ref();
    log::info!("Saving graph results to {}", output_dir.display());

    // Ensure output directory exists
    fs::create_dir_all(output_dir)?;

    save_summary(graph, output_dir)?;
    save_graph_stats(graph, output_dir)?;
    save_snapshot(graph, output_dir.join("graph.bin"))?;

    log::info!("Results saved successfully");

    Ok(())
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(value)?.as_bytes())?;
    Ok(())
}

fn degrees(graph: &FollowGraph) -> (Vec<f64>, Vec<f64>) {
    (0..graph.node_count as u32)
        .map(|node| (graph.in_degree(node) as f64, graph.out_degree(node) as f64))
        .unzip()
}

/// Save summary information
fn save_summary(graph: &FollowGraph, output_dir: &Path) -> Result<()> {
    log::info!("Saving summary information");

    let (in_degrees, out_degrees) = degrees(graph);
    let isolated = (0..graph.node_count as u32)
        .filter(|&node| graph.in_degree(node) == 0 && graph.out_degree(node) == 0)
        .count();
    let reciprocal = graph
        .edges()
        .filter(|&(src, dst)| src < dst && graph.has_edge(dst, src))
        .count();

    let popular: Vec<Value> = analytics::popular(graph, TOP_ACCOUNTS)
        .into_iter()
        .map(|(id, followers)| json!({ "id": id, "followers": followers }))
        .collect();

    let summary = json!({
        "graph_stats": {
            "node_count": graph.node_count,
            "edge_count": graph.edge_count(),
            "reciprocal_pairs": reciprocal,
            "isolated_nodes": isolated,
            "avg_degree": graph.edge_count() as f64 / graph.node_count.max(1) as f64,
            "in_degree_std_dev": in_degrees.iter().std_dev(),
            "out_degree_std_dev": out_degrees.iter().std_dev(),
            "memory_bytes": graph.memory_usage(),
        },
        "most_followed": popular,
    });

    write_json(&output_dir.join("summary.json"), &summary)
}

/// Bucket degrees into 0..=100, the last bucket holding 100 and above
fn distribution(degrees: &[f64]) -> Vec<usize> {
    let mut buckets = vec![0; 101];
    for &degree in degrees {
        buckets[(degree as usize).min(100)] += 1;
    }
    buckets
}

/// Save graph statistics
fn save_graph_stats(graph: &FollowGraph, output_dir: &Path) -> Result<()> {
    log::info!("Saving graph statistics");

    let (in_degrees, out_degrees) = degrees(graph);

    let stats = json!({
        "node_count": graph.node_count,
        "edge_count": graph.edge_count(),
        "in_degree_distribution": distribution(&in_degrees),
        "out_degree_distribution": distribution(&out_degrees),
        "in_degree_mean": in_degrees.iter().mean(),
        "out_degree_mean": out_degrees.iter().mean(),
    });

    write_json(&output_dir.join("graph_stats.json"), &stats)
}

/// Save a report of a generation run: roles, clusters and edge mix
pub fn save_generation_report<P: AsRef<Path>>(generated: &GeneratedGraph, output_dir: P) -> Result<()> {
    let output_dir = output_dir.as_ref();
    log::info!("Saving generation report to {}", output_dir.display());
    fs::create_dir_all(output_dir)?;

    let mut in_degree = vec![0usize; generated.node_count()];
    let mut cross_cluster = 0;
    for &(src, dst) in &generated.edges {
        in_degree[dst as usize] += 1;
        if generated.cluster_of[src as usize] != generated.cluster_of[dst as usize] {
            cross_cluster += 1;
        }
    }

    let influencers: Vec<Value> = generated
        .roles
        .iter()
        .enumerate()
        .filter(|(_, &role)| role == Role::Influencer)
        .map(|(idx, _)| json!({ "id": generated.node_ids[idx], "followers": in_degree[idx] }))
        .collect();

    let mut cluster_sizes = Vec::new();
    for &cid in &generated.cluster_of {
        let cid = cid as usize;
        if cid >= cluster_sizes.len() {
            cluster_sizes.resize(cid + 1, 0usize);
        }
        cluster_sizes[cid] += 1;
    }

    let report = json!({
        "node_count": generated.node_count(),
        "edge_count": generated.edge_count(),
        "cross_cluster_edges": cross_cluster,
        "roles": {
            "influencers": influencers,
            "ghost_count": generated.ids_with_role(Role::Ghost).len(),
            "normal_count": generated.ids_with_role(Role::Normal).len(),
        },
        "cluster_sizes": cluster_sizes,
    });

    write_json(&output_dir.join("generation.json"), &report)
}

/// Write a bincode snapshot of the graph index
pub fn save_snapshot<P: AsRef<Path>>(graph: &FollowGraph, path: P) -> Result<()> {
    let path = path.as_ref();
    log::info!("Writing graph snapshot to {}", path.display());

    let writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(writer, graph)?;

    Ok(())
}

/// Read a snapshot written by `save_snapshot`
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<FollowGraph> {
    let path = path.as_ref();
    log::info!("Reading graph snapshot from {}", path.display());

    let reader = BufReader::new(File::open(path)?);
    let graph: FollowGraph = bincode::deserialize_from(reader)?;

    log::info!(
        "Loaded snapshot with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::generator::generate;

    fn small_graph() -> GeneratedGraph {
        let ids: Vec<String> = (1..=80).map(|i| format!("{:04}", i)).collect();
        let config = GeneratorConfig {
            num_clusters: 4,
            top_influencers: 2,
            influencer_min: 10,
            influencer_max: 20,
            ghost_accounts: 5,
            normal_min: 2,
            normal_max: 5,
            cross_cluster_prob: 0.1,
        };
        generate(&ids, 42, &config).unwrap()
    }

    #[test]
    fn distribution_caps_at_last_bucket() {
        let buckets = distribution(&[0.0, 3.0, 3.0, 250.0]);
        assert_eq!(buckets.len(), 101);
        assert_eq!(buckets[0], 1);
        assert_eq!(buckets[3], 2);
        assert_eq!(buckets[100], 1);
    }

    #[test]
    fn results_and_snapshot_round_trip() {
        let generated = small_graph();
        let graph = FollowGraph::from_generated(&generated).unwrap();
        let dir = tempfile::tempdir().unwrap();

        save_results(&graph, dir.path()).unwrap();
        assert!(dir.path().join("summary.json").exists());
        assert!(dir.path().join("graph_stats.json").exists());

        let restored = load_snapshot(dir.path().join("graph.bin")).unwrap();
        assert_eq!(restored, graph);
    }

    #[test]
    fn generation_report_lists_influencers() {
        let generated = small_graph();
        let dir = tempfile::tempdir().unwrap();
        save_generation_report(&generated, dir.path()).unwrap();

        let text = fs::read_to_string(dir.path().join("generation.json")).unwrap();
        let report: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(report["roles"]["influencers"].as_array().unwrap().len(), 2);
        assert_eq!(report["roles"]["ghost_count"], 5);
        assert_eq!(report["cluster_sizes"].as_array().unwrap().len(), 4);
    }
}
