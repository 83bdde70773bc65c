use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use follow_graph::config::Config;
use follow_graph::data::{self, tables, users};
use follow_graph::generator::{self, GenerationMode};
use follow_graph::graph::analytics;
use follow_graph::storage;

#[derive(Parser, Debug)]
#[clap(
    name = "follow-graph",
    about = "Generate synthetic social follow graphs and query them"
)]
struct Cli {
    /// JSON configuration file (missing fields take defaults)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0", global = true)]
    threads: usize,

    /// Verbose logging
    #[clap(long, short, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

/// Paths of the user and follows tables
#[derive(clap::Args, Debug)]
struct Tables {
    /// User table (CSV or .parquet)
    #[clap(long, default_value = "users.csv")]
    users: PathBuf,

    /// Follows table (CSV or .parquet)
    #[clap(long, default_value = "follows.csv")]
    follows: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the synthetic user table
    Users {
        /// Number of users (defaults to the configured count)
        #[clap(long)]
        count: Option<usize>,

        /// Seed (defaults to the configured seed)
        #[clap(long)]
        seed: Option<u64>,

        /// Value stored in the passwordHash column
        #[clap(long, default_value = "unset")]
        password_hash: String,

        /// Output path
        #[clap(long, default_value = "users.csv")]
        output: PathBuf,
    },

    /// Generate the follows table for an existing user table
    Generate {
        /// User table to read node ids from
        #[clap(long, default_value = "users.csv")]
        users: PathBuf,

        /// Output path for the follows table
        #[clap(long, default_value = "follows.csv")]
        output: PathBuf,

        /// Seed (defaults to the configured seed)
        #[clap(long)]
        seed: Option<u64>,

        /// Sample per node in parallel with independently seeded generators
        #[clap(long)]
        sharded: bool,

        /// Directory for a generation report
        #[clap(long)]
        report_dir: Option<PathBuf>,
    },

    /// Follower and following counts of a user
    Degree {
        #[clap(flatten)]
        tables: Tables,

        #[clap(long)]
        user: String,
    },

    /// Users following a user
    Followers {
        #[clap(flatten)]
        tables: Tables,

        #[clap(long)]
        user: String,
    },

    /// Users a user follows
    Following {
        #[clap(flatten)]
        tables: Tables,

        #[clap(long)]
        user: String,
    },

    /// Accounts followed by both users
    Mutual {
        #[clap(flatten)]
        tables: Tables,

        #[clap(long)]
        a: String,

        #[clap(long)]
        b: String,
    },

    /// Friend-of-friend recommendations for a user
    Recommend {
        #[clap(flatten)]
        tables: Tables,

        #[clap(long)]
        user: String,

        #[clap(long)]
        limit: Option<usize>,
    },

    /// Recommendations for every user, written as JSON
    RecommendAll {
        #[clap(flatten)]
        tables: Tables,

        #[clap(long)]
        limit: Option<usize>,

        #[clap(long, default_value = "recommendations.json")]
        output: PathBuf,
    },

    /// Most-followed users
    Popular {
        #[clap(flatten)]
        tables: Tables,

        #[clap(long)]
        limit: Option<usize>,
    },

    /// Search users by username or name
    Search {
        /// User table
        #[clap(long, default_value = "users.csv")]
        users: PathBuf,

        #[clap(long)]
        query: String,

        #[clap(long)]
        limit: Option<usize>,
    },

    /// Write summary statistics and a graph snapshot
    Summary {
        #[clap(flatten)]
        tables: Tables,

        /// Output directory for results
        #[clap(long, default_value = "graph_results")]
        output_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    // Set number of threads
    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    let config = match &args.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };

    run(args.command, &config)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Users {
            count,
            seed,
            password_hash,
            output,
        } => {
            let count = count.unwrap_or(config.user_count);
            let users = users::generate_users(count, seed.unwrap_or(config.seed), &password_hash);
            tables::write_users(&users, &output)?;
        }

        Command::Generate {
            users,
            output,
            seed,
            sharded,
            report_dir,
        } => {
            let profiles = tables::read_users(&users)?;
            let ids: Vec<&str> = profiles.iter().map(|u| u.user_id.as_str()).collect();
            let mode = if sharded {
                GenerationMode::Sharded
            } else {
                GenerationMode::Sequential
            };

            let generated = generator::generate_with_mode(
                &ids,
                seed.unwrap_or(config.seed),
                &config.generator,
                mode,
            )?;

            let written = tables::write_follows(generated.edge_pairs(), &output)?;
            log::info!("Generated {} with {} edges", output.display(), written);

            if let Some(dir) = report_dir {
                storage::save_generation_report(&generated, dir)?;
            }
        }

        Command::Degree { tables, user } => {
            let graph = data::load_graph(&tables.users, &tables.follows)?;
            print_json(&analytics::degree_counts(&graph, &user)?)?;
        }

        Command::Followers { tables, user } => {
            let graph = data::load_graph(&tables.users, &tables.follows)?;
            print_json(&analytics::followers(&graph, &user)?)?;
        }

        Command::Following { tables, user } => {
            let graph = data::load_graph(&tables.users, &tables.follows)?;
            print_json(&analytics::following(&graph, &user)?)?;
        }

        Command::Mutual { tables, a, b } => {
            let graph = data::load_graph(&tables.users, &tables.follows)?;
            print_json(&analytics::mutual_connections(&graph, &a, &b)?)?;
        }

        Command::Recommend {
            tables,
            user,
            limit,
        } => {
            let graph = data::load_graph(&tables.users, &tables.follows)?;
            let limit = limit.unwrap_or(config.recommend_limit);
            print_json(&analytics::recommend(&graph, &user, limit)?)?;
        }

        Command::RecommendAll {
            tables,
            limit,
            output,
        } => {
            let graph = data::load_graph(&tables.users, &tables.follows)?;
            let limit = limit.unwrap_or(config.recommend_limit);

            let results = analytics::recommend_batch(&graph, graph.node_ids(), limit);
            let mut all = serde_json::Map::with_capacity(results.len());
            for (id, recs) in results {
                all.insert(id, serde_json::to_value(recs?)?);
            }

            std::fs::write(&output, serde_json::to_string_pretty(&all)?)?;
            log::info!("Wrote recommendations for {} users to {}", all.len(), output.display());
        }

        Command::Popular { tables, limit } => {
            let graph = data::load_graph(&tables.users, &tables.follows)?;
            let limit = limit.unwrap_or(config.popular_limit);
            print_json(&analytics::popular(&graph, limit))?;
        }

        Command::Search {
            users,
            query,
            limit,
        } => {
            let profiles = tables::read_users(&users)?;
            let limit = limit.unwrap_or(config.search_limit);
            print_json(&users::search_users(&profiles, &query, limit))?;
        }

        Command::Summary { tables, output_dir } => {
            let graph = data::load_graph(&tables.users, &tables.follows)?;
            storage::save_results(&graph, &output_dir)?;
            log::info!("Analysis complete. Results saved to {}", output_dir.display());
        }
    }

    Ok(())
}
