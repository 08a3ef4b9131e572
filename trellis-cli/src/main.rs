//! Trellis CLI - Command-line interface for Trellis
//!
//! Builds the organization's trust graph from its credentials and prints
//! scores, rankings and summaries.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "trellis")]
#[command(author = "Trellis Contributors")]
#[command(version)]
#[command(about = "Trust graph and standing scores for credentialed communities", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project directory holding .trellis/
    #[arg(short = 'C', long, global = true, default_value = ".")]
    dir: PathBuf,

    /// Override the organization root id from the config
    #[arg(long, global = true)]
    root: Option<String>,

    /// Read credentials from this JSON file instead of the configured store
    #[arg(long, global = true)]
    credentials: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Trellis in the project directory
    Init {
        /// The organization's identifier
        #[arg(long)]
        org: String,
    },

    /// Load credentials from a JSON file into the local store
    Import {
        /// JSON array of credential records
        file: PathBuf,
    },

    /// Build the trust graph and print or export it
    Graph {
        /// Only the neighborhood around this identity
        #[arg(long)]
        id: Option<String>,

        /// Neighborhood radius in hops
        #[arg(short, long, default_value = "2")]
        depth: usize,

        /// Write the graph JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rank identities by trust score
    Scores {
        /// Number of identities to show
        #[arg(short, long, default_value = "10")]
        top: usize,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Show the score breakdown for one identity
    Score {
        /// Identity to score
        id: String,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Show aggregate statistics for the whole graph
    Summary {
        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Show configuration and store status
    Status,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let overrides = commands::Overrides {
        root: cli.root,
        credentials: cli.credentials,
    };

    let result = match cli.command {
        Commands::Init { org } => commands::init(&cli.dir, &org),
        Commands::Import { file } => commands::import(&cli.dir, &file),
        Commands::Graph { id, depth, output } => {
            commands::graph(&cli.dir, overrides, id.as_deref(), depth, output.as_deref()).await
        }
        Commands::Scores { top, json } => commands::scores(&cli.dir, overrides, top, json).await,
        Commands::Score { id, json } => commands::score(&cli.dir, overrides, &id, json).await,
        Commands::Summary { json } => commands::summary(&cli.dir, overrides, json).await,
        Commands::Status => commands::status(&cli.dir, overrides).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
