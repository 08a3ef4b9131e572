//! CLI command implementations.

use crate::config::{Config, SourceKind, CONFIG_DIR};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use trellis_core::{CredentialRecord, CredentialStore};
use trellis_graph::{
    GraphBuilder, Score, ScoreCalculator, SledCredentialStore, TrustGraph, UNREACHABLE_DEPTH,
};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub root: Option<String>,
    pub credentials: Option<PathBuf>,
}

fn load_config(dir: &Path, overrides: Overrides) -> Result<Config> {
    let config = match Config::load(dir) {
        Ok(config) => config,
        // A root plus a credentials file is enough to run without init
        Err(_) if overrides.root.is_some() && overrides.credentials.is_some() => {
            Config::new(String::new())
        }
        Err(e) => return Err(e.into()),
    };
    let config = config.with_overrides(overrides.root, overrides.credentials);
    debug!(
        "Using root {} with {:?} credentials at {}",
        config.root,
        config.credentials.kind,
        config.credentials.path.display()
    );
    Ok(config)
}

/// Initialize Trellis in a directory.
pub fn init(dir: &Path, org: &str) -> Result<()> {
    if Config::path(dir).exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    Config::new(org).save(dir)?;

    println!("{} Initialized Trellis in {}", "✓".green(), dir.display());
    println!("  Run {} to load credentials", "trellis import <file>".cyan());

    Ok(())
}

/// Import a JSON credential file into the sled store.
pub fn import(dir: &Path, file: &Path) -> Result<()> {
    let config = Config::load(dir)?;
    if config.credentials.kind != SourceKind::Sled {
        return Err(format!(
            "configured credential source is a JSON file ({}); nothing to import into",
            config.credentials.path.display()
        )
        .into());
    }

    let records: Vec<CredentialRecord> = serde_json::from_slice(&fs::read(file)?)?;
    let store = SledCredentialStore::open(config.credentials_path(dir))?;
    let written = store.import(&records)?;

    println!(
        "{} Imported {} credentials ({} in store)",
        "✓".green(),
        written.to_string().cyan(),
        store.len()
    );
    Ok(())
}

async fn build_graph(
    config: &Config,
    dir: &Path,
    focus: Option<(&str, usize)>,
) -> Result<TrustGraph> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message("Building trust graph...");

    let store = config.open_store(dir)?;
    let builder = GraphBuilder::new(store, config.root.clone()).with_registry(config.registry());

    let result = match focus {
        Some((id, depth)) => builder.build_for_aid(id, depth).await,
        None => builder.build().await,
    };
    spinner.finish_and_clear();

    Ok(result?)
}

/// Build the graph and print or export it.
pub async fn graph(
    dir: &Path,
    overrides: Overrides,
    id: Option<&str>,
    depth: usize,
    output: Option<&Path>,
) -> Result<()> {
    let config = load_config(dir, overrides)?;
    let graph = build_graph(&config, dir, id.map(|id| (id, depth))).await?;
    let export = graph.export();

    match output {
        Some(path) => {
            fs::write(path, serde_json::to_string_pretty(&export)?)?;
            println!(
                "{} Exported {} nodes, {} edges to {}",
                "✓".green(),
                graph.node_count(),
                graph.edge_count(),
                path.display()
            );
        }
        None => {
            if graph.edge_count() == 0 {
                println!("{}", "No relationships found".yellow());
            }
            for edge in &export.edges {
                let arrow = if edge.bidirectional { "<->" } else { "-->" };
                println!(
                    "  {} {} {} {}",
                    edge.from.cyan(),
                    arrow,
                    edge.to.cyan(),
                    format!("({}, {})", edge.kind, edge.credential_id).dimmed()
                );
            }
        }
    }

    Ok(())
}

/// Print the top-ranked identities.
pub async fn scores(dir: &Path, overrides: Overrides, top: usize, json: bool) -> Result<()> {
    let config = load_config(dir, overrides)?;
    let graph = build_graph(&config, dir, None).await?;
    let scores = ScoreCalculator::with_weights(config.weights).top_scores(&graph, top);

    if json {
        println!("{}", serde_json::to_string_pretty(&scores)?);
        return Ok(());
    }

    if scores.is_empty() {
        println!("No data yet");
        return Ok(());
    }

    println!("{}", "Trust Ranking".cyan().bold());
    println!();
    for (rank, score) in scores.iter().enumerate() {
        println!(
            "  {:>3}. {:<24} {:>8.2}  {}  {}",
            rank + 1,
            display_name(score),
            score.score,
            score.role.yellow(),
            depth_label(score.graph_depth).dimmed()
        );
    }

    Ok(())
}

/// Print the score breakdown for one identity.
pub async fn score(dir: &Path, overrides: Overrides, id: &str, json: bool) -> Result<()> {
    let config = load_config(dir, overrides)?;
    let graph = build_graph(&config, dir, None).await?;
    let score = ScoreCalculator::with_weights(config.weights).calculate_score(&graph, id);

    if json {
        println!("{}", serde_json::to_string_pretty(&score)?);
        return Ok(());
    }

    if !graph.contains_node(id) {
        println!("{} {} has no credentials in this organization", "•".blue(), id);
        return Ok(());
    }

    println!("{} {}", display_name(&score).cyan().bold(), format!("({})", score.role).dimmed());
    println!();
    println!("  {} {}", "Incoming:".dimmed(), score.incoming_credentials);
    println!("  {} {}", "Outgoing:".dimmed(), score.outgoing_credentials);
    println!("  {} {}", "Issuers:".dimmed(), score.unique_issuers);
    println!("  {} {}", "Mutual:".dimmed(), score.bidirectional_relations);
    println!("  {} {}", "Depth:".dimmed(), depth_label(score.graph_depth));
    if score.org_issued {
        println!("  {} yes", "Org-issued:".dimmed());
    }
    println!();
    println!("  {} {:.2}", "Score:".bold(), score.score);

    Ok(())
}

/// Print aggregate statistics.
pub async fn summary(dir: &Path, overrides: Overrides, json: bool) -> Result<()> {
    let config = load_config(dir, overrides)?;
    let graph = build_graph(&config, dir, None).await?;
    let summary = ScoreCalculator::with_weights(config.weights).calculate_summary(&graph);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", "Trust Summary".cyan().bold());
    println!();
    println!("  {} {}", "Nodes:".dimmed(), summary.total_nodes);
    println!("  {} {}", "Edges:".dimmed(), summary.total_edges);
    println!("  {} {}", "Mutual edges:".dimmed(), summary.bidirectional_relations);
    println!(
        "  {} {:.2} (min {:.2}, max {:.2})",
        "Mean score:".dimmed(),
        summary.mean_score,
        summary.min_score,
        summary.max_score
    );
    println!("  {} {:.1}", "Median depth:".dimmed(), summary.median_depth);

    Ok(())
}

/// Show configuration and store status.
pub async fn status(dir: &Path, overrides: Overrides) -> Result<()> {
    if !dir.join(CONFIG_DIR).exists() && overrides.credentials.is_none() {
        println!("{} Trellis not initialized in this directory", "✗".red());
        println!("  Run {} to initialize", "trellis init --org <id>".cyan());
        return Ok(());
    }

    let config = load_config(dir, overrides)?;
    let store = config.open_store(dir)?;
    let records = store.list_all_credentials().await?;

    println!("{}", "Trellis Status".cyan().bold());
    println!();
    println!("  {} {}", "Root:".dimmed(), config.root);
    println!(
        "  {} {} ({:?})",
        "Credentials:".dimmed(),
        config.credentials_path(dir).display(),
        config.credentials.kind
    );
    println!("  {} {}", "Records:".dimmed(), records.len());
    println!("  {} {}", "Schema aliases:".dimmed(), config.schemas.len());

    Ok(())
}

fn display_name(score: &Score) -> String {
    score.alias.clone().unwrap_or_else(|| score.id.clone())
}

fn depth_label(depth: i32) -> String {
    if depth == UNREACHABLE_DEPTH {
        "unreachable".to_string()
    } else {
        format!("depth {}", depth)
    }
}
