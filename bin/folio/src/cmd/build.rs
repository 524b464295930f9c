//! Build command - ingest content and report the graph

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use folio_core::Config;
use folio_graph::{ContentGraph, IngestStats};

/// Run the build command.
///
/// Loads every collection, derives typed nodes, and prints statistics.
pub fn run(config_path: &Path) -> Result<()> {
    tracing::info!(?config_path, "Starting build");

    let config = Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;
    tracing::debug!(?config, "Loaded configuration");

    println!("Building content graph for {}", config.site.title);
    let graph = ContentGraph::new(config);
    let stats = graph.ingest().wrap_err("Failed to ingest content")?;

    print_ingest_stats(&stats);
    Ok(())
}

/// Print ingestion statistics in a user-friendly format.
pub(crate) fn print_ingest_stats(stats: &IngestStats) {
    println!();
    println!("  Graph Statistics:");
    println!("  ─────────────────────────────────");
    println!("  Files:        {:>6}", stats.files);
    println!("  Sources:      {:>6}", stats.sources);
    println!("  Posts:        {:>6}", stats.posts);
    println!("  Persons:      {:>6}", stats.persons);
    if stats.skipped > 0 {
        println!("  Skipped:      {:>6}", stats.skipped);
    }
    println!("  ─────────────────────────────────");
    println!("  Duration:     {:>6}ms", stats.duration_ms);
    println!();
}
