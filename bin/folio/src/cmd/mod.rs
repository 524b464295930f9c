//! Command implementations.

pub mod build;
pub mod check;
pub mod new;
pub mod query;
pub mod watch;

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use folio_core::Config;
use folio_graph::ContentGraph;

/// Load configuration (with `FOLIO__*` overrides) and ingest all content.
pub(crate) fn load_graph(config_path: &Path) -> Result<ContentGraph> {
    let config = Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;
    tracing::debug!(?config, "Loaded configuration");

    let graph = ContentGraph::new(config);
    graph.ingest().wrap_err("Failed to ingest content")?;
    Ok(graph)
}
