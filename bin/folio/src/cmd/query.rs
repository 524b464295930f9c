//! Query command - run a selection query and print JSON

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr, bail};
use folio_core::NodeId;

use super::load_graph;

/// Run the query command.
///
/// With `id`, resolves one node and fails if it does not exist; otherwise
/// prints an array of every node of the type.
pub fn run(config_path: &Path, type_name: &str, selection: &str, id: Option<&str>) -> Result<()> {
    tracing::info!(?config_path, type_name, selection, ?id, "Running query");

    let graph = load_graph(config_path)?;

    let value = match id {
        Some(id) => {
            let Some(value) = graph
                .query_one(type_name, selection, &NodeId::new(id))
                .wrap_err("Query failed")?
            else {
                bail!("No {type_name} node with id {id}");
            };
            value
        }
        None => graph.query(type_name, selection).wrap_err("Query failed")?,
    };

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
