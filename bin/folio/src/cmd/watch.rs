//! Watch command - re-derive nodes as content changes

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    time::Duration,
};

use color_eyre::eyre::{Result, WrapErr};
use folio_core::Config;
use folio_graph::ContentGraph;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher, event::ModifyKind};
use tokio::sync::mpsc;

use super::build::print_ingest_stats;

/// Debounce interval for file changes.
const DEBOUNCE_MS: u64 = 200;

/// Outcome of applying one batch of file changes.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ChangeSummary {
    /// Files re-read into the graph.
    pub updated: usize,
    /// Nodes removed, including derived ones.
    pub removed: usize,
    /// Typed nodes re-derived from updated files.
    pub derived: usize,
    pub failed: usize,
}

/// Run the watch command.
///
/// Ingests all collections, then applies file changes incrementally until
/// interrupted.
pub async fn run(config_path: &Path) -> Result<()> {
    tracing::info!(?config_path, "Starting watch mode");

    let config = Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;
    let roots: Vec<PathBuf> = config
        .sources
        .iter()
        .map(|source| config.source_dir(source))
        .collect();

    tracing::info!("Running initial ingestion...");
    let graph = ContentGraph::new(config);
    let stats = graph.ingest().wrap_err("Failed to ingest content")?;
    print_ingest_stats(&stats);

    let (tx, mut rx) = mpsc::channel::<Vec<PathBuf>>(64);

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| {
            if let Ok(event) = res
                && is_content_change(&event.kind)
            {
                let _ = tx.blocking_send(event.paths);
            }
        },
        notify::Config::default(),
    )
    .wrap_err("Failed to create file watcher")?;

    let mut watched = 0;
    for root in &roots {
        if root.is_dir() {
            watcher
                .watch(root, RecursiveMode::Recursive)
                .wrap_err_with(|| format!("Failed to watch {}", root.display()))?;
            tracing::debug!(root = %root.display(), "Watching collection");
            watched += 1;
        } else {
            tracing::warn!(root = %root.display(), "Collection directory missing, not watched");
        }
    }

    println!("  Watching {watched} collection(s)");
    println!("  Press Ctrl+C to stop");
    println!();

    loop {
        tokio::select! {
            Some(paths) = rx.recv() => {
                let mut pending: BTreeSet<PathBuf> = paths.into_iter().collect();

                // Debounce
                let deadline = tokio::time::sleep(Duration::from_millis(DEBOUNCE_MS));
                tokio::pin!(deadline);
                loop {
                    tokio::select! {
                        Some(more) = rx.recv() => pending.extend(more),
                        () = &mut deadline => break,
                    }
                }

                let summary = apply_changes(&graph, pending);
                println!(
                    "  ✓ Updated {} file(s), re-derived {} node(s), removed {} node(s)",
                    summary.updated, summary.derived, summary.removed
                );
                if summary.failed > 0 {
                    eprintln!("  ✗ {} file(s) failed to load", summary.failed);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                println!("  Stopping watch");
                break;
            }
        }
    }

    drop(watcher);
    Ok(())
}

fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Name(_) | ModifyKind::Any)
            | EventKind::Create(_)
            | EventKind::Remove(_)
    )
}

/// Apply a batch of changed paths to the graph.
///
/// Existing files are re-read and re-derived; a directory path re-reads
/// every visible file below it. Vanished paths remove the nodes of every
/// file at or below them, with everything derived from them. Hidden paths
/// are ignored.
pub fn apply_changes(graph: &ContentGraph, paths: impl IntoIterator<Item = PathBuf>) -> ChangeSummary {
    let mut summary = ChangeSummary::default();

    for path in paths {
        if is_hidden(graph, &path) {
            continue;
        }

        if path.is_dir() {
            match graph.loader().files_under(&path) {
                Ok(files) => {
                    for file in files {
                        upsert(graph, &file, &mut summary);
                    }
                }
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "Failed to walk directory");
                    summary.failed += 1;
                }
            }
        } else if path.exists() {
            upsert(graph, &path, &mut summary);
        } else {
            let removed = graph.remove_path(&path);
            if !removed.is_empty() {
                tracing::info!(path = %path.display(), removed = removed.len(), "Removed path");
            }
            summary.removed += removed.len();
        }
    }

    summary
}

fn upsert(graph: &ContentGraph, path: &Path, summary: &mut ChangeSummary) {
    match graph.upsert_path(path) {
        Ok(Some(derived)) => {
            for id in &derived {
                tracing::info!(path = %path.display(), %id, "Re-derived node");
            }
            summary.updated += 1;
            summary.derived += derived.len();
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to reload file");
            summary.failed += 1;
        }
    }
}

fn is_hidden(graph: &ContentGraph, path: &Path) -> bool {
    graph.loader().locate(path).is_some_and(|(_, relative)| {
        relative
            .components()
            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use folio_core::NodeType;
    use folio_graph::NodeModel;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn graph() -> (TempDir, ContentGraph) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(
            root.join("folio.toml"),
            "[site]\ntitle = \"T\"\n\n[[sources]]\nname = \"posts\"\npath = \"posts\"\n",
        )
        .unwrap();
        fs::create_dir_all(root.join("posts")).unwrap();
        fs::write(root.join("posts/a.md"), "---\ntitle: A\n---\n").unwrap();

        let config = Config::load(&root.join("folio.toml")).unwrap();
        let graph = ContentGraph::new(config);
        graph.ingest().unwrap();
        (dir, graph)
    }

    #[test]
    fn test_apply_update_and_remove() {
        let (dir, graph) = graph();
        let a = dir.path().join("posts/a.md");
        let b = dir.path().join("posts/b.md");

        fs::write(&a, "---\ntitle: A2\n---\n").unwrap();
        fs::write(&b, "---\ntitle: B\n---\n").unwrap();
        let summary = apply_changes(&graph, [a.clone(), b]);
        assert_eq!(summary.updated, 2);
        assert_eq!(summary.derived, 2);
        assert_eq!(
            graph.query("Post", "{ title }").unwrap(),
            json!([{ "title": "A2" }, { "title": "B" }])
        );

        fs::remove_file(&a).unwrap();
        let summary = apply_changes(&graph, [a]);
        assert_eq!(summary.removed, 3);
        assert_eq!(
            graph.query("Post", "{ title }").unwrap(),
            json!([{ "title": "B" }])
        );
    }

    #[test]
    fn test_ignores_hidden_and_outside_paths() {
        let (dir, graph) = graph();
        let swap = dir.path().join("posts/.a.md.swp");
        fs::write(&swap, "junk").unwrap();

        let summary = apply_changes(&graph, [swap, dir.path().join("folio.toml")]);
        assert_eq!(summary, ChangeSummary::default());
    }

    #[test]
    fn test_directory_rename() {
        let (dir, graph) = graph();
        let old = dir.path().join("posts/2024");
        let new = dir.path().join("posts/2025");
        fs::create_dir_all(&old).unwrap();
        fs::write(old.join("b.md"), "---\ntitle: B\n---\n").unwrap();
        fs::create_dir_all(old.join(".cache")).unwrap();
        fs::write(old.join(".cache/c.md"), "---\ntitle: C\n---\n").unwrap();
        apply_changes(&graph, [old.clone()]);
        assert_eq!(
            graph.query("Post", "{ title }").unwrap(),
            json!([{ "title": "A" }, { "title": "B" }])
        );

        fs::rename(&old, &new).unwrap();
        let summary = apply_changes(&graph, [old, new.clone()]);
        assert_eq!(
            summary,
            ChangeSummary {
                updated: 1,
                removed: 3,
                derived: 1,
                failed: 0,
            }
        );

        let files: Vec<_> = graph
            .store()
            .get_all_nodes(NodeType::File)
            .iter()
            .filter_map(|n| n.as_file().map(|f| f.relative_path.clone()))
            .collect();
        assert_eq!(files, vec!["a.md", "2025/b.md"]);
        assert_eq!(
            graph.query("Post", "{ title }").unwrap(),
            json!([{ "title": "A" }, { "title": "B" }])
        );

        fs::remove_dir_all(&new).unwrap();
        assert_eq!(apply_changes(&graph, [new]).removed, 3);
        assert_eq!(graph.query("Post", "{ title }").unwrap(), json!([{ "title": "A" }]));
    }

    #[test]
    fn test_content_change_kinds() {
        use notify::event::{CreateKind, DataChange, RemoveKind};

        assert!(is_content_change(&EventKind::Create(CreateKind::File)));
        assert!(is_content_change(&EventKind::Remove(RemoveKind::File)));
        assert!(is_content_change(&EventKind::Modify(ModifyKind::Data(
            DataChange::Content
        ))));
        assert!(!is_content_change(&EventKind::Access(
            notify::event::AccessKind::Read
        )));
    }
}
