//! The content graph facade.
//!
//! [`ContentGraph`] ties the loader, node store, deriver, schema and markup
//! compiler together: ingestion fills the store, queries read from it.

use std::{path::Path, sync::Arc, time::Instant};

use folio_core::{Config, Node, NodeId, NodeIdMinter, NodeType};
use folio_parser::{CachedCompiler, MarkdownParser, MarkupCompiler};
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    derive::{DeriveContext, NodeDeriver},
    error::Result,
    lint::{Diagnostic, lint},
    loader::{FilesystemLoader, LoadedFile, absolute},
    query::Query,
    schema::{ResolveContext, Schema},
    store::{NodeModel, NodeStore},
};

/// Statistics from an ingestion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// `File` nodes created.
    pub files: usize,
    /// `Markdown` source nodes created.
    pub sources: usize,
    pub posts: usize,
    pub persons: usize,
    /// Files that could not be read.
    pub skipped: usize,
    pub duration_ms: u64,
}

/// Typed content graph over the configured collections.
#[derive(Debug)]
pub struct ContentGraph<C = CachedCompiler<MarkdownParser>> {
    loader: FilesystemLoader,
    store: NodeStore,
    schema: Schema,
    minter: NodeIdMinter,
    deriver: NodeDeriver,
    compiler: C,
}

impl ContentGraph {
    /// Graph with the default cached Markdown compiler.
    pub fn new(config: Config) -> Self {
        let parser = MarkdownParser::with_theme(&config.markdown.syntax_theme);
        Self::with_compiler(config, CachedCompiler::new(parser))
    }
}

impl<C: MarkupCompiler> ContentGraph<C> {
    /// Graph with a custom markup compiler.
    pub fn with_compiler(config: Config, compiler: C) -> Self {
        let minter = NodeIdMinter::default();
        Self {
            loader: FilesystemLoader::new(config, minter),
            store: NodeStore::new(),
            schema: Schema::content(),
            minter,
            deriver: NodeDeriver,
            compiler,
        }
    }

    pub fn config(&self) -> &Config {
        self.loader.config()
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Mutable schema, for registering extra object types.
    pub fn schema_mut(&mut self) -> &mut Schema {
        &mut self.schema
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    pub fn loader(&self) -> &FilesystemLoader {
        &self.loader
    }

    /// Resolver context over this graph's store and compiler.
    pub fn context(&self) -> ResolveContext<'_> {
        ResolveContext::new(&self.store, &self.compiler)
    }

    /// Rebuild the graph from disk.
    ///
    /// The store is cleared, every collection is read, and nodes are
    /// registered in walk order with derivation after each one.
    pub fn ingest(&self) -> Result<IngestStats> {
        let start = Instant::now();
        info!(sources = self.config().sources.len(), "ingesting content");

        let (files, skipped) = self.loader.load_all()?;
        self.store.clear();
        self.compiler.evict_all();
        for file in files {
            self.register(file);
        }

        let stats = IngestStats {
            files: self.store.count(NodeType::File),
            sources: self.store.count(NodeType::Markdown),
            posts: self.store.count(NodeType::Post),
            persons: self.store.count(NodeType::Person),
            skipped,
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        info!(
            files = stats.files,
            posts = stats.posts,
            persons = stats.persons,
            skipped = stats.skipped,
            duration_ms = stats.duration_ms,
            "ingestion complete"
        );
        Ok(stats)
    }

    /// Re-read one file and re-derive its nodes.
    ///
    /// Returns the ids of derived nodes, or `None` if the path is outside
    /// every collection.
    pub fn upsert_path(&self, path: &Path) -> Result<Option<Vec<NodeId>>> {
        let Some(file) = self.loader.load_file(path)? else {
            debug!(path = %path.display(), "path outside collections");
            return Ok(None);
        };
        Ok(Some(self.register(file)))
    }

    /// Remove the nodes of a file, or of every file below a directory, and
    /// everything derived from them.
    pub fn remove_path(&self, path: &Path) -> Vec<NodeId> {
        if self.loader.locate(path).is_none() {
            return Vec::new();
        }

        let prefix = absolute(path);
        let files: Vec<NodeId> = self
            .store
            .get_all_nodes(NodeType::File)
            .iter()
            .filter(|node| {
                node.as_file()
                    .is_some_and(|file| file.absolute_path.starts_with(&prefix))
            })
            .map(|node| node.id.clone())
            .collect();

        let removed: Vec<NodeId> = files
            .iter()
            .flat_map(|id| self.store.delete_node(id))
            .collect();
        self.compiler.evict(&removed);
        removed
    }

    /// Run a selection query over every node of `type_name`.
    pub fn query(&self, type_name: &str, selection: &str) -> Result<Value> {
        Query::parse(&self.schema, type_name, selection)?.execute(&self.schema, &self.context())
    }

    /// Run a selection query against one node.
    pub fn query_one(&self, type_name: &str, selection: &str, id: &NodeId) -> Result<Option<Value>> {
        Query::parse(&self.schema, type_name, selection)?.execute_one(
            &self.schema,
            &self.context(),
            id,
        )
    }

    /// Content warnings over the current store.
    pub fn lint(&self) -> Vec<Diagnostic> {
        lint(&self.store)
    }

    /// The `File` node a node was ultimately loaded from.
    pub fn source_file(&self, node: &Node) -> Option<Arc<Node>> {
        source_file(&self.store, node)
    }

    fn register(&self, file: LoadedFile) -> Vec<NodeId> {
        let ctx = DeriveContext::new(&self.store, &self.minter);
        let (file_node, markdown) = self.loader.nodes(file);

        let mut derived = Vec::new();
        let file_node = self.store.create_node(file_node);
        derived.extend(self.deriver.on_create_node(&file_node, &ctx));

        if let Some(markdown) = markdown {
            let markdown = self.store.create_node(markdown);
            derived.extend(self.deriver.on_create_node(&markdown, &ctx));
        }
        derived
    }
}

/// Walk parent links up to the root `File` node.
pub(crate) fn source_file(nodes: &dyn NodeModel, node: &Node) -> Option<Arc<Node>> {
    let mut current = nodes.get_node(&node.id)?;
    while current.node_type() != NodeType::File {
        current = nodes.get_node(current.parent.as_ref()?)?;
    }
    Some(current)
}
