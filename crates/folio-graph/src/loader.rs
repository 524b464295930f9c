//! Filesystem loader.
//!
//! Each configured `[[sources]]` entry is a collection rooted at a
//! directory. Every file under the root becomes a `File` node tagged with the
//! collection name; files with a Markdown extension also get a `Markdown`
//! source node holding their front matter and body.

use std::{
    path::{Path, PathBuf},
    time::UNIX_EPOCH,
};

use folio_core::{
    Config, ContentDigest, FileNode, Frontmatter, MarkdownNode, Node, NodeContent, NodeId,
    NodeIdMinter, SourceConfig,
    frontmatter::{parse_frontmatter, split_frontmatter},
};
use rayon::prelude::*;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{GraphError, Result};

/// Owner recorded on loaded nodes.
pub const LOADER_OWNER: &str = "folio-graph::loader";

/// A file read from a collection, not yet registered.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    /// Collection name.
    pub source: String,
    pub absolute_path: PathBuf,
    /// Path relative to the collection root, `/`-separated.
    pub relative_path: String,
    pub extension: String,
    pub digest: ContentDigest,
    pub markdown: Option<LoadedMarkdown>,
}

/// Markdown portion of a loaded file.
#[derive(Debug, Clone)]
pub struct LoadedMarkdown {
    pub frontmatter: Frontmatter,
    pub raw_body: String,
    pub digest: ContentDigest,
}

/// Walks collection directories and turns files into nodes.
#[derive(Debug, Clone)]
pub struct FilesystemLoader {
    config: Config,
    minter: NodeIdMinter,
}

impl FilesystemLoader {
    pub fn new(config: Config, minter: NodeIdMinter) -> Self {
        Self { config, minter }
    }

    /// Loader configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Find every file in every collection, in walk order.
    ///
    /// Missing collection directories are logged and skipped.
    pub fn discover(&self) -> Result<Vec<(&SourceConfig, PathBuf)>> {
        let mut found = Vec::new();

        for source in &self.config.sources {
            let dir = self.config.source_dir(source);
            if !dir.is_dir() {
                warn!(source = %source.name, dir = %dir.display(), "collection directory not found");
                continue;
            }

            let files = self.files_under(&dir)?;
            debug!(source = %source.name, files = files.len(), "walked collection");
            found.extend(files.into_iter().map(|path| (source, path)));
        }

        Ok(found)
    }

    /// Every file below `dir`, sorted by name, skipping hidden entries.
    pub fn files_under(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        for entry in WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        {
            let entry = entry?;
            if entry.file_type().is_file() {
                found.push(entry.into_path());
            }
        }
        Ok(found)
    }

    /// Read every file in every collection.
    ///
    /// Files are read in parallel; output keeps walk order. Unreadable files
    /// are logged and counted in the second tuple element.
    pub fn load_all(&self) -> Result<(Vec<LoadedFile>, usize)> {
        let discovered = self.discover()?;
        info!(files = discovered.len(), "loading content");

        let results: Vec<_> = discovered
            .par_iter()
            .map(|(source, path)| self.read(source, path))
            .collect();

        let mut files = Vec::with_capacity(results.len());
        let mut skipped = 0;
        for result in results {
            match result {
                Ok(file) => files.push(file),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable file");
                    skipped += 1;
                }
            }
        }

        Ok((files, skipped))
    }

    /// Read one file. `None` if the path is outside every collection.
    pub fn load_file(&self, path: &Path) -> Result<Option<LoadedFile>> {
        match self.locate(path) {
            Some((source, _)) => self.read(source, path).map(Some),
            None => Ok(None),
        }
    }

    /// The collection containing `path`, with the path relative to its root.
    pub fn locate(&self, path: &Path) -> Option<(&SourceConfig, PathBuf)> {
        let path = absolute(path);
        self.config.sources.iter().find_map(|source| {
            let root = absolute(&self.config.source_dir(source));
            path.strip_prefix(&root)
                .ok()
                .map(|relative| (source, relative.to_path_buf()))
        })
    }

    /// Id of the `File` node for a path.
    pub fn file_id(&self, path: &Path) -> NodeId {
        self.minter.mint(&absolute(path).to_string_lossy())
    }

    /// Id of the `Markdown` node for a file.
    pub fn markdown_id(&self, file_id: &NodeId) -> NodeId {
        self.minter.mint(&format!("{file_id} >>> Markdown"))
    }

    /// Build the nodes for a loaded file: the `File` node and, for Markdown
    /// files, its `Markdown` child.
    pub fn nodes(&self, file: LoadedFile) -> (Node, Option<Node>) {
        let file_id = self.file_id(&file.absolute_path);

        let markdown = file.markdown.map(|md| {
            Node::new(
                self.markdown_id(&file_id),
                Some(file_id.clone()),
                md.digest,
                LOADER_OWNER,
                NodeContent::Markdown(MarkdownNode {
                    frontmatter: md.frontmatter,
                    raw_body: md.raw_body,
                }),
            )
        });

        let file_node = Node::new(
            file_id,
            None,
            file.digest,
            LOADER_OWNER,
            NodeContent::File(FileNode {
                source_instance_name: file.source,
                relative_path: file.relative_path,
                absolute_path: file.absolute_path,
                extension: file.extension,
            }),
        );

        (file_node, markdown)
    }

    fn read(&self, source: &SourceConfig, path: &Path) -> Result<LoadedFile> {
        let absolute_path = absolute(path);
        let metadata = std::fs::metadata(&absolute_path).map_err(|e| GraphError::io(path, e))?;

        let root = absolute(&self.config.source_dir(source));
        let relative_path = absolute_path
            .strip_prefix(&root)
            .unwrap_or(&absolute_path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let extension = absolute_path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let modified = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |d| d.as_nanos());
        let digest = ContentDigest::of(format!("{}:{modified}", metadata.len()));

        let markdown = if self.config.markdown.is_markdown(&extension) {
            let text =
                std::fs::read_to_string(&absolute_path).map_err(|e| GraphError::io(path, e))?;
            Some(read_markdown(&text, &absolute_path))
        } else {
            None
        };

        debug!(source = %source.name, path = %relative_path, "read file");

        Ok(LoadedFile {
            source: source.name.clone(),
            absolute_path,
            relative_path,
            extension,
            digest,
            markdown,
        })
    }
}

/// Split a Markdown file. Malformed front matter is logged and replaced with
/// an empty mapping.
fn read_markdown(text: &str, path: &Path) -> LoadedMarkdown {
    let (frontmatter, raw_body) = match parse_frontmatter(text, path) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "malformed front matter, ignoring");
            let body = split_frontmatter(text).map_or(text, |(_, _, body)| body);
            (Frontmatter::default(), body.to_string())
        }
    };

    LoadedMarkdown {
        frontmatter,
        raw_body,
        digest: ContentDigest::of(text),
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

pub(crate) fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
