//! Folio Graph Library
//!
//! Loads content collections from disk into a node store, derives typed
//! `Post` and `Person` nodes from Markdown sources, and answers selection
//! queries with lazily resolved fields.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use folio_core::Config;
//! use folio_graph::ContentGraph;
//!
//! let config = Config::load(Path::new("folio.toml")).unwrap();
//! let graph = ContentGraph::new(config);
//! graph.ingest().unwrap();
//!
//! let posts = graph.query("Post", "{ title authors { name } }").unwrap();
//! println!("{posts:#}");
//! ```

pub mod derive;
pub mod error;
pub mod graph;
pub mod lint;
pub mod loader;
pub mod query;
pub mod resolvers;
pub mod schema;
pub mod store;

pub use derive::{Collection, DeriveContext, NodeDeriver};
pub use error::{GraphError, Result};
pub use graph::{ContentGraph, IngestStats};
pub use lint::{Diagnostic, DiagnosticKind};
pub use loader::{FilesystemLoader, LoadedFile};
pub use query::{Query, Selection, parse_selection};
pub use schema::{FieldDef, FieldType, ObjectType, ResolveContext, Resolved, Schema};
pub use store::{NodeModel, NodeStore};
