//! Folio Core Library
//!
//! Node types, configuration, front matter, and error handling shared by the
//! Folio content graph.

pub mod config;
pub mod error;
pub mod frontmatter;
pub mod node;

pub use config::{Config, SourceConfig};
pub use error::{CoreError, Result};
pub use frontmatter::{FieldValue, Frontmatter};
pub use node::{
    ContentDigest, FileNode, MarkdownNode, Node, NodeContent, NodeId, NodeIdMinter, NodeType,
    PersonNode, PostNode,
};
