//! Folio Parser Library
//!
//! Markdown body compilation. The graph consumes compilation through the
//! [`MarkupCompiler`] trait so that resolvers never depend on a concrete
//! renderer.

pub mod cache;
pub mod markdown;
pub mod syntax;

use folio_core::{Node, NodeId, NodeType};
pub use cache::CachedCompiler;
pub use markdown::MarkdownParser;
pub use syntax::SyntaxHighlighter;
use thiserror::Error;

/// Parser errors.
#[derive(Debug, Error)]
pub enum ParserError {
    /// The node handed to the compiler carries no markup.
    #[error("node {id} is a {node_type}, not a markup source")]
    NotMarkup { id: NodeId, node_type: NodeType },
}

/// Result type for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Compiles the body of a markup source node to its rendered form.
pub trait MarkupCompiler: Send + Sync {
    /// Compile the body of `node`.
    fn compile(&self, node: &Node) -> Result<String>;

    /// Drop anything held for these nodes. Called when they leave the graph.
    fn evict(&self, _ids: &[NodeId]) {}

    /// Drop everything held. Called before a full re-ingest.
    fn evict_all(&self) {}
}

impl MarkupCompiler for MarkdownParser {
    fn compile(&self, node: &Node) -> Result<String> {
        let markdown = node.as_markdown().ok_or_else(|| ParserError::NotMarkup {
            id: node.id.clone(),
            node_type: node.node_type(),
        })?;
        Ok(self.render(&markdown.raw_body))
    }
}

#[cfg(test)]
mod tests {
    use folio_core::{ContentDigest, FileNode, Frontmatter, MarkdownNode, NodeContent};

    use super::*;

    fn markdown_node(body: &str) -> Node {
        Node::new(
            NodeId::new("md-1"),
            Some(NodeId::new("file-1")),
            ContentDigest::of(body),
            "test",
            NodeContent::Markdown(MarkdownNode {
                frontmatter: Frontmatter::default(),
                raw_body: body.to_string(),
            }),
        )
    }

    #[test]
    fn test_compile_markdown_node() {
        let parser = MarkdownParser::new();
        let html = parser.compile(&markdown_node("Hello **there**")).unwrap();

        assert_eq!(html, "<p>Hello <strong>there</strong></p>\n");
    }

    #[test]
    fn test_compile_rejects_non_markup() {
        let parser = MarkdownParser::new();
        let file = Node::new(
            NodeId::new("file-1"),
            None,
            ContentDigest::of("x"),
            "test",
            NodeContent::File(FileNode {
                source_instance_name: "posts".to_string(),
                relative_path: "a.png".to_string(),
                absolute_path: "/tmp/a.png".into(),
                extension: "png".to_string(),
            }),
        );

        let err = parser.compile(&file).unwrap_err();
        assert!(matches!(err, ParserError::NotMarkup { .. }));
        assert!(err.to_string().contains("File"));
    }

    #[test]
    fn test_compiler_trait_object() {
        let compiler: Box<dyn MarkupCompiler> = Box::new(MarkdownParser::new());
        let html = compiler.compile(&markdown_node("# Title")).unwrap();
        assert!(html.contains("<h1 id=\"title\">Title</h1>"));
    }
}
