//! Computed field resolvers.

use folio_core::{Node, NodeType};
use serde_json::Value;

use crate::{
    error::{GraphError, Result},
    schema::{ResolveContext, Resolved},
};

/// `Post.authors`: every Person whose email appears in the post's stored
/// author list.
///
/// Matching is exact string equality. Persons are returned in store order;
/// a post without authors, or whose authors match nobody, yields an empty
/// list.
pub fn resolve_authors(source: &Node, ctx: &ResolveContext<'_>) -> Result<Resolved> {
    let Some(authors) = source.as_post().and_then(|post| post.authors.as_ref()) else {
        return Ok(Resolved::Nodes(Vec::new()));
    };

    let persons = ctx
        .nodes
        .get_all_nodes(NodeType::Person)
        .into_iter()
        .filter(|node| {
            node.as_person()
                .and_then(|person| person.email.as_ref())
                .is_some_and(|email| authors.contains(email))
        })
        .collect();

    Ok(Resolved::Nodes(persons))
}

/// `Post.body` / `Person.bio`: compile the parent source node's markup.
///
/// Compilation errors propagate to the caller.
pub fn resolve_markup_body(source: &Node, ctx: &ResolveContext<'_>) -> Result<Resolved> {
    let parent = source
        .parent
        .as_ref()
        .and_then(|id| ctx.nodes.get_node(id))
        .ok_or_else(|| GraphError::MissingParent {
            id: source.id.clone(),
        })?;

    let html = ctx.compiler.compile(&parent)?;
    Ok(Resolved::Value(Value::String(html)))
}

#[cfg(test)]
mod tests {
    use folio_core::{
        ContentDigest, Frontmatter, MarkdownNode, NodeContent, NodeId, PersonNode, PostNode,
    };
    use folio_parser::{MarkdownParser, MarkupCompiler, ParserError};

    use super::*;
    use crate::store::NodeStore;

    struct FailingCompiler;

    impl MarkupCompiler for FailingCompiler {
        fn compile(&self, node: &Node) -> folio_parser::Result<String> {
            Err(ParserError::NotMarkup {
                id: node.id.clone(),
                node_type: node.node_type(),
            })
        }
    }

    fn person(id: &str, name: &str, email: Option<&str>) -> Node {
        Node::new(
            NodeId::new(id),
            None,
            ContentDigest::of(id),
            "test",
            NodeContent::Person(PersonNode {
                name: Some(name.to_string()),
                email: email.map(str::to_string),
                bio: String::new(),
            }),
        )
    }

    fn post(authors: Option<&[&str]>, parent: Option<&str>) -> Node {
        Node::new(
            NodeId::new("post"),
            parent.map(NodeId::new),
            ContentDigest::of("post"),
            "test",
            NodeContent::Post(PostNode {
                title: Some("Post".to_string()),
                authors: authors.map(|a| a.iter().map(|s| s.to_string()).collect()),
                body: "raw".to_string(),
            }),
        )
    }

    fn names(resolved: Resolved) -> Vec<String> {
        match resolved {
            Resolved::Nodes(nodes) => nodes
                .iter()
                .map(|n| n.as_person().unwrap().name.clone().unwrap())
                .collect(),
            other => panic!("expected node list, got {other:?}"),
        }
    }

    #[test]
    fn test_authors_match_by_email() {
        let store = NodeStore::new();
        store.create_node(person("a", "A", Some("a@x.com")));
        store.create_node(person("c", "C", Some("c@x.com")));
        let parser = MarkdownParser::new();
        let ctx = ResolveContext::new(&store, &parser);

        let resolved = resolve_authors(&post(Some(&["a@x.com", "b@x.com"]), None), &ctx).unwrap();
        assert_eq!(names(resolved), vec!["A"]);
    }

    #[test]
    fn test_authors_follow_store_order() {
        let store = NodeStore::new();
        store.create_node(person("c", "C", Some("c@x.com")));
        store.create_node(person("a", "A", Some("a@x.com")));
        store.create_node(person("n", "N", None));
        let parser = MarkdownParser::new();
        let ctx = ResolveContext::new(&store, &parser);

        let resolved = resolve_authors(&post(Some(&["a@x.com", "c@x.com"]), None), &ctx).unwrap();
        assert_eq!(names(resolved), vec!["C", "A"]);
    }

    #[test]
    fn test_authors_empty_cases() {
        let store = NodeStore::new();
        store.create_node(person("a", "A", Some("a@x.com")));
        let parser = MarkdownParser::new();
        let ctx = ResolveContext::new(&store, &parser);

        let unmatched = resolve_authors(&post(Some(&["z@x.com"]), None), &ctx).unwrap();
        assert!(names(unmatched).is_empty());

        let missing = resolve_authors(&post(None, None), &ctx).unwrap();
        assert!(names(missing).is_empty());
    }

    #[test]
    fn test_authors_no_normalization() {
        let store = NodeStore::new();
        store.create_node(person("a", "A", Some("a@x.com")));
        let parser = MarkdownParser::new();
        let ctx = ResolveContext::new(&store, &parser);

        let resolved = resolve_authors(&post(Some(&["A@X.com", " a@x.com"]), None), &ctx).unwrap();
        assert!(names(resolved).is_empty());
    }

    #[test]
    fn test_body_compiles_parent() {
        let store = NodeStore::new();
        store.create_node(Node::new(
            NodeId::new("src"),
            None,
            ContentDigest::of("*hi*"),
            "test",
            NodeContent::Markdown(MarkdownNode {
                frontmatter: Frontmatter::default(),
                raw_body: "*hi*".to_string(),
            }),
        ));
        let parser = MarkdownParser::new();
        let ctx = ResolveContext::new(&store, &parser);

        let resolved = resolve_markup_body(&post(None, Some("src")), &ctx).unwrap();
        match resolved {
            Resolved::Value(Value::String(html)) => assert_eq!(html, "<p><em>hi</em></p>\n"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_body_missing_parent() {
        let store = NodeStore::new();
        let parser = MarkdownParser::new();
        let ctx = ResolveContext::new(&store, &parser);

        let err = resolve_markup_body(&post(None, Some("gone")), &ctx).unwrap_err();
        assert!(matches!(err, GraphError::MissingParent { .. }));

        let err = resolve_markup_body(&post(None, None), &ctx).unwrap_err();
        assert!(matches!(err, GraphError::MissingParent { .. }));
    }

    #[test]
    fn test_body_compile_error_propagates() {
        let store = NodeStore::new();
        store.create_node(person("src", "S", None));
        let compiler = FailingCompiler;
        let ctx = ResolveContext::new(&store, &compiler);

        let err = resolve_markup_body(&post(None, Some("src")), &ctx).unwrap_err();
        assert!(matches!(err, GraphError::Compile(_)));
    }
}
