//! Node storage.
//!
//! The store owns every node in the graph and tracks parent/child links so
//! that removing a file removes everything derived from it.
//!
//! # Thread Safety
//!
//! Uses `RwLock` to allow:
//! - Multiple concurrent reads (field resolution during queries)
//! - Exclusive writes (node creation and deletion during ingestion)

use std::{collections::HashMap, sync::Arc};

use folio_core::{Node, NodeId, NodeType};
use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use tracing::debug;

/// Read access to the node collection.
///
/// This is what resolvers see; they never write.
pub trait NodeModel: Send + Sync {
    /// Look up a node by id.
    fn get_node(&self, id: &NodeId) -> Option<Arc<Node>>;

    /// All nodes of a type, in store order.
    fn get_all_nodes(&self, node_type: NodeType) -> Vec<Arc<Node>>;
}

#[derive(Debug, Default)]
struct StoreInner {
    nodes: IndexMap<NodeId, Arc<Node>>,
    children: HashMap<NodeId, IndexSet<NodeId>>,
}

/// Thread-safe node storage.
///
/// Store order is insertion order. Replacing a node keeps its slot.
#[derive(Debug, Default)]
pub struct NodeStore {
    inner: RwLock<StoreInner>,
}

impl NodeStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, replacing any node with the same id.
    pub fn create_node(&self, node: Node) -> Arc<Node> {
        let node = Arc::new(node);
        let mut inner = self.inner.write();

        let previous = inner.nodes.insert(node.id.clone(), Arc::clone(&node));
        if let Some(old_parent) = previous.as_ref().and_then(|p| p.parent.clone())
            && node.parent.as_ref() != Some(&old_parent)
            && let Some(siblings) = inner.children.get_mut(&old_parent)
        {
            siblings.shift_remove(&node.id);
        }
        if let Some(parent) = &node.parent {
            inner
                .children
                .entry(parent.clone())
                .or_default()
                .insert(node.id.clone());
        }

        debug!(
            id = %node.id,
            node_type = %node.node_type(),
            replaced = previous.is_some(),
            "node created"
        );
        node
    }

    /// Remove a node and, transitively, all of its children.
    ///
    /// Returns the removed ids, the requested node first. Unknown ids remove
    /// nothing.
    pub fn delete_node(&self, id: &NodeId) -> Vec<NodeId> {
        let mut inner = self.inner.write();
        let Some(root) = inner.nodes.shift_remove(id) else {
            return Vec::new();
        };

        if let Some(parent) = &root.parent
            && let Some(siblings) = inner.children.get_mut(parent)
        {
            siblings.shift_remove(id);
        }

        let mut removed = vec![id.clone()];
        let mut pending: Vec<NodeId> = inner
            .children
            .remove(id)
            .map(|c| c.into_iter().collect())
            .unwrap_or_default();

        while let Some(child) = pending.pop() {
            if inner.nodes.shift_remove(&child).is_some() {
                if let Some(grandchildren) = inner.children.remove(&child) {
                    pending.extend(grandchildren);
                }
                removed.push(child);
            }
        }

        debug!(id = %id, removed = removed.len(), "node deleted");
        removed
    }

    /// Ids of a node's direct children.
    pub fn children(&self, id: &NodeId) -> Vec<NodeId> {
        self.inner
            .read()
            .children
            .get(id)
            .map(|c| c.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of nodes of a type.
    pub fn count(&self, node_type: NodeType) -> usize {
        self.inner
            .read()
            .nodes
            .values()
            .filter(|n| n.node_type() == node_type)
            .count()
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.inner.read().nodes.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().nodes.is_empty()
    }

    /// Remove every node.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.nodes.clear();
        inner.children.clear();
    }
}

impl NodeModel for NodeStore {
    fn get_node(&self, id: &NodeId) -> Option<Arc<Node>> {
        self.inner.read().nodes.get(id).cloned()
    }

    fn get_all_nodes(&self, node_type: NodeType) -> Vec<Arc<Node>> {
        self.inner
            .read()
            .nodes
            .values()
            .filter(|n| n.node_type() == node_type)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use folio_core::{ContentDigest, Frontmatter, MarkdownNode, NodeContent, PersonNode};

    use super::*;

    fn markdown(id: &str, parent: Option<&str>) -> Node {
        Node::new(
            NodeId::new(id),
            parent.map(NodeId::new),
            ContentDigest::of(id),
            "test",
            NodeContent::Markdown(MarkdownNode {
                frontmatter: Frontmatter::default(),
                raw_body: String::new(),
            }),
        )
    }

    fn person(id: &str, parent: &str, email: &str) -> Node {
        Node::new(
            NodeId::new(id),
            Some(NodeId::new(parent)),
            ContentDigest::of(email),
            "test",
            NodeContent::Person(PersonNode {
                name: None,
                email: Some(email.to_string()),
                bio: String::new(),
            }),
        )
    }

    #[test]
    fn test_create_and_get() {
        let store = NodeStore::new();
        store.create_node(markdown("a", None));

        assert_eq!(store.len(), 1);
        assert!(store.get_node(&NodeId::new("a")).is_some());
        assert!(store.get_node(&NodeId::new("b")).is_none());
    }

    #[test]
    fn test_replace_keeps_slot() {
        let store = NodeStore::new();
        store.create_node(person("p1", "s1", "one@x.com"));
        store.create_node(person("p2", "s2", "two@x.com"));
        store.create_node(person("p1", "s1", "uno@x.com"));

        let persons = store.get_all_nodes(NodeType::Person);
        assert_eq!(persons.len(), 2);
        assert_eq!(persons[0].id, NodeId::new("p1"));
        assert_eq!(
            persons[0].as_person().unwrap().email.as_deref(),
            Some("uno@x.com")
        );
        assert_eq!(store.children(&NodeId::new("s1")), vec![NodeId::new("p1")]);
    }

    #[test]
    fn test_reparent_moves_child_link() {
        let store = NodeStore::new();
        store.create_node(person("p1", "s1", "a@x.com"));
        store.create_node(person("p1", "s2", "a@x.com"));

        assert!(store.children(&NodeId::new("s1")).is_empty());
        assert_eq!(store.children(&NodeId::new("s2")), vec![NodeId::new("p1")]);
    }

    #[test]
    fn test_delete_cascades() {
        let store = NodeStore::new();
        store.create_node(markdown("file", None));
        store.create_node(markdown("src", Some("file")));
        store.create_node(person("derived", "src", "a@x.com"));
        store.create_node(markdown("other", None));

        let removed = store.delete_node(&NodeId::new("file"));

        assert_eq!(removed.len(), 3);
        assert_eq!(removed[0], NodeId::new("file"));
        assert_eq!(store.len(), 1);
        assert!(store.get_node(&NodeId::new("derived")).is_none());
        assert!(store.get_node(&NodeId::new("other")).is_some());
    }

    #[test]
    fn test_delete_child_unlinks_parent() {
        let store = NodeStore::new();
        store.create_node(markdown("file", None));
        store.create_node(markdown("src", Some("file")));

        store.delete_node(&NodeId::new("src"));
        assert!(store.children(&NodeId::new("file")).is_empty());
        assert!(store.delete_node(&NodeId::new("missing")).is_empty());
    }

    #[test]
    fn test_counts_and_clear() {
        let store = NodeStore::new();
        store.create_node(markdown("a", None));
        store.create_node(person("p", "a", "a@x.com"));

        assert_eq!(store.count(NodeType::Markdown), 1);
        assert_eq!(store.count(NodeType::Person), 1);
        assert_eq!(store.count(NodeType::Post), 0);

        store.clear();
        assert!(store.is_empty());
    }
}
