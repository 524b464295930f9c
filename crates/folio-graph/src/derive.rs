//! Typed node derivation.
//!
//! Markdown source nodes become `Post` or `Person` nodes depending on the
//! collection their file was loaded from. Front matter is copied as found;
//! missing keys become absent fields, never errors.

use std::sync::Arc;

use folio_core::{Node, NodeContent, NodeId, NodeIdMinter, NodeType, PersonNode, PostNode};
use tracing::{debug, trace};

use crate::store::{NodeModel, NodeStore};

/// Owner recorded on derived nodes.
pub const DERIVER_OWNER: &str = "folio-graph::derive";

/// Content collections with a derived type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// `posts`: blog posts.
    Posts,
    /// `persons`: author bios.
    Persons,
}

impl Collection {
    /// Match a collection tag. Unrecognized tags have no derived type.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "posts" => Some(Self::Posts),
            "persons" => Some(Self::Persons),
            _ => None,
        }
    }

    /// Collection tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Persons => "persons",
        }
    }

    /// Node type derived from this collection.
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Posts => NodeType::Post,
            Self::Persons => NodeType::Person,
        }
    }
}

/// Accessors handed to the deriver for one node event.
#[derive(Debug, Clone, Copy)]
pub struct DeriveContext<'a> {
    store: &'a NodeStore,
    minter: &'a NodeIdMinter,
}

impl<'a> DeriveContext<'a> {
    pub fn new(store: &'a NodeStore, minter: &'a NodeIdMinter) -> Self {
        Self { store, minter }
    }

    /// Look up a node by id.
    pub fn get_node(&self, id: &NodeId) -> Option<Arc<Node>> {
        self.store.get_node(id)
    }

    /// Mint a deterministic id for a seed.
    pub fn create_node_id(&self, seed: &str) -> NodeId {
        self.minter.mint(seed)
    }

    /// Register a node in the store.
    pub fn create_node(&self, node: Node) -> Arc<Node> {
        self.store.create_node(node)
    }
}

/// Derives typed nodes from Markdown source nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeDeriver;

impl NodeDeriver {
    /// Handle a newly created or replaced node.
    ///
    /// Returns the id of the derived node, or `None` when the node is not a
    /// Markdown source, its parent file is missing, or its collection has no
    /// derived type.
    pub fn on_create_node(&self, node: &Node, ctx: &DeriveContext<'_>) -> Option<NodeId> {
        let markdown = node.as_markdown()?;
        let parent = node.parent.as_ref().and_then(|id| ctx.get_node(id))?;
        let file = parent.as_file()?;

        let Some(collection) = Collection::from_tag(&file.source_instance_name) else {
            trace!(
                id = %node.id,
                collection = %file.source_instance_name,
                "no derived type for collection"
            );
            return None;
        };

        let fm = &markdown.frontmatter;
        let content = match collection {
            Collection::Posts => NodeContent::Post(PostNode {
                title: fm.get_str("title").map(str::to_string),
                authors: fm.get_str_list("authors"),
                body: markdown.raw_body.clone(),
            }),
            Collection::Persons => NodeContent::Person(PersonNode {
                name: fm.get_str("name").map(str::to_string),
                email: fm.get_str("email").map(str::to_string),
                bio: markdown.raw_body.clone(),
            }),
        };

        let node_type = collection.node_type();
        let id = ctx.create_node_id(&format!("{} >>> {node_type}", node.id));
        ctx.create_node(Node::new(
            id.clone(),
            Some(node.id.clone()),
            node.content_digest().clone(),
            DERIVER_OWNER,
            content,
        ));

        debug!(source = %node.id, id = %id, %node_type, "derived node");
        Some(id)
    }
}
