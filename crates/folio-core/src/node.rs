//! Content graph node types.
//!
//! Every record in the graph is a [`Node`]: an id, an optional parent, the
//! internal bookkeeping shared by all nodes, and a typed payload. Nodes are
//! immutable once built; a content change produces a new node with the same
//! id.

use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::frontmatter::Frontmatter;

/// Opaque node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mints deterministic node ids from seed strings.
///
/// Ids are UUIDv5 values in a namespace derived from the minter's name, so
/// the same seed always yields the same id and different minters never
/// collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeIdMinter {
    namespace: Uuid,
}

impl Default for NodeIdMinter {
    fn default() -> Self {
        Self::new("folio")
    }
}

impl NodeIdMinter {
    /// Create a minter whose namespace is derived from `name`.
    pub fn new(name: &str) -> Self {
        Self {
            namespace: Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()),
        }
    }

    /// Mint the id for a seed string.
    pub fn mint(&self, seed: &str) -> NodeId {
        NodeId(Uuid::new_v5(&self.namespace, seed.as_bytes()).to_string())
    }
}

/// Change fingerprint of a node's underlying content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Digest arbitrary bytes (hex-encoded SHA-256).
    pub fn of(bytes: impl AsRef<[u8]>) -> Self {
        Self(hex::encode(Sha256::digest(bytes.as_ref())))
    }

    /// Borrow the digest as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Type discriminant of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// A file discovered in a content collection.
    File,
    /// A Markdown source record derived from a file.
    Markdown,
    /// A blog post derived from a Markdown source.
    Post,
    /// A person bio derived from a Markdown source.
    Person,
}

impl NodeType {
    /// All node types, in derivation order.
    pub const ALL: [NodeType; 4] = [Self::File, Self::Markdown, Self::Post, Self::Person];

    /// Type name as exposed to queries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "File",
            Self::Markdown => "Markdown",
            Self::Post => "Post",
            Self::Person => "Person",
        }
    }

    /// Look up a type by its exposed name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bookkeeping shared by every node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Internal {
    /// Node type.
    pub node_type: NodeType,

    /// Fingerprint of the content this node was built from.
    pub content_digest: ContentDigest,

    /// Component that created the node.
    pub owner: String,
}

/// A file inside a configured content collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNode {
    /// Collection name this file was loaded from.
    pub source_instance_name: String,

    /// Path relative to the collection root, `/`-separated.
    pub relative_path: String,

    /// Absolute path on disk.
    pub absolute_path: PathBuf,

    /// Lowercase file extension, empty when there is none.
    pub extension: String,
}

/// A Markdown source record: parsed front matter plus raw body text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkdownNode {
    /// Parsed front matter.
    pub frontmatter: Frontmatter,

    /// Body text following the front matter block, not yet compiled.
    pub raw_body: String,
}

/// A blog post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostNode {
    pub title: Option<String>,
    /// Author emails as written in front matter.
    pub authors: Option<Vec<String>>,
    /// Raw Markdown body.
    pub body: String,
}

/// A person bio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonNode {
    pub name: Option<String>,
    pub email: Option<String>,
    /// Raw Markdown bio.
    pub bio: String,
}

/// Typed payload of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeContent {
    File(FileNode),
    Markdown(MarkdownNode),
    Post(PostNode),
    Person(PersonNode),
}

impl NodeContent {
    /// Type discriminant matching this payload.
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::File(_) => NodeType::File,
            Self::Markdown(_) => NodeType::Markdown,
            Self::Post(_) => NodeType::Post,
            Self::Person(_) => NodeType::Person,
        }
    }
}

/// A node in the content graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub internal: Internal,
    pub content: NodeContent,
}

impl Node {
    /// Build a node, deriving the internal type from the payload.
    pub fn new(
        id: NodeId,
        parent: Option<NodeId>,
        content_digest: ContentDigest,
        owner: impl Into<String>,
        content: NodeContent,
    ) -> Self {
        Self {
            id,
            parent,
            internal: Internal {
                node_type: content.node_type(),
                content_digest,
                owner: owner.into(),
            },
            content,
        }
    }

    /// Node type.
    pub fn node_type(&self) -> NodeType {
        self.internal.node_type
    }

    /// Content fingerprint.
    pub fn content_digest(&self) -> &ContentDigest {
        &self.internal.content_digest
    }

    /// File payload, if this is a file node.
    pub fn as_file(&self) -> Option<&FileNode> {
        match &self.content {
            NodeContent::File(file) => Some(file),
            _ => None,
        }
    }

    /// Markdown payload, if this is a Markdown source node.
    pub fn as_markdown(&self) -> Option<&MarkdownNode> {
        match &self.content {
            NodeContent::Markdown(markdown) => Some(markdown),
            _ => None,
        }
    }

    /// Post payload, if this is a post node.
    pub fn as_post(&self) -> Option<&PostNode> {
        match &self.content {
            NodeContent::Post(post) => Some(post),
            _ => None,
        }
    }

    /// Person payload, if this is a person node.
    pub fn as_person(&self) -> Option<&PersonNode> {
        match &self.content {
            NodeContent::Person(person) => Some(person),
            _ => None,
        }
    }

    /// Read a stored property by name.
    ///
    /// Absent or unknown properties are `Value::Null`.
    pub fn property(&self, name: &str) -> Value {
        match name {
            "id" => return Value::String(self.id.to_string()),
            "parent" => {
                return self
                    .parent
                    .as_ref()
                    .map_or(Value::Null, |p| Value::String(p.to_string()));
            }
            _ => {}
        }

        match &self.content {
            NodeContent::File(file) => match name {
                "sourceInstanceName" => Value::String(file.source_instance_name.clone()),
                "relativePath" => Value::String(file.relative_path.clone()),
                "absolutePath" => Value::String(file.absolute_path.display().to_string()),
                "extension" => Value::String(file.extension.clone()),
                _ => Value::Null,
            },
            NodeContent::Markdown(markdown) => match name {
                "rawBody" => Value::String(markdown.raw_body.clone()),
                "frontmatter" => serde_json::to_value(&markdown.frontmatter).unwrap_or(Value::Null),
                _ => Value::Null,
            },
            NodeContent::Post(post) => match name {
                "title" => post.title.clone().map_or(Value::Null, Value::String),
                "authors" => post.authors.as_ref().map_or(Value::Null, |authors| {
                    Value::Array(authors.iter().cloned().map(Value::String).collect())
                }),
                "body" => Value::String(post.body.clone()),
                _ => Value::Null,
            },
            NodeContent::Person(person) => match name {
                "name" => person.name.clone().map_or(Value::Null, Value::String),
                "email" => person.email.clone().map_or(Value::Null, Value::String),
                "bio" => Value::String(person.bio.clone()),
                _ => Value::Null,
            },
        }
    }
}
