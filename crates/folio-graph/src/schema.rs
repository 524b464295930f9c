//! Type registry for queryable node types.
//!
//! A [`Schema`] maps type names to [`ObjectType`]s, and each object type maps
//! field names to a declared [`FieldType`] and a resolver. Stored fields use
//! the property resolver; computed fields carry a resolver function that is
//! only called when a query selects the field.

use std::{collections::HashMap, fmt, sync::Arc};

use folio_core::{Node, NodeType};
use folio_parser::MarkupCompiler;
use indexmap::IndexMap;
use serde_json::Value;

use crate::{
    error::{GraphError, Result},
    resolvers::{resolve_authors, resolve_markup_body},
    store::NodeModel,
};

/// Declared type of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Id,
    String,
    /// Reference to a registered object type by name.
    Object(String),
    List(Box<FieldType>),
}

impl FieldType {
    /// List of `inner`.
    pub fn list(inner: FieldType) -> Self {
        Self::List(Box::new(inner))
    }

    /// Object type name this field yields, looking through lists.
    pub fn object_type(&self) -> Option<&str> {
        match self {
            Self::Object(name) => Some(name.as_str()),
            Self::List(inner) => inner.object_type(),
            Self::Id | Self::String => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id => f.write_str("ID"),
            Self::String => f.write_str("String"),
            Self::Object(name) => f.write_str(name),
            Self::List(inner) => write!(f, "[{inner}]"),
        }
    }
}

/// Query-time accessors passed to every resolver.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    /// Node collection and id lookup.
    pub nodes: &'a dyn NodeModel,
    /// Markup compiler for body fields.
    pub compiler: &'a dyn MarkupCompiler,
}

impl<'a> ResolveContext<'a> {
    pub fn new(nodes: &'a dyn NodeModel, compiler: &'a dyn MarkupCompiler) -> Self {
        Self { nodes, compiler }
    }
}

/// Output of a field resolver.
#[derive(Debug, Clone)]
pub enum Resolved {
    /// A scalar or JSON value.
    Value(Value),
    /// A list of referenced nodes.
    Nodes(Vec<Arc<Node>>),
}

/// Resolver function for a computed field.
pub type ResolverFn = Arc<dyn Fn(&Node, &ResolveContext<'_>) -> Result<Resolved> + Send + Sync>;

/// How a field obtains its value.
#[derive(Clone)]
pub enum FieldResolver {
    /// Read the stored property of the same name.
    Property,
    /// Call a resolver function.
    Computed(ResolverFn),
}

impl fmt::Debug for FieldResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property => f.write_str("Property"),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// A field declaration.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
    pub resolver: FieldResolver,
}

impl FieldDef {
    /// A stored field read by property name.
    pub fn property(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            resolver: FieldResolver::Property,
        }
    }

    /// A computed field.
    pub fn computed<F>(name: impl Into<String>, field_type: FieldType, resolve: F) -> Self
    where
        F: Fn(&Node, &ResolveContext<'_>) -> Result<Resolved> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            field_type,
            resolver: FieldResolver::Computed(Arc::new(resolve)),
        }
    }

    /// Resolve this field on `node`.
    pub fn resolve(&self, node: &Node, ctx: &ResolveContext<'_>) -> Result<Resolved> {
        match &self.resolver {
            FieldResolver::Property => Ok(Resolved::Value(node.property(&self.name))),
            FieldResolver::Computed(resolve) => resolve(node, ctx),
        }
    }
}

/// A queryable object type backed by one node type.
#[derive(Debug, Clone)]
pub struct ObjectType {
    pub name: String,
    pub node_type: NodeType,
    fields: IndexMap<String, FieldDef>,
}

impl ObjectType {
    /// Object type named after its node type.
    pub fn new(node_type: NodeType) -> Self {
        Self {
            name: node_type.as_str().to_string(),
            node_type,
            fields: IndexMap::new(),
        }
    }

    /// Add or replace a field.
    #[must_use]
    pub fn field(mut self, def: FieldDef) -> Self {
        self.fields.insert(def.name.clone(), def);
        self
    }

    /// Look up a field.
    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.values()
    }
}

/// Registry of object types.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    types: HashMap<String, ObjectType>,
}

impl Schema {
    /// Empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// The content schema: `Post` and `Person`.
    pub fn content() -> Self {
        let mut schema = Self::new();

        schema.register(
            ObjectType::new(NodeType::Post)
                .field(FieldDef::property("id", FieldType::Id))
                .field(FieldDef::property("title", FieldType::String))
                .field(FieldDef::computed(
                    "authors",
                    FieldType::list(FieldType::Object("Person".to_string())),
                    resolve_authors,
                ))
                .field(FieldDef::computed(
                    "body",
                    FieldType::String,
                    resolve_markup_body,
                )),
        );

        schema.register(
            ObjectType::new(NodeType::Person)
                .field(FieldDef::property("id", FieldType::Id))
                .field(FieldDef::property("name", FieldType::String))
                .field(FieldDef::property("email", FieldType::String))
                .field(FieldDef::computed(
                    "bio",
                    FieldType::String,
                    resolve_markup_body,
                )),
        );

        schema
    }

    /// Register an object type, replacing one with the same name.
    pub fn register(&mut self, object: ObjectType) {
        self.types.insert(object.name.clone(), object);
    }

    /// Look up an object type.
    pub fn get(&self, name: &str) -> Result<&ObjectType> {
        self.types
            .get(name)
            .ok_or_else(|| GraphError::UnknownType(name.to_string()))
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_schema_shape() {
        let schema = Schema::content();
        assert_eq!(schema.type_names(), vec!["Person", "Post"]);

        let post = schema.get("Post").unwrap();
        let names: Vec<_> = post.fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "title", "authors", "body"]);
        assert_eq!(post.get("authors").unwrap().field_type.to_string(), "[Person]");
        assert_eq!(
            post.get("authors").unwrap().field_type.object_type(),
            Some("Person")
        );
        assert!(matches!(
            post.get("body").unwrap().resolver,
            FieldResolver::Computed(_)
        ));

        let person = schema.get("Person").unwrap();
        assert!(matches!(
            person.get("email").unwrap().resolver,
            FieldResolver::Property
        ));
        assert!(person.get("bio").is_some());
    }

    #[test]
    fn test_unknown_type() {
        let schema = Schema::content();
        let err = schema.get("Image").unwrap_err();
        assert!(matches!(err, GraphError::UnknownType(ref t) if t == "Image"));
    }

    #[test]
    fn test_register_replaces() {
        let mut schema = Schema::new();
        schema.register(ObjectType::new(NodeType::Post));
        schema.register(
            ObjectType::new(NodeType::Post).field(FieldDef::property("title", FieldType::String)),
        );

        assert_eq!(schema.type_names(), vec!["Post"]);
        assert!(schema.get("Post").unwrap().get("title").is_some());
    }
}
