//! Selection queries over the content graph.
//!
//! A query names an object type and a selection set such as
//! `{ title authors { name email } }`. Only selected fields are resolved,
//! so computed fields cost nothing unless asked for.

use std::{iter::Peekable, str::CharIndices};

use folio_core::{Node, NodeId};
use serde_json::{Map, Value};

use crate::{
    error::{GraphError, Result},
    schema::{ObjectType, ResolveContext, Resolved, Schema},
};

/// A selected field and its sub-selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub name: String,
    pub children: Vec<Selection>,
}

impl Selection {
    /// Leaf selection.
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }
}

/// Parse a selection set.
///
/// Grammar: `set := '{' field+ '}'`, `field := ident set?`. Commas and
/// whitespace separate fields.
pub fn parse_selection(input: &str) -> Result<Vec<Selection>> {
    let mut lexer = Lexer::new(input);
    let set = lexer.selection_set()?;
    match lexer.next_token()? {
        None => Ok(set),
        Some((pos, token)) => Err(GraphError::syntax(
            pos,
            format!("unexpected {token} after selection"),
        )),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    Ident(String),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => f.write_str("'{'"),
            Self::Close => f.write_str("'}'"),
            Self::Ident(name) => write!(f, "field {name}"),
        }
    }
}

struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    peeked: Option<(usize, Token)>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            peeked: None,
        }
    }

    fn next_token(&mut self) -> Result<Option<(usize, Token)>> {
        if let Some(token) = self.peeked.take() {
            return Ok(Some(token));
        }

        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_whitespace() || c == ',' {
                self.chars.next();
            } else {
                break;
            }
        }

        let Some((start, c)) = self.chars.next() else {
            return Ok(None);
        };

        match c {
            '{' => Ok(Some((start, Token::Open))),
            '}' => Ok(Some((start, Token::Close))),
            c if c == '_' || c.is_ascii_alphabetic() => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, c)) = self.chars.peek() {
                    if c == '_' || c.is_ascii_alphanumeric() {
                        end = i + c.len_utf8();
                        self.chars.next();
                    } else {
                        break;
                    }
                }
                Ok(Some((start, Token::Ident(self.input[start..end].to_string()))))
            }
            other => Err(GraphError::syntax(start, format!("unexpected character {other:?}"))),
        }
    }

    fn peek_token(&mut self) -> Result<Option<&(usize, Token)>> {
        if self.peeked.is_none() {
            self.peeked = self.next_token()?;
        }
        Ok(self.peeked.as_ref())
    }

    fn selection_set(&mut self) -> Result<Vec<Selection>> {
        match self.next_token()? {
            Some((_, Token::Open)) => {}
            Some((pos, token)) => {
                return Err(GraphError::syntax(pos, format!("expected '{{', found {token}")));
            }
            None => return Err(GraphError::syntax(self.input.len(), "expected '{'")),
        }

        let mut fields = Vec::new();
        loop {
            match self.next_token()? {
                Some((pos, Token::Close)) => {
                    if fields.is_empty() {
                        return Err(GraphError::syntax(pos, "empty selection"));
                    }
                    return Ok(fields);
                }
                Some((_, Token::Ident(name))) => {
                    let children = if matches!(self.peek_token()?, Some((_, Token::Open))) {
                        self.selection_set()?
                    } else {
                        Vec::new()
                    };
                    fields.push(Selection { name, children });
                }
                Some((pos, Token::Open)) => {
                    return Err(GraphError::syntax(pos, "selection must follow a field name"));
                }
                None => return Err(GraphError::syntax(self.input.len(), "unclosed selection")),
            }
        }
    }
}

/// A validated query against one object type.
#[derive(Debug, Clone)]
pub struct Query {
    type_name: String,
    selection: Vec<Selection>,
}

impl Query {
    /// Parse and validate a selection against `type_name`.
    pub fn parse(schema: &Schema, type_name: &str, selection: &str) -> Result<Self> {
        Self::new(schema, type_name, parse_selection(selection)?)
    }

    /// Validate a pre-built selection against `type_name`.
    pub fn new(schema: &Schema, type_name: &str, selection: Vec<Selection>) -> Result<Self> {
        let object = schema.get(type_name)?;
        validate(schema, object, &selection)?;
        Ok(Self {
            type_name: type_name.to_string(),
            selection,
        })
    }

    /// Queried type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Resolve every node of the queried type, in store order.
    pub fn execute(&self, schema: &Schema, ctx: &ResolveContext<'_>) -> Result<Value> {
        let object = schema.get(&self.type_name)?;
        let nodes = ctx.nodes.get_all_nodes(object.node_type);

        let mut results = Vec::with_capacity(nodes.len());
        for node in &nodes {
            results.push(resolve_object(schema, object, node, &self.selection, ctx)?);
        }
        Ok(Value::Array(results))
    }

    /// Resolve one node by id. `None` if it is missing or of another type.
    pub fn execute_one(
        &self,
        schema: &Schema,
        ctx: &ResolveContext<'_>,
        id: &NodeId,
    ) -> Result<Option<Value>> {
        let object = schema.get(&self.type_name)?;
        match ctx.nodes.get_node(id) {
            Some(node) if node.node_type() == object.node_type => Ok(Some(resolve_object(
                schema,
                object,
                &node,
                &self.selection,
                ctx,
            )?)),
            _ => Ok(None),
        }
    }
}

fn validate(schema: &Schema, object: &ObjectType, selection: &[Selection]) -> Result<()> {
    for sel in selection {
        let field = object.get(&sel.name).ok_or_else(|| GraphError::UnknownField {
            type_name: object.name.clone(),
            field: sel.name.clone(),
        })?;

        match (field.field_type.object_type(), sel.children.is_empty()) {
            (Some(_), true) => {
                return Err(GraphError::MissingSelection {
                    type_name: object.name.clone(),
                    field: sel.name.clone(),
                });
            }
            (None, false) => {
                return Err(GraphError::UnexpectedSelection {
                    type_name: object.name.clone(),
                    field: sel.name.clone(),
                });
            }
            (Some(target), false) => validate(schema, schema.get(target)?, &sel.children)?,
            (None, true) => {}
        }
    }
    Ok(())
}

fn resolve_object(
    schema: &Schema,
    object: &ObjectType,
    node: &Node,
    selection: &[Selection],
    ctx: &ResolveContext<'_>,
) -> Result<Value> {
    let mut out = Map::with_capacity(selection.len());

    for sel in selection {
        let field = object.get(&sel.name).ok_or_else(|| GraphError::UnknownField {
            type_name: object.name.clone(),
            field: sel.name.clone(),
        })?;

        let value = match field.resolve(node, ctx)? {
            Resolved::Value(value) => value,
            Resolved::Nodes(children) => {
                let target = child_type(schema, object, &sel.name, field.field_type.object_type())?;
                let mut items = Vec::with_capacity(children.len());
                for child in &children {
                    items.push(resolve_object(schema, target, child, &sel.children, ctx)?);
                }
                Value::Array(items)
            }
        };

        out.insert(sel.name.clone(), value);
    }

    Ok(Value::Object(out))
}

fn child_type<'s>(
    schema: &'s Schema,
    object: &ObjectType,
    field: &str,
    target: Option<&str>,
) -> Result<&'s ObjectType> {
    let target = target.ok_or_else(|| GraphError::UnexpectedSelection {
        type_name: object.name.clone(),
        field: field.to_string(),
    })?;
    schema.get(target)
}
