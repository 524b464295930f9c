//! Error types for the content graph.

use std::path::PathBuf;

use folio_core::{CoreError, NodeId};
use folio_parser::ParserError;
use thiserror::Error;

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Content graph errors.
#[derive(Debug, Error)]
pub enum GraphError {
    /// No object type registered under this name.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// The type has no such field.
    #[error("unknown field {field} on type {type_name}")]
    UnknownField { type_name: String, field: String },

    /// Selection text could not be parsed.
    #[error("selection syntax error at {position}: {message}")]
    Syntax { position: usize, message: String },

    /// Object field selected without a sub-selection.
    #[error("field {type_name}.{field} must have a sub-selection")]
    MissingSelection { type_name: String, field: String },

    /// Scalar field selected with a sub-selection.
    #[error("field {type_name}.{field} is a scalar and cannot have a sub-selection")]
    UnexpectedSelection { type_name: String, field: String },

    /// A derived node's source could not be found.
    #[error("parent of node {id} not found")]
    MissingParent { id: NodeId },

    /// Markup compilation failed.
    #[error("compile error: {0}")]
    Compile(#[from] ParserError),

    /// Reading content from disk failed.
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Walking a collection directory failed.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Core library error.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl GraphError {
    /// Create a syntax error.
    pub fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }

    /// Create an IO error for a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
