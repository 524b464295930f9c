//! Content diagnostics.
//!
//! None of these are errors to the graph: an untitled post still queries
//! with a null title, an unknown author email just matches nobody. They are
//! reported so that authors can fix their content.

use std::{collections::HashMap, fmt, path::PathBuf};

use folio_core::{Node, NodeType};

use crate::{
    graph::source_file,
    store::{NodeModel, NodeStore},
};

/// What a diagnostic is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Post without a string `title`.
    UntitledPost,
    /// Post author email with no matching Person.
    UnknownAuthor { email: String },
    /// Person without a string `email`; no post can reference it.
    MissingEmail,
    /// Email shared by more than one Person.
    DuplicateEmail { email: String },
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UntitledPost => f.write_str("post has no title"),
            Self::UnknownAuthor { email } => write!(f, "no person with email {email}"),
            Self::MissingEmail => f.write_str("person has no email"),
            Self::DuplicateEmail { email } => {
                write!(f, "email {email} is used by more than one person")
            }
        }
    }
}

/// A content warning tied to the file it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Collection-relative path of the offending file, if known.
    pub path: Option<PathBuf>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path.display(), self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// Collect diagnostics for every Post and Person in the store.
pub fn lint(store: &NodeStore) -> Vec<Diagnostic> {
    let persons = store.get_all_nodes(NodeType::Person);
    let posts = store.get_all_nodes(NodeType::Post);
    let mut out = Vec::new();

    let mut by_email: HashMap<&str, usize> = HashMap::new();
    for node in &persons {
        let Some(person) = node.as_person() else {
            continue;
        };
        match person.email.as_deref() {
            Some(email) => *by_email.entry(email).or_default() += 1,
            None => out.push(diagnostic(store, node, DiagnosticKind::MissingEmail)),
        }
    }

    for node in &persons {
        if let Some(email) = node.as_person().and_then(|p| p.email.as_deref())
            && by_email.get(email).is_some_and(|&n| n > 1)
        {
            out.push(diagnostic(
                store,
                node,
                DiagnosticKind::DuplicateEmail {
                    email: email.to_string(),
                },
            ));
        }
    }

    for node in &posts {
        let Some(post) = node.as_post() else {
            continue;
        };
        if post.title.is_none() {
            out.push(diagnostic(store, node, DiagnosticKind::UntitledPost));
        }
        for email in post.authors.iter().flatten() {
            if !by_email.contains_key(email.as_str()) {
                out.push(diagnostic(
                    store,
                    node,
                    DiagnosticKind::UnknownAuthor {
                        email: email.clone(),
                    },
                ));
            }
        }
    }

    out
}

fn diagnostic(store: &NodeStore, node: &Node, kind: DiagnosticKind) -> Diagnostic {
    let path = source_file(store, node)
        .and_then(|file| file.as_file().map(|f| PathBuf::from(&f.relative_path)));
    Diagnostic { kind, path }
}
