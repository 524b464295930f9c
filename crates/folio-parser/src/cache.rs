//! Memoizing wrapper around a [`MarkupCompiler`].

use std::collections::HashMap;

use folio_core::{ContentDigest, Node, NodeId};
use parking_lot::RwLock;
use tracing::trace;

use crate::{MarkupCompiler, Result};

/// Caches compiled output per node and content digest.
///
/// A replaced node with a new digest misses the cache; the stale entry for
/// the old digest is dropped on the next insert for that id. Entries for
/// removed nodes are dropped through [`MarkupCompiler::evict`].
#[derive(Debug)]
pub struct CachedCompiler<C> {
    inner: C,
    entries: RwLock<HashMap<NodeId, (ContentDigest, String)>>,
}

impl<C: MarkupCompiler> CachedCompiler<C> {
    /// Wrap a compiler.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The wrapped compiler.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<C: MarkupCompiler> MarkupCompiler for CachedCompiler<C> {
    fn compile(&self, node: &Node) -> Result<String> {
        if let Some((digest, html)) = self.entries.read().get(&node.id)
            && digest == node.content_digest()
        {
            trace!(id = %node.id, "compile cache hit");
            return Ok(html.clone());
        }

        let html = self.inner.compile(node)?;
        self.entries.write().insert(
            node.id.clone(),
            (node.content_digest().clone(), html.clone()),
        );
        Ok(html)
    }

    fn evict(&self, ids: &[NodeId]) {
        let mut entries = self.entries.write();
        for id in ids {
            if entries.remove(id).is_some() {
                trace!(%id, "compile cache evict");
            }
        }
    }

    fn evict_all(&self) {
        self.entries.write().clear();
    }
}
