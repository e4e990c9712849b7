//! Compiled schema graph.
//!
//! Every compiled document owns an arena of [`SchemaNode`]s. Nested subschemas are referenced by
//! [`NodeId`] and owned by the document; `parent` and `resource` are non-owning ids into the same
//! arena. References to other documents are [`SchemaRef`] lookups through the registry and are
//! never copies.
pub(crate) mod display;
mod keywords;

use std::sync::Arc;

use ahash::AHashMap;
use jsonschema_ir::JsonValue;

pub(crate) use keywords::{Keywords, Pattern, Reference, TypeKeyword};

use crate::paths::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(u32);

impl NodeId {
    pub(crate) const ROOT: NodeId = NodeId(0);

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn new(index: usize) -> NodeId {
        NodeId(index as u32)
    }
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct DocumentId(u32);

impl DocumentId {
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn new(index: usize) -> DocumentId {
        DocumentId(index as u32)
    }
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Address of a node anywhere in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SchemaRef {
    pub(crate) document: DocumentId,
    pub(crate) node: NodeId,
}

impl SchemaRef {
    pub(crate) fn new(document: DocumentId, node: NodeId) -> SchemaRef {
        SchemaRef { document, node }
    }
    pub(crate) fn root(document: DocumentId) -> SchemaRef {
        SchemaRef::new(document, NodeId::ROOT)
    }
    /// Another node of the same document.
    pub(crate) fn sibling(self, node: NodeId) -> SchemaRef {
        SchemaRef::new(self.document, node)
    }
}

#[derive(Debug)]
pub(crate) enum SchemaBody {
    Bool(bool),
    Keywords(Box<Keywords>),
}

#[derive(Debug)]
pub(crate) struct SchemaNode {
    /// Lexical parent. Evaluation follows keyword edges and only tests walk upwards.
    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) parent: Option<NodeId>,
    /// Nearest ancestor-or-self that starts a resource (`$id` or document root).
    pub(crate) resource: NodeId,
    /// Canonical URI of `resource`, without fragment.
    pub(crate) base: Arc<str>,
    /// JSON Pointer of this node from the document root.
    pub(crate) location: Location,
    /// `base` plus the pointer relative to the resource, e.g. `http://x/s.json#/properties/a`.
    pub(crate) absolute: Arc<str>,
    pub(crate) body: SchemaBody,
}

impl SchemaNode {
    pub(crate) fn keywords(&self) -> Option<&Keywords> {
        match &self.body {
            SchemaBody::Keywords(keywords) => Some(keywords),
            SchemaBody::Bool(_) => None,
        }
    }
    pub(crate) fn is_false(&self) -> bool {
        matches!(self.body, SchemaBody::Bool(false))
    }
}

/// One compiled document.
#[derive(Debug)]
pub(crate) struct Document {
    pub(crate) id: DocumentId,
    /// Canonical URI of the root node.
    pub(crate) uri: Arc<str>,
    pub(crate) source: JsonValue,
    pub(crate) nodes: Vec<SchemaNode>,
    /// Escaped JSON Pointer from the document root to every schema node.
    pub(crate) pointers: AHashMap<String, NodeId>,
}

impl Document {
    pub(crate) fn node(&self, id: NodeId) -> Option<&SchemaNode> {
        self.nodes.get(id.index())
    }
    /// Resolve a JSON Pointer relative to the resource starting at `resource`.
    pub(crate) fn follow_pointer(&self, resource: NodeId, pointer: &str) -> Option<NodeId> {
        let prefix = self.node(resource)?.location.as_str();
        let tokens = referencing::pointer::segments(pointer)?;
        let mut full = String::with_capacity(prefix.len() + pointer.len());
        full.push_str(prefix);
        for token in tokens {
            full.push('/');
            full.push_str(&referencing::pointer::escape_segment(&token));
        }
        self.pointers.get(&full).copied()
    }
}
