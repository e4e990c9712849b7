//! Reference resolution over the registry's URI table.
use referencing::{uri, Error, Url};

use crate::{
    node::{Document, DocumentId, SchemaNode, SchemaRef},
    scope::DynamicScope,
};

/// Read access to a set of compiled documents and their URI table.
pub(crate) trait Corpus {
    fn document(&self, id: DocumentId) -> Option<&Document>;

    /// Resolve an absolute URI (with optional pointer or anchor fragment).
    fn lookup(&self, target: &Url) -> Result<SchemaRef, Error>;

    /// The node declaring `$dynamicAnchor: name` in the resource `base`, if any.
    fn dynamic_anchor(&self, base: &str, name: &str) -> Option<SchemaRef>;

    fn node(&self, target: SchemaRef) -> Option<&SchemaNode> {
        self.document(target.document)?.node(target.node)
    }
}

/// Walk a pointer fragment inside the resource at `resource`.
pub(crate) fn follow<C: Corpus + ?Sized>(
    corpus: &C,
    resource: SchemaRef,
    pointer: &str,
) -> Option<SchemaRef> {
    corpus
        .document(resource.document)?
        .follow_pointer(resource.node, pointer)
        .map(|node| resource.sibling(node))
}

/// Resolve a `$dynamicRef` target.
///
/// The target is first resolved statically. If that node declares a `$dynamicAnchor` matching
/// the fragment, the dynamic scope is searched from the outermost resource inwards and the first
/// resource declaring the same dynamic anchor wins. Otherwise the static target is used.
pub(crate) fn resolve_dynamic<C: Corpus + ?Sized>(
    corpus: &C,
    scope: &DynamicScope,
    target: &Url,
) -> Result<SchemaRef, Error> {
    let initial = corpus.lookup(target)?;
    let (_, fragment) = uri::split_fragment(target)?;
    let Some(name) = fragment.filter(|fragment| !fragment.starts_with('/')) else {
        return Ok(initial);
    };
    let bookended = corpus
        .node(initial)
        .and_then(SchemaNode::keywords)
        .and_then(|keywords| keywords.dynamic_anchor.as_deref())
        == Some(name.as_str());
    if !bookended {
        return Ok(initial);
    }
    for frame in scope.outermost_first() {
        if let Some(found) = corpus.dynamic_anchor(&frame.base, &name) {
            tracing::trace!(
                reference = %target,
                resource = %frame.base,
                entered = ?frame.node,
                "Dynamic reference matched"
            );
            return Ok(found);
        }
    }
    Ok(initial)
}

