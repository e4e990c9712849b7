use std::sync::Arc;

use crate::node::SchemaRef;

/// One entered schema resource.
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    /// Canonical URI of the resource, without fragment.
    pub(crate) base: Arc<str>,
    /// The node through which the resource was entered.
    pub(crate) node: SchemaRef,
}

/// Resources entered along the current evaluation path, outermost first.
///
/// Owned by a single evaluation call; never shared.
#[derive(Debug, Default)]
pub(crate) struct DynamicScope {
    frames: Vec<Frame>,
}

impl DynamicScope {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Enter `node` of the resource `base`. A frame is pushed only when the resource differs
    /// from the innermost one; the return value tells whether [`DynamicScope::pop`] must be
    /// called.
    pub(crate) fn enter(&mut self, base: &Arc<str>, node: SchemaRef) -> bool {
        if self
            .frames
            .last()
            .is_some_and(|frame| frame.base == *base)
        {
            return false;
        }
        self.frames.push(Frame {
            base: Arc::clone(base),
            node,
        });
        true
    }

    pub(crate) fn pop(&mut self) {
        self.frames.pop();
    }

    /// Frames from the outermost to the innermost.
    pub(crate) fn outermost_first(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }
}
