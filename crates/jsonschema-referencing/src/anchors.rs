/// Whether an anchor was declared with `$anchor` or `$dynamicAnchor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorKind {
    Static,
    Dynamic,
}

/// An anchor name scoped to the canonical URI of the resource that declares it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnchorKey {
    base: String,
    name: String,
}

impl AnchorKey {
    pub fn new(base: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            name: name.into(),
        }
    }
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}
