use crate::paths::Location;

/// Context information passed to tracing callbacks during evaluation.
///
/// One context is emitted per keyword that was looked at, in evaluation order.
#[derive(Debug, Clone)]
pub struct TracingContext<'a> {
    /// The location in the instance being evaluated
    pub instance_location: &'a Location,
    /// Absolute location of the keyword, e.g. `http://example.com/s.json#/properties/a/type`
    pub schema_location: &'a str,
    /// The keyword name
    pub keyword: &'a str,
    /// The result of evaluating this keyword
    pub result: NodeEvaluationResult,
}

impl<'a> TracingContext<'a> {
    /// Create a new tracing context
    pub fn new(
        instance_location: &'a Location,
        schema_location: &'a str,
        keyword: &'a str,
        result: impl Into<NodeEvaluationResult>,
    ) -> Self {
        Self {
            instance_location,
            schema_location,
            keyword,
            result: result.into(),
        }
    }

    /// Call the tracing callback with this context
    pub fn call(self, callback: TracingCallback<'_>) {
        callback(self);
    }
}

/// Result of evaluating a keyword against an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeEvaluationResult {
    /// The keyword passed
    Valid,
    /// The keyword failed
    Invalid,
    /// The keyword was not applicable (e.g., type mismatch)
    Ignored,
}

impl From<bool> for NodeEvaluationResult {
    fn from(value: bool) -> Self {
        if value {
            Self::Valid
        } else {
            Self::Invalid
        }
    }
}

impl From<Option<bool>> for NodeEvaluationResult {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Valid,
            Some(false) => Self::Invalid,
            None => Self::Ignored,
        }
    }
}

/// Type alias for tracing callbacks.
///
/// A tracing callback is called for each evaluated keyword,
/// providing visibility into the evaluation process.
pub type TracingCallback<'a> = &'a mut dyn FnMut(TracingContext);
