//! Handle to a compiled schema.
use std::fmt;

use jsonschema_ir::JsonValue;

use crate::{
    error::CompileError,
    evaluator::Evaluator,
    node::{display, SchemaRef},
    output::Evaluation,
    registry::Registry,
    resolver::Corpus,
    tracing::TracingCallback,
};

/// A compiled schema: a registry plus the node to start evaluation from.
///
/// Cloning is cheap. A `Schema` stays valid for as long as any clone of its registry lives, and
/// it may be evaluated from several threads at once.
#[derive(Clone)]
pub struct Schema {
    registry: Registry,
    root: SchemaRef,
}

impl Schema {
    pub(crate) fn new(registry: Registry, root: SchemaRef) -> Schema {
        Schema { registry, root }
    }

    pub(crate) fn root(&self) -> SchemaRef {
        self.root
    }

    /// The registry this schema was compiled into.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Canonical URI of this schema.
    ///
    /// Resource roots are named by their base URI, other subschemas by base URI plus a JSON
    /// Pointer fragment.
    #[must_use]
    pub fn uri(&self) -> String {
        let state = self.registry.read();
        match state.node(self.root) {
            Some(node) if node.resource == self.root.node => node.base.to_string(),
            Some(node) => node.absolute.to_string(),
            None => String::new(),
        }
    }

    /// Evaluate `instance` and return the full result tree.
    ///
    /// ```rust
    /// use jsonschema::Registry;
    /// use serde_json::json;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let schema = Registry::new().compile(&json!({"minimum": 5}), None)?;
    /// let evaluation = schema.evaluate(&json!(3));
    /// assert!(!evaluation.is_valid());
    /// for entry in evaluation.iter_errors() {
    ///     assert_eq!(entry.error.code(), "minimum");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn evaluate(&self, instance: impl Into<JsonValue>) -> Evaluation {
        self.evaluate_value(&instance.into())
    }

    /// Evaluate an instance that is already a [`JsonValue`].
    #[must_use]
    pub fn evaluate_value(&self, instance: &JsonValue) -> Evaluation {
        let state = self.registry.read();
        let root = Evaluator::new(&state).evaluate_root(self.root, instance);
        Evaluation::new(root)
    }

    /// Decode `bytes` with the registry codec and evaluate the result.
    ///
    /// # Errors
    ///
    /// If the bytes are not a valid JSON document.
    pub fn evaluate_bytes(&self, bytes: &[u8]) -> Result<Evaluation, CompileError> {
        let codec = std::sync::Arc::clone(&self.registry.read().config.codec);
        let instance = codec.decode(bytes)?;
        Ok(self.evaluate_value(&instance))
    }

    /// Whether `instance` is valid. Builds the same tree as [`Schema::evaluate`].
    #[must_use]
    pub fn is_valid(&self, instance: impl Into<JsonValue>) -> bool {
        self.evaluate(instance).is_valid()
    }

    /// Evaluate `instance`, reporting every keyword looked at to `callback`.
    pub fn trace(&self, instance: impl Into<JsonValue>, callback: TracingCallback<'_>) -> bool {
        let instance = instance.into();
        let state = self.registry.read();
        Evaluator::with_tracer(&state, callback)
            .evaluate_root(self.root, &instance)
            .is_valid()
    }

    /// Keyword form of the compiled schema.
    #[must_use]
    pub fn to_value(&self) -> JsonValue {
        let state = self.registry.read();
        state
            .document(self.root.document)
            .map_or(JsonValue::Bool(false), |document| {
                display::to_value(document, self.root.node)
            })
    }

    /// The `default` of this schema.
    ///
    /// A string default of the form `"name()"` is replaced by the result of the function
    /// registered under `name` with [`Registry::register_default_function`]. Other defaults are
    /// returned as they are.
    #[must_use]
    pub fn default_value(&self) -> Option<JsonValue> {
        let default = {
            let state = self.registry.read();
            state
                .node(self.root)
                .and_then(|node| node.keywords())
                .and_then(|keywords| keywords.default.clone())?
        };
        let Some(name) = default.as_str().and_then(|value| value.strip_suffix("()")) else {
            return Some(default);
        };
        // The read lock is released; the function may use the registry itself
        match self.registry.default_function(name) {
            Some(function) => Some(function()),
            None => {
                tracing::debug!(function = name, "Default function is not registered");
                Some(default)
            }
        }
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.registry.ptr_eq(&other.registry) && self.root == other.root
    }
}

impl Eq for Schema {}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").field("uri", &self.uri()).finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{NodeEvaluationResult, Registry};

    #[test]
    fn subschema_uri_has_pointer_fragment() {
        let registry = Registry::new();
        let root = registry
            .compile(
                &json!({"$id": "http://example.com/root.json", "$defs": {"a": {"type": "string"}}}),
                None,
            )
            .expect("Valid schema");
        let sub = registry
            .resolve(&root, "#/$defs/a")
            .expect("Existing subschema");
        assert_eq!(root.uri(), "http://example.com/root.json");
        assert_eq!(sub.uri(), "http://example.com/root.json#/$defs/a");
    }

    #[test]
    fn to_value_restores_keyword_form() {
        let source = json!({
            "$id": "http://example.com/person.json",
            "type": "object",
            "properties": {
                "name": {"type": "string", "minLength": 1},
                "tags": {"type": "array", "items": {"type": "string"}, "uniqueItems": true}
            },
            "required": ["name"],
            "additionalProperties": false
        });
        let registry = Registry::new();
        let schema = registry.compile(&source, None).expect("Valid schema");
        assert_eq!(schema.to_value(), jsonschema_ir::JsonValue::from(&source));
    }

    #[test]
    fn default_functions() {
        let registry = Registry::new();
        registry.register_default_function("now", || jsonschema_ir::JsonValue::from("2024-01-01"));
        let computed = registry
            .compile(&json!({"default": "now()"}), None)
            .expect("Valid schema");
        let missing = registry
            .compile(&json!({"default": "later()"}), None)
            .expect("Valid schema");
        let plain = registry
            .compile(&json!({"default": [1, 2]}), None)
            .expect("Valid schema");
        let none = registry.compile(&json!({}), None).expect("Valid schema");
        assert_eq!(
            computed.default_value(),
            Some(jsonschema_ir::JsonValue::from("2024-01-01"))
        );
        assert_eq!(
            missing.default_value(),
            Some(jsonschema_ir::JsonValue::from("later()"))
        );
        assert_eq!(
            plain.default_value(),
            Some(jsonschema_ir::JsonValue::from(vec![1_u64, 2]))
        );
        assert_eq!(none.default_value(), None);
    }

    #[test]
    fn trace_reports_keywords() {
        let registry = Registry::new();
        let schema = registry
            .compile(&json!({"type": "string", "minimum": 1, "minLength": 3}), None)
            .expect("Valid schema");
        let mut seen = Vec::new();
        let valid = schema.trace(&json!("ab"), &mut |context| {
            seen.push((context.keyword.to_string(), context.result));
        });
        assert!(!valid);
        assert_eq!(
            seen,
            vec![
                ("type".to_string(), NodeEvaluationResult::Valid),
                ("minimum".to_string(), NodeEvaluationResult::Ignored),
                ("minLength".to_string(), NodeEvaluationResult::Invalid),
            ]
        );
    }

    #[test]
    fn schemas_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<crate::Schema>();
        assert_send_sync::<Registry>();
    }
}
