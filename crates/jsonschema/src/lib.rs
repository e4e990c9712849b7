//! A JSON Schema 2020-12 compiler and evaluator.
//!
//! Schemas are compiled into a shared [`Registry`]; the resulting [`Schema`] handles evaluate
//! instances and produce an [`Evaluation`] tree that can be projected into the `flag`, `list`
//! and `hierarchical` output formats.
//!
//! ```rust
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = jsonschema::schema_for(&json!({
//!     "type": "object",
//!     "properties": {"name": {"type": "string"}},
//!     "required": ["name"]
//! }))?;
//!
//! assert!(schema.is_valid(&json!({"name": "Alice"})));
//!
//! let evaluation = schema.evaluate(&json!({"name": 42}));
//! for entry in evaluation.iter_errors() {
//!     println!("{}: {}", entry.node.instance_location(), entry.error.message());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! References between documents are resolved regardless of compilation order: a `$ref` to a
//! document that is not compiled yet is recorded and starts resolving as soon as that document
//! is registered.
//!
//! ```rust
//! use jsonschema::Registry;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Registry::new();
//! let user = registry.compile(
//!     &json!({"$id": "http://example.com/user.json", "$ref": "name.json"}),
//!     None,
//! )?;
//! assert_eq!(
//!     registry.unresolved_references(&user),
//!     vec!["http://example.com/name.json".to_string()]
//! );
//! registry.compile(
//!     &json!({"$id": "http://example.com/name.json", "type": "string"}),
//!     None,
//! )?;
//! assert!(user.is_valid(&json!("Alice")));
//! # Ok(())
//! # }
//! ```
mod compiler;
mod error;
mod evaluator;
mod formats;
mod keywords;
mod node;
mod options;
mod output;
mod paths;
mod regex;
mod registry;
mod resolver;
mod schema;
mod scope;
mod tracing;
mod types;

pub use error::{CompileError, ValidationError};
pub use formats::Format;
pub use jsonschema_ir::{JsonCodec, JsonValue, Map, Number};
pub use options::RegistryOptions;
pub use output::{
    AnnotationEntry, ErrorEntry, Evaluation, EvaluationNode, FlagOutput, HierarchicalOutput,
    ListAnnotation, ListError, ListOutput,
};
pub use paths::{Location, LocationSegment};
pub use referencing::{Retrieve, Url};
pub use regex::{FancyRegex, PatternEngine, PatternOptions, StandardRegex};
pub use registry::Registry;
pub use schema::Schema;
pub use tracing::{NodeEvaluationResult, TracingCallback, TracingContext};
pub use types::{JsonType, JsonTypeSet};

/// Compile `schema` into a fresh registry with default options.
///
/// # Errors
///
/// See [`Registry::compile`].
pub fn schema_for(schema: impl Into<JsonValue>) -> Result<Schema, CompileError> {
    Registry::new().compile(schema, None)
}

/// Configure a registry, the same as [`Registry::options`].
#[must_use]
pub fn options() -> RegistryOptions {
    Registry::options()
}

/// Whether `instance` is valid under `schema`.
///
/// # Panics
///
/// If `schema` does not compile. Use [`schema_for`] to handle that case.
#[must_use]
pub fn is_valid(schema: impl Into<JsonValue>, instance: impl Into<JsonValue>) -> bool {
    schema_for(schema)
        .expect("Invalid schema")
        .is_valid(instance)
}
