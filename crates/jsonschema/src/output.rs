//! Evaluation results and their output projections.
//!
//! Every evaluation produces one [`EvaluationNode`] tree. The `flag`, `list` and
//! `hierarchical` projections are computed from that tree without evaluating again.
use std::sync::Arc;

use jsonschema_ir::{JsonValue, Map};
use serde::Serialize;

use crate::{error::ValidationError, paths::Location};

/// Outcome of evaluating one schema node against one instance location.
#[derive(Debug, Clone)]
pub struct EvaluationNode {
    pub(crate) valid: bool,
    pub(crate) evaluation_path: Location,
    pub(crate) schema_location: Arc<str>,
    pub(crate) instance_location: Location,
    pub(crate) errors: Vec<ValidationError>,
    pub(crate) annotations: Vec<(String, JsonValue)>,
    pub(crate) children: Vec<EvaluationNode>,
}

impl EvaluationNode {
    pub(crate) fn new(
        evaluation_path: Location,
        schema_location: Arc<str>,
        instance_location: Location,
    ) -> EvaluationNode {
        EvaluationNode {
            valid: true,
            evaluation_path,
            schema_location,
            instance_location,
            errors: Vec::new(),
            annotations: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Drop annotations of this node and its whole subtree.
    pub(crate) fn drop_annotations(&mut self) {
        self.annotations.clear();
        for child in &mut self.children {
            child.drop_annotations();
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }
    /// Keywords traversed from the evaluation root, including `$ref` hops.
    #[must_use]
    pub fn evaluation_path(&self) -> &Location {
        &self.evaluation_path
    }
    /// Absolute URI of the schema node, e.g. `http://example.com/s.json#/properties/a`.
    #[must_use]
    pub fn schema_location(&self) -> &str {
        &self.schema_location
    }
    #[must_use]
    pub fn instance_location(&self) -> &Location {
        &self.instance_location
    }
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }
    #[must_use]
    pub fn annotations(&self) -> &[(String, JsonValue)] {
        &self.annotations
    }
    /// Annotation emitted by `keyword` at this node.
    #[must_use]
    pub fn annotation(&self, keyword: &str) -> Option<&JsonValue> {
        self.annotations
            .iter()
            .find(|(name, _)| name == keyword)
            .map(|(_, value)| value)
    }
    #[must_use]
    pub fn children(&self) -> &[EvaluationNode] {
        &self.children
    }
}

/// The result of [`crate::Schema::evaluate`].
#[derive(Debug, Clone)]
pub struct Evaluation {
    root: EvaluationNode,
}

/// An error together with the node that produced it.
#[derive(Debug, Clone, Copy)]
pub struct ErrorEntry<'a> {
    pub node: &'a EvaluationNode,
    pub error: &'a ValidationError,
}

/// An annotation together with the node that produced it.
#[derive(Debug, Clone, Copy)]
pub struct AnnotationEntry<'a> {
    pub node: &'a EvaluationNode,
    pub keyword: &'a str,
    pub value: &'a JsonValue,
}

impl Evaluation {
    pub(crate) fn new(root: EvaluationNode) -> Evaluation {
        Evaluation { root }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.root.valid
    }

    #[must_use]
    pub fn root(&self) -> &EvaluationNode {
        &self.root
    }

    /// Every error, depth-first in evaluation order.
    pub fn iter_errors(&self) -> impl Iterator<Item = ErrorEntry<'_>> {
        let mut entries = Vec::new();
        collect_errors(&self.root, &mut entries);
        entries.into_iter()
    }

    /// Every annotation of valid nodes, depth-first in evaluation order.
    pub fn iter_annotations(&self) -> impl Iterator<Item = AnnotationEntry<'_>> {
        let mut entries = Vec::new();
        collect_annotations(&self.root, &mut entries);
        entries.into_iter()
    }

    #[must_use]
    pub fn flag(&self) -> FlagOutput {
        FlagOutput {
            valid: self.is_valid(),
        }
    }

    #[must_use]
    pub fn list(&self) -> ListOutput {
        ListOutput {
            valid: self.is_valid(),
            errors: self
                .iter_errors()
                .map(|entry| ListError {
                    evaluation_path: entry.node.evaluation_path.to_string(),
                    schema_location: entry.node.schema_location.to_string(),
                    instance_location: entry.node.instance_location.to_string(),
                    keyword: entry.error.keyword(),
                    code: entry.error.code(),
                    error: entry.error.message(),
                })
                .collect(),
            annotations: self
                .iter_annotations()
                .map(|entry| ListAnnotation {
                    evaluation_path: entry.node.evaluation_path.to_string(),
                    schema_location: entry.node.schema_location.to_string(),
                    instance_location: entry.node.instance_location.to_string(),
                    keyword: entry.keyword.to_string(),
                    value: entry.value.clone(),
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn hierarchical(&self) -> HierarchicalOutput {
        HierarchicalOutput::from_node(&self.root)
    }
}

fn collect_errors<'a>(node: &'a EvaluationNode, out: &mut Vec<ErrorEntry<'a>>) {
    out.extend(node.errors.iter().map(|error| ErrorEntry { node, error }));
    for child in &node.children {
        collect_errors(child, out);
    }
}

fn collect_annotations<'a>(node: &'a EvaluationNode, out: &mut Vec<AnnotationEntry<'a>>) {
    if !node.valid {
        return;
    }
    out.extend(node.annotations.iter().map(|(keyword, value)| AnnotationEntry {
        node,
        keyword,
        value,
    }));
    for child in &node.children {
        collect_annotations(child, out);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagOutput {
    pub valid: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListOutput {
    pub valid: bool,
    pub errors: Vec<ListError>,
    pub annotations: Vec<ListAnnotation>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListError {
    pub evaluation_path: String,
    pub schema_location: String,
    pub instance_location: String,
    pub keyword: &'static str,
    pub code: &'static str,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAnnotation {
    pub evaluation_path: String,
    pub schema_location: String,
    pub instance_location: String,
    pub keyword: String,
    pub value: JsonValue,
}

/// Nested output mirroring the evaluation tree.
///
/// `errors` maps keywords to messages; several errors from the same keyword are joined with
/// `"; "`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchicalOutput {
    pub valid: bool,
    pub evaluation_path: String,
    pub schema_location: String,
    pub instance_location: String,
    #[serde(skip_serializing_if = "is_empty_object")]
    pub errors: JsonValue,
    #[serde(skip_serializing_if = "is_empty_object")]
    pub annotations: JsonValue,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<HierarchicalOutput>,
}

fn is_empty_object(value: &JsonValue) -> bool {
    value.as_object().is_some_and(Map::is_empty)
}

impl HierarchicalOutput {
    fn from_node(node: &EvaluationNode) -> HierarchicalOutput {
        let mut errors: Map = Map::default();
        for error in &node.errors {
            let message = error.message();
            match errors.get_mut(error.keyword()) {
                Some(JsonValue::String(existing)) => {
                    existing.push_str("; ");
                    existing.push_str(&message);
                }
                _ => {
                    errors.insert(error.keyword().to_string(), JsonValue::String(message));
                }
            }
        }
        let mut annotations: Map = Map::default();
        for (keyword, value) in &node.annotations {
            annotations.insert(keyword.clone(), value.clone());
        }
        HierarchicalOutput {
            valid: node.valid,
            evaluation_path: node.evaluation_path.to_string(),
            schema_location: node.schema_location.to_string(),
            instance_location: node.instance_location.to_string(),
            errors: JsonValue::Object(errors),
            annotations: JsonValue::Object(annotations),
            details: node.children.iter().map(HierarchicalOutput::from_node).collect(),
        }
    }
}
