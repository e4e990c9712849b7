//! Recursive evaluation of a schema graph against an instance.
use std::sync::Arc;

use ahash::AHashSet;
use jsonschema_ir::JsonValue;
use referencing::{Error, Url};

use crate::{
    error::ValidationError,
    keywords,
    node::{Keywords, NodeId, SchemaBody, SchemaNode, SchemaRef},
    options::Config,
    output::EvaluationNode,
    paths::Location,
    registry::RegistryState,
    resolver::{self, Corpus},
    scope::DynamicScope,
    tracing::{NodeEvaluationResult, TracingCallback, TracingContext},
};

/// Object keys and array indices of the current instance judged valid by some keyword.
#[derive(Debug, Default)]
pub(crate) struct Evaluated<'i> {
    pub(crate) properties: AHashSet<&'i str>,
    pub(crate) items: AHashSet<usize>,
}

impl<'i> Evaluated<'i> {
    fn merge(&mut self, other: Evaluated<'i>) {
        self.properties.extend(other.properties);
        self.items.extend(other.items);
    }
}

/// Result of evaluating one node: the output subtree plus what it evaluated in place.
pub(crate) struct Outcome<'i> {
    pub(crate) unit: EvaluationNode,
    pub(crate) evaluated: Evaluated<'i>,
}

/// Everything the keywords of one node look at.
pub(crate) struct Input<'a, 'i> {
    pub(crate) target: SchemaRef,
    pub(crate) node: &'a SchemaNode,
    pub(crate) keywords: &'a Keywords,
    pub(crate) instance: &'i JsonValue,
    pub(crate) instance_location: &'a Location,
    pub(crate) evaluation_path: &'a Location,
}

/// The node result under construction.
pub(crate) struct Output<'i> {
    pub(crate) unit: EvaluationNode,
    pub(crate) evaluated: Evaluated<'i>,
}

impl<'i> Output<'i> {
    pub(crate) fn fail(&mut self, error: ValidationError) {
        self.unit.valid = false;
        self.unit.errors.push(error);
    }

    pub(crate) fn annotate(&mut self, keyword: &str, value: JsonValue) {
        self.unit.annotations.push((keyword.to_string(), value));
    }

    /// Attach a child result. A failing child fails this node.
    pub(crate) fn attach(&mut self, child: EvaluationNode) {
        if !child.valid {
            self.unit.valid = false;
        }
        self.unit.children.push(child);
    }

    /// Attach the result of a subschema applied to the same instance, merging what it evaluated
    /// when it is valid.
    pub(crate) fn apply(&mut self, outcome: Outcome<'i>) {
        if outcome.unit.valid {
            self.evaluated.merge(outcome.evaluated);
        }
        self.attach(outcome.unit);
    }

    fn finish(mut self) -> Outcome<'i> {
        if self.unit.valid {
            Outcome {
                unit: self.unit,
                evaluated: self.evaluated,
            }
        } else {
            self.unit.drop_annotations();
            Outcome {
                unit: self.unit,
                evaluated: Evaluated::default(),
            }
        }
    }
}

/// State of one evaluation call. Never shared between calls.
pub(crate) struct Evaluator<'s, 't> {
    state: &'s RegistryState,
    scope: DynamicScope,
    /// `(schema, instance address)` pairs entered through a reference and not yet left.
    active: AHashSet<(SchemaRef, usize)>,
    tracer: Option<TracingCallback<'t>>,
}

impl<'s, 't> Evaluator<'s, 't> {
    pub(crate) fn new(state: &'s RegistryState) -> Self {
        Evaluator {
            state,
            scope: DynamicScope::new(),
            active: AHashSet::new(),
            tracer: None,
        }
    }

    pub(crate) fn with_tracer(state: &'s RegistryState, tracer: TracingCallback<'t>) -> Self {
        Evaluator {
            tracer: Some(tracer),
            ..Evaluator::new(state)
        }
    }

    pub(crate) fn evaluate_root(&mut self, root: SchemaRef, instance: &JsonValue) -> EvaluationNode {
        let key = reference_key(root, instance);
        self.active.insert(key);
        let outcome = self.evaluate(root, instance, &Location::new(), Location::new());
        self.active.remove(&key);
        outcome.unit
    }

    pub(crate) fn evaluate<'i>(
        &mut self,
        target: SchemaRef,
        instance: &'i JsonValue,
        instance_location: &Location,
        evaluation_path: Location,
    ) -> Outcome<'i> {
        let state = self.state;
        let Some(node) = state.node(target) else {
            let mut unit =
                EvaluationNode::new(evaluation_path, Arc::from(""), instance_location.clone());
            unit.valid = false;
            unit.errors
                .push(ValidationError::internal("$ref", "Schema node does not exist"));
            return Outcome {
                unit,
                evaluated: Evaluated::default(),
            };
        };
        let mut output = Output {
            unit: EvaluationNode::new(
                evaluation_path,
                Arc::clone(&node.absolute),
                instance_location.clone(),
            ),
            evaluated: Evaluated::default(),
        };
        match &node.body {
            SchemaBody::Bool(true) => {}
            SchemaBody::Bool(false) => {
                output.fail(ValidationError::false_schema(instance));
                self.trace_node(node, instance_location, "false", false);
            }
            SchemaBody::Keywords(keywords) => {
                let entered = self.scope.enter(&node.base, target);
                let evaluation_path = output.unit.evaluation_path.clone();
                let input = Input {
                    target,
                    node,
                    keywords,
                    instance,
                    instance_location,
                    evaluation_path: &evaluation_path,
                };
                keywords::evaluate(self, &input, &mut output);
                if entered {
                    self.scope.pop();
                }
            }
        }
        output.finish()
    }

    /// Apply a subschema of the current node to the same instance.
    pub(crate) fn in_place<'i>(
        &mut self,
        input: &Input<'_, 'i>,
        child: NodeId,
        evaluation_path: Location,
    ) -> Outcome<'i> {
        self.evaluate(
            input.target.sibling(child),
            input.instance,
            input.instance_location,
            evaluation_path,
        )
    }

    /// Apply a subschema of the current node to a part of the instance.
    pub(crate) fn descend<'j>(
        &mut self,
        input: &Input<'_, '_>,
        child: NodeId,
        instance: &'j JsonValue,
        instance_location: &Location,
        evaluation_path: Location,
    ) -> Outcome<'j> {
        self.evaluate(
            input.target.sibling(child),
            instance,
            instance_location,
            evaluation_path,
        )
    }

    pub(crate) fn config(&self) -> &'s Config {
        &self.state.config
    }

    pub(crate) fn is_false(&self, target: SchemaRef) -> bool {
        self.state.node(target).is_some_and(SchemaNode::is_false)
    }

    pub(crate) fn lookup(&self, target: &Url) -> Result<SchemaRef, Error> {
        self.state.lookup(target)
    }

    pub(crate) fn resolve_dynamic(&self, target: &Url) -> Result<SchemaRef, Error> {
        resolver::resolve_dynamic(self.state, &self.scope, target)
    }

    /// Mark a reference target as entered. `false` if it is already being evaluated at the same
    /// instance.
    pub(crate) fn enter_reference(&mut self, target: SchemaRef, instance: &JsonValue) -> bool {
        self.active.insert(reference_key(target, instance))
    }

    pub(crate) fn leave_reference(&mut self, target: SchemaRef, instance: &JsonValue) {
        self.active.remove(&reference_key(target, instance));
    }

    pub(crate) fn trace(
        &mut self,
        input: &Input<'_, '_>,
        keyword: &str,
        result: impl Into<NodeEvaluationResult>,
    ) {
        self.trace_node(input.node, input.instance_location, keyword, result);
    }

    fn trace_node(
        &mut self,
        node: &SchemaNode,
        instance_location: &Location,
        keyword: &str,
        result: impl Into<NodeEvaluationResult>,
    ) {
        if let Some(tracer) = self.tracer.as_mut() {
            let schema_location = format!("{}/{keyword}", node.absolute);
            TracingContext::new(instance_location, &schema_location, keyword, result)
                .call(&mut **tracer);
        }
    }
}

fn reference_key(target: SchemaRef, instance: &JsonValue) -> (SchemaRef, usize) {
    (target, std::ptr::from_ref(instance) as usize)
}
