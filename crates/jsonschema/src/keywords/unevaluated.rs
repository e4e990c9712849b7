//! `unevaluatedProperties` and `unevaluatedItems`.
//!
//! Both run after every other keyword of the node, so `output.evaluated` already holds what the
//! adjacent keywords and their valid in-place subschemas evaluated.
use jsonschema_ir::JsonValue;

use crate::{
    error::ValidationError,
    evaluator::{Evaluator, Input, Output},
    node::NodeId,
};

pub(super) fn evaluate<'i>(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, 'i>,
    output: &mut Output<'i>,
) {
    let keywords = input.keywords;
    match input.instance {
        JsonValue::Object(object) => {
            if let Some(child) = keywords.unevaluated_properties {
                let rest: Vec<(&'i str, &'i JsonValue)> = object
                    .iter()
                    .map(|(name, value)| (name.as_str(), value))
                    .filter(|(name, _)| !output.evaluated.properties.contains(name))
                    .collect();
                properties(ev, input, output, child, rest);
            }
            super::ignore(
                ev,
                input,
                &[("unevaluatedItems", keywords.unevaluated_items.is_some())],
            );
        }
        JsonValue::Array(items) => {
            if let Some(child) = keywords.unevaluated_items {
                let rest: Vec<(usize, &'i JsonValue)> = items
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| !output.evaluated.items.contains(idx))
                    .collect();
                self::items(ev, input, output, child, rest);
            }
            super::ignore(
                ev,
                input,
                &[(
                    "unevaluatedProperties",
                    keywords.unevaluated_properties.is_some(),
                )],
            );
        }
        _ => super::ignore(
            ev,
            input,
            &[
                (
                    "unevaluatedProperties",
                    keywords.unevaluated_properties.is_some(),
                ),
                ("unevaluatedItems", keywords.unevaluated_items.is_some()),
            ],
        ),
    }
}

fn properties<'i>(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, 'i>,
    output: &mut Output<'i>,
    child: NodeId,
    rest: Vec<(&'i str, &'i JsonValue)>,
) {
    if ev.is_false(input.target.sibling(child)) {
        let valid = rest.is_empty();
        if !valid {
            output.fail(ValidationError::unevaluated_properties(
                input.instance,
                rest.iter().map(|(name, _)| JsonValue::from(*name)).collect(),
            ));
        }
        ev.trace(input, "unevaluatedProperties", valid);
        return;
    }
    let path = input.evaluation_path.join("unevaluatedProperties");
    let mut valid = true;
    let mut matched = Vec::with_capacity(rest.len());
    for (name, value) in rest {
        let outcome = ev.descend(
            input,
            child,
            value,
            &input.instance_location.join(name),
            path.clone(),
        );
        valid &= outcome.unit.is_valid();
        output.attach(outcome.unit);
        output.evaluated.properties.insert(name);
        matched.push(JsonValue::from(name));
    }
    output.annotate("unevaluatedProperties", JsonValue::Array(matched));
    ev.trace(input, "unevaluatedProperties", valid);
}

fn items<'i>(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, 'i>,
    output: &mut Output<'i>,
    child: NodeId,
    rest: Vec<(usize, &'i JsonValue)>,
) {
    if ev.is_false(input.target.sibling(child)) {
        let valid = rest.is_empty();
        if !valid {
            output.fail(ValidationError::unevaluated_items(
                input.instance,
                rest.iter().map(|(_, item)| (*item).clone()).collect(),
            ));
        }
        ev.trace(input, "unevaluatedItems", valid);
        return;
    }
    let path = input.evaluation_path.join("unevaluatedItems");
    let mut valid = true;
    let applied = !rest.is_empty();
    for (idx, item) in rest {
        let outcome = ev.descend(
            input,
            child,
            item,
            &input.instance_location.join(idx),
            path.clone(),
        );
        valid &= outcome.unit.is_valid();
        output.attach(outcome.unit);
        output.evaluated.items.insert(idx);
    }
    if applied {
        output.annotate("unevaluatedItems", JsonValue::Bool(true));
    }
    ev.trace(input, "unevaluatedItems", valid);
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::Registry;

    #[test]
    fn reports_every_unevaluated_property() {
        let registry = Registry::new();
        let schema = registry
            .compile(
                &json!({"properties": {"a": {}}, "unevaluatedProperties": false}),
                None,
            )
            .expect("Valid schema");
        let evaluation = schema.evaluate(&json!({"a": 1, "b": 2, "c": 3}));
        let error = evaluation.iter_errors().next().expect("Invalid instance");
        assert_eq!(error.error.code(), "unevaluated_properties");
        assert_eq!(
            error.error.param("unexpected"),
            Some(&jsonschema_ir::JsonValue::from(vec!["b", "c"]))
        );
    }

    #[test]
    fn sees_through_references() {
        let registry = Registry::new();
        let schema = registry
            .compile(
                &json!({
                    "$defs": {"base": {"properties": {"a": {}}}},
                    "$ref": "#/$defs/base",
                    "unevaluatedProperties": false
                }),
                None,
            )
            .expect("Valid schema");
        assert!(schema.is_valid(&json!({"a": 1})));
        assert!(!schema.is_valid(&json!({"a": 1, "b": 2})));
    }

    #[test]
    fn failed_branches_do_not_count() {
        let registry = Registry::new();
        let schema = registry
            .compile(
                &json!({
                    "oneOf": [
                        {"properties": {"a": {"type": "string"}}, "required": ["a"]},
                        {"properties": {"b": {}}, "required": ["b"]}
                    ],
                    "unevaluatedProperties": false
                }),
                None,
            )
            .expect("Valid schema");
        assert!(schema.is_valid(&json!({"b": 1})));
        assert!(!schema.is_valid(&json!({"a": 1, "b": 1})));
    }

    #[test]
    fn nested_unevaluated_items() {
        let registry = Registry::new();
        let schema = registry
            .compile(
                &json!({
                    "prefixItems": [{"type": "string"}],
                    "unevaluatedItems": {"type": "integer"}
                }),
                None,
            )
            .expect("Valid schema");
        assert!(schema.is_valid(&json!(["a", 1, 2])));
        assert!(!schema.is_valid(&json!(["a", "b"])));
    }
}
