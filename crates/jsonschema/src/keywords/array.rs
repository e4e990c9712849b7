//! Array keywords.
use ahash::AHashSet;
use jsonschema_ir::JsonValue;

use crate::{
    error::ValidationError,
    evaluator::{Evaluator, Input, Output},
};

/// Below this size pairwise comparison beats hashing.
const ITEMS_SIZE_THRESHOLD: usize = 16;

pub(super) fn evaluate<'i>(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, 'i>,
    output: &mut Output<'i>,
) {
    let keywords = input.keywords;
    let Some(items) = input.instance.as_array() else {
        super::ignore(
            ev,
            input,
            &[
                ("maxItems", keywords.max_items.is_some()),
                ("minItems", keywords.min_items.is_some()),
                ("uniqueItems", keywords.unique_items.is_some()),
                ("prefixItems", keywords.prefix_items.is_some()),
                ("items", keywords.items.is_some()),
                ("contains", keywords.contains.is_some()),
            ],
        );
        return;
    };
    counts(ev, input, output, items);
    prefix_items(ev, input, output, items);
    rest_items(ev, input, output, items);
    contains(ev, input, output, items);
}

fn counts(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, '_>,
    output: &mut Output<'_>,
    items: &[JsonValue],
) {
    let keywords = input.keywords;
    let size = items.len() as u64;
    if let Some(limit) = keywords.max_items {
        let valid = size <= limit;
        if !valid {
            output.fail(ValidationError::max_items(input.instance, limit));
        }
        ev.trace(input, "maxItems", valid);
    }
    if let Some(limit) = keywords.min_items {
        let valid = size >= limit;
        if !valid {
            output.fail(ValidationError::min_items(input.instance, limit));
        }
        ev.trace(input, "minItems", valid);
    }
    if keywords.unique_items == Some(true) {
        // Items past `prefixItems` can not exist when `items` is `false`
        let scope = match (keywords.items, &keywords.prefix_items) {
            (Some(rest), Some(prefix)) if ev.is_false(input.target.sibling(rest)) => {
                &items[..prefix.len().min(items.len())]
            }
            _ => items,
        };
        let valid = is_unique(scope);
        if !valid {
            output.fail(ValidationError::unique_items(input.instance));
        }
        ev.trace(input, "uniqueItems", valid);
    }
}

fn is_unique(items: &[JsonValue]) -> bool {
    if items.len() <= ITEMS_SIZE_THRESHOLD {
        for (idx, item) in items.iter().enumerate() {
            if items[idx + 1..].iter().any(|other| other == item) {
                return false;
            }
        }
        true
    } else {
        let mut seen = AHashSet::with_capacity(items.len());
        items.iter().all(|item| seen.insert(item))
    }
}

fn prefix_items<'i>(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, 'i>,
    output: &mut Output<'i>,
    items: &'i [JsonValue],
) {
    let Some(prefix) = &input.keywords.prefix_items else {
        return;
    };
    let path = input.evaluation_path.join("prefixItems");
    let mut valid = true;
    for (idx, (child, item)) in prefix.iter().zip(items).enumerate() {
        let outcome = ev.descend(
            input,
            *child,
            item,
            &input.instance_location.join(idx),
            path.join(idx),
        );
        valid &= outcome.unit.is_valid();
        output.attach(outcome.unit);
        output.evaluated.items.insert(idx);
    }
    let annotation = if prefix.len() >= items.len() {
        JsonValue::Bool(true)
    } else {
        JsonValue::from(prefix.len().saturating_sub(1))
    };
    output.annotate("prefixItems", annotation);
    ev.trace(input, "prefixItems", valid);
}

fn rest_items<'i>(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, 'i>,
    output: &mut Output<'i>,
    items: &'i [JsonValue],
) {
    let Some(child) = input.keywords.items else {
        return;
    };
    let start = input
        .keywords
        .prefix_items
        .as_ref()
        .map_or(0, Vec::len);
    if ev.is_false(input.target.sibling(child)) {
        let valid = items.len() <= start;
        if !valid {
            output.fail(ValidationError::additional_items(input.instance, start));
        }
        ev.trace(input, "items", valid);
        return;
    }
    let path = input.evaluation_path.join("items");
    let mut valid = true;
    for (idx, item) in items.iter().enumerate().skip(start) {
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
    if items.len() > start {
        output.annotate("items", JsonValue::Bool(true));
    }
    ev.trace(input, "items", valid);
}

fn contains<'i>(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, 'i>,
    output: &mut Output<'i>,
    items: &'i [JsonValue],
) {
    let keywords = input.keywords;
    let Some(child) = keywords.contains else {
        super::ignore(
            ev,
            input,
            &[
                ("minContains", keywords.min_contains.is_some()),
                ("maxContains", keywords.max_contains.is_some()),
            ],
        );
        return;
    };
    let path = input.evaluation_path.join("contains");
    let mut matched = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        let outcome = ev.descend(
            input,
            child,
            item,
            &input.instance_location.join(idx),
            path.clone(),
        );
        // Non-matching items are expected and say nothing about the result
        if outcome.unit.is_valid() {
            output.attach(outcome.unit);
            output.evaluated.items.insert(idx);
            matched.push(JsonValue::from(idx));
        }
    }
    let count = matched.len() as u64;
    let minimum = keywords.min_contains.unwrap_or(1);
    let mut valid = true;
    if count < minimum {
        valid = false;
        output.fail(match keywords.min_contains {
            Some(limit) => ValidationError::min_contains(input.instance, limit),
            None => ValidationError::contains(input.instance),
        });
    }
    if keywords.min_contains.is_some() {
        ev.trace(input, "minContains", count >= minimum);
    }
    if let Some(limit) = keywords.max_contains {
        let within = count <= limit;
        if !within {
            valid = false;
            output.fail(ValidationError::max_contains(input.instance, limit));
        }
        ev.trace(input, "maxContains", within);
    }
    output.annotate("contains", JsonValue::Array(matched));
    ev.trace(input, "contains", valid);
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::is_unique;
    use crate::Registry;

    #[test_case(&json!([1, 2, 3]), true)]
    #[test_case(&json!([[1], [1.0]]), false)]
    #[test_case(&json!([{"a": [1]}, {"a": [2]}]), true)]
    #[test_case(&json!([null, false, 0, ""]), true)]
    fn uniqueness(items: &serde_json::Value, expected: bool) {
        let value = jsonschema_ir::JsonValue::from(items);
        let items = value.as_array().expect("Array");
        assert_eq!(is_unique(items), expected);
    }

    #[test]
    fn unique_items_ignores_forbidden_tail() {
        let registry = Registry::new();
        let schema = registry
            .compile(
                &json!({"prefixItems": [{}, {}], "items": false, "uniqueItems": true}),
                None,
            )
            .expect("Valid schema");
        let evaluation = schema.evaluate(&json!([1, 2, 1]));
        let codes: Vec<_> = evaluation
            .iter_errors()
            .map(|entry| entry.error.code())
            .collect();
        assert_eq!(codes, vec!["additional_items"]);
    }

    #[test_case(&json!({"contains": {"const": 1}}), &json!([0]), "contains_none")]
    #[test_case(&json!({"contains": {"const": 1}, "minContains": 2}), &json!([0, 1]), "contains_too_few")]
    #[test_case(&json!({"contains": {"const": 1}, "maxContains": 1}), &json!([1, 1]), "contains_too_many")]
    fn contains_error_codes(schema: &serde_json::Value, instance: &serde_json::Value, code: &str) {
        let registry = Registry::new();
        let schema = registry.compile(schema, None).expect("Valid schema");
        let evaluation = schema.evaluate(instance);
        let codes: Vec<_> = evaluation
            .iter_errors()
            .map(|entry| entry.error.code())
            .collect();
        assert_eq!(codes, vec![code]);
    }

    #[test]
    fn contains_keeps_only_matching_items() {
        let registry = Registry::new();
        let schema = registry
            .compile(&json!({"contains": {"type": "string"}}), None)
            .expect("Valid schema");
        let evaluation = schema.evaluate(&json!([1, "a", 2, "b"]));
        assert!(evaluation.is_valid());
        let locations: Vec<_> = evaluation
            .root()
            .children()
            .iter()
            .map(|child| child.instance_location().as_str().to_string())
            .collect();
        assert_eq!(locations, vec!["/1".to_string(), "/3".to_string()]);
        assert_eq!(
            evaluation.root().annotation("contains"),
            Some(&jsonschema_ir::JsonValue::from(vec![1_u64, 3]))
        );
    }

    #[test]
    fn prefix_items_annotation() {
        let registry = Registry::new();
        let schema = registry
            .compile(&json!({"prefixItems": [{}, {}]}), None)
            .expect("Valid schema");
        let partial = schema.evaluate(&json!([1, 2, 3]));
        assert_eq!(
            partial.root().annotation("prefixItems"),
            Some(&jsonschema_ir::JsonValue::from(1_u64))
        );
        let full = schema.evaluate(&json!([1]));
        assert_eq!(
            full.root().annotation("prefixItems"),
            Some(&jsonschema_ir::JsonValue::Bool(true))
        );
    }
}
