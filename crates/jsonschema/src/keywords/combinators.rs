//! `allOf`, `anyOf`, `oneOf` and `not`.
//!
//! Branches are always evaluated in full so that every valid branch contributes what it
//! evaluated. Only branches that explain the result are kept in the output tree.
use jsonschema_ir::JsonValue;

use crate::{
    error::ValidationError,
    evaluator::{Evaluator, Input, Outcome, Output},
    node::NodeId,
};

pub(super) fn evaluate<'i>(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, 'i>,
    output: &mut Output<'i>,
) {
    let keywords = input.keywords;
    if let Some(branches) = &keywords.all_of {
        all_of(ev, input, output, branches);
    }
    if let Some(branches) = &keywords.any_of {
        any_of(ev, input, output, branches);
    }
    if let Some(branches) = &keywords.one_of {
        one_of(ev, input, output, branches);
    }
    if let Some(child) = keywords.not {
        not(ev, input, output, child);
    }
}

fn branches<'i>(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, 'i>,
    keyword: &str,
    branches: &[NodeId],
) -> Vec<Outcome<'i>> {
    let path = input.evaluation_path.join(keyword);
    branches
        .iter()
        .enumerate()
        .map(|(idx, child)| ev.in_place(input, *child, path.join(idx)))
        .collect()
}

fn all_of<'i>(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, 'i>,
    output: &mut Output<'i>,
    children: &[NodeId],
) {
    let mut failed = Vec::new();
    for (idx, outcome) in branches(ev, input, "allOf", children)
        .into_iter()
        .enumerate()
    {
        if !outcome.unit.is_valid() {
            failed.push(JsonValue::from(idx));
        }
        output.apply(outcome);
    }
    let valid = failed.is_empty();
    if !valid {
        output.fail(ValidationError::all_of(input.instance, failed));
    }
    ev.trace(input, "allOf", valid);
}

fn any_of<'i>(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, 'i>,
    output: &mut Output<'i>,
    children: &[NodeId],
) {
    let outcomes = branches(ev, input, "anyOf", children);
    let valid = outcomes.iter().any(|outcome| outcome.unit.is_valid());
    if valid {
        for outcome in outcomes {
            if outcome.unit.is_valid() {
                output.apply(outcome);
            }
        }
    } else {
        for outcome in outcomes {
            output.attach(outcome.unit);
        }
        output.fail(ValidationError::any_of(input.instance));
    }
    ev.trace(input, "anyOf", valid);
}

fn one_of<'i>(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, 'i>,
    output: &mut Output<'i>,
    children: &[NodeId],
) {
    let outcomes = branches(ev, input, "oneOf", children);
    let matched: Vec<usize> = outcomes
        .iter()
        .enumerate()
        .filter(|(_, outcome)| outcome.unit.is_valid())
        .map(|(idx, _)| idx)
        .collect();
    match matched.len() {
        1 => {
            for outcome in outcomes {
                if outcome.unit.is_valid() {
                    output.apply(outcome);
                }
            }
        }
        0 => {
            for outcome in outcomes {
                output.attach(outcome.unit);
            }
            output.fail(ValidationError::one_of_not_valid(input.instance));
        }
        _ => {
            for outcome in outcomes {
                if outcome.unit.is_valid() {
                    output.attach(outcome.unit);
                }
            }
            output.fail(ValidationError::one_of_multiple_valid(
                input.instance,
                matched.iter().copied().map(JsonValue::from).collect(),
            ));
        }
    }
    ev.trace(input, "oneOf", matched.len() == 1);
}

fn not<'i>(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, 'i>,
    output: &mut Output<'i>,
    child: NodeId,
) {
    let outcome = ev.in_place(input, child, input.evaluation_path.join("not"));
    // What the negated schema evaluated never counts as evaluated
    let valid = !outcome.unit.is_valid();
    if !valid {
        output.attach(outcome.unit);
        output.fail(ValidationError::not(input.instance));
    }
    ev.trace(input, "not", valid);
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::Registry;

    #[test]
    fn any_of_keeps_only_valid_branches() {
        let registry = Registry::new();
        let schema = registry
            .compile(
                &json!({"anyOf": [{"type": "string"}, {"type": "integer", "title": "int"}]}),
                None,
            )
            .expect("Valid schema");
        let evaluation = schema.evaluate(&json!(1));
        assert!(evaluation.is_valid());
        let children = evaluation.root().children();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].evaluation_path().as_str(), "/anyOf/1");
        assert_eq!(evaluation.iter_errors().count(), 0);
    }

    #[test]
    fn any_of_reports_every_branch_on_failure() {
        let registry = Registry::new();
        let schema = registry
            .compile(&json!({"anyOf": [{"type": "string"}, {"minimum": 5}]}), None)
            .expect("Valid schema");
        let evaluation = schema.evaluate(&json!(1));
        let codes: Vec<_> = evaluation
            .iter_errors()
            .map(|entry| entry.error.code())
            .collect();
        assert_eq!(codes.len(), 3);
        assert!(codes.contains(&"any_of_none"));
        assert!(codes.contains(&"type_mismatch"));
    }

    #[test]
    fn one_of_reports_matched_branches() {
        let registry = Registry::new();
        let schema = registry
            .compile(&json!({"oneOf": [{"type": "integer"}, {"minimum": 0}, {"type": "string"}]}), None)
            .expect("Valid schema");
        let evaluation = schema.evaluate(&json!(3));
        let error = evaluation
            .iter_errors()
            .find(|entry| entry.error.code() == "one_of_multiple")
            .expect("oneOf must fail");
        assert_eq!(
            error.error.param("matched"),
            Some(&jsonschema_ir::JsonValue::from(vec![0_u64, 1]))
        );
        assert_eq!(evaluation.root().children().len(), 2);
    }

    #[test]
    fn one_of_without_matches_reports_every_branch() {
        let registry = Registry::new();
        let schema = registry
            .compile(&json!({"oneOf": [{"type": "string"}, {"type": "null"}]}), None)
            .expect("Valid schema");
        let evaluation = schema.evaluate(&json!(1));
        assert!(!evaluation.is_valid());
        let codes: Vec<_> = evaluation
            .iter_errors()
            .map(|entry| entry.error.code())
            .collect();
        assert!(codes.contains(&"one_of_none"));
        assert!(!codes.contains(&"one_of_multiple"));
        let paths: Vec<_> = evaluation
            .root()
            .children()
            .iter()
            .map(|child| child.evaluation_path().as_str().to_string())
            .collect();
        assert_eq!(paths, vec!["/oneOf/0", "/oneOf/1"]);
    }

    #[test]
    fn not_drops_invalid_child() {
        let registry = Registry::new();
        let schema = registry
            .compile(&json!({"not": {"type": "string"}}), None)
            .expect("Valid schema");
        let evaluation = schema.evaluate(&json!(1));
        assert!(evaluation.is_valid());
        assert!(evaluation.root().children().is_empty());
    }

    #[test]
    fn all_of_lists_failed_indices() {
        let registry = Registry::new();
        let schema = registry
            .compile(&json!({"allOf": [{"minimum": 0}, {"maximum": 1}, {"type": "string"}]}), None)
            .expect("Valid schema");
        let evaluation = schema.evaluate(&json!(5));
        let error = evaluation
            .iter_errors()
            .find(|entry| entry.error.code() == "all_of_failed")
            .expect("allOf must fail");
        assert_eq!(
            error.error.param("failed"),
            Some(&jsonschema_ir::JsonValue::from(vec![1_u64, 2]))
        );
    }
}
