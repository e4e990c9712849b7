use crate::{
    error::ValidationError,
    evaluator::{Evaluator, Input, Output},
    node::Reference,
};

pub(super) fn evaluate<'i>(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, 'i>,
    output: &mut Output<'i>,
) {
    if let Some(reference) = &input.keywords.reference {
        apply(ev, input, output, "$ref", reference);
    }
    if let Some(reference) = &input.keywords.dynamic_reference {
        apply(ev, input, output, "$dynamicRef", reference);
    }
}

fn apply<'i>(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, 'i>,
    output: &mut Output<'i>,
    keyword: &'static str,
    reference: &Reference,
) {
    let resolved = if keyword == "$dynamicRef" {
        ev.resolve_dynamic(&reference.target)
    } else {
        ev.lookup(&reference.target)
    };
    let target = match resolved {
        Ok(target) => target,
        Err(error) => {
            output.fail(ValidationError::unresolved_reference(
                keyword,
                &reference.raw,
                &error.to_string(),
            ));
            ev.trace(input, keyword, false);
            return;
        }
    };
    if !ev.enter_reference(target, input.instance) {
        output.fail(ValidationError::circular_reference(keyword, &reference.raw));
        ev.trace(input, keyword, false);
        return;
    }
    let outcome = ev.evaluate(
        target,
        input.instance,
        input.instance_location,
        input.evaluation_path.join(keyword),
    );
    ev.leave_reference(target, input.instance);
    ev.trace(input, keyword, outcome.unit.is_valid());
    output.apply(outcome);
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::Registry;

    #[test]
    fn self_reference_without_descent_is_circular() {
        let registry = Registry::new();
        let schema = registry
            .compile(&json!({"$defs": {"a": {"$ref": "#/$defs/a"}}, "$ref": "#/$defs/a"}), None)
            .expect("Valid schema");
        let evaluation = schema.evaluate(&json!(1));
        assert!(!evaluation.is_valid());
        assert!(evaluation
            .iter_errors()
            .any(|entry| entry.error.code() == "circular_reference"));
    }

    #[test]
    fn recursion_through_descent_terminates() {
        let registry = Registry::new();
        let schema = registry
            .compile(
                &json!({
                    "type": "object",
                    "properties": {"child": {"$ref": "#"}},
                    "additionalProperties": false
                }),
                None,
            )
            .expect("Valid schema");
        assert!(schema.is_valid(&json!({"child": {"child": {}}})));
        assert!(!schema.is_valid(&json!({"child": {"child": {"other": 1}}})));
    }

    #[test]
    fn unresolved_reference_fails_evaluation() {
        let registry = Registry::new();
        let schema = registry
            .compile(&json!({"$ref": "http://example.com/missing.json"}), None)
            .expect("Unresolved references are not fatal");
        let evaluation = schema.evaluate(&json!(1));
        let errors: Vec<_> = evaluation.iter_errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error.keyword(), "$ref");
        assert_eq!(errors[0].error.code(), "unresolved_reference");
    }

    #[test]
    fn reference_sits_alongside_siblings() {
        let registry = Registry::new();
        let schema = registry
            .compile(
                &json!({"$defs": {"int": {"type": "integer"}}, "$ref": "#/$defs/int", "minimum": 5}),
                None,
            )
            .expect("Valid schema");
        assert!(schema.is_valid(&json!(6)));
        assert!(!schema.is_valid(&json!(4)));
        assert!(!schema.is_valid(&json!("6")));
    }
}
