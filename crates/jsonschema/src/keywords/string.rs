//! `maxLength`, `minLength`, `pattern` and `format`.
use jsonschema_ir::JsonValue;

use crate::{
    error::ValidationError,
    evaluator::{Evaluator, Input, Output},
};

pub(super) fn evaluate<'i>(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, 'i>,
    output: &mut Output<'i>,
) {
    let keywords = input.keywords;
    format(ev, input, output);
    let Some(value) = input.instance.as_str() else {
        super::ignore(
            ev,
            input,
            &[
                ("maxLength", keywords.max_length.is_some()),
                ("minLength", keywords.min_length.is_some()),
                ("pattern", keywords.pattern.is_some()),
            ],
        );
        return;
    };
    if keywords.max_length.is_some() || keywords.min_length.is_some() {
        let length = value.chars().count() as u64;
        if let Some(limit) = keywords.max_length {
            let valid = length <= limit;
            if !valid {
                output.fail(ValidationError::max_length(input.instance, limit));
            }
            ev.trace(input, "maxLength", valid);
        }
        if let Some(limit) = keywords.min_length {
            let valid = length >= limit;
            if !valid {
                output.fail(ValidationError::min_length(input.instance, limit));
            }
            ev.trace(input, "minLength", valid);
        }
    }
    if let Some(pattern) = &keywords.pattern {
        match super::is_match(pattern, "pattern", value, input.instance) {
            Ok(true) => ev.trace(input, "pattern", true),
            Ok(false) => {
                output.fail(ValidationError::pattern(input.instance, &pattern.source));
                ev.trace(input, "pattern", false);
            }
            Err(error) => {
                output.fail(error);
                ev.trace(input, "pattern", false);
            }
        }
    }
}

/// `format` is always an annotation and an assertion only when enabled.
fn format<'i>(ev: &mut Evaluator<'_, '_>, input: &Input<'_, 'i>, output: &mut Output<'i>) {
    let Some(format) = &input.keywords.format else {
        return;
    };
    output.annotate("format", JsonValue::from(format.as_str()));
    let config = ev.config();
    let check = match input.instance.as_str() {
        Some(value) if config.assert_formats => config
            .formats
            .get(format)
            .map(|validator| validator.is_valid(value)),
        _ => None,
    };
    if check == Some(false) {
        output.fail(ValidationError::format(input.instance, format));
    }
    ev.trace(input, "format", check);
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use crate::Registry;

    #[test_case(false, "not-an-email", true)]
    #[test_case(true, "not-an-email", false)]
    #[test_case(true, "user@example.com", true)]
    fn format_assertion_is_opt_in(assert: bool, instance: &str, expected: bool) {
        let registry = Registry::options()
            .assert_formats(assert)
            .build()
            .expect("Valid options");
        let schema = registry
            .compile(&json!({"format": "email"}), None)
            .expect("Valid schema");
        assert_eq!(schema.is_valid(&json!(instance)), expected);
    }

    #[test]
    fn unknown_formats_never_fail() {
        let registry = Registry::options()
            .assert_formats(true)
            .build()
            .expect("Valid options");
        let schema = registry
            .compile(&json!({"format": "no-such-format"}), None)
            .expect("Valid schema");
        assert!(schema.is_valid(&json!("anything")));
    }

    #[test]
    fn custom_format() {
        let registry = Registry::options()
            .assert_formats(true)
            .with_format("even-length", |value: &str| value.len() % 2 == 0)
            .build()
            .expect("Valid options");
        let schema = registry
            .compile(&json!({"format": "even-length"}), None)
            .expect("Valid schema");
        assert!(schema.is_valid(&json!("ab")));
        assert!(!schema.is_valid(&json!("abc")));
        assert!(schema.is_valid(&json!(3)));
    }

    #[test]
    fn format_is_reported_as_annotation() {
        let registry = Registry::new();
        let schema = registry
            .compile(&json!({"format": "date"}), None)
            .expect("Valid schema");
        let evaluation = schema.evaluate(&json!("2024-01-01"));
        assert_eq!(
            evaluation.root().annotation("format"),
            Some(&jsonschema_ir::JsonValue::from("date"))
        );
    }
}
