//! Keywords that only produce annotations.
use jsonschema_ir::JsonValue;

use crate::evaluator::{Input, Output};

pub(super) fn evaluate(input: &Input<'_, '_>, output: &mut Output<'_>) {
    let keywords = input.keywords;
    let strings = [
        ("title", &keywords.title),
        ("description", &keywords.description),
        ("$comment", &keywords.comment),
        ("contentEncoding", &keywords.content_encoding),
        ("contentMediaType", &keywords.content_media_type),
    ];
    for (keyword, value) in strings {
        if let Some(value) = value {
            output.annotate(keyword, JsonValue::from(value.as_str()));
        }
    }
    if let Some(default) = &keywords.default {
        output.annotate("default", default.clone());
    }
    if let Some(examples) = &keywords.examples {
        output.annotate("examples", JsonValue::Array(examples.clone()));
    }
    let flags = [
        ("deprecated", keywords.deprecated),
        ("readOnly", keywords.read_only),
        ("writeOnly", keywords.write_only),
    ];
    for (keyword, value) in flags {
        if let Some(value) = value {
            output.annotate(keyword, JsonValue::Bool(value));
        }
    }
    for (keyword, value) in &keywords.unknown {
        output.annotate(keyword, value.clone());
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::Registry;

    #[test]
    fn annotations_are_collected_from_valid_nodes() {
        let registry = Registry::new();
        let schema = registry
            .compile(
                &json!({
                    "title": "Root",
                    "properties": {"a": {"default": 5, "x-custom": [1]}}
                }),
                None,
            )
            .expect("Valid schema");
        let evaluation = schema.evaluate(&json!({"a": 1}));
        let mut keywords: Vec<_> = evaluation
            .iter_annotations()
            .map(|entry| entry.keyword.to_string())
            .collect();
        keywords.sort();
        assert_eq!(keywords, vec!["default", "properties", "title", "x-custom"]);
    }

    #[test]
    fn invalid_nodes_lose_their_annotations() {
        let registry = Registry::new();
        let schema = registry
            .compile(
                &json!({"title": "Root", "properties": {"a": {"title": "A", "type": "string"}}}),
                None,
            )
            .expect("Valid schema");
        let evaluation = schema.evaluate(&json!({"a": 1}));
        assert_eq!(evaluation.iter_annotations().count(), 0);
    }
}
