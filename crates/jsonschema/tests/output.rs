use jsonschema::Registry;
use serde_json::json;
use test_case::test_case;

const BASE: &str = "http://example.com/s.json";

fn compile(schema: &serde_json::Value) -> jsonschema::Schema {
    Registry::new()
        .compile(schema, Some(BASE))
        .expect("Valid schema")
}

#[test_case(&json!({"type": "string"}), &json!("a"), true)]
#[test_case(&json!({"type": "string"}), &json!(1), false)]
#[test_case(&json!(false), &json!(null), false)]
fn flag(schema: &serde_json::Value, instance: &serde_json::Value, valid: bool) {
    let output = compile(schema).evaluate(instance).flag();
    assert_eq!(
        serde_json::to_value(output).expect("Serializable"),
        json!({"valid": valid})
    );
}

#[test]
fn list_errors() {
    let schema = compile(&json!({"allOf": [{"type": "array"}, {"maxLength": 4}]}));
    let output = schema.evaluate(&json!("some string")).list();
    assert_eq!(
        serde_json::to_value(output).expect("Serializable"),
        json!({
            "valid": false,
            "errors": [
                {
                    "evaluationPath": "",
                    "schemaLocation": "http://example.com/s.json#",
                    "instanceLocation": "",
                    "keyword": "allOf",
                    "code": "all_of_failed",
                    "error": "\"some string\" is not valid under all of the given schemas (failed: [0,1])"
                },
                {
                    "evaluationPath": "/allOf/0",
                    "schemaLocation": "http://example.com/s.json#/allOf/0",
                    "instanceLocation": "",
                    "keyword": "type",
                    "code": "type_mismatch",
                    "error": "\"some string\" is not of type \"array\""
                },
                {
                    "evaluationPath": "/allOf/1",
                    "schemaLocation": "http://example.com/s.json#/allOf/1",
                    "instanceLocation": "",
                    "keyword": "maxLength",
                    "code": "string_too_long",
                    "error": "\"some string\" is longer than 4 characters"
                }
            ],
            "annotations": []
        })
    );
}

#[test]
fn list_annotations() {
    let schema = compile(&json!({
        "title": "Root",
        "properties": {"name": {"description": "Full name"}}
    }));
    let output = schema.evaluate(&json!({"name": "Alice"})).list();
    assert_eq!(
        serde_json::to_value(output).expect("Serializable"),
        json!({
            "valid": true,
            "errors": [],
            "annotations": [
                {
                    "evaluationPath": "",
                    "schemaLocation": "http://example.com/s.json#",
                    "instanceLocation": "",
                    "keyword": "properties",
                    "value": ["name"]
                },
                {
                    "evaluationPath": "",
                    "schemaLocation": "http://example.com/s.json#",
                    "instanceLocation": "",
                    "keyword": "title",
                    "value": "Root"
                },
                {
                    "evaluationPath": "/properties/name",
                    "schemaLocation": "http://example.com/s.json#/properties/name",
                    "instanceLocation": "/name",
                    "keyword": "description",
                    "value": "Full name"
                }
            ]
        })
    );
}

#[test]
fn hierarchical() {
    let schema = compile(&json!({
        "properties": {
            "age": {"type": "integer", "minimum": 0}
        },
        "required": ["name"]
    }));
    let output = schema.evaluate(&json!({"age": -1.5})).hierarchical();
    assert_eq!(
        serde_json::to_value(output).expect("Serializable"),
        json!({
            "valid": false,
            "evaluationPath": "",
            "schemaLocation": "http://example.com/s.json#",
            "instanceLocation": "",
            "errors": {"required": "\"name\" is a required property"},
            "details": [
                {
                    "valid": false,
                    "evaluationPath": "/properties/age",
                    "schemaLocation": "http://example.com/s.json#/properties/age",
                    "instanceLocation": "/age",
                    "errors": {
                        "type": "-1.5 is not of type \"integer\"",
                        "minimum": "-1.5 is less than the minimum of 0"
                    }
                }
            ]
        })
    );
}

#[test]
fn references_extend_the_evaluation_path() {
    let schema = compile(&json!({
        "$defs": {"positive": {"exclusiveMinimum": 0}},
        "properties": {"count": {"$ref": "#/$defs/positive"}}
    }));
    let evaluation = schema.evaluate(&json!({"count": 0}));
    let error = evaluation.iter_errors().next().expect("Invalid instance");
    assert_eq!(
        error.node.evaluation_path().as_str(),
        "/properties/count/$ref"
    );
    assert_eq!(
        error.node.schema_location(),
        "http://example.com/s.json#/$defs/positive"
    );
    assert_eq!(error.node.instance_location().as_str(), "/count");
}

#[test]
fn projections_share_one_tree() {
    let schema = compile(&json!({"anyOf": [{"type": "string"}, {"type": "null"}]}));
    let evaluation = schema.evaluate(&json!(1));
    let list = evaluation.list();
    let hierarchical = evaluation.hierarchical();
    assert!(!evaluation.flag().valid);
    assert_eq!(list.errors.len(), evaluation.iter_errors().count());
    assert_eq!(hierarchical.details.len(), 2);
}
