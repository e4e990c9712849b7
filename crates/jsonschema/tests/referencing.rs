use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use jsonschema::{CompileError, Registry, Url};
use serde_json::json;
use test_case::test_case;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[test_case("#/$defs/a", true; "pointer")]
#[test_case("#/$defs/b%20c", true; "percent encoded pointer")]
#[test_case("#/$defs/d~1e", true; "escaped pointer")]
#[test_case("#named", true; "anchor")]
#[test_case("nested.json", true; "embedded resource")]
#[test_case("nested.json#/type", false; "pointer into non-schema")]
fn local_references(reference: &str, resolves: bool) {
    let registry = Registry::new();
    let schema = registry
        .compile(
            &json!({
                "$id": "http://example.com/root.json",
                "$defs": {
                    "a": {"type": "integer"},
                    "b c": {"type": "integer"},
                    "d/e": {"type": "integer"},
                    "named": {"$anchor": "named", "type": "integer"},
                    "nested": {"$id": "nested.json", "type": "integer"}
                },
                "$ref": reference
            }),
            None,
        )
        .expect("Valid schema");
    assert_eq!(registry.unresolved_references(&schema).is_empty(), resolves);
    if resolves {
        assert!(schema.is_valid(&json!(1)));
        assert!(!schema.is_valid(&json!("1")));
    }
}

#[test]
fn anchors_belong_to_their_resource() {
    let registry = Registry::new();
    let root = registry
        .compile(
            &json!({
                "$id": "http://example.com/root.json",
                "$defs": {
                    "inner": {
                        "$id": "inner.json",
                        "$defs": {"x": {"$anchor": "x", "type": "string"}}
                    }
                }
            }),
            None,
        )
        .expect("Valid schema");
    assert!(registry.resolve(&root, "#x").is_err());
    let anchored = registry
        .resolve(&root, "inner.json#x")
        .expect("Anchor of the embedded resource");
    assert_eq!(anchored.uri(), "http://example.com/inner.json#/$defs/x");
}

#[test]
fn duplicate_anchors_are_rejected() {
    let error = Registry::new()
        .compile(
            &json!({"$defs": {"a": {"$anchor": "x"}, "b": {"$anchor": "x"}}}),
            None,
        )
        .expect_err("Duplicate anchor");
    assert!(matches!(error, CompileError::DuplicateAnchor { ref anchor, .. } if anchor == "x"));
}

#[test]
fn relative_references_from_anonymous_documents() {
    let registry = Registry::new();
    registry
        .compile(&json!({"type": "string"}), Some("strings.json"))
        .expect("Valid schema");
    let schema = registry
        .compile(&json!({"items": {"$ref": "strings.json"}}), None)
        .expect("Valid schema");
    assert!(schema.is_valid(&json!(["a", "b"])));
    assert!(!schema.is_valid(&json!(["a", 1])));
}

#[test]
fn pending_references_are_reported_until_resolved() {
    let registry = Registry::new();
    let schema = registry
        .compile(
            &json!({
                "$id": "http://example.com/a.json",
                "properties": {
                    "b": {"$ref": "b.json"},
                    "c": {"$ref": "c.json#/$defs/x"}
                }
            }),
            None,
        )
        .expect("Valid schema");
    assert_eq!(
        registry.unresolved_references(&schema),
        vec![
            "http://example.com/b.json".to_string(),
            "http://example.com/c.json#/$defs/x".to_string()
        ]
    );
    let evaluation = schema.evaluate(&json!({"b": 1}));
    assert!(!evaluation.is_valid());
    registry
        .compile(&json!({"$id": "http://example.com/b.json"}), None)
        .expect("Valid schema");
    assert_eq!(
        registry.unresolved_references(&schema),
        vec!["http://example.com/c.json#/$defs/x".to_string()]
    );
    assert!(schema.is_valid(&json!({"b": 1})));
}

#[test]
fn loaders_fetch_transitively() {
    let fetched = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fetched);
    let registry = Registry::options()
        .with_loader("mem", move |uri: &Url| -> Result<Vec<u8>, BoxError> {
            counter.fetch_add(1, Ordering::SeqCst);
            match uri.as_str() {
                "mem://schemas/a.json" => Ok(br#"{"$ref": "b.json"}"#.to_vec()),
                "mem://schemas/b.json" => Ok(br#"{"type": "integer"}"#.to_vec()),
                other => Err(format!("Unknown document: {other}").into()),
            }
        })
        .build()
        .expect("Valid options");
    let schema = registry
        .compile(&json!({"$ref": "mem://schemas/a.json"}), None)
        .expect("Loaded schemas");
    assert_eq!(fetched.load(Ordering::SeqCst), 2);
    assert!(schema.is_valid(&json!(1)));
    assert!(!schema.is_valid(&json!("1")));
    assert!(registry.unresolved_references(&schema).is_empty());
}

#[test]
fn dynamic_resolution_without_matching_anchor_is_static() {
    let registry = Registry::new();
    let schema = registry
        .compile(
            &json!({
                "$id": "http://example.com/list.json",
                "$defs": {"item": {"$anchor": "item", "type": "string"}},
                "items": {"$dynamicRef": "#item"}
            }),
            None,
        )
        .expect("Valid schema");
    assert!(schema.is_valid(&json!(["a"])));
    assert!(!schema.is_valid(&json!([1])));
}

#[test]
fn resolve_dynamic_picks_outermost_anchor() {
    let registry = Registry::new();
    let base = registry
        .compile(
            &json!({
                "$id": "http://example.com/base.json",
                "$dynamicAnchor": "meta",
                "type": "object"
            }),
            None,
        )
        .expect("Valid schema");
    let extended = registry
        .compile(
            &json!({
                "$id": "http://example.com/extended.json",
                "$dynamicAnchor": "meta",
                "$ref": "base.json"
            }),
            None,
        )
        .expect("Valid schema");
    let resolved = registry
        .resolve_dynamic(&[extended.clone(), base.clone()], "#meta")
        .expect("Resolvable");
    assert_eq!(resolved, extended);
    let alone = registry
        .resolve_dynamic(&[base.clone()], "#meta")
        .expect("Resolvable");
    assert_eq!(alone, base);
}

#[test]
fn get_compiled_schema_by_uri() {
    let registry = Registry::new();
    registry
        .compile(
            &json!({"$id": "http://example.com/s.json", "$defs": {"a": {"const": 1}}}),
            None,
        )
        .expect("Valid schema");
    let sub = registry
        .get_compiled_schema("http://example.com/s.json#/$defs/a")
        .expect("Registered subschema");
    assert!(sub.is_valid(&json!(1)));
    assert!(registry.get_compiled_schema("http://example.com/other.json").is_none());
}

#[test]
fn registries_are_shared_between_threads() {
    let registry = Registry::new();
    let schema = registry
        .compile(&json!({"type": "array", "items": {"type": "integer"}}), None)
        .expect("Valid schema");
    let handles: Vec<_> = (0..4)
        .map(|idx| {
            let schema = schema.clone();
            let registry = registry.clone();
            std::thread::spawn(move || {
                registry
                    .compile(&json!({"const": idx}), None)
                    .expect("Valid schema");
                schema.is_valid(&json!([idx, idx + 1]))
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().expect("Thread finished"));
    }
    assert_eq!(registry.len(), 5);
}
