//! Keyword form of compiled nodes.
use jsonschema_ir::{JsonValue, Map};

use super::{Document, NodeId, SchemaBody};

/// Rebuild the keyword form of `node` and everything below it.
pub(crate) fn to_value(document: &Document, node: NodeId) -> JsonValue {
    KeywordForm { document }.node(node)
}

struct KeywordForm<'d> {
    document: &'d Document,
}

impl KeywordForm<'_> {
    fn node(&self, id: NodeId) -> JsonValue {
        let Some(node) = self.document.node(id) else {
            return JsonValue::Bool(false);
        };
        let keywords = match &node.body {
            SchemaBody::Bool(value) => return JsonValue::Bool(*value),
            SchemaBody::Keywords(keywords) => keywords,
        };
        let mut map = Map::default();
        let mut string = |keyword: &str, value: &Option<String>| {
            if let Some(value) = value {
                map.insert(keyword.to_string(), JsonValue::from(value.as_str()));
            }
        };
        string("$schema", &keywords.schema);
        string("$id", &keywords.id);
        string("$anchor", &keywords.anchor);
        string("$dynamicAnchor", &keywords.dynamic_anchor);
        string("$comment", &keywords.comment);
        string("title", &keywords.title);
        string("description", &keywords.description);
        string("format", &keywords.format);
        string("contentEncoding", &keywords.content_encoding);
        string("contentMediaType", &keywords.content_media_type);
        if let Some(reference) = &keywords.reference {
            map.insert("$ref".to_string(), JsonValue::from(reference.raw.as_str()));
        }
        if let Some(reference) = &keywords.dynamic_reference {
            map.insert("$dynamicRef".to_string(), JsonValue::from(reference.raw.as_str()));
        }
        if let Some(types) = &keywords.types {
            let names: Vec<JsonValue> = types
                .types
                .iter()
                .map(|ty| JsonValue::from(ty.as_str()))
                .collect();
            let value = match names.as_slice() {
                [single] if types.single => single.clone(),
                _ => JsonValue::Array(names),
            };
            map.insert("type".to_string(), value);
        }
        if let Some(options) = &keywords.enumeration {
            map.insert("enum".to_string(), JsonValue::Array(options.clone()));
        }
        if let Some(constant) = &keywords.constant {
            map.insert("const".to_string(), constant.clone());
        }
        for (keyword, number) in [
            ("multipleOf", &keywords.multiple_of),
            ("maximum", &keywords.maximum),
            ("exclusiveMaximum", &keywords.exclusive_maximum),
            ("minimum", &keywords.minimum),
            ("exclusiveMinimum", &keywords.exclusive_minimum),
        ] {
            if let Some(number) = number {
                map.insert(keyword.to_string(), JsonValue::Number(*number));
            }
        }
        for (keyword, limit) in [
            ("maxLength", keywords.max_length),
            ("minLength", keywords.min_length),
            ("maxItems", keywords.max_items),
            ("minItems", keywords.min_items),
            ("maxContains", keywords.max_contains),
            ("minContains", keywords.min_contains),
            ("maxProperties", keywords.max_properties),
            ("minProperties", keywords.min_properties),
        ] {
            if let Some(limit) = limit {
                map.insert(keyword.to_string(), JsonValue::from(limit));
            }
        }
        for (keyword, flag) in [
            ("uniqueItems", keywords.unique_items),
            ("deprecated", keywords.deprecated),
            ("readOnly", keywords.read_only),
            ("writeOnly", keywords.write_only),
        ] {
            if let Some(flag) = flag {
                map.insert(keyword.to_string(), JsonValue::Bool(flag));
            }
        }
        if let Some(pattern) = &keywords.pattern {
            map.insert("pattern".to_string(), JsonValue::from(pattern.source.as_str()));
        }
        if let Some(required) = &keywords.required {
            map.insert("required".to_string(), strings(required));
        }
        if let Some(dependencies) = &keywords.dependent_required {
            map.insert(
                "dependentRequired".to_string(),
                JsonValue::object(
                    dependencies
                        .iter()
                        .map(|(name, required)| (name.as_str(), strings(required))),
                ),
            );
        }
        for (keyword, list) in [
            ("allOf", &keywords.all_of),
            ("anyOf", &keywords.any_of),
            ("oneOf", &keywords.one_of),
            ("prefixItems", &keywords.prefix_items),
        ] {
            if let Some(list) = list {
                let children = list.iter().map(|child| self.node(*child)).collect();
                map.insert(keyword.to_string(), JsonValue::Array(children));
            }
        }
        for (keyword, child) in [
            ("not", keywords.not),
            ("if", keywords.if_),
            ("then", keywords.then_),
            ("else", keywords.else_),
            ("items", keywords.items),
            ("contains", keywords.contains),
            ("additionalProperties", keywords.additional_properties),
            ("propertyNames", keywords.property_names),
            ("unevaluatedProperties", keywords.unevaluated_properties),
            ("unevaluatedItems", keywords.unevaluated_items),
        ] {
            if let Some(child) = child {
                map.insert(keyword.to_string(), self.node(child));
            }
        }
        if let Some(properties) = &keywords.properties {
            map.insert("properties".to_string(), self.named(properties.iter()));
        }
        if let Some(patterns) = &keywords.pattern_properties {
            map.insert(
                "patternProperties".to_string(),
                self.named(patterns.iter().map(|(pattern, child)| (&pattern.source, child))),
            );
        }
        for (keyword, entries) in [
            ("$defs", &keywords.defs),
            ("definitions", &keywords.definitions),
            ("dependentSchemas", &keywords.dependent_schemas),
        ] {
            if let Some(entries) = entries {
                map.insert(
                    keyword.to_string(),
                    self.named(entries.iter().map(|(name, child)| (name, child))),
                );
            }
        }
        if let Some(default) = &keywords.default {
            map.insert("default".to_string(), default.clone());
        }
        if let Some(examples) = &keywords.examples {
            map.insert("examples".to_string(), JsonValue::Array(examples.clone()));
        }
        for (keyword, value) in &keywords.unknown {
            map.insert(keyword.clone(), value.clone());
        }
        JsonValue::Object(map)
    }

    fn named<'a>(&self, entries: impl Iterator<Item = (&'a String, &'a NodeId)>) -> JsonValue {
        JsonValue::object(entries.map(|(name, child)| (name.as_str(), self.node(*child))))
    }
}

fn strings(values: &[String]) -> JsonValue {
    JsonValue::Array(values.iter().map(|value| JsonValue::from(value.as_str())).collect())
}
