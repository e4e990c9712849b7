use indexmap::IndexMap;
use jsonschema_ir::{JsonValue, Number};
use url::Url;

use super::NodeId;
use crate::{
    regex::CompiledPattern,
    types::{JsonType, JsonTypeSet},
};

/// A `$ref` or `$dynamicRef` value and its target resolved against the lexical base URI.
#[derive(Debug)]
pub(crate) struct Reference {
    pub(crate) raw: String,
    pub(crate) target: Url,
}

/// A pattern keyword. `compiled` is filled before the document is published.
#[derive(Debug)]
pub(crate) struct Pattern {
    pub(crate) source: String,
    pub(crate) compiled: Option<CompiledPattern>,
}

impl Pattern {
    pub(crate) fn new(source: &str) -> Pattern {
        Pattern {
            source: source.to_string(),
            compiled: None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct TypeKeyword {
    /// Types in declaration order.
    pub(crate) types: Vec<JsonType>,
    pub(crate) set: JsonTypeSet,
    /// Declared as a plain string rather than an array.
    pub(crate) single: bool,
}

pub(crate) type PropertyMap = IndexMap<String, NodeId, ahash::RandomState>;

/// Every keyword this crate understands, as typed optional fields.
#[derive(Debug, Default)]
pub(crate) struct Keywords {
    // Identity
    pub(crate) id: Option<String>,
    pub(crate) schema: Option<String>,
    pub(crate) anchor: Option<String>,
    pub(crate) dynamic_anchor: Option<String>,
    pub(crate) reference: Option<Reference>,
    pub(crate) dynamic_reference: Option<Reference>,
    pub(crate) defs: Option<Vec<(String, NodeId)>>,
    pub(crate) definitions: Option<Vec<(String, NodeId)>>,
    // Assertions
    pub(crate) types: Option<TypeKeyword>,
    pub(crate) enumeration: Option<Vec<JsonValue>>,
    pub(crate) constant: Option<JsonValue>,
    pub(crate) multiple_of: Option<Number>,
    pub(crate) maximum: Option<Number>,
    pub(crate) exclusive_maximum: Option<Number>,
    pub(crate) minimum: Option<Number>,
    pub(crate) exclusive_minimum: Option<Number>,
    pub(crate) max_length: Option<u64>,
    pub(crate) min_length: Option<u64>,
    pub(crate) pattern: Option<Pattern>,
    pub(crate) format: Option<String>,
    pub(crate) max_items: Option<u64>,
    pub(crate) min_items: Option<u64>,
    pub(crate) unique_items: Option<bool>,
    pub(crate) max_contains: Option<u64>,
    pub(crate) min_contains: Option<u64>,
    pub(crate) max_properties: Option<u64>,
    pub(crate) min_properties: Option<u64>,
    pub(crate) required: Option<Vec<String>>,
    pub(crate) dependent_required: Option<Vec<(String, Vec<String>)>>,
    // Applicators
    pub(crate) all_of: Option<Vec<NodeId>>,
    pub(crate) any_of: Option<Vec<NodeId>>,
    pub(crate) one_of: Option<Vec<NodeId>>,
    pub(crate) not: Option<NodeId>,
    pub(crate) if_: Option<NodeId>,
    pub(crate) then_: Option<NodeId>,
    pub(crate) else_: Option<NodeId>,
    pub(crate) prefix_items: Option<Vec<NodeId>>,
    pub(crate) items: Option<NodeId>,
    pub(crate) contains: Option<NodeId>,
    pub(crate) properties: Option<PropertyMap>,
    pub(crate) pattern_properties: Option<Vec<(Pattern, NodeId)>>,
    pub(crate) additional_properties: Option<NodeId>,
    pub(crate) property_names: Option<NodeId>,
    pub(crate) dependent_schemas: Option<Vec<(String, NodeId)>>,
    pub(crate) unevaluated_properties: Option<NodeId>,
    pub(crate) unevaluated_items: Option<NodeId>,
    // Annotations
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) default: Option<JsonValue>,
    pub(crate) examples: Option<Vec<JsonValue>>,
    pub(crate) deprecated: Option<bool>,
    pub(crate) read_only: Option<bool>,
    pub(crate) write_only: Option<bool>,
    pub(crate) comment: Option<String>,
    pub(crate) content_encoding: Option<String>,
    pub(crate) content_media_type: Option<String>,
    /// Keywords outside the supported vocabularies, kept verbatim.
    pub(crate) unknown: Vec<(String, JsonValue)>,
}

impl Keywords {
    /// Every applicator child with the keyword path segments leading to it.
    pub(crate) fn applicator_children(&self) -> Vec<(Vec<String>, NodeId)> {
        fn list(out: &mut Vec<(Vec<String>, NodeId)>, keyword: &str, ids: Option<&Vec<NodeId>>) {
            for (idx, id) in ids.into_iter().flatten().enumerate() {
                out.push((vec![keyword.to_string(), idx.to_string()], *id));
            }
        }
        fn single(out: &mut Vec<(Vec<String>, NodeId)>, keyword: &str, id: Option<NodeId>) {
            if let Some(id) = id {
                out.push((vec![keyword.to_string()], id));
            }
        }
        let mut out = Vec::new();
        list(&mut out, "allOf", self.all_of.as_ref());
        list(&mut out, "anyOf", self.any_of.as_ref());
        list(&mut out, "oneOf", self.one_of.as_ref());
        single(&mut out, "not", self.not);
        single(&mut out, "if", self.if_);
        single(&mut out, "then", self.then_);
        single(&mut out, "else", self.else_);
        list(&mut out, "prefixItems", self.prefix_items.as_ref());
        single(&mut out, "items", self.items);
        single(&mut out, "contains", self.contains);
        for (name, id) in self.properties.iter().flatten() {
            out.push((vec!["properties".to_string(), name.clone()], *id));
        }
        for (pattern, id) in self.pattern_properties.iter().flatten() {
            out.push((
                vec!["patternProperties".to_string(), pattern.source.clone()],
                *id,
            ));
        }
        single(&mut out, "additionalProperties", self.additional_properties);
        single(&mut out, "propertyNames", self.property_names);
        for (name, id) in self.dependent_schemas.iter().flatten() {
            out.push((vec!["dependentSchemas".to_string(), name.clone()], *id));
        }
        single(&mut out, "unevaluatedProperties", self.unevaluated_properties);
        single(&mut out, "unevaluatedItems", self.unevaluated_items);
        out
    }

    pub(crate) fn has_patterns(&self) -> bool {
        self.pattern.is_some() || self.pattern_properties.is_some()
    }
}
