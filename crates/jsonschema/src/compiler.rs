//! Parsing of schema documents into the arena representation.
use std::sync::Arc;

use ahash::AHashMap;
use jsonschema_ir::{JsonValue, Map, Number};
use referencing::{uri, AnchorKind, Url};

use crate::{
    error::CompileError,
    node::{
        Document, DocumentId, Keywords, NodeId, Pattern, Reference, SchemaBody, SchemaNode,
        TypeKeyword,
    },
    paths::Location,
    types::JsonType,
};

/// A parsed document plus everything the registry needs to index it.
#[derive(Debug)]
pub(crate) struct Parsed {
    pub(crate) document: Document,
    /// Resources (`$id`-bearing nodes and the root) by canonical URI.
    pub(crate) resources: Vec<(Url, NodeId)>,
    pub(crate) anchors: Vec<Anchor>,
    pub(crate) dialects: Vec<Dialect>,
}

#[derive(Debug)]
pub(crate) struct Anchor {
    pub(crate) base: Arc<str>,
    pub(crate) name: String,
    pub(crate) kind: AnchorKind,
    pub(crate) node: NodeId,
}

/// A `$schema` declaration, checked by the registry once all documents are registered.
#[derive(Debug)]
pub(crate) struct Dialect {
    pub(crate) location: String,
    pub(crate) uri: Url,
    pub(crate) raw: String,
}

/// Canonical URI of a document: its root `$id` resolved against `base`, or `base` itself.
pub(crate) fn canonical_root(source: &JsonValue, base: &Url) -> Result<Url, CompileError> {
    match source.get("$id") {
        Some(JsonValue::String(id)) => {
            let mut resolved = uri::resolve_against(base, id)?;
            resolved.set_fragment(None);
            Ok(resolved)
        }
        Some(_) => Err(CompileError::invalid_schema("/$id", "'$id' must be a string")),
        None => {
            let mut base = base.clone();
            base.set_fragment(None);
            Ok(base)
        }
    }
}

/// Parse `source` into a document whose root canonical URI is `canonical`.
pub(crate) fn parse(
    id: DocumentId,
    source: JsonValue,
    canonical: &Url,
) -> Result<Parsed, CompileError> {
    let mut compiler = Compiler::default();
    let ctx = Context {
        location: Location::new(),
        base: Arc::new(canonical.clone()),
        base_key: Arc::from(canonical.as_str()),
        resource: NodeId::ROOT,
        resource_prefix: 0,
    };
    compiler.resources.push((canonical.clone(), NodeId::ROOT));
    compiler.compile(&source, None, &ctx)?;
    tracing::trace!(
        uri = %canonical,
        nodes = compiler.nodes.len(),
        resources = compiler.resources.len(),
        "Parsed schema document"
    );
    Ok(Parsed {
        document: Document {
            id,
            uri: Arc::from(canonical.as_str()),
            source,
            nodes: compiler.nodes,
            pointers: compiler.pointers,
        },
        resources: compiler.resources,
        anchors: compiler.anchors,
        dialects: compiler.dialects,
    })
}

#[derive(Debug, Clone)]
struct Context {
    location: Location,
    base: Arc<Url>,
    base_key: Arc<str>,
    resource: NodeId,
    /// Length of the resource root's location, to derive resource-relative pointers.
    resource_prefix: usize,
}

impl Context {
    fn new_at_location(&self, segment: &str) -> Context {
        Context {
            location: self.location.join(segment),
            ..self.clone()
        }
    }
    fn keyword_location(&self, keyword: &str) -> Location {
        self.location.join(keyword)
    }
    fn invalid(&self, keyword: &str, message: impl Into<String>) -> CompileError {
        CompileError::invalid_schema(self.keyword_location(keyword).as_str(), message)
    }
}

#[derive(Default)]
struct Compiler {
    nodes: Vec<SchemaNode>,
    pointers: AHashMap<String, NodeId>,
    resources: Vec<(Url, NodeId)>,
    anchors: Vec<Anchor>,
    dialects: Vec<Dialect>,
}

impl Compiler {
    fn compile(
        &mut self,
        value: &JsonValue,
        parent: Option<NodeId>,
        ctx: &Context,
    ) -> Result<NodeId, CompileError> {
        let id = NodeId::new(self.nodes.len());
        let map = match value {
            JsonValue::Object(map) => Some(map),
            JsonValue::Bool(_) => None,
            _ => {
                return Err(CompileError::invalid_schema(
                    ctx.location.as_str(),
                    "Expected a schema (object or boolean)",
                ))
            }
        };
        let ctx = match map.and_then(|map| map.get("$id")) {
            Some(raw) if parent.is_some() => self.enter_resource(raw, id, ctx)?,
            Some(raw) => {
                check_id(raw, ctx)?;
                ctx.clone()
            }
            None => ctx.clone(),
        };
        let relative = &ctx.location.as_str()[ctx.resource_prefix..];
        let absolute = format!("{}#{}", ctx.base_key, uri::encode_fragment(relative));
        self.nodes.push(SchemaNode {
            parent,
            resource: ctx.resource,
            base: Arc::clone(&ctx.base_key),
            location: ctx.location.clone(),
            absolute: Arc::from(absolute),
            body: SchemaBody::Bool(true),
        });
        self.pointers.insert(ctx.location.as_str().to_string(), id);
        let body = match (map, value) {
            (Some(map), _) => SchemaBody::Keywords(Box::new(self.keywords(map, id, &ctx)?)),
            (None, value) => SchemaBody::Bool(value.as_bool().unwrap_or(true)),
        };
        self.nodes[id.index()].body = body;
        Ok(id)
    }

    fn enter_resource(
        &mut self,
        raw: &JsonValue,
        id: NodeId,
        ctx: &Context,
    ) -> Result<Context, CompileError> {
        let raw = check_id(raw, ctx)?;
        let mut resolved = uri::resolve_against(&ctx.base, raw)?;
        resolved.set_fragment(None);
        self.resources.push((resolved.clone(), id));
        Ok(Context {
            location: ctx.location.clone(),
            base_key: Arc::from(resolved.as_str()),
            base: Arc::new(resolved),
            resource: id,
            resource_prefix: ctx.location.as_str().len(),
        })
    }

    fn keywords(
        &mut self,
        map: &Map,
        id: NodeId,
        ctx: &Context,
    ) -> Result<Keywords, CompileError> {
        let mut keywords = Keywords::default();
        for (keyword, value) in map {
            match keyword.as_str() {
                "$id" => keywords.id = Some(string(ctx, keyword, value)?),
                "$schema" => {
                    let raw = string(ctx, keyword, value)?;
                    self.dialects.push(Dialect {
                        location: ctx.keyword_location(keyword).as_str().to_string(),
                        uri: uri::resolve_against(&ctx.base, &raw)?,
                        raw: raw.clone(),
                    });
                    keywords.schema = Some(raw);
                }
                "$anchor" | "$dynamicAnchor" => {
                    let name = string(ctx, keyword, value)?;
                    if !uri::is_valid_anchor(&name) {
                        return Err(ctx.invalid(keyword, format!("'{name}' is not a valid anchor name")));
                    }
                    let kind = if keyword == "$anchor" {
                        keywords.anchor = Some(name.clone());
                        AnchorKind::Static
                    } else {
                        keywords.dynamic_anchor = Some(name.clone());
                        AnchorKind::Dynamic
                    };
                    self.anchors.push(Anchor {
                        base: Arc::clone(&ctx.base_key),
                        name,
                        kind,
                        node: id,
                    });
                }
                "$ref" => keywords.reference = Some(reference(ctx, keyword, value)?),
                "$dynamicRef" => keywords.dynamic_reference = Some(reference(ctx, keyword, value)?),
                "$defs" => keywords.defs = Some(self.subschema_map(value, id, ctx, keyword)?),
                "definitions" => {
                    keywords.definitions = Some(self.subschema_map(value, id, ctx, keyword)?);
                }
                "$comment" => keywords.comment = Some(string(ctx, keyword, value)?),
                "type" => keywords.types = Some(types(ctx, value)?),
                "enum" => {
                    let JsonValue::Array(options) = value else {
                        return Err(ctx.invalid(keyword, "'enum' must be an array"));
                    };
                    keywords.enumeration = Some(options.clone());
                }
                "const" => keywords.constant = Some(value.clone()),
                "multipleOf" => {
                    let number = number(ctx, keyword, value)?;
                    if !number.gt(&Number::PositiveInteger(0)) {
                        return Err(ctx.invalid(keyword, "'multipleOf' must be strictly greater than 0"));
                    }
                    keywords.multiple_of = Some(number);
                }
                "maximum" => keywords.maximum = Some(number(ctx, keyword, value)?),
                "exclusiveMaximum" => keywords.exclusive_maximum = Some(number(ctx, keyword, value)?),
                "minimum" => keywords.minimum = Some(number(ctx, keyword, value)?),
                "exclusiveMinimum" => keywords.exclusive_minimum = Some(number(ctx, keyword, value)?),
                "maxLength" => keywords.max_length = Some(non_negative(ctx, keyword, value)?),
                "minLength" => keywords.min_length = Some(non_negative(ctx, keyword, value)?),
                "pattern" => keywords.pattern = Some(Pattern::new(&string(ctx, keyword, value)?)),
                "format" => keywords.format = Some(string(ctx, keyword, value)?),
                "maxItems" => keywords.max_items = Some(non_negative(ctx, keyword, value)?),
                "minItems" => keywords.min_items = Some(non_negative(ctx, keyword, value)?),
                "uniqueItems" => keywords.unique_items = Some(boolean(ctx, keyword, value)?),
                "maxContains" => keywords.max_contains = Some(non_negative(ctx, keyword, value)?),
                "minContains" => keywords.min_contains = Some(non_negative(ctx, keyword, value)?),
                "maxProperties" => keywords.max_properties = Some(non_negative(ctx, keyword, value)?),
                "minProperties" => keywords.min_properties = Some(non_negative(ctx, keyword, value)?),
                "required" => keywords.required = Some(string_array(ctx, keyword, value)?),
                "dependentRequired" => {
                    let JsonValue::Object(entries) = value else {
                        return Err(ctx.invalid(keyword, "'dependentRequired' must be an object"));
                    };
                    let mut dependencies = Vec::with_capacity(entries.len());
                    for (property, required) in entries {
                        let ctx = ctx.new_at_location(keyword);
                        dependencies.push((property.clone(), string_array(&ctx, property, required)?));
                    }
                    keywords.dependent_required = Some(dependencies);
                }
                "allOf" => keywords.all_of = Some(self.subschema_list(value, id, ctx, keyword)?),
                "anyOf" => keywords.any_of = Some(self.subschema_list(value, id, ctx, keyword)?),
                "oneOf" => keywords.one_of = Some(self.subschema_list(value, id, ctx, keyword)?),
                "prefixItems" => {
                    keywords.prefix_items = Some(self.subschema_list(value, id, ctx, keyword)?);
                }
                "not" => keywords.not = Some(self.subschema(value, id, ctx, keyword)?),
                "if" => keywords.if_ = Some(self.subschema(value, id, ctx, keyword)?),
                "then" => keywords.then_ = Some(self.subschema(value, id, ctx, keyword)?),
                "else" => keywords.else_ = Some(self.subschema(value, id, ctx, keyword)?),
                "items" => {
                    if matches!(value, JsonValue::Array(_)) {
                        return Err(ctx.invalid(keyword, "'items' must be a schema; use 'prefixItems' for tuples"));
                    }
                    keywords.items = Some(self.subschema(value, id, ctx, keyword)?);
                }
                "contains" => keywords.contains = Some(self.subschema(value, id, ctx, keyword)?),
                "additionalProperties" => {
                    keywords.additional_properties = Some(self.subschema(value, id, ctx, keyword)?);
                }
                "propertyNames" => {
                    keywords.property_names = Some(self.subschema(value, id, ctx, keyword)?);
                }
                "unevaluatedProperties" => {
                    keywords.unevaluated_properties = Some(self.subschema(value, id, ctx, keyword)?);
                }
                "unevaluatedItems" => {
                    keywords.unevaluated_items = Some(self.subschema(value, id, ctx, keyword)?);
                }
                "properties" => {
                    let entries = self.subschema_map(value, id, ctx, keyword)?;
                    keywords.properties = Some(entries.into_iter().collect());
                }
                "patternProperties" => {
                    let entries = self.subschema_map(value, id, ctx, keyword)?;
                    keywords.pattern_properties = Some(
                        entries
                            .into_iter()
                            .map(|(pattern, node)| (Pattern::new(&pattern), node))
                            .collect(),
                    );
                }
                "dependentSchemas" => {
                    keywords.dependent_schemas = Some(self.subschema_map(value, id, ctx, keyword)?);
                }
                "title" => keywords.title = Some(string(ctx, keyword, value)?),
                "description" => keywords.description = Some(string(ctx, keyword, value)?),
                "default" => keywords.default = Some(value.clone()),
                "examples" => {
                    let JsonValue::Array(examples) = value else {
                        return Err(ctx.invalid(keyword, "'examples' must be an array"));
                    };
                    keywords.examples = Some(examples.clone());
                }
                "deprecated" => keywords.deprecated = Some(boolean(ctx, keyword, value)?),
                "readOnly" => keywords.read_only = Some(boolean(ctx, keyword, value)?),
                "writeOnly" => keywords.write_only = Some(boolean(ctx, keyword, value)?),
                "contentEncoding" => keywords.content_encoding = Some(string(ctx, keyword, value)?),
                "contentMediaType" => {
                    keywords.content_media_type = Some(string(ctx, keyword, value)?);
                }
                _ => keywords.unknown.push((keyword.clone(), value.clone())),
            }
        }
        Ok(keywords)
    }

    fn subschema(
        &mut self,
        value: &JsonValue,
        parent: NodeId,
        ctx: &Context,
        keyword: &str,
    ) -> Result<NodeId, CompileError> {
        self.compile(value, Some(parent), &ctx.new_at_location(keyword))
    }

    fn subschema_list(
        &mut self,
        value: &JsonValue,
        parent: NodeId,
        ctx: &Context,
        keyword: &str,
    ) -> Result<Vec<NodeId>, CompileError> {
        match value {
            JsonValue::Array(items) if !items.is_empty() => {
                let ctx = ctx.new_at_location(keyword);
                items
                    .iter()
                    .enumerate()
                    .map(|(idx, item)| {
                        let ctx = Context {
                            location: ctx.location.join(idx),
                            ..ctx.clone()
                        };
                        self.compile(item, Some(parent), &ctx)
                    })
                    .collect()
            }
            _ => Err(ctx.invalid(
                keyword,
                format!("'{keyword}' must be a non-empty array of schemas"),
            )),
        }
    }

    fn subschema_map(
        &mut self,
        value: &JsonValue,
        parent: NodeId,
        ctx: &Context,
        keyword: &str,
    ) -> Result<Vec<(String, NodeId)>, CompileError> {
        let JsonValue::Object(entries) = value else {
            return Err(ctx.invalid(keyword, format!("'{keyword}' must be an object")));
        };
        let ctx = ctx.new_at_location(keyword);
        let mut compiled = Vec::with_capacity(entries.len());
        for (name, schema) in entries {
            let node = self.compile(schema, Some(parent), &ctx.new_at_location(name))?;
            compiled.push((name.clone(), node));
        }
        Ok(compiled)
    }
}

fn check_id<'a>(raw: &'a JsonValue, ctx: &Context) -> Result<&'a str, CompileError> {
    let Some(id) = raw.as_str() else {
        return Err(ctx.invalid("$id", "'$id' must be a string"));
    };
    if id.split_once('#').is_some_and(|(_, fragment)| !fragment.is_empty()) {
        return Err(ctx.invalid("$id", format!("'{id}' must not contain a non-empty fragment")));
    }
    Ok(id)
}

fn reference(ctx: &Context, keyword: &str, value: &JsonValue) -> Result<Reference, CompileError> {
    let raw = string(ctx, keyword, value)?;
    let target = uri::resolve_against(&ctx.base, &raw)?;
    Ok(Reference { raw, target })
}

fn string(ctx: &Context, keyword: &str, value: &JsonValue) -> Result<String, CompileError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ctx.invalid(keyword, format!("'{keyword}' must be a string")))
}

fn boolean(ctx: &Context, keyword: &str, value: &JsonValue) -> Result<bool, CompileError> {
    value
        .as_bool()
        .ok_or_else(|| ctx.invalid(keyword, format!("'{keyword}' must be a boolean")))
}

fn number(ctx: &Context, keyword: &str, value: &JsonValue) -> Result<Number, CompileError> {
    value
        .as_number()
        .copied()
        .ok_or_else(|| ctx.invalid(keyword, format!("'{keyword}' must be a number")))
}

fn non_negative(ctx: &Context, keyword: &str, value: &JsonValue) -> Result<u64, CompileError> {
    value
        .as_number()
        .filter(|number| number.is_integer())
        .and_then(jsonschema_ir::Number::as_u64)
        .ok_or_else(|| ctx.invalid(keyword, format!("'{keyword}' must be a non-negative integer")))
}

fn string_array(ctx: &Context, keyword: &str, value: &JsonValue) -> Result<Vec<String>, CompileError> {
    let error = || ctx.invalid(keyword, format!("'{keyword}' must be an array of strings"));
    let JsonValue::Array(items) = value else {
        return Err(error());
    };
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(error))
        .collect()
}

fn types(ctx: &Context, value: &JsonValue) -> Result<TypeKeyword, CompileError> {
    let parse = |name: &JsonValue| {
        name.as_str()
            .and_then(|name| name.parse::<JsonType>().ok())
            .ok_or_else(|| ctx.invalid("type", format!("{name} is not a valid type name")))
    };
    match value {
        JsonValue::String(_) => {
            let ty = parse(value)?;
            Ok(TypeKeyword {
                types: vec![ty],
                set: [ty].into_iter().collect(),
                single: true,
            })
        }
        JsonValue::Array(names) => {
            let types = names.iter().map(parse).collect::<Result<Vec<_>, _>>()?;
            Ok(TypeKeyword {
                set: types.iter().copied().collect(),
                types,
                single: false,
            })
        }
        _ => Err(ctx.invalid(
            "type",
            "'type' must be a type name or an array of type names",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn parse_json(schema: &serde_json::Value) -> Result<Parsed, CompileError> {
        let base = uri::from_str("http://example.com/root.json").expect("Valid URI");
        let source = JsonValue::from(schema);
        let canonical = canonical_root(&source, &base)?;
        parse(DocumentId::new(0), source, &canonical)
    }

    #[test]
    fn arena_links() {
        let parsed = parse_json(&json!({
            "properties": {"a": {"items": {"type": "string"}}},
            "$defs": {"inner": {"$id": "inner.json", "minimum": 1}}
        }))
        .expect("Valid schema");
        let document = &parsed.document;
        let items = document.pointers["/properties/a/items"];
        let node = document.node(items).expect("Exists");
        assert_eq!(node.parent, Some(document.pointers["/properties/a"]));
        assert_eq!(node.resource, NodeId::ROOT);
        assert_eq!(&*node.absolute, "http://example.com/root.json#/properties/a/items");
        let inner = document.pointers["/$defs/inner"];
        let node = document.node(inner).expect("Exists");
        assert_eq!(node.resource, inner);
        assert_eq!(&*node.base, "http://example.com/inner.json");
        assert_eq!(&*node.absolute, "http://example.com/inner.json#");
        assert_eq!(parsed.resources.len(), 2);
    }

    #[test]
    fn anchors_are_scoped_to_resources() {
        let parsed = parse_json(&json!({
            "$dynamicAnchor": "node",
            "$defs": {"x": {"$id": "x.json", "$anchor": "item"}}
        }))
        .expect("Valid schema");
        let anchors: Vec<_> = parsed
            .anchors
            .iter()
            .map(|anchor| (&*anchor.base, anchor.name.as_str(), anchor.kind))
            .collect();
        assert_eq!(
            anchors,
            vec![
                ("http://example.com/root.json", "node", AnchorKind::Dynamic),
                ("http://example.com/x.json", "item", AnchorKind::Static),
            ]
        );
    }

    #[test]
    fn references_are_resolved_against_base() {
        let parsed = parse_json(&json!({
            "$defs": {"x": {"$id": "dir/x.json", "$ref": "y.json#/a"}}
        }))
        .expect("Valid schema");
        let node = parsed.document.pointers["/$defs/x"];
        let keywords = parsed.document.node(node).and_then(SchemaNode::keywords).expect("Object");
        let reference = keywords.reference.as_ref().expect("Has $ref");
        assert_eq!(reference.target.as_str(), "http://example.com/dir/y.json#/a");
    }

    #[test_case(&json!({"minLength": -1}), "#/minLength"; "negative length")]
    #[test_case(&json!({"properties": {"a": 5}}), "#/properties/a"; "non-schema")]
    #[test_case(&json!({"type": "strin"}), "#/type"; "unknown type")]
    #[test_case(&json!({"allOf": []}), "#/allOf"; "empty allOf")]
    #[test_case(&json!({"multipleOf": 0}), "#/multipleOf"; "zero multiple")]
    #[test_case(&json!({"$anchor": "1x"}), "#/$anchor"; "bad anchor")]
    #[test_case(&json!({"items": [{}]}), "#/items"; "array items")]
    #[test_case(&json!({"$defs": {"a": {"$id": "a.json#frag"}}}), "#/$defs/a/$id"; "fragment in id")]
    fn malformed(schema: &serde_json::Value, location: &str) {
        let error = parse_json(schema).expect_err("Should fail");
        assert_eq!(error.location(), Some(location));
    }

    #[test]
    fn unknown_keywords_are_kept() {
        let parsed = parse_json(&json!({"x-extension": [1, 2]})).expect("Valid schema");
        let root = parsed.document.node(NodeId::ROOT).and_then(SchemaNode::keywords).expect("Object");
        assert_eq!(root.unknown.len(), 1);
        assert_eq!(root.unknown[0].0, "x-extension");
    }
}
