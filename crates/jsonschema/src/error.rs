//! Error types.
//!
//! [`CompileError`] aborts compilation of a document. [`ValidationError`] is not an `Err` value:
//! it is structured data attached to evaluation output, one per violated keyword.
use core::fmt;
use std::{error, fmt::Write as _};

use jsonschema_ir::{CodecError, JsonValue};

use crate::types::JsonType;

/// A violated keyword.
///
/// The pair of `code` and `params` is the stable contract; [`ValidationError::message`] renders
/// the English `template` and is only one possible presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    keyword: &'static str,
    code: &'static str,
    template: &'static str,
    params: Vec<(&'static str, JsonValue)>,
}

impl ValidationError {
    fn new(
        keyword: &'static str,
        code: &'static str,
        template: &'static str,
        params: Vec<(&'static str, JsonValue)>,
    ) -> ValidationError {
        ValidationError {
            keyword,
            code,
            template,
            params,
        }
    }

    /// The keyword that produced this error, e.g. `minLength`.
    #[must_use]
    pub fn keyword(&self) -> &'static str {
        self.keyword
    }
    /// Machine-readable error code, e.g. `string_too_short`.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }
    /// Message template with `{name}` placeholders.
    #[must_use]
    pub fn template(&self) -> &'static str {
        self.template
    }
    #[must_use]
    pub fn params(&self) -> &[(&'static str, JsonValue)] {
        &self.params
    }
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&JsonValue> {
        self.params
            .iter()
            .find_map(|(key, value)| (*key == name).then_some(value))
    }

    /// Render the template, substituting every `{name}` with its parameter as compact JSON.
    #[must_use]
    pub fn message(&self) -> String {
        let mut output = String::with_capacity(self.template.len() + 16);
        let mut rest = self.template;
        while let Some(start) = rest.find('{') {
            output.push_str(&rest[..start]);
            let tail = &rest[start + 1..];
            match tail.find('}') {
                Some(end) => {
                    let name = &tail[..end];
                    match self.param(name) {
                        Some(value) => {
                            let _ = write!(output, "{value}");
                        }
                        None => {
                            output.push('{');
                            output.push_str(name);
                            output.push('}');
                        }
                    }
                    rest = &tail[end + 1..];
                }
                None => {
                    output.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        output.push_str(rest);
        output
    }

    pub(crate) fn false_schema(instance: &JsonValue) -> ValidationError {
        ValidationError::new(
            "false",
            "false_schema",
            "False schema does not allow {instance}",
            vec![("instance", instance.clone())],
        )
    }
    pub(crate) fn type_mismatch(instance: &JsonValue, expected: &[JsonType]) -> ValidationError {
        let expected = if let [single] = expected {
            JsonValue::from(single.as_str())
        } else {
            JsonValue::Array(
                expected
                    .iter()
                    .map(|ty| JsonValue::from(ty.as_str()))
                    .collect(),
            )
        };
        ValidationError::new(
            "type",
            "type_mismatch",
            "{instance} is not of type {expected}",
            vec![("instance", instance.clone()), ("expected", expected)],
        )
    }
    pub(crate) fn enumeration(instance: &JsonValue, options: &[JsonValue]) -> ValidationError {
        ValidationError::new(
            "enum",
            "enum_mismatch",
            "{instance} is not one of {options}",
            vec![
                ("instance", instance.clone()),
                ("options", JsonValue::Array(options.to_vec())),
            ],
        )
    }
    pub(crate) fn constant(instance: &JsonValue, expected: &JsonValue) -> ValidationError {
        ValidationError::new(
            "const",
            "const_mismatch",
            "{expected} was expected",
            vec![("instance", instance.clone()), ("expected", expected.clone())],
        )
    }
    pub(crate) fn multiple_of(instance: &JsonValue, multiple_of: &JsonValue) -> ValidationError {
        ValidationError::new(
            "multipleOf",
            "not_multiple_of",
            "{instance} is not a multiple of {multiple_of}",
            vec![
                ("instance", instance.clone()),
                ("multiple_of", multiple_of.clone()),
            ],
        )
    }
    pub(crate) fn maximum(instance: &JsonValue, limit: &JsonValue) -> ValidationError {
        ValidationError::new(
            "maximum",
            "maximum",
            "{instance} is greater than the maximum of {limit}",
            vec![("instance", instance.clone()), ("limit", limit.clone())],
        )
    }
    pub(crate) fn exclusive_maximum(instance: &JsonValue, limit: &JsonValue) -> ValidationError {
        ValidationError::new(
            "exclusiveMaximum",
            "exclusive_maximum",
            "{instance} is greater than or equal to the maximum of {limit}",
            vec![("instance", instance.clone()), ("limit", limit.clone())],
        )
    }
    pub(crate) fn minimum(instance: &JsonValue, limit: &JsonValue) -> ValidationError {
        ValidationError::new(
            "minimum",
            "minimum",
            "{instance} is less than the minimum of {limit}",
            vec![("instance", instance.clone()), ("limit", limit.clone())],
        )
    }
    pub(crate) fn exclusive_minimum(instance: &JsonValue, limit: &JsonValue) -> ValidationError {
        ValidationError::new(
            "exclusiveMinimum",
            "exclusive_minimum",
            "{instance} is less than or equal to the minimum of {limit}",
            vec![("instance", instance.clone()), ("limit", limit.clone())],
        )
    }
    pub(crate) fn max_length(instance: &JsonValue, limit: u64) -> ValidationError {
        ValidationError::new(
            "maxLength",
            "string_too_long",
            "{instance} is longer than {limit} characters",
            vec![("instance", instance.clone()), ("limit", limit.into())],
        )
    }
    pub(crate) fn min_length(instance: &JsonValue, limit: u64) -> ValidationError {
        ValidationError::new(
            "minLength",
            "string_too_short",
            "{instance} is shorter than {limit} characters",
            vec![("instance", instance.clone()), ("limit", limit.into())],
        )
    }
    pub(crate) fn pattern(instance: &JsonValue, pattern: &str) -> ValidationError {
        ValidationError::new(
            "pattern",
            "pattern_mismatch",
            "{instance} does not match {pattern}",
            vec![("instance", instance.clone()), ("pattern", pattern.into())],
        )
    }
    pub(crate) fn backtrack_limit(
        keyword: &'static str,
        instance: &JsonValue,
        pattern: &str,
    ) -> ValidationError {
        ValidationError::new(
            keyword,
            "pattern_backtrack_limit",
            "Matching {instance} against {pattern} exceeded the backtracking limit",
            vec![("instance", instance.clone()), ("pattern", pattern.into())],
        )
    }
    pub(crate) fn format(instance: &JsonValue, format: &str) -> ValidationError {
        ValidationError::new(
            "format",
            "format_mismatch",
            "{instance} is not a {format}",
            vec![("instance", instance.clone()), ("format", format.into())],
        )
    }
    pub(crate) fn max_items(instance: &JsonValue, limit: u64) -> ValidationError {
        ValidationError::new(
            "maxItems",
            "too_many_items",
            "{instance} has more than {limit} items",
            vec![("instance", instance.clone()), ("limit", limit.into())],
        )
    }
    pub(crate) fn min_items(instance: &JsonValue, limit: u64) -> ValidationError {
        ValidationError::new(
            "minItems",
            "too_few_items",
            "{instance} has less than {limit} items",
            vec![("instance", instance.clone()), ("limit", limit.into())],
        )
    }
    pub(crate) fn unique_items(instance: &JsonValue) -> ValidationError {
        ValidationError::new(
            "uniqueItems",
            "duplicate_items",
            "{instance} has non-unique elements",
            vec![("instance", instance.clone())],
        )
    }
    pub(crate) fn additional_items(instance: &JsonValue, limit: usize) -> ValidationError {
        ValidationError::new(
            "items",
            "additional_items",
            "{instance} has more than {limit} items allowed by prefixItems",
            vec![("instance", instance.clone()), ("limit", limit.into())],
        )
    }
    pub(crate) fn contains(instance: &JsonValue) -> ValidationError {
        ValidationError::new(
            "contains",
            "contains_none",
            "None of {instance} are valid under the given schema",
            vec![("instance", instance.clone())],
        )
    }
    pub(crate) fn min_contains(instance: &JsonValue, limit: u64) -> ValidationError {
        ValidationError::new(
            "minContains",
            "contains_too_few",
            "{instance} has less than {limit} items valid under the contains schema",
            vec![("instance", instance.clone()), ("limit", limit.into())],
        )
    }
    pub(crate) fn max_contains(instance: &JsonValue, limit: u64) -> ValidationError {
        ValidationError::new(
            "maxContains",
            "contains_too_many",
            "{instance} has more than {limit} items valid under the contains schema",
            vec![("instance", instance.clone()), ("limit", limit.into())],
        )
    }
    pub(crate) fn max_properties(instance: &JsonValue, limit: u64) -> ValidationError {
        ValidationError::new(
            "maxProperties",
            "too_many_properties",
            "{instance} has more than {limit} properties",
            vec![("instance", instance.clone()), ("limit", limit.into())],
        )
    }
    pub(crate) fn min_properties(instance: &JsonValue, limit: u64) -> ValidationError {
        ValidationError::new(
            "minProperties",
            "too_few_properties",
            "{instance} has less than {limit} properties",
            vec![("instance", instance.clone()), ("limit", limit.into())],
        )
    }
    pub(crate) fn required(instance: &JsonValue, property: &str) -> ValidationError {
        ValidationError::new(
            "required",
            "required_missing",
            "{property} is a required property",
            vec![("instance", instance.clone()), ("property", property.into())],
        )
    }
    pub(crate) fn dependent_required(
        instance: &JsonValue,
        property: &str,
        dependency: &str,
    ) -> ValidationError {
        ValidationError::new(
            "dependentRequired",
            "dependent_required_missing",
            "{property} is a required property when {dependency} is present",
            vec![
                ("instance", instance.clone()),
                ("property", property.into()),
                ("dependency", dependency.into()),
            ],
        )
    }
    pub(crate) fn additional_properties(
        instance: &JsonValue,
        unexpected: Vec<JsonValue>,
    ) -> ValidationError {
        ValidationError::new(
            "additionalProperties",
            "additional_properties",
            "Additional properties are not allowed ({unexpected} were unexpected)",
            vec![
                ("instance", instance.clone()),
                ("unexpected", JsonValue::Array(unexpected)),
            ],
        )
    }
    pub(crate) fn unevaluated_properties(
        instance: &JsonValue,
        unexpected: Vec<JsonValue>,
    ) -> ValidationError {
        ValidationError::new(
            "unevaluatedProperties",
            "unevaluated_properties",
            "Unevaluated properties are not allowed ({unexpected} were unexpected)",
            vec![
                ("instance", instance.clone()),
                ("unexpected", JsonValue::Array(unexpected)),
            ],
        )
    }
    pub(crate) fn unevaluated_items(
        instance: &JsonValue,
        unexpected: Vec<JsonValue>,
    ) -> ValidationError {
        ValidationError::new(
            "unevaluatedItems",
            "unevaluated_items",
            "Unevaluated items are not allowed ({unexpected} were unexpected)",
            vec![
                ("instance", instance.clone()),
                ("unexpected", JsonValue::Array(unexpected)),
            ],
        )
    }
    pub(crate) fn all_of(instance: &JsonValue, failed: Vec<JsonValue>) -> ValidationError {
        ValidationError::new(
            "allOf",
            "all_of_failed",
            "{instance} is not valid under all of the given schemas (failed: {failed})",
            vec![
                ("instance", instance.clone()),
                ("failed", JsonValue::Array(failed)),
            ],
        )
    }
    pub(crate) fn any_of(instance: &JsonValue) -> ValidationError {
        ValidationError::new(
            "anyOf",
            "any_of_none",
            "{instance} is not valid under any of the given schemas",
            vec![("instance", instance.clone())],
        )
    }
    pub(crate) fn one_of_not_valid(instance: &JsonValue) -> ValidationError {
        ValidationError::new(
            "oneOf",
            "one_of_none",
            "{instance} is not valid under any of the given schemas",
            vec![("instance", instance.clone())],
        )
    }
    pub(crate) fn one_of_multiple_valid(
        instance: &JsonValue,
        matched: Vec<JsonValue>,
    ) -> ValidationError {
        ValidationError::new(
            "oneOf",
            "one_of_multiple",
            "{instance} is valid under more than one of the given schemas (matched: {matched})",
            vec![
                ("instance", instance.clone()),
                ("matched", JsonValue::Array(matched)),
            ],
        )
    }
    pub(crate) fn not(instance: &JsonValue) -> ValidationError {
        ValidationError::new(
            "not",
            "not_failed",
            "{instance} should not be valid under the given schema",
            vec![("instance", instance.clone())],
        )
    }
    pub(crate) fn if_then(instance: &JsonValue) -> ValidationError {
        ValidationError::new(
            "then",
            "if_then_mismatch",
            "{instance} is valid under the if schema but not under the then schema",
            vec![("instance", instance.clone())],
        )
    }
    pub(crate) fn if_else(instance: &JsonValue) -> ValidationError {
        ValidationError::new(
            "else",
            "if_else_mismatch",
            "{instance} is not valid under the if schema nor under the else schema",
            vec![("instance", instance.clone())],
        )
    }
    pub(crate) fn unresolved_reference(
        keyword: &'static str,
        reference: &str,
        reason: &str,
    ) -> ValidationError {
        ValidationError::new(
            keyword,
            "unresolved_reference",
            "Reference {reference} can not be resolved: {reason}",
            vec![("reference", reference.into()), ("reason", reason.into())],
        )
    }
    pub(crate) fn circular_reference(keyword: &'static str, reference: &str) -> ValidationError {
        ValidationError::new(
            keyword,
            "circular_reference",
            "Reference {reference} is already being evaluated at this instance location",
            vec![("reference", reference.into())],
        )
    }
    pub(crate) fn internal(keyword: &'static str, detail: &str) -> ValidationError {
        ValidationError::new(
            keyword,
            "internal_error",
            "Internal error: {detail}",
            vec![("detail", detail.into())],
        )
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Errors that abort compilation of a document.
#[derive(Debug)]
pub enum CompileError {
    /// The document bytes could not be decoded.
    InvalidJson(CodecError),
    /// A keyword has a value of the wrong shape.
    InvalidSchema { location: String, message: String },
    /// `$schema` names a dialect this crate does not implement.
    UnsupportedDialect { location: String, dialect: String },
    /// A base URI, `$id` or reference is not a valid URI.
    InvalidUri(referencing::Error),
    /// Another, different, document is already registered under this URI.
    DuplicateUri { uri: String },
    /// An anchor is declared twice in one resource.
    DuplicateAnchor { uri: String, anchor: String },
    /// A `pattern` or `patternProperties` regex can not be compiled.
    InvalidPattern {
        location: String,
        keyword: &'static str,
        pattern: String,
        message: String,
    },
    /// An external document could not be loaded.
    Load {
        uri: String,
        source: referencing::Error,
    },
}

impl CompileError {
    pub(crate) fn invalid_schema(location: &str, message: impl Into<String>) -> CompileError {
        CompileError::InvalidSchema {
            location: format!("#{location}"),
            message: message.into(),
        }
    }
    pub(crate) fn unsupported_dialect(location: &str, dialect: &str) -> CompileError {
        CompileError::UnsupportedDialect {
            location: format!("#{location}"),
            dialect: dialect.to_string(),
        }
    }
    pub(crate) fn duplicate_uri(uri: impl Into<String>) -> CompileError {
        CompileError::DuplicateUri { uri: uri.into() }
    }
    pub(crate) fn invalid_pattern(
        location: &str,
        keyword: &'static str,
        pattern: &str,
        message: impl Into<String>,
    ) -> CompileError {
        CompileError::InvalidPattern {
            location: format!("#{location}"),
            keyword,
            pattern: pattern.to_string(),
            message: message.into(),
        }
    }
    pub(crate) fn load(uri: impl Into<String>, source: referencing::Error) -> CompileError {
        CompileError::Load {
            uri: uri.into(),
            source,
        }
    }
    /// Location of the offending keyword as a `#`-prefixed JSON Pointer, if known.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        match self {
            CompileError::InvalidSchema { location, .. }
            | CompileError::UnsupportedDialect { location, .. }
            | CompileError::InvalidPattern { location, .. } => Some(location),
            _ => None,
        }
    }
}

impl From<referencing::Error> for CompileError {
    fn from(error: referencing::Error) -> Self {
        match error {
            referencing::Error::DuplicateAnchor { base, anchor } => {
                CompileError::DuplicateAnchor { uri: base, anchor }
            }
            other => CompileError::InvalidUri(other),
        }
    }
}

impl From<CodecError> for CompileError {
    fn from(error: CodecError) -> Self {
        CompileError::InvalidJson(error)
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::InvalidJson(error) => error.fmt(f),
            CompileError::InvalidSchema { location, message } => {
                f.write_fmt(format_args!("Invalid schema at '{location}': {message}"))
            }
            CompileError::UnsupportedDialect { location, dialect } => f.write_fmt(format_args!(
                "Unsupported dialect '{dialect}' declared at '{location}'"
            )),
            CompileError::InvalidUri(error) => error.fmt(f),
            CompileError::DuplicateUri { uri } => f.write_fmt(format_args!(
                "A different schema is already registered under '{uri}'"
            )),
            CompileError::DuplicateAnchor { uri, anchor } => f.write_fmt(format_args!(
                "Anchor '{anchor}' is declared more than once in '{uri}'"
            )),
            CompileError::InvalidPattern {
                location,
                keyword,
                pattern,
                message,
            } => f.write_fmt(format_args!(
                "Invalid '{keyword}' at '{location}': regular expression '{pattern}' can not be compiled: {message}"
            )),
            CompileError::Load { uri, source } => {
                f.write_fmt(format_args!("Failed to load '{uri}': {source}"))
            }
        }
    }
}

impl error::Error for CompileError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            CompileError::InvalidJson(error) => Some(error),
            CompileError::InvalidUri(error) | CompileError::Load { source: error, .. } => {
                Some(error)
            }
            _ => None,
        }
    }
}
