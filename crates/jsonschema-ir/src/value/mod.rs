mod number;

use std::{
    collections::hash_map::DefaultHasher,
    fmt::{self, Write as _},
    hash::{Hash, Hasher},
};

use indexmap::IndexMap;
pub use number::Number;

/// Insertion-ordered JSON object. Lookup is by key equality, never by position.
pub type Map = IndexMap<String, JsonValue, ahash::RandomState>;

/// An immutable JSON value.
///
/// `PartialEq` and `Hash` are canonical: object key order is irrelevant and numbers compare
/// mathematically, so `{"a": 1, "b": 2}` equals `{"b": 2.0, "a": 1}`.
#[derive(Debug, Clone)]
pub enum JsonValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<JsonValue>),
    Object(Map),
}

impl JsonValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, JsonValue::Null)
    }
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        if let JsonValue::Bool(value) = self {
            Some(*value)
        } else {
            None
        }
    }
    #[must_use]
    pub fn as_number(&self) -> Option<&Number> {
        if let JsonValue::Number(value) = self {
            Some(value)
        } else {
            None
        }
    }
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        if let JsonValue::String(value) = self {
            Some(value)
        } else {
            None
        }
    }
    #[must_use]
    pub fn as_array(&self) -> Option<&[JsonValue]> {
        if let JsonValue::Array(items) = self {
            Some(items)
        } else {
            None
        }
    }
    #[must_use]
    pub fn as_object(&self) -> Option<&Map> {
        if let JsonValue::Object(map) = self {
            Some(map)
        } else {
            None
        }
    }
    /// Member lookup for objects, `None` for everything else.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.as_object().and_then(|map| map.get(key))
    }
    /// Look up a nested value by an RFC 6901 JSON Pointer.
    #[must_use]
    pub fn pointer(&self, pointer: &str) -> Option<&JsonValue> {
        self::pointer(self, pointer)
    }
    /// Build an object from key/value pairs, keeping their order.
    pub fn object<K, I>(pairs: I) -> JsonValue
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, JsonValue)>,
    {
        JsonValue::Object(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Look up a value by a JSON Pointer.
#[must_use]
pub fn pointer<'a>(document: &'a JsonValue, pointer: &str) -> Option<&'a JsonValue> {
    if pointer.is_empty() {
        return Some(document);
    }
    if !pointer.starts_with('/') {
        return None;
    }
    pointer
        .split('/')
        .skip(1)
        .map(|token| token.replace("~1", "/").replace("~0", "~"))
        .try_fold(document, |target, token| match target {
            JsonValue::Object(map) => map.get(token.as_str()),
            JsonValue::Array(list) => parse_index(&token).and_then(|idx| list.get(idx)),
            _ => None,
        })
}

fn parse_index(s: &str) -> Option<usize> {
    if s.starts_with('+') || (s.starts_with('0') && s.len() != 1) {
        return None;
    }
    s.parse().ok()
}

impl PartialEq for JsonValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (JsonValue::Null, JsonValue::Null) => true,
            (JsonValue::Bool(l), JsonValue::Bool(r)) => l == r,
            (JsonValue::Number(l), JsonValue::Number(r)) => l == r,
            (JsonValue::String(l), JsonValue::String(r)) => l == r,
            (JsonValue::Array(l), JsonValue::Array(r)) => l == r,
            (JsonValue::Object(l), JsonValue::Object(r)) => {
                l.len() == r.len()
                    && l.iter()
                        .all(|(key, value)| r.get(key).is_some_and(|other| value == other))
            }
            _ => false,
        }
    }
}

impl Eq for JsonValue {}

impl Hash for JsonValue {
    fn hash<H: Hasher>(&self, h: &mut H) {
        match self {
            JsonValue::Null => 0u8.hash(h),
            JsonValue::Bool(value) => {
                1u8.hash(h);
                value.hash(h);
            }
            JsonValue::Number(value) => {
                2u8.hash(h);
                value.hash(h);
            }
            JsonValue::String(value) => {
                3u8.hash(h);
                value.hash(h);
            }
            JsonValue::Array(items) => {
                4u8.hash(h);
                items.len().hash(h);
                for item in items {
                    item.hash(h);
                }
            }
            JsonValue::Object(map) => {
                5u8.hash(h);
                map.len().hash(h);
                // Order-independent: combine per-entry digests commutatively.
                let mut combined = 0u64;
                for (key, value) in map {
                    let mut entry = DefaultHasher::new();
                    key.hash(&mut entry);
                    value.hash(&mut entry);
                    combined = combined.wrapping_add(entry.finish());
                }
                combined.hash(h);
            }
        }
    }
}

impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonValue::Null => f.write_str("null"),
            JsonValue::Bool(value) => write!(f, "{value}"),
            JsonValue::Number(value) => write!(f, "{value}"),
            JsonValue::String(value) => write_escaped(f, value),
            JsonValue::Array(items) => {
                f.write_char('[')?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_char(']')
            }
            JsonValue::Object(map) => {
                f.write_char('{')?;
                for (idx, (key, value)) in map.iter().enumerate() {
                    if idx > 0 {
                        f.write_char(',')?;
                    }
                    write_escaped(f, key)?;
                    write!(f, ":{value}")?;
                }
                f.write_char('}')
            }
        }
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in value.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if u32::from(c) < 0x20 => write!(f, "\\u{:04x}", u32::from(c))?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

impl From<bool> for JsonValue {
    fn from(value: bool) -> Self {
        JsonValue::Bool(value)
    }
}

impl From<&str> for JsonValue {
    fn from(value: &str) -> Self {
        JsonValue::String(value.to_string())
    }
}

impl From<String> for JsonValue {
    fn from(value: String) -> Self {
        JsonValue::String(value)
    }
}

impl From<Number> for JsonValue {
    fn from(value: Number) -> Self {
        JsonValue::Number(value)
    }
}

impl From<u64> for JsonValue {
    fn from(value: u64) -> Self {
        JsonValue::Number(Number::PositiveInteger(value))
    }
}

impl From<i64> for JsonValue {
    fn from(value: i64) -> Self {
        JsonValue::Number(Number::from(value))
    }
}

impl From<usize> for JsonValue {
    fn from(value: usize) -> Self {
        JsonValue::Number(Number::from(value))
    }
}

impl From<f64> for JsonValue {
    fn from(value: f64) -> Self {
        JsonValue::Number(Number::Float(value))
    }
}

impl<T: Into<JsonValue>> From<Vec<T>> for JsonValue {
    fn from(value: Vec<T>) -> Self {
        JsonValue::Array(value.into_iter().map(Into::into).collect())
    }
}

impl From<Map> for JsonValue {
    fn from(value: Map) -> Self {
        JsonValue::Object(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{JsonValue, Number};
    use std::{
        collections::hash_map::DefaultHasher,
        hash::{BuildHasher, BuildHasherDefault},
    };
    use test_case::test_case;

    fn hash(value: &JsonValue) -> u64 {
        BuildHasherDefault::<DefaultHasher>::default().hash_one(value)
    }

    fn object(pairs: &[(&str, JsonValue)]) -> JsonValue {
        JsonValue::object(pairs.iter().map(|(k, v)| (*k, v.clone())))
    }

    #[test]
    fn key_order_does_not_affect_equality() {
        let left = object(&[("a", 1u64.into()), ("b", 2u64.into())]);
        let right = object(&[("b", 2u64.into()), ("a", 1u64.into())]);
        assert_eq!(left, right);
        assert_eq!(hash(&left), hash(&right));
    }

    #[test]
    fn insertion_order_is_kept() {
        let value = object(&[("z", JsonValue::Null), ("a", JsonValue::Null)]);
        let keys: Vec<_> = value
            .as_object()
            .expect("Is an object")
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, ["z", "a"]);
    }

    #[test_case(JsonValue::from("1"), JsonValue::from(1u64), false; "string vs number")]
    #[test_case(JsonValue::from(1u64), JsonValue::from(1.0), true; "integer vs float")]
    #[test_case(JsonValue::from(false), JsonValue::from(0u64), false; "bool vs number")]
    #[test_case(JsonValue::Null, JsonValue::Null, true; "nulls")]
    #[test_case(
        JsonValue::from(vec![1u64, 2]),
        JsonValue::from(vec![2u64, 1]),
        false;
        "array order matters"
    )]
    fn canonical_equality(left: JsonValue, right: JsonValue, expected: bool) {
        assert_eq!(left == right, expected);
    }

    #[test_case("", Some(JsonValue::from(vec![JsonValue::from("x")])); "whole document")]
    #[test_case("/0", Some(JsonValue::from("x")); "index")]
    #[test_case("/01", None; "leading zero")]
    #[test_case("a", None; "no leading slash")]
    fn pointers(pointer: &str, expected: Option<JsonValue>) {
        let document = JsonValue::from(vec![JsonValue::from("x")]);
        assert_eq!(document.pointer(pointer).cloned(), expected);
    }

    #[test]
    fn escaped_pointer_tokens() {
        let document = object(&[("a/b", object(&[("~c", JsonValue::from(true))]))]);
        assert_eq!(document.pointer("/a~1b/~0c"), Some(&JsonValue::Bool(true)));
    }

    #[test]
    fn display_is_compact_json() {
        let value = object(&[
            ("name", JsonValue::from("a\"b")),
            ("n", JsonValue::Number(Number::Float(2.5))),
            ("list", JsonValue::from(vec![JsonValue::Null])),
        ]);
        assert_eq!(value.to_string(), r#"{"name":"a\"b","n":2.5,"list":[null]}"#);
    }
}
