use core::fmt;
use std::str::FromStr;

use jsonschema_ir::JsonValue;

/// Primitive types of the JSON Schema `type` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonType {
    Array,
    Boolean,
    Integer,
    Null,
    Number,
    Object,
    String,
}

impl JsonType {
    /// The most specific type of `value`. Numbers without a fractional part are integers.
    #[must_use]
    pub fn of(value: &JsonValue) -> JsonType {
        match value {
            JsonValue::Null => JsonType::Null,
            JsonValue::Bool(_) => JsonType::Boolean,
            JsonValue::Number(number) if number.is_integer() => JsonType::Integer,
            JsonValue::Number(_) => JsonType::Number,
            JsonValue::String(_) => JsonType::String,
            JsonValue::Array(_) => JsonType::Array,
            JsonValue::Object(_) => JsonType::Object,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            JsonType::Array => "array",
            JsonType::Boolean => "boolean",
            JsonType::Integer => "integer",
            JsonType::Null => "null",
            JsonType::Number => "number",
            JsonType::Object => "object",
            JsonType::String => "string",
        }
    }

    fn bit(self) -> u8 {
        match self {
            JsonType::Array => 1,
            JsonType::Boolean => 1 << 1,
            JsonType::Integer => 1 << 2,
            JsonType::Null => 1 << 3,
            JsonType::Number => 1 << 4,
            JsonType::Object => 1 << 5,
            JsonType::String => 1 << 6,
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JsonType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "array" => Ok(JsonType::Array),
            "boolean" => Ok(JsonType::Boolean),
            "integer" => Ok(JsonType::Integer),
            "null" => Ok(JsonType::Null),
            "number" => Ok(JsonType::Number),
            "object" => Ok(JsonType::Object),
            "string" => Ok(JsonType::String),
            _ => Err(()),
        }
    }
}

/// A set of [`JsonType`] values packed into a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonTypeSet(u8);

impl JsonTypeSet {
    #[must_use]
    pub fn empty() -> Self {
        JsonTypeSet(0)
    }
    #[must_use]
    pub fn insert(self, ty: JsonType) -> Self {
        JsonTypeSet(self.0 | ty.bit())
    }
    #[must_use]
    pub fn contains(self, ty: JsonType) -> bool {
        self.0 & ty.bit() != 0
    }
    /// Whether `value` is an instance of any type in the set.
    ///
    /// `number` admits integers as well.
    #[must_use]
    pub fn matches(self, value: &JsonValue) -> bool {
        let ty = JsonType::of(value);
        self.contains(ty) || (ty == JsonType::Integer && self.contains(JsonType::Number))
    }
    pub fn iter(self) -> impl Iterator<Item = JsonType> {
        [
            JsonType::Array,
            JsonType::Boolean,
            JsonType::Integer,
            JsonType::Null,
            JsonType::Number,
            JsonType::Object,
            JsonType::String,
        ]
        .into_iter()
        .filter(move |ty| self.contains(*ty))
    }
}

impl FromIterator<JsonType> for JsonTypeSet {
    fn from_iter<T: IntoIterator<Item = JsonType>>(iter: T) -> Self {
        iter.into_iter().fold(JsonTypeSet::empty(), JsonTypeSet::insert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(&json!(1), JsonType::Integer)]
    #[test_case(&json!(1.0), JsonType::Integer)]
    #[test_case(&json!(1.5), JsonType::Number)]
    #[test_case(&json!(null), JsonType::Null)]
    #[test_case(&json!({}), JsonType::Object)]
    fn type_of(value: &serde_json::Value, expected: JsonType) {
        assert_eq!(JsonType::of(&JsonValue::from(value)), expected);
    }

    #[test]
    fn number_admits_integers() {
        let set: JsonTypeSet = [JsonType::Number].into_iter().collect();
        assert!(set.matches(&JsonValue::from(3u64)));
        let set: JsonTypeSet = [JsonType::Integer].into_iter().collect();
        assert!(!set.matches(&JsonValue::from(3.5)));
    }
}
