use serde_json::Value;

use crate::{CodecError, JsonCodec, JsonValue, Number};

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(b),
            Value::Number(num) => JsonValue::Number(Number::from(&num)),
            Value::String(s) => JsonValue::String(s),
            Value::Array(items) => JsonValue::Array(items.into_iter().map(JsonValue::from).collect()),
            Value::Object(map) => JsonValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, JsonValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for JsonValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Number(num) => JsonValue::Number(Number::from(num)),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Array(items) => JsonValue::Array(items.iter().map(JsonValue::from).collect()),
            Value::Object(map) => JsonValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), JsonValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&serde_json::Number> for Number {
    fn from(num: &serde_json::Number) -> Self {
        if let Some(u) = num.as_u64() {
            Number::PositiveInteger(u)
        } else if let Some(i) = num.as_i64() {
            Number::NegativeInteger(i)
        } else {
            // Without `arbitrary_precision` every number fits one of the three representations.
            Number::Float(num.as_f64().unwrap_or(f64::NAN))
        }
    }
}

impl From<&JsonValue> for Value {
    fn from(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(Number::PositiveInteger(u)) => Value::from(*u),
            JsonValue::Number(Number::NegativeInteger(i)) => Value::from(*i),
            JsonValue::Number(Number::Float(f)) => {
                serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number)
            }
            JsonValue::String(s) => Value::String(s.clone()),
            JsonValue::Array(items) => Value::Array(items.iter().map(Value::from).collect()),
            JsonValue::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl PartialEq<Value> for JsonValue {
    fn eq(&self, other: &Value) -> bool {
        *self == JsonValue::from(other)
    }
}

/// [`JsonCodec`] backed by `serde_json`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerdeJsonCodec;

impl JsonCodec for SerdeJsonCodec {
    fn decode(&self, bytes: &[u8]) -> Result<JsonValue, CodecError> {
        serde_json::from_slice::<Value>(bytes)
            .map(JsonValue::from)
            .map_err(|error| CodecError::with_source(format!("Invalid JSON: {error}"), error))
    }

    fn encode(&self, value: &JsonValue) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(value)
            .map_err(|error| CodecError::with_source(format!("Cannot encode JSON: {error}"), error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!(null), JsonValue::Null; "null")]
    #[test_case(json!(true), JsonValue::Bool(true); "bool")]
    #[test_case(json!(42u64), JsonValue::Number(Number::PositiveInteger(42)); "positive number")]
    #[test_case(json!(-42), JsonValue::Number(Number::NegativeInteger(-42)); "negative number")]
    #[test_case(json!(3.25), JsonValue::Number(Number::Float(3.25)); "float number")]
    #[test_case(json!("hello"), JsonValue::String("hello".into()); "string")]
    fn from_serde_json(input: Value, expected: JsonValue) {
        assert_eq!(JsonValue::from(input), expected);
    }

    #[test]
    fn codec_keeps_object_order() {
        let codec = SerdeJsonCodec;
        let value = codec
            .decode(br#"{"z": 1, "a": [true, null]}"#)
            .expect("Valid JSON");
        let keys: Vec<_> = value
            .as_object()
            .expect("Is an object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["z", "a"]);
        let encoded = codec.encode(&value).expect("Encodable");
        assert_eq!(codec.decode(&encoded).expect("Valid JSON"), value);
    }

    #[test]
    fn codec_reports_malformed_input() {
        let error = SerdeJsonCodec.decode(b"{").expect_err("Should fail");
        assert!(error.to_string().starts_with("Invalid JSON"));
    }
}
