//! Conversions between [`Value`] and `serde_json::Value`.
//!
//! JSON → `Value` always succeeds. The other direction keeps sequences,
//! tuples, text-keyed mappings and scalars; decimals become JSON strings
//! so no digits are lost. Byte strings, sets, extensions, non-finite floats
//! and mappings with non-text keys have no JSON form.

use serde_json::{Map, Number, Value as JsonValue};

use crate::error::UsageError;
use crate::{Decimal, Value};

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Absent,
            JsonValue::Bool(b) => Value::Boolean(b),
            JsonValue::Number(n) => from_number(&n),
            JsonValue::String(s) => Value::Text(s),
            JsonValue::Array(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            JsonValue::Object(map) => Value::Mapping(
                map.into_iter()
                    .map(|(k, v)| (Value::Text(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

fn from_number(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Integer(i)
    } else if let Some(u) = n.as_u64() {
        Value::Decimal(Decimal::from(u))
    } else {
        Value::float(n.as_f64().unwrap_or(f64::NAN))
    }
}

impl TryFrom<&Value> for JsonValue {
    type Error = UsageError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let not_json = || UsageError::NotJson {
            kind: value.kind().to_string(),
        };
        Ok(match value {
            Value::Absent => JsonValue::Null,
            Value::Boolean(b) => JsonValue::Bool(*b),
            Value::Integer(i) => JsonValue::from(*i),
            Value::Float(f) => Number::from_f64(f.0).map(JsonValue::Number).ok_or_else(not_json)?,
            Value::Decimal(d) if d.is_nan() || d.is_infinite() => return Err(not_json()),
            Value::Decimal(d) => JsonValue::String(d.to_string()),
            Value::Text(s) => JsonValue::String(s.clone()),
            Value::Sequence(items) | Value::Tuple(items) => JsonValue::Array(
                items
                    .iter()
                    .map(JsonValue::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Mapping(map) => {
                let mut object = Map::new();
                for (key, item) in map {
                    let key = key.as_str().ok_or_else(|| UsageError::NotJson {
                        kind: format!("mapping key of kind {}", key.kind()),
                    })?;
                    object.insert(key.to_string(), JsonValue::try_from(item)?);
                }
                JsonValue::Object(object)
            }
            Value::Bytes(_) | Value::ByteArray(_) | Value::Set(_) | Value::Extension(_) => {
                return Err(not_json())
            }
        })
    }
}

impl TryFrom<Value> for JsonValue {
    type Error = UsageError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        JsonValue::try_from(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json() {
        let value = Value::from(json!({
            "name": "packify",
            "tags": [1, -2.5, null, true],
            "big": 18446744073709551615u64,
        }));
        let expected = Value::mapping([
            (Value::text("name"), Value::text("packify")),
            (
                Value::text("tags"),
                Value::sequence([
                    Value::Integer(1),
                    Value::float(-2.5),
                    Value::Absent,
                    Value::Boolean(true),
                ]),
            ),
            (Value::text("big"), Value::Decimal(Decimal::from(u64::MAX))),
        ]);
        assert_eq!(value, expected);
    }

    #[test]
    fn to_json() {
        let value = Value::mapping([
            (Value::text("t"), Value::tuple([1, 2])),
            (Value::text("d"), Value::decimal("0.10").unwrap()),
        ]);
        assert_eq!(
            JsonValue::try_from(&value),
            Ok(json!({ "t": [1, 2], "d": "0.10" }))
        );
    }

    #[test]
    fn kinds_without_json_form() {
        for value in [
            Value::Bytes(vec![1]),
            Value::set([1]),
            Value::float(f64::INFINITY),
            Value::decimal("NaN").unwrap(),
            Value::mapping([(1, 2)]),
        ] {
            let err = JsonValue::try_from(&value).unwrap_err();
            assert!(matches!(err, UsageError::NotJson { .. }), "{value:?}");
        }
    }
}
