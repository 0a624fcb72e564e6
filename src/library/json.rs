//! `json` native module: `json.encode(value)` / `json.decode(text)`, backed
//! by `serde_json`. Conversion is hand-written rather than derived because
//! `Value` carries a function-closure variant with no JSON representation.

use crate::error::{function_call, invalid_input, MycoError};
use crate::value::{ArrayKind, Value};
use indexmap::IndexMap;
use serde_json::Value as Json;

fn to_json(value: &Value) -> Json {
    match value {
        Value::None => Json::Null,
        Value::Int(i) => Json::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        Value::Bool(b) => Json::Bool(*b),
        Value::Str(s) => Json::String(s.clone()),
        Value::Array(_, items) => Json::Array(items.iter().map(to_json).collect()),
        Value::Object(map) => {
            let mut obj = serde_json::Map::new();
            for (k, v) in map {
                obj.insert(k.clone(), to_json(v));
            }
            Json::Object(obj)
        }
        Value::Function(_) => Json::Null,
    }
}

fn from_json(json: &Json) -> Value {
    match json {
        Json::Null => Value::None,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(0.0))
            }
        }
        Json::String(s) => Value::Str(s.clone()),
        Json::Array(items) => {
            let values: Vec<Value> = items.iter().map(from_json).collect();
            let kind = if values.iter().all(Value::is_string) {
                ArrayKind::String
            } else {
                ArrayKind::Number
            };
            Value::Array(kind, values)
        }
        Json::Object(map) => {
            let mut out = IndexMap::new();
            for (k, v) in map {
                out.insert(k.clone(), from_json(v));
            }
            Value::Object(out)
        }
    }
}

/// `json.encode(value)`, `json.decode(text)`.
pub fn call(fn_name: &str, args: &[Value], line: usize) -> Result<Value, MycoError> {
    match fn_name {
        "encode" => {
            let value = args.first().ok_or_else(|| MycoError::new(function_call(), line))?;
            let text = serde_json::to_string(&to_json(value))
                .map_err(|_| MycoError::new(invalid_input(), line))?;
            Ok(Value::Str(text))
        }
        "decode" => {
            let text = match args.first() {
                Some(Value::Str(s)) => s,
                _ => return Err(MycoError::new(invalid_input(), line)),
            };
            let parsed: Json =
                serde_json::from_str(text).map_err(|_| MycoError::new(invalid_input(), line))?;
            Ok(from_json(&parsed))
        }
        _ => Err(MycoError::new(function_call(), line)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_decode_preserves_shape() {
        let mut obj = IndexMap::new();
        obj.insert("a".to_string(), Value::Int(1));
        let original = Value::Object(obj);
        let encoded = call("encode", &[original], 1).unwrap();
        let decoded = call("decode", &[encoded], 1).unwrap();
        match decoded {
            Value::Object(map) => assert!(matches!(map.get("a"), Some(Value::Int(1)))),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_malformed_text() {
        assert!(call("decode", &[Value::Str("{not json".into())], 1).is_err());
    }
}
