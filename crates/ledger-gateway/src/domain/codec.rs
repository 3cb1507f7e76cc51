//! Argument codec for the string-only contract argument channel.
//!
//! Scalars pass through as their textual form. Lists and objects become
//! canonical JSON: object keys sorted at every depth, no whitespace. Equal
//! values therefore always encode to byte-identical strings.
//!
//! Round-trip law: for any list of strings or object of strings `v`,
//! `decode(encode(v).as_bytes()) == v`.

use crate::domain::error::{GatewayError, GatewayResult};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Encode a value as a single contract argument.
pub fn encode(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => canonicalize(value).to_string(),
        scalar => scalar.to_string(),
    }
}

/// Encode a list of strings, e.g. a user's roles.
pub fn encode_list(items: &[String]) -> String {
    encode(&Value::Array(
        items.iter().cloned().map(Value::String).collect(),
    ))
}

/// Encode an object, e.g. audit event metadata.
pub fn encode_object(object: &Map<String, Value>) -> String {
    encode(&Value::Object(object.clone()))
}

/// Decode a payload returned by the ledger.
///
/// Accepts any JSON document, with surrounding whitespace, so payloads from
/// other writers are tolerated.
pub fn decode(bytes: &[u8]) -> GatewayResult<Value> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| GatewayError::malformed_payload(format!("payload is not UTF-8: {}", e)))?;
    serde_json::from_str(text.trim())
        .map_err(|e| GatewayError::malformed_payload(format!("payload is not JSON: {}", e)))
}

/// Decode a payload that must be a JSON boolean.
pub fn decode_bool(bytes: &[u8]) -> GatewayResult<bool> {
    match decode(bytes)? {
        Value::Bool(b) => Ok(b),
        other => Err(GatewayError::malformed_payload(format!(
            "expected boolean, got {}",
            json_type_name(&other)
        ))),
    }
}

/// Rebuild a value with object keys in sorted order at every depth.
///
/// Keys are inserted in sorted order, so the output is sorted whether or not
/// serde_json preserves insertion order.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        Value::Object(object) => {
            let sorted: BTreeMap<&String, &Value> = object.iter().collect();
            let mut out = Map::with_capacity(sorted.len());
            for (key, inner) in sorted {
                out.insert(key.clone(), canonicalize(inner));
            }
            Value::Object(out)
        }
        scalar => scalar.clone(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::DispatchFailure;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_scalars_pass_through() {
        assert_eq!(encode(&json!("Alice")), "Alice");
        assert_eq!(encode(&json!(42)), "42");
        assert_eq!(encode(&json!(true)), "true");
        assert_eq!(encode(&Value::Null), "null");
    }

    #[test]
    fn test_list_encoding_matches_contract_format() {
        assert_eq!(encode_list(&["admin".to_string()]), r#"["admin"]"#);
        assert_eq!(
            encode_list(&["admin".to_string(), "auditor".to_string()]),
            r#"["admin","auditor"]"#
        );
        assert_eq!(encode_list(&[]), "[]");
    }

    #[test]
    fn test_object_keys_sorted_at_every_depth() {
        let value = json!({"z": 1, "a": {"y": [ {"d": 1, "c": 2} ], "b": null}});
        assert_eq!(
            encode(&value),
            r#"{"a":{"b":null,"y":[{"c":2,"d":1}]},"z":1}"#
        );
    }

    #[test]
    fn test_equal_objects_encode_identically() {
        let first: Value = serde_json::from_str(r#"{"ip":"10.0.0.1","agent":"curl"}"#).unwrap();
        let second: Value = serde_json::from_str(r#"{"agent":"curl","ip":"10.0.0.1"}"#).unwrap();
        assert_eq!(encode(&first), encode(&second));
    }

    #[test]
    fn test_empty_object() {
        assert_eq!(encode_object(&Map::new()), "{}");
    }

    #[test]
    fn test_decode_tolerates_foreign_formatting() {
        let decoded = decode(b"  {\n  \"b\": \"2\",\n  \"a\": \"1\"\n}\n").unwrap();
        assert_eq!(decoded, json!({"a": "1", "b": "2"}));
    }

    #[test]
    fn test_decode_bool() {
        assert!(decode_bool(b"true").unwrap());
        assert!(!decode_bool(b"false").unwrap());
        assert!(decode_bool(b" true\n").unwrap());
    }

    #[test]
    fn test_decode_bool_rejects_other_payloads() {
        for payload in [&b"yes"[..], b"\"true\"", b"1", b"", b"\xff\xfe"] {
            let err = decode_bool(payload).unwrap_err();
            assert_eq!(
                err.dispatch_reason(),
                Some(DispatchFailure::MalformedPayload),
                "payload {:?}",
                payload
            );
        }
    }

    proptest! {
        #[test]
        fn prop_list_round_trip(items in prop::collection::vec(".*", 0..8)) {
            let value = Value::Array(items.into_iter().map(Value::String).collect());
            let encoded = encode(&value);
            prop_assert_eq!(decode(encoded.as_bytes()).unwrap(), value);
        }

        #[test]
        fn prop_object_round_trip(entries in prop::collection::btree_map(".*", ".*", 0..8)) {
            let object: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            let value = Value::Object(object);
            let encoded = encode(&value);
            prop_assert_eq!(decode(encoded.as_bytes()).unwrap(), value);
        }

        #[test]
        fn prop_encoding_is_deterministic(entries in prop::collection::btree_map("[a-z]{1,6}", ".*", 0..8)) {
            let forward: Map<String, Value> = entries
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            let reverse: Map<String, Value> = entries
                .iter()
                .rev()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            prop_assert_eq!(encode_object(&forward), encode_object(&reverse));
        }
    }
}
