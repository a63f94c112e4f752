use crate::error::CoreResult;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

// Canonical form used for result digests:
// - UTF-8 JSON, keys sorted lexicographically at every depth
// - no insignificant whitespace
// - array order preserved (result order is meaningful)
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> CoreResult<Vec<u8>> {
    let v = serde_json::to_value(value)?;
    let normalized = normalize_value(v);
    let s = serde_json::to_string(&normalized)?;
    Ok(s.into_bytes())
}

fn normalize_value(v: Value) -> Value {
    match v {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .into_iter()
                .map(|(k, vv)| (k, normalize_value(vv)))
                .collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(arr) => Value::Array(arr.into_iter().map(normalize_value).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::to_canonical_bytes;
    use serde_json::json;

    #[test]
    fn sorts_nested_keys_and_keeps_array_order() {
        let bytes = to_canonical_bytes(&json!({"z": [3, 1], "a": {"y": 1, "b": 2}})).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"a":{"b":2,"y":1},"z":[3,1]}"#
        );
    }
}
