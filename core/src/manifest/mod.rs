pub mod icons;

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const FALLBACK_APP_NAME: &str = "My App";

/// Outcome of reading one manifest member through a typed accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<T> {
    Absent,
    Malformed {
        expected: &'static str,
        found: &'static str,
    },
    Present(T),
}

impl<T> Field<T> {
    pub fn present(self) -> Option<T> {
        match self {
            Field::Present(v) => Some(v),
            _ => None,
        }
    }
}

/// Parsed web app manifest. Unknown members are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManifestDocument {
    members: Map<String, Value>,
}

impl ManifestDocument {
    pub fn from_value(value: Value) -> CoreResult<Self> {
        match value {
            Value::Object(members) => Ok(Self { members }),
            other => Err(CoreError::InvalidInput(format!(
                "manifest must be a JSON object, found {}",
                json_type_name(&other)
            ))),
        }
    }

    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.members.get(key)
    }

    pub fn string(&self, key: &str) -> Field<&str> {
        match self.get(key) {
            None => Field::Absent,
            Some(Value::String(s)) => Field::Present(s.as_str()),
            Some(other) => malformed("string", other),
        }
    }

    pub fn array(&self, key: &str) -> Field<&[Value]> {
        match self.get(key) {
            None => Field::Absent,
            Some(Value::Array(items)) => Field::Present(items.as_slice()),
            Some(other) => malformed("array", other),
        }
    }

    pub fn object(&self, key: &str) -> Field<&Map<String, Value>> {
        match self.get(key) {
            None => Field::Absent,
            Some(Value::Object(map)) => Field::Present(map),
            Some(other) => malformed("object", other),
        }
    }

    pub fn boolean(&self, key: &str) -> Field<bool> {
        match self.get(key) {
            None => Field::Absent,
            Some(Value::Bool(b)) => Field::Present(*b),
            Some(other) => malformed("boolean", other),
        }
    }

    /// Name shown for the app: `name`, then `short_name`, then a fixed fallback.
    pub fn display_name(&self) -> &str {
        for key in ["name", "short_name"] {
            if let Field::Present(s) = self.string(key) {
                if !s.trim().is_empty() {
                    return s;
                }
            }
        }
        FALLBACK_APP_NAME
    }
}

fn malformed<T>(expected: &'static str, found: &Value) -> Field<T> {
    Field::Malformed {
        expected,
        found: json_type_name(found),
    }
}

pub fn json_type_name(v: &Value) -> &'static str {
    match v {
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
    use serde_json::json;

    fn doc(v: Value) -> ManifestDocument {
        ManifestDocument::from_value(v).unwrap()
    }

    #[test]
    fn absent_is_distinct_from_empty() {
        let m = doc(json!({"name": ""}));
        assert_eq!(m.string("name"), Field::Present(""));
        assert_eq!(m.string("short_name"), Field::Absent);
    }

    #[test]
    fn mistyped_member_is_malformed_not_a_panic() {
        let m = doc(json!({"icons": "icon.png", "name": 7}));
        assert_eq!(
            m.array("icons"),
            Field::Malformed {
                expected: "array",
                found: "string"
            }
        );
        assert!(m.string("name").present().is_none());
    }

    #[test]
    fn non_object_manifest_is_rejected() {
        let err = ManifestDocument::from_value(json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn display_name_falls_back() {
        assert_eq!(doc(json!({"name": "Demo"})).display_name(), "Demo");
        assert_eq!(
            doc(json!({"name": " ", "short_name": "D"})).display_name(),
            "D"
        );
        assert_eq!(doc(json!({})).display_name(), FALLBACK_APP_NAME);
    }
}
