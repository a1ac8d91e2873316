//! Raw submission records as delivered by intake.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CanonicalError, Result};

/// A raw submission: a JSON object with an identifying field, an owner, and
/// arbitrary domain fields.
///
/// Submissions are immutable once constructed; the canonicalizer reads them
/// but never modifies them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Submission {
    fields: Map<String, Value>,
}

impl Submission {
    /// Wrap an already-parsed JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Parse a submission from JSON bytes.
    ///
    /// Fails with `MalformedSubmission` if the bytes are not a JSON object.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| CanonicalError::MalformedSubmission(format!("invalid JSON: {}", e)))?;
        Self::from_value(value)
    }

    /// Build a submission from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(CanonicalError::MalformedSubmission(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Get a field by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// All fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Iterate field names.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl From<Map<String, Value>> for Submission {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
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

    #[test]
    fn test_from_json_object() {
        let s = Submission::from_json(br#"{"name":"S1","owner":"alice"}"#).unwrap();
        assert_eq!(s.get("name"), Some(&Value::String("S1".into())));
        assert_eq!(s.field_names().count(), 2);
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let err = Submission::from_json(b"[1,2,3]").unwrap_err();
        assert!(matches!(err, CanonicalError::MalformedSubmission(m) if m.contains("array")));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = Submission::from_json(b"{not json").unwrap_err();
        assert!(matches!(err, CanonicalError::MalformedSubmission(_)));
    }
}
