//! Deterministic canonicalization of submissions.
//!
//! A submission is reduced to its attestable fields (owner, claim id and any
//! declared volatile fields are removed) and serialized so that the same
//! attestable content always produces identical bytes, whatever order the
//! fields arrived in.
//!
//! Two encodings are supported:
//! - **JSON**: object keys sorted by byte order at every depth, no whitespace.
//! - **CBOR**: RFC 8949 Core Deterministic Encoding. Map keys sorted by encoded
//!   byte comparison, smallest integer encoding, definite lengths only,
//!   floats always as binary64.

use std::collections::BTreeSet;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{CanonicalError, Result};
use crate::submission::{json_kind, Submission};
use crate::types::SubmissionId;

/// Serialization used for canonical payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    #[default]
    Json,
    Cbor,
}

impl PayloadFormat {
    /// Parse payload bytes written in this format back into a JSON value.
    pub fn parse(&self, bytes: &[u8]) -> Result<Value> {
        match self {
            PayloadFormat::Json => serde_json::from_slice(bytes)
                .map_err(|e| CanonicalError::EncodingError(format!("invalid JSON payload: {}", e))),
            PayloadFormat::Cbor => ciborium::from_reader(bytes)
                .map_err(|e| CanonicalError::EncodingError(format!("invalid CBOR payload: {}", e))),
        }
    }
}

/// Deterministic bytes derived from a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPayload {
    format: PayloadFormat,
    bytes: Bytes,
}

impl CanonicalPayload {
    pub fn format(&self) -> PayloadFormat {
        self.format
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Turns submissions into canonical payloads and extracts correlation metadata.
///
/// The identity field is attestable content and stays in the payload. The
/// owner field, the optional claim field, and `volatile_fields` are removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Canonicalizer {
    /// Field holding the submission identity.
    pub identity_field: String,
    /// Field holding the submitting owner.
    pub owner_field: String,
    /// Field holding a claim identifier carried only for correlation.
    pub claim_field: Option<String>,
    /// Further fields excluded from attestation.
    pub volatile_fields: BTreeSet<String>,
    /// Payload encoding.
    pub format: PayloadFormat,
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self {
            identity_field: "name".to_string(),
            owner_field: "owner".to_string(),
            claim_field: Some("citizenship_no".to_string()),
            volatile_fields: BTreeSet::new(),
            format: PayloadFormat::Json,
        }
    }
}

impl Canonicalizer {
    /// Set the payload format.
    pub fn with_format(mut self, format: PayloadFormat) -> Self {
        self.format = format;
        self
    }

    /// Set (or clear) the claim field.
    pub fn with_claim_field(mut self, field: Option<&str>) -> Self {
        self.claim_field = field.map(String::from);
        self
    }

    /// Declare an extra volatile field.
    pub fn with_volatile(mut self, field: &str) -> Self {
        self.volatile_fields.insert(field.to_string());
        self
    }

    /// Whether a field is excluded from the canonical payload.
    pub fn is_volatile(&self, field: &str) -> bool {
        field == self.owner_field
            || self.claim_field.as_deref() == Some(field)
            || self.volatile_fields.contains(field)
    }

    /// Extract the submission identity.
    ///
    /// The identity field must be present and a non-empty string.
    pub fn identity(&self, submission: &Submission) -> Result<SubmissionId> {
        match submission.get(&self.identity_field) {
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(SubmissionId::new(s.clone())),
            Some(Value::String(_)) => Err(CanonicalError::MalformedSubmission(format!(
                "identity field `{}` is empty",
                self.identity_field
            ))),
            Some(other) => Err(CanonicalError::MalformedSubmission(format!(
                "identity field `{}` must be a string, got {}",
                self.identity_field,
                json_kind(other)
            ))),
            None => Err(CanonicalError::MalformedSubmission(format!(
                "missing identity field `{}`",
                self.identity_field
            ))),
        }
    }

    /// Extract the owner, if present.
    pub fn owner(&self, submission: &Submission) -> Result<Option<String>> {
        metadata_text(submission, &self.owner_field)
    }

    /// Extract the claim identifier, if a claim field is configured and present.
    pub fn claim(&self, submission: &Submission) -> Result<Option<String>> {
        match &self.claim_field {
            Some(field) => metadata_text(submission, field),
            None => Ok(None),
        }
    }

    /// Produce the canonical payload for a submission.
    pub fn canonicalize(&self, submission: &Submission) -> Result<CanonicalPayload> {
        self.identity(submission)?;

        let attestable: Map<String, Value> = submission
            .fields()
            .iter()
            .filter(|(k, _)| !self.is_volatile(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let value = Value::Object(attestable);

        let mut buf = Vec::new();
        match self.format {
            PayloadFormat::Json => encode_json_canonical(&mut buf, &value)?,
            PayloadFormat::Cbor => encode_cbor_canonical(&mut buf, &value),
        }

        Ok(CanonicalPayload {
            format: self.format,
            bytes: Bytes::from(buf),
        })
    }
}

/// Read a metadata field as text. Numbers render as their decimal form.
fn metadata_text(submission: &Submission, field: &str) -> Result<Option<String>> {
    match submission.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(CanonicalError::MalformedSubmission(format!(
            "field `{}` must be a string or number, got {}",
            field,
            json_kind(other)
        ))),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON
// ─────────────────────────────────────────────────────────────────────────────

/// Encode a JSON value with sorted keys and no whitespace.
fn encode_json_canonical(buf: &mut Vec<u8>, value: &Value) -> Result<()> {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

            buf.push(b'{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_json_scalar(buf, &Value::String(key.clone()))?;
                buf.push(b':');
                encode_json_canonical(buf, item)?;
            }
            buf.push(b'}');
        }
        Value::Array(items) => {
            buf.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                encode_json_canonical(buf, item)?;
            }
            buf.push(b']');
        }
        scalar => write_json_scalar(buf, scalar)?,
    }
    Ok(())
}

fn write_json_scalar(buf: &mut Vec<u8>, value: &Value) -> Result<()> {
    serde_json::to_writer(&mut *buf, value)
        .map_err(|e| CanonicalError::EncodingError(e.to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// CBOR
// ─────────────────────────────────────────────────────────────────────────────

/// Recursively encode a JSON value as deterministic CBOR.
fn encode_cbor_canonical(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Null => buf.push(0xf6),
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Number(n) => encode_number(buf, n),
        Value::String(s) => encode_text(buf, s),
        Value::Array(items) => {
            encode_uint(buf, 4, items.len() as u64);
            for item in items {
                encode_cbor_canonical(buf, item);
            }
        }
        Value::Object(map) => encode_map_canonical(buf, map),
    }
}

/// Encode a number: integers use major types 0/1, everything else binary64.
fn encode_number(buf: &mut Vec<u8>, n: &Number) {
    if let Some(u) = n.as_u64() {
        encode_uint(buf, 0, u);
    } else if let Some(i) = n.as_i64() {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        encode_uint(buf, 1, (-1 - i) as u64);
    } else {
        let f = n.as_f64().unwrap_or(f64::NAN);
        buf.push(0xfb);
        buf.extend_from_slice(&f.to_bits().to_be_bytes());
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a text string (major type 3).
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Encode a map canonically (major type 5).
///
/// Keys are sorted by their encoded byte comparison.
fn encode_map_canonical(buf: &mut Vec<u8>, map: &Map<String, Value>) {
    let mut pairs: Vec<(Vec<u8>, &Value)> = map
        .iter()
        .map(|(k, v)| {
            let mut key_buf = Vec::with_capacity(k.len() + 1);
            encode_text(&mut key_buf, k);
            (key_buf, v)
        })
        .collect();

    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, pairs.len() as u64);
    for (key_bytes, value) in pairs {
        buf.extend_from_slice(&key_bytes);
        encode_cbor_canonical(buf, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submission(value: Value) -> Submission {
        Submission::from_value(value).unwrap()
    }

    #[test]
    fn test_owner_and_claim_removed() {
        let c = Canonicalizer::default();
        let s = submission(json!({
            "name": "S1",
            "owner": "alice",
            "citizenship_no": "C1",
            "dob": "2000-01-01"
        }));
        let payload = c.canonicalize(&s).unwrap();
        assert_eq!(payload.as_bytes(), br#"{"dob":"2000-01-01","name":"S1"}"#);
    }

    #[test]
    fn test_owner_independent() {
        let c = Canonicalizer::default();
        let a = submission(json!({"name": "S1", "owner": "alice", "x": 1}));
        let b = submission(json!({"name": "S1", "owner": "bob", "x": 1}));
        assert_eq!(c.canonicalize(&a).unwrap(), c.canonicalize(&b).unwrap());
    }

    #[test]
    fn test_insertion_order_independent() {
        let c = Canonicalizer::default();
        let a: Value =
            serde_json::from_str(r#"{"name":"S1","b":{"y":2,"x":1},"a":[3,{"q":1,"p":0}]}"#)
                .unwrap();
        let b: Value =
            serde_json::from_str(r#"{"a":[3,{"p":0,"q":1}],"b":{"x":1,"y":2},"name":"S1"}"#)
                .unwrap();
        let pa = c.canonicalize(&submission(a)).unwrap();
        let pb = c.canonicalize(&submission(b)).unwrap();
        assert_eq!(pa, pb);
        assert_eq!(pa.as_bytes(), br#"{"a":[3,{"p":0,"q":1}],"b":{"x":1,"y":2},"name":"S1"}"#);
    }

    #[test]
    fn test_extra_volatile_fields() {
        let c = Canonicalizer::default().with_volatile("received_at");
        let a = submission(json!({"name": "S1", "received_at": 1}));
        let b = submission(json!({"name": "S1", "received_at": 2}));
        assert_eq!(c.canonicalize(&a).unwrap(), c.canonicalize(&b).unwrap());
    }

    #[test]
    fn test_claim_kept_when_not_configured() {
        let c = Canonicalizer::default().with_claim_field(None);
        let s = submission(json!({"name": "S1", "citizenship_no": "C1"}));
        let payload = c.canonicalize(&s).unwrap();
        assert_eq!(payload.as_bytes(), br#"{"citizenship_no":"C1","name":"S1"}"#);
        assert_eq!(c.claim(&s).unwrap(), None);
    }

    #[test]
    fn test_missing_identity_is_malformed() {
        let c = Canonicalizer::default();
        let err = c.canonicalize(&submission(json!({"owner": "alice"}))).unwrap_err();
        assert!(matches!(err, CanonicalError::MalformedSubmission(_)));

        let err = c.identity(&submission(json!({"name": ""}))).unwrap_err();
        assert!(matches!(err, CanonicalError::MalformedSubmission(_)));

        let err = c.identity(&submission(json!({"name": 7}))).unwrap_err();
        assert!(matches!(err, CanonicalError::MalformedSubmission(_)));
    }

    #[test]
    fn test_metadata_extraction() {
        let c = Canonicalizer::default();
        let s = submission(json!({"name": "S1", "owner": "alice", "citizenship_no": 12345}));
        assert_eq!(c.identity(&s).unwrap(), SubmissionId::new("S1"));
        assert_eq!(c.owner(&s).unwrap().as_deref(), Some("alice"));
        assert_eq!(c.claim(&s).unwrap().as_deref(), Some("12345"));

        let bad = submission(json!({"name": "S1", "owner": {"id": 1}}));
        assert!(c.owner(&bad).is_err());
    }

    #[test]
    fn test_integer_encoding() {
        let mut buf = Vec::new();

        encode_uint(&mut buf, 0, 0);
        assert_eq!(buf, vec![0x00]);

        buf.clear();
        encode_uint(&mut buf, 0, 23);
        assert_eq!(buf, vec![0x17]);

        buf.clear();
        encode_uint(&mut buf, 0, 24);
        assert_eq!(buf, vec![0x18, 24]);

        buf.clear();
        encode_uint(&mut buf, 0, 256);
        assert_eq!(buf, vec![0x19, 0x01, 0x00]);

        buf.clear();
        encode_number(&mut buf, &Number::from(-1));
        assert_eq!(buf, vec![0x20]);

        buf.clear();
        encode_number(&mut buf, &Number::from_f64(1.5).unwrap());
        assert_eq!(buf, vec![0xfb, 0x3f, 0xf8, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_cbor_map_key_ordering() {
        // Shorter keys sort first because the length is part of the encoded key.
        let mut buf = Vec::new();
        let value = json!({"bb": 1, "a": 2, "c": 3});
        encode_cbor_canonical(&mut buf, &value);
        assert_eq!(
            buf,
            vec![0xa3, 0x61, b'a', 0x02, 0x61, b'c', 0x03, 0x62, b'b', b'b', 0x01]
        );
    }

    #[test]
    fn test_cbor_payload_parses_back() {
        let c = Canonicalizer::default().with_format(PayloadFormat::Cbor);
        let s = submission(json!({
            "name": "S1",
            "owner": "alice",
            "age": 30,
            "tags": ["a", "b"],
            "ok": true
        }));
        let payload = c.canonicalize(&s).unwrap();
        assert_eq!(payload.format(), PayloadFormat::Cbor);

        let parsed = PayloadFormat::Cbor.parse(payload.as_bytes()).unwrap();
        assert_eq!(parsed, json!({"name": "S1", "age": 30, "tags": ["a", "b"], "ok": true}));
    }

    #[test]
    fn test_json_parse_rejects_garbage() {
        assert!(PayloadFormat::Json.parse(b"\xff\xfe").is_err());
    }
}
