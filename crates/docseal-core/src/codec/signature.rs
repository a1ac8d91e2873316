//! Function signatures, selectors and the signature catalog.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::abi::ParamType;
use crate::crypto::keccak256;
use crate::error::CodecError;

/// The 4-byte prefix identifying which function a call encodes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Selector(pub [u8; 4]);

impl Selector {
    pub const LEN: usize = 4;

    /// First four bytes of Keccak-256 over the canonical signature text.
    pub fn for_signature(canonical: &str) -> Self {
        let digest = keccak256(canonical.as_bytes());
        Self([digest[0], digest[1], digest[2], digest[3]])
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector({})", self.to_hex())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A function name plus ordered parameter types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionSignature {
    name: String,
    inputs: Vec<ParamType>,
}

impl FunctionSignature {
    /// Build a signature from parts. Widths are not checked here; catalogs
    /// refuse signatures whose types are out of range.
    pub fn new(name: impl Into<String>, inputs: Vec<ParamType>) -> Self {
        Self {
            name: name.into(),
            inputs,
        }
    }

    /// Parse `name(type1,type2)`.
    ///
    /// Whitespace is ignored and parameter names are tolerated, so
    /// `addDocument(string ipfsHash)` parses the same as `addDocument(string)`.
    pub fn parse(text: &str) -> Result<Self, CodecError> {
        let text = text.trim();
        let text = text.strip_prefix("function ").unwrap_or(text).trim();

        let open = text
            .find('(')
            .ok_or_else(|| CodecError::InvalidSignature(format!("missing `(` in `{}`", text)))?;
        let inner = text[open + 1..]
            .strip_suffix(')')
            .ok_or_else(|| CodecError::InvalidSignature(format!("missing `)` in `{}`", text)))?;

        let name = text[..open].trim();
        if !is_identifier(name) {
            return Err(CodecError::InvalidSignature(format!(
                "invalid function name `{}`",
                name
            )));
        }
        if inner.contains('(') || inner.contains(')') {
            return Err(CodecError::InvalidSignature(format!(
                "tuple parameters are not supported: `{}`",
                text
            )));
        }

        let inputs = if inner.trim().is_empty() {
            Vec::new()
        } else {
            inner
                .split(',')
                .map(|param| {
                    let ty = param.split_whitespace().next().ok_or_else(|| {
                        CodecError::InvalidSignature(format!("empty parameter in `{}`", text))
                    })?;
                    ParamType::parse(ty)
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Self::new(name, inputs))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[ParamType] {
        &self.inputs
    }

    /// `name(type1,type2)` with canonical type names and no spaces.
    pub fn canonical(&self) -> String {
        let types: Vec<String> = self.inputs.iter().map(ToString::to_string).collect();
        format!("{}({})", self.name, types.join(","))
    }

    pub fn selector(&self) -> Selector {
        Selector::for_signature(&self.canonical())
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl std::str::FromStr for FunctionSignature {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for FunctionSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical())
    }
}

impl<'de> Deserialize<'de> for FunctionSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// The set of function signatures a decoder recognizes, keyed by selector.
///
/// Building a catalog with two distinct signatures that share a selector is a
/// configuration error; the catalog never picks one by precedence.
#[derive(Debug, Clone, Default)]
pub struct SignatureCatalog {
    by_selector: HashMap<Selector, FunctionSignature>,
    order: Vec<Selector>,
}

impl SignatureCatalog {
    pub fn new(
        signatures: impl IntoIterator<Item = FunctionSignature>,
    ) -> Result<Self, CodecError> {
        let mut catalog = Self::default();
        for signature in signatures {
            catalog.insert(signature)?;
        }
        Ok(catalog)
    }

    /// Build a catalog from signature text.
    pub fn parse<'a>(signatures: impl IntoIterator<Item = &'a str>) -> Result<Self, CodecError> {
        let parsed = signatures
            .into_iter()
            .map(FunctionSignature::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(parsed)
    }

    /// Add a signature. Re-adding the same signature is a no-op.
    pub fn insert(&mut self, signature: FunctionSignature) -> Result<(), CodecError> {
        if let Some(ty) = signature.inputs().iter().find(|ty| !ty.is_valid()) {
            return Err(CodecError::InvalidSignature(format!(
                "type out of range in `{}`: `{}`",
                signature.canonical(),
                ty
            )));
        }
        let selector = signature.selector();
        if let Some(existing) = self.by_selector.get(&selector) {
            if existing.canonical() == signature.canonical() {
                return Ok(());
            }
            return Err(CodecError::AmbiguousSelector {
                selector: selector.0,
                first: existing.canonical(),
                second: signature.canonical(),
            });
        }
        self.by_selector.insert(selector, signature);
        self.order.push(selector);
        Ok(())
    }

    pub fn get(&self, selector: &Selector) -> Option<&FunctionSignature> {
        self.by_selector.get(selector)
    }

    pub fn contains(&self, signature: &FunctionSignature) -> bool {
        self.get(&signature.selector())
            .is_some_and(|s| s.canonical() == signature.canonical())
    }

    /// Signatures in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FunctionSignature> {
        self.order.iter().filter_map(|s| self.by_selector.get(s))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_selectors() {
        let cases = [
            ("transfer(address,uint256)", "0xa9059cbb"),
            ("balanceOf(address)", "0x70a08231"),
            ("approve(address,uint256)", "0x095ea7b3"),
            ("totalSupply()", "0x18160ddd"),
            ("transferFrom(address,address,uint256)", "0x23b872dd"),
        ];
        for (sig, expected) in cases {
            let parsed = FunctionSignature::parse(sig).unwrap();
            assert_eq!(parsed.selector().to_hex(), expected, "{}", sig);
        }
    }

    #[test]
    fn test_parse_normalizes() {
        let sig =
            FunctionSignature::parse(" function transfer( address to , uint amount ) ").unwrap();
        assert_eq!(sig.canonical(), "transfer(address,uint256)");
        assert_eq!(sig.name(), "transfer");
        assert_eq!(sig.inputs().len(), 2);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(FunctionSignature::parse("noParens").is_err());
        assert!(FunctionSignature::parse("(string)").is_err());
        assert!(FunctionSignature::parse("f(string").is_err());
        assert!(FunctionSignature::parse("f(string,)").is_err());
        assert!(FunctionSignature::parse("f((uint256,bool))").is_err());
        assert!(FunctionSignature::parse("9f(bool)").is_err());
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog =
            SignatureCatalog::parse(["addDocument(string)", "getDocument(address)"]).unwrap();
        assert_eq!(catalog.len(), 2);

        let add = FunctionSignature::parse("addDocument(string)").unwrap();
        assert!(catalog.contains(&add));
        assert_eq!(catalog.get(&add.selector()), Some(&add));

        let names: Vec<&str> = catalog.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["addDocument", "getDocument"]);
    }

    #[test]
    fn test_catalog_duplicate_is_idempotent() {
        let catalog =
            SignatureCatalog::parse(["addDocument(string)", "addDocument(string ipfsHash)"])
                .unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_catalog_rejects_out_of_range_types() {
        for inputs in [
            vec![ParamType::Uint(512)],
            vec![ParamType::String, ParamType::Int(264)],
            vec![ParamType::FixedBytes(33)],
        ] {
            let sig = FunctionSignature::new("wide", inputs);
            assert!(matches!(
                SignatureCatalog::new([sig]),
                Err(CodecError::InvalidSignature(_))
            ));
        }
    }

    #[test]
    fn test_catalog_rejects_selector_collision() {
        // Real 4-byte collisions are rare; plant a different signature under
        // addDocument(string)'s selector.
        let impostor = FunctionSignature::parse("addDocument(bytes)").unwrap();
        let selector = FunctionSignature::parse("addDocument(string)").unwrap().selector();

        let mut colliding = SignatureCatalog::default();
        colliding.by_selector.insert(selector, impostor);
        colliding.order.push(selector);
        let err = colliding
            .insert(FunctionSignature::parse("addDocument(string)").unwrap())
            .unwrap_err();
        assert!(matches!(err, CodecError::AmbiguousSelector { .. }));
    }

    #[test]
    fn test_signature_serde() {
        let sig: FunctionSignature = serde_json::from_str("\"addDocument(string hash)\"").unwrap();
        assert_eq!(serde_json::to_string(&sig).unwrap(), "\"addDocument(string)\"");
    }
}
