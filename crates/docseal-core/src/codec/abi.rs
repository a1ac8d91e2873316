//! Parameter types and typed argument values.

use std::fmt;

use crate::error::CodecError;

/// Size of one ABI word.
pub const WORD: usize = 32;

/// A parameter type supported by the codec.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    Address,
    Bool,
    /// Unsigned integer of the given bit width (8..=256, multiple of 8).
    Uint(usize),
    /// Two's complement signed integer of the given bit width.
    Int(usize),
    /// Fixed-size byte array, 1..=32 bytes.
    FixedBytes(usize),
    Bytes,
    String,
}

impl ParamType {
    /// Parse a canonical or aliased type name (`uint` means `uint256`).
    pub fn parse(s: &str) -> Result<Self, CodecError> {
        let s = s.trim();
        match s {
            "address" => return Ok(ParamType::Address),
            "bool" => return Ok(ParamType::Bool),
            "string" => return Ok(ParamType::String),
            "bytes" => return Ok(ParamType::Bytes),
            "uint" => return Ok(ParamType::Uint(256)),
            "int" => return Ok(ParamType::Int(256)),
            _ => {}
        }

        if s.ends_with(']') {
            return Err(CodecError::InvalidSignature(format!(
                "array types are not supported: `{}`",
                s
            )));
        }

        if let Some(bits) = s.strip_prefix("uint") {
            return int_width(s, bits).map(ParamType::Uint);
        }
        if let Some(bits) = s.strip_prefix("int") {
            return int_width(s, bits).map(ParamType::Int);
        }
        if let Some(len) = s.strip_prefix("bytes") {
            let n: usize = len
                .parse()
                .map_err(|_| CodecError::InvalidSignature(format!("unknown type `{}`", s)))?;
            if (1..=32).contains(&n) {
                return Ok(ParamType::FixedBytes(n));
            }
            return Err(CodecError::InvalidSignature(format!(
                "fixed bytes length out of range: `{}`",
                s
            )));
        }

        Err(CodecError::InvalidSignature(format!("unknown type `{}`", s)))
    }

    /// Whether the width parameters are in range. `parse` only yields valid
    /// types; hand-built ones may not be.
    pub fn is_valid(&self) -> bool {
        match self {
            ParamType::Uint(bits) | ParamType::Int(bits) => {
                (8..=256).contains(bits) && bits % 8 == 0
            }
            ParamType::FixedBytes(n) => (1..=WORD).contains(n),
            _ => true,
        }
    }

    /// Dynamic types are encoded out of line, behind an offset.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, ParamType::Bytes | ParamType::String)
    }
}

fn int_width(ty: &str, digits: &str) -> Result<usize, CodecError> {
    let bits: usize = digits
        .parse()
        .map_err(|_| CodecError::InvalidSignature(format!("unknown type `{}`", ty)))?;
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(CodecError::InvalidSignature(format!(
            "integer width out of range: `{}`",
            ty
        )));
    }
    Ok(bits)
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Address => f.write_str("address"),
            ParamType::Bool => f.write_str("bool"),
            ParamType::Uint(bits) => write!(f, "uint{}", bits),
            ParamType::Int(bits) => write!(f, "int{}", bits),
            ParamType::FixedBytes(n) => write!(f, "bytes{}", n),
            ParamType::Bytes => f.write_str("bytes"),
            ParamType::String => f.write_str("string"),
        }
    }
}

/// A 32-byte big-endian word holding an integer value.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Word(pub [u8; WORD]);

impl Word {
    pub const ZERO: Self = Self([0u8; WORD]);

    pub fn from_u128(n: u128) -> Self {
        let mut w = [0u8; WORD];
        w[16..].copy_from_slice(&n.to_be_bytes());
        Self(w)
    }

    /// Sign-extended two's complement.
    pub fn from_i128(n: i128) -> Self {
        let fill = if n < 0 { 0xff } else { 0x00 };
        let mut w = [fill; WORD];
        w[16..].copy_from_slice(&n.to_be_bytes());
        Self(w)
    }

    /// The value, if it fits in a `u128`.
    pub fn to_u128(&self) -> Option<u128> {
        if self.0[..16].iter().any(|&b| b != 0) {
            return None;
        }
        let mut low = [0u8; 16];
        low.copy_from_slice(&self.0[16..]);
        Some(u128::from_be_bytes(low))
    }

    /// The value read as two's complement, if it fits in an `i128`.
    pub fn to_i128(&self) -> Option<i128> {
        let mut low = [0u8; 16];
        low.copy_from_slice(&self.0[16..]);
        let n = i128::from_be_bytes(low);
        let fill = if n < 0 { 0xff } else { 0x00 };
        if self.0[..16].iter().all(|&b| b == fill) {
            Some(n)
        } else {
            None
        }
    }

    /// Whether the value fits an unsigned integer of `bits` width.
    /// Widths outside 8..=256 never fit.
    pub fn fits_unsigned(&self, bits: usize) -> bool {
        match high_bytes(bits) {
            Some(high) => self.0[..high].iter().all(|&b| b == 0),
            None => false,
        }
    }

    /// Whether the value is a properly sign-extended integer of `bits` width.
    pub fn fits_signed(&self, bits: usize) -> bool {
        let Some(high) = high_bytes(bits) else {
            return false;
        };
        if high == 0 {
            return true;
        }
        let fill = if self.0[high] & 0x80 != 0 { 0xff } else { 0x00 };
        self.0[..high].iter().all(|&b| b == fill)
    }
}

/// Leading bytes that must hold padding for an integer of `bits` width.
fn high_bytes(bits: usize) -> Option<usize> {
    if bits < 8 {
        return None;
    }
    WORD.checked_sub(bits / 8)
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word(0x{})", hex::encode(self.0))
    }
}

/// A typed argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Address([u8; 20]),
    Bool(bool),
    Uint(Word),
    Int(Word),
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
}

impl Token {
    /// Whether this value can be encoded as `ty`.
    pub fn matches(&self, ty: &ParamType) -> bool {
        if !ty.is_valid() {
            return false;
        }
        match (self, ty) {
            (Token::Address(_), ParamType::Address) => true,
            (Token::Bool(_), ParamType::Bool) => true,
            (Token::Uint(w), ParamType::Uint(bits)) => w.fits_unsigned(*bits),
            (Token::Int(w), ParamType::Int(bits)) => w.fits_signed(*bits),
            (Token::FixedBytes(b), ParamType::FixedBytes(n)) => b.len() == *n,
            (Token::Bytes(_), ParamType::Bytes) => true,
            (Token::String(_), ParamType::String) => true,
            _ => false,
        }
    }

    /// The zero value of `ty`: all-zero word for static types, empty for dynamic.
    pub fn zero(ty: &ParamType) -> Self {
        match ty {
            ParamType::Address => Token::Address([0; 20]),
            ParamType::Bool => Token::Bool(false),
            ParamType::Uint(_) => Token::Uint(Word::ZERO),
            ParamType::Int(_) => Token::Int(Word::ZERO),
            ParamType::FixedBytes(n) => Token::FixedBytes(vec![0; *n]),
            ParamType::Bytes => Token::Bytes(Vec::new()),
            ParamType::String => Token::String(String::new()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Token::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            Token::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Address(a) => write!(f, "0x{}", hex::encode(a)),
            Token::Bool(b) => write!(f, "{}", b),
            Token::Uint(w) => match w.to_u128() {
                Some(n) => write!(f, "{}", n),
                None => write!(f, "0x{}", hex::encode(w.0)),
            },
            Token::Int(w) => match w.to_i128() {
                Some(n) => write!(f, "{}", n),
                None => write!(f, "0x{}", hex::encode(w.0)),
            },
            Token::FixedBytes(b) | Token::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            Token::String(s) => write!(f, "{:?}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_types() {
        assert_eq!(ParamType::parse("string").unwrap(), ParamType::String);
        assert_eq!(ParamType::parse("uint").unwrap(), ParamType::Uint(256));
        assert_eq!(ParamType::parse("int8").unwrap(), ParamType::Int(8));
        assert_eq!(ParamType::parse("bytes32").unwrap(), ParamType::FixedBytes(32));
        assert!(ParamType::parse("uint7").is_err());
        assert!(ParamType::parse("bytes33").is_err());
        assert!(ParamType::parse("string[]").is_err());
        assert!(ParamType::parse("tuple").is_err());
    }

    #[test]
    fn test_word_integers() {
        assert_eq!(Word::from_u128(5).to_u128(), Some(5));
        assert_eq!(Word::from_i128(-5).to_i128(), Some(-5));
        assert_eq!(Word::from_i128(-1).0, [0xff; 32]);
        assert!(Word::from_u128(255).fits_unsigned(8));
        assert!(!Word::from_u128(256).fits_unsigned(8));
        assert!(Word::from_i128(-128).fits_signed(8));
        assert!(!Word::from_i128(-129).fits_signed(8));
        assert!(!Word::from_u128(128).fits_signed(8));
        assert_eq!(Word([0xff; 32]).to_u128(), None);
    }

    #[test]
    fn test_out_of_range_widths_never_fit() {
        let max = Word([0xff; 32]);
        assert!(!Word::ZERO.fits_unsigned(512));
        assert!(!Word::ZERO.fits_signed(512));
        assert!(!max.fits_signed(4));
        assert!(max.fits_unsigned(256));

        assert!(!ParamType::Uint(512).is_valid());
        assert!(!ParamType::Int(0).is_valid());
        assert!(!ParamType::FixedBytes(40).is_valid());
        assert!(!Token::Uint(Word::ZERO).matches(&ParamType::Uint(512)));
        assert!(!Token::FixedBytes(vec![0; 40]).matches(&ParamType::FixedBytes(40)));
    }

    #[test]
    fn test_token_matches() {
        assert!(Token::String("x".into()).matches(&ParamType::String));
        assert!(!Token::String("x".into()).matches(&ParamType::Bytes));
        assert!(Token::FixedBytes(vec![0; 4]).matches(&ParamType::FixedBytes(4)));
        assert!(!Token::FixedBytes(vec![0; 3]).matches(&ParamType::FixedBytes(4)));
    }

    #[test]
    fn test_zero_tokens_match_their_type() {
        for ty in ["address", "bool", "uint8", "int256", "bytes32", "bytes", "string"] {
            let ty = ParamType::parse(ty).unwrap();
            assert!(Token::zero(&ty).matches(&ty), "{}", ty);
        }
    }
}
