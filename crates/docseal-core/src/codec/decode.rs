//! Call-data decoding against a signature catalog.

use super::abi::{ParamType, Token, Word, WORD};
use super::signature::{FunctionSignature, Selector, SignatureCatalog};
use crate::error::CodecError;

/// A call recovered from call-data bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCall {
    pub signature: FunctionSignature,
    pub args: Vec<Token>,
}

impl DecodedCall {
    pub fn name(&self) -> &str {
        self.signature.name()
    }

    pub fn selector(&self) -> Selector {
        self.signature.selector()
    }

    pub fn arg(&self, index: usize) -> Option<&Token> {
        self.args.get(index)
    }

    /// The argument at `index`, if it is a string.
    pub fn string_arg(&self, index: usize) -> Option<&str> {
        self.arg(index).and_then(Token::as_str)
    }
}

impl SignatureCatalog {
    /// Decode call data: match the selector, then decode parameters in order.
    pub fn decode(&self, call_data: &[u8]) -> Result<DecodedCall, CodecError> {
        decode_call(self, call_data)
    }
}

/// Decode call data against `catalog`.
pub fn decode_call(
    catalog: &SignatureCatalog,
    call_data: &[u8],
) -> Result<DecodedCall, CodecError> {
    if call_data.len() < Selector::LEN {
        return Err(CodecError::TruncatedCallData {
            offset: 0,
            needed: Selector::LEN,
            available: call_data.len(),
        });
    }

    let mut raw = [0u8; 4];
    raw.copy_from_slice(&call_data[..Selector::LEN]);
    let selector = Selector(raw);

    let signature = catalog
        .get(&selector)
        .ok_or(CodecError::UnknownSelector(raw))?;

    let args = decode_params(signature.inputs(), &call_data[Selector::LEN..])?;
    Ok(DecodedCall {
        signature: signature.clone(),
        args,
    })
}

/// Decode parameters (without selector) per `types`.
pub fn decode_params(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, CodecError> {
    let head_len = WORD * types.len();
    if data.len() < head_len {
        return Err(CodecError::TruncatedCallData {
            offset: data.len(),
            needed: head_len,
            available: data.len(),
        });
    }

    types
        .iter()
        .enumerate()
        .map(|(i, ty)| {
            let word = read_word(data, i * WORD)?;
            if ty.is_dynamic() {
                let offset = word_to_usize(&word, "offset")?;
                let body = read_dynamic(data, offset)?;
                match ty {
                    ParamType::String => {
                        String::from_utf8(body.to_vec()).map(Token::String).map_err(|_| {
                            CodecError::TypeDecodeError(format!(
                                "parameter {} is not valid UTF-8",
                                i
                            ))
                        })
                    }
                    _ => Ok(Token::Bytes(body.to_vec())),
                }
            } else {
                decode_static(ty, word, i)
            }
        })
        .collect()
}

fn decode_static(ty: &ParamType, word: [u8; WORD], index: usize) -> Result<Token, CodecError> {
    let invalid = |what: &str| {
        CodecError::TypeDecodeError(format!("parameter {} is not a valid {}", index, what))
    };
    if !ty.is_valid() {
        return Err(invalid(&ty.to_string()));
    }

    match ty {
        ParamType::Address => {
            if word[..12].iter().any(|&b| b != 0) {
                return Err(invalid("address"));
            }
            let mut addr = [0u8; 20];
            addr.copy_from_slice(&word[12..]);
            Ok(Token::Address(addr))
        }
        ParamType::Bool => match Word(word).to_u128() {
            Some(0) => Ok(Token::Bool(false)),
            Some(1) => Ok(Token::Bool(true)),
            _ => Err(invalid("bool")),
        },
        ParamType::Uint(bits) => {
            let w = Word(word);
            if !w.fits_unsigned(*bits) {
                return Err(invalid(&ty.to_string()));
            }
            Ok(Token::Uint(w))
        }
        ParamType::Int(bits) => {
            let w = Word(word);
            if !w.fits_signed(*bits) {
                return Err(invalid(&ty.to_string()));
            }
            Ok(Token::Int(w))
        }
        ParamType::FixedBytes(n) => {
            if word[*n..].iter().any(|&b| b != 0) {
                return Err(invalid(&ty.to_string()));
            }
            Ok(Token::FixedBytes(word[..*n].to_vec()))
        }
        ParamType::Bytes | ParamType::String => Err(invalid("static value")),
    }
}

fn read_word(data: &[u8], offset: usize) -> Result<[u8; WORD], CodecError> {
    let end = offset.checked_add(WORD).filter(|&end| end <= data.len()).ok_or(
        CodecError::TruncatedCallData {
            offset,
            needed: WORD,
            available: data.len().saturating_sub(offset),
        },
    )?;
    let mut word = [0u8; WORD];
    word.copy_from_slice(&data[offset..end]);
    Ok(word)
}

/// Read `length || data` at `offset`. Trailing padding is not required.
fn read_dynamic(data: &[u8], offset: usize) -> Result<&[u8], CodecError> {
    let length_end = offset.checked_add(WORD).filter(|&end| end <= data.len()).ok_or_else(|| {
        CodecError::TypeDecodeError(format!(
            "offset {} points past the end of {} bytes of call data",
            offset,
            data.len()
        ))
    })?;

    let mut length_word = [0u8; WORD];
    length_word.copy_from_slice(&data[offset..length_end]);
    let length = word_to_usize(&length_word, "length prefix")?;

    let body_end = length_end
        .checked_add(length)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| {
            CodecError::TypeDecodeError(format!(
                "length prefix {} exceeds the {} bytes remaining",
                length,
                data.len() - length_end
            ))
        })?;

    Ok(&data[length_end..body_end])
}

fn word_to_usize(word: &[u8; WORD], what: &str) -> Result<usize, CodecError> {
    if word[..WORD - 8].iter().any(|&b| b != 0) {
        return Err(CodecError::TypeDecodeError(format!("{} does not fit in 64 bits", what)));
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&word[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(low))
        .map_err(|_| CodecError::TypeDecodeError(format!("{} does not fit in usize", what)))
}
