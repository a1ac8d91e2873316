//! Call-data encoding.
//!
//! Layout: `selector || head || tail`. Each parameter owns one head word in
//! declared order. Static values sit in the head; dynamic values put their
//! byte offset (relative to the start of the head) there and append
//! `length || data || zero padding` to the tail.

use bytes::Bytes;

use super::abi::{ParamType, Token, WORD};
use super::signature::FunctionSignature;
use crate::error::CodecError;

/// Encode a call to `signature` with `args`.
pub fn encode_call(signature: &FunctionSignature, args: &[Token]) -> Result<Bytes, CodecError> {
    let params = encode_params(signature.inputs(), args)?;
    let mut out = Vec::with_capacity(4 + params.len());
    out.extend_from_slice(&signature.selector().0);
    out.extend_from_slice(&params);
    Ok(Bytes::from(out))
}

/// Encode arguments without a selector.
pub fn encode_params(types: &[ParamType], args: &[Token]) -> Result<Vec<u8>, CodecError> {
    if types.len() != args.len() {
        return Err(CodecError::TypeMismatch(format!(
            "expected {} arguments, got {}",
            types.len(),
            args.len()
        )));
    }

    let head_len = WORD * types.len();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for (i, (ty, arg)) in types.iter().zip(args).enumerate() {
        if !arg.matches(ty) {
            return Err(CodecError::TypeMismatch(format!(
                "argument {} is not a valid {}",
                i, ty
            )));
        }

        match arg {
            Token::Bytes(data) => {
                head.extend_from_slice(&usize_word(head_len + tail.len()));
                encode_dynamic(&mut tail, data);
            }
            Token::String(s) => {
                head.extend_from_slice(&usize_word(head_len + tail.len()));
                encode_dynamic(&mut tail, s.as_bytes());
            }
            Token::Address(addr) => {
                let mut word = [0u8; WORD];
                word[12..].copy_from_slice(addr);
                head.extend_from_slice(&word);
            }
            Token::Bool(b) => head.extend_from_slice(&usize_word(usize::from(*b))),
            Token::Uint(w) | Token::Int(w) => head.extend_from_slice(&w.0),
            Token::FixedBytes(data) => {
                let mut word = [0u8; WORD];
                word[..data.len()].copy_from_slice(data);
                head.extend_from_slice(&word);
            }
        }
    }

    head.extend_from_slice(&tail);
    Ok(head)
}

fn encode_dynamic(buf: &mut Vec<u8>, data: &[u8]) {
    buf.extend_from_slice(&usize_word(data.len()));
    buf.extend_from_slice(data);
    let padding = (WORD - data.len() % WORD) % WORD;
    buf.resize(buf.len() + padding, 0);
}

pub(crate) fn usize_word(n: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(n as u64).to_be_bytes());
    word
}
