//! Call-data codec.
//!
//! Encodes a function call as `selector || arguments` and decodes call data
//! back into a function name and typed arguments, given a catalog of known
//! signatures. The wire format is the EVM contract ABI for the supported
//! types: static `address`, `bool`, `uint<N>`, `int<N>`, `bytes<N>` and
//! dynamic `bytes`, `string`.
//!
//! The codec is pure: no I/O, no state beyond the catalog it is given.

pub mod abi;
pub mod decode;
pub mod encode;
pub mod signature;

pub use abi::{ParamType, Token, Word};
pub use decode::{decode_call, decode_params, DecodedCall};
pub use encode::{encode_call, encode_params};
pub use signature::{FunctionSignature, Selector, SignatureCatalog};
