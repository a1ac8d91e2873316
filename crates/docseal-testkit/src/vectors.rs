//! Golden test vectors for deterministic verification.
//!
//! Selectors and call encodings match the EVM contract ABI as produced by
//! common tooling. Canonical payload vectors pin the byte layout of both
//! payload formats.

use serde_json::{json, Value};

use docseal_core::{
    encode_call, Canonicalizer, FunctionSignature, PayloadFormat, Submission, Token, Word,
};

/// A signature and its expected 4-byte selector.
#[derive(Debug, Clone)]
pub struct SelectorVector {
    pub signature: &'static str,
    /// Expected selector (hex, no prefix).
    pub selector: &'static str,
}

/// A call and its expected encoding.
#[derive(Debug, Clone)]
pub struct CallVector {
    pub name: &'static str,
    pub signature: &'static str,
    pub args: Vec<Token>,
    /// Expected call data (hex, no prefix).
    pub call_data: &'static str,
}

/// A submission and its expected canonical payload.
#[derive(Debug, Clone)]
pub struct CanonicalVector {
    pub name: &'static str,
    pub format: PayloadFormat,
    pub submission: Value,
    /// Expected payload (hex).
    pub payload: &'static str,
}

pub fn all_selector_vectors() -> Vec<SelectorVector> {
    vec![
        SelectorVector { signature: "addDocument(string)", selector: "f740e045" },
        SelectorVector { signature: "getDocument(address)", selector: "72e2a59e" },
        SelectorVector { signature: "documents(address)", selector: "cbe99b39" },
        SelectorVector { signature: "transfer(address,uint256)", selector: "a9059cbb" },
        SelectorVector { signature: "transferFrom(address,address,uint256)", selector: "23b872dd" },
        SelectorVector { signature: "approve(address,uint256)", selector: "095ea7b3" },
        SelectorVector { signature: "balanceOf(address)", selector: "70a08231" },
        SelectorVector { signature: "totalSupply()", selector: "18160ddd" },
    ]
}

pub fn all_call_vectors() -> Vec<CallVector> {
    let account = [
        0x00, 0xa3, 0x29, 0xc0, 0x64, 0x87, 0x69, 0xa7, 0x3a, 0xfa, 0xc7, 0xf9, 0x38, 0x1e, 0x08,
        0xfb, 0x43, 0xdb, 0xea, 0x72,
    ];

    vec![
        CallVector {
            name: "addDocument with a short string",
            signature: "addDocument(string)",
            args: vec![Token::String("Hello".into())],
            call_data: concat!(
                "f740e045",
                "0000000000000000000000000000000000000000000000000000000000000020",
                "0000000000000000000000000000000000000000000000000000000000000005",
                "48656c6c6f000000000000000000000000000000000000000000000000000000",
            ),
        },
        CallVector {
            name: "addDocument with a CIDv0",
            signature: "addDocument(string)",
            args: vec![Token::String("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG".into())],
            call_data: concat!(
                "f740e045",
                "0000000000000000000000000000000000000000000000000000000000000020",
                "000000000000000000000000000000000000000000000000000000000000002e",
                "516d597741504a7a7635435a736e4136323573335866326e656d745967507048",
                "6457457a37396f6a576e50626447000000000000000000000000000000000000",
            ),
        },
        CallVector {
            name: "addDocument with an empty string",
            signature: "addDocument(string)",
            args: vec![Token::String(String::new())],
            call_data: concat!(
                "f740e045",
                "0000000000000000000000000000000000000000000000000000000000000020",
                "0000000000000000000000000000000000000000000000000000000000000000",
            ),
        },
        CallVector {
            name: "transfer",
            signature: "transfer(address,uint256)",
            args: vec![Token::Address([0x11; 20]), Token::Uint(Word::from_u128(1000))],
            call_data: concat!(
                "a9059cbb",
                "0000000000000000000000001111111111111111111111111111111111111111",
                "00000000000000000000000000000000000000000000000000000000000003e8",
            ),
        },
        CallVector {
            name: "getDocument",
            signature: "getDocument(address)",
            args: vec![Token::Address(account)],
            call_data: concat!(
                "72e2a59e",
                "00000000000000000000000000a329c0648769a73afac7f9381e08fb43dbea72",
            ),
        },
    ]
}

pub fn all_canonical_vectors() -> Vec<CanonicalVector> {
    vec![
        CanonicalVector {
            name: "JSON sorts keys and drops metadata",
            format: PayloadFormat::Json,
            submission: json!({
                "owner": "alice",
                "name": "S1",
                "citizenship_no": "C1",
                "b": 2,
                "a": {"z": 1, "y": [true, null]}
            }),
            // {"a":{"y":[true,null],"z":1},"b":2,"name":"S1"}
            payload: "7b2261223a7b2279223a5b747275652c6e756c6c5d2c227a223a317d2c2262223a322c226e616d65223a225331227d",
        },
        CanonicalVector {
            name: "CBOR orders keys by encoded length first",
            format: PayloadFormat::Cbor,
            submission: json!({"name": "S1", "b": 2, "owner": "alice"}),
            payload: "a2616202646e616d65625331",
        },
    ]
}

/// Check every vector. Returns `(name, matches, detail)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    let mut results = Vec::new();

    for v in all_selector_vectors() {
        let (ok, detail) = match FunctionSignature::parse(v.signature) {
            Ok(sig) => {
                let got = hex::encode(sig.selector().0);
                (got == v.selector, got)
            }
            Err(e) => (false, e.to_string()),
        };
        results.push((v.signature.to_string(), ok, detail));
    }

    for v in all_call_vectors() {
        let encoded = FunctionSignature::parse(v.signature)
            .and_then(|sig| encode_call(&sig, &v.args));
        let (ok, detail) = match encoded {
            Ok(data) => {
                let got = hex::encode(&data);
                (got == v.call_data, got)
            }
            Err(e) => (false, e.to_string()),
        };
        results.push((v.name.to_string(), ok, detail));
    }

    for v in all_canonical_vectors() {
        let canon = Canonicalizer::default().with_format(v.format);
        let payload = Submission::from_value(v.submission.clone())
            .and_then(|s| canon.canonicalize(&s));
        let (ok, detail) = match payload {
            Ok(p) => {
                let got = hex::encode(p.as_bytes());
                (got == v.payload, got)
            }
            Err(e) => (false, e.to_string()),
        };
        results.push((v.name.to_string(), ok, detail));
    }

    results
}
