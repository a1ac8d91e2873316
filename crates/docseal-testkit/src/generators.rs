//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use docseal_core::{
    ContentId, FunctionSignature, ParamType, Submission, SubmissionId, Token, TransactionId, Word,
};

/// Generate a submission identity.
pub fn submission_id() -> impl Strategy<Value = SubmissionId> {
    "[A-Za-z0-9][A-Za-z0-9 _-]{0,31}".prop_map(SubmissionId::new)
}

/// Generate a content id shaped like a CIDv0.
pub fn content_id() -> impl Strategy<Value = ContentId> {
    "Qm[1-9A-HJ-NP-Za-km-z]{44}".prop_map(ContentId::new)
}

/// Generate a 32-byte hex transaction id.
pub fn transaction_id() -> impl Strategy<Value = TransactionId> {
    any::<[u8; 32]>().prop_map(|b| TransactionId::new(format!("0x{}", hex::encode(b))))
}

/// Generate a JSON scalar.
pub fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        ".{0,24}".prop_map(Value::String),
    ]
}

/// Generate a JSON value nested up to a few levels.
pub fn json_value() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z_]{1,8}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Generate a supported parameter type.
pub fn param_type() -> impl Strategy<Value = ParamType> {
    prop_oneof![
        Just(ParamType::Address),
        Just(ParamType::Bool),
        (1usize..=32).prop_map(|n| ParamType::Uint(n * 8)),
        (1usize..=32).prop_map(|n| ParamType::Int(n * 8)),
        (1usize..=32).prop_map(ParamType::FixedBytes),
        Just(ParamType::Bytes),
        Just(ParamType::String),
    ]
}

/// Generate a token valid for `ty`.
pub fn token_for(ty: ParamType) -> BoxedStrategy<Token> {
    match ty {
        ParamType::Address => any::<[u8; 20]>().prop_map(Token::Address).boxed(),
        ParamType::Bool => any::<bool>().prop_map(Token::Bool).boxed(),
        ParamType::Uint(bits) => any::<[u8; 32]>()
            .prop_map(move |mut w| {
                let high = 32 - bits / 8;
                w[..high].fill(0);
                Token::Uint(Word(w))
            })
            .boxed(),
        ParamType::Int(bits) => any::<i128>()
            .prop_map(move |n| {
                let n = if bits < 128 {
                    let shift = 128 - bits;
                    (n << shift) >> shift
                } else {
                    n
                };
                Token::Int(Word::from_i128(n))
            })
            .boxed(),
        ParamType::FixedBytes(n) => prop::collection::vec(any::<u8>(), n..=n)
            .prop_map(Token::FixedBytes)
            .boxed(),
        ParamType::Bytes => prop::collection::vec(any::<u8>(), 0..80)
            .prop_map(Token::Bytes)
            .boxed(),
        ParamType::String => ".{0,80}".prop_map(Token::String).boxed(),
    }
}

/// Generate a function signature with matching arguments.
pub fn call() -> impl Strategy<Value = (FunctionSignature, Vec<Token>)> {
    ("[a-z][a-zA-Z0-9]{0,15}", prop::collection::vec(param_type(), 0..5)).prop_flat_map(
        |(name, types)| {
            let tokens: Vec<BoxedStrategy<Token>> = types.iter().cloned().map(token_for).collect();
            (Just(FunctionSignature::new(name, types)), tokens)
        },
    )
}

/// Parameters for generating a submission.
#[derive(Debug, Clone)]
pub struct SubmissionParams {
    pub name: String,
    pub owner: Option<String>,
    pub claim: Option<String>,
    pub extra: Map<String, Value>,
}

impl SubmissionParams {
    pub fn to_submission(&self) -> Submission {
        let mut fields = self.extra.clone();
        fields.insert("name".into(), Value::String(self.name.clone()));
        if let Some(owner) = &self.owner {
            fields.insert("owner".into(), Value::String(owner.clone()));
        }
        if let Some(claim) = &self.claim {
            fields.insert("citizenship_no".into(), Value::String(claim.clone()));
        }
        Submission::new(fields)
    }
}

impl Arbitrary for SubmissionParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            submission_id(),
            prop::option::of("[a-z]{1,12}"),
            prop::option::of("[0-9]{2}-[0-9]{2}-[0-9]{5}"),
            // Field names are prefixed so they never collide with metadata.
            prop::collection::btree_map("x_[a-z]{1,8}", json_value(), 0..6),
        )
            .prop_map(|(id, owner, claim, extra)| SubmissionParams {
                name: id.into_string(),
                owner,
                claim,
                extra: extra.into_iter().collect(),
            })
            .boxed()
    }
}
