//! Golden vectors, checked against what the kernel actually writes.

use docseal::core::{encode_call, FunctionSignature, Token};
use docseal_testkit::fixtures::{sample_submission, TestHarness};
use docseal_testkit::vectors::{all_call_vectors, verify_all_vectors};

#[test]
fn test_golden_vectors() {
    let failures: Vec<_> = verify_all_vectors()
        .into_iter()
        .filter(|(_, ok, _)| !ok)
        .collect();
    assert!(failures.is_empty(), "mismatched vectors: {:#?}", failures);
}

#[tokio::test]
async fn test_ledger_call_matches_reference_encoding() {
    let h = TestHarness::new();
    let record = h
        .kernel
        .attest(&sample_submission("S1", "alice", None))
        .await
        .unwrap()
        .into_record();
    let (tx, _) = h.kernel.inspect_transaction(&record.transaction_id).await.unwrap();

    let sig = FunctionSignature::parse("addDocument(string)").unwrap();
    let expected = encode_call(&sig, &[Token::String(record.content_id.into_string())]).unwrap();
    assert_eq!(tx.call_data, expected);

    // Same layout as the reference vectors: selector, offset 0x20, length.
    let reference = hex::decode(all_call_vectors()[0].call_data).unwrap();
    assert_eq!(&tx.call_data[..36], &reference[..36]);
}
