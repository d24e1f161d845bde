//! End-to-end integration tests for asset transactions.
//!
//! These tests exercise the whole client-side lifecycle: fee schedule
//! creation, building, canonical encoding, signing, shipping the signed
//! bytes, and decoding plus verification on the receiving side. Each test
//! stands alone; nothing is shared between them.

use assetchain_protocol::assets::{AssetId, FeeSchedule, SharedFees};
use assetchain_protocol::config::{EncoderLimits, HEADER_SIZE};
use assetchain_protocol::crypto::Keypair;
use assetchain_protocol::error::{ErrorKind, TxError};
use assetchain_protocol::transaction::{
    decode_add_assets, decode_delete_assets, decode_transfer, peek_kind, sign_encoded,
    verify_encoded, AddAssetsBuilder, DeleteAssetsBuilder, SignedPayload, TransactionKind,
    TransferBuilder,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn standard_fees() -> SharedFees {
    FeeSchedule::new(10, "0.1", 20, "0.2", 9, "0.99999")
        .expect("valid schedule")
        .shared()
}

fn scenario(keypair: &Keypair) -> AddAssetsBuilder {
    let fees = standard_fees();
    let mut tx = AddAssetsBuilder::new(keypair.public_key(), 123);
    tx.add_asset("Asset#10", 10, &fees, keypair.public_key())
        .expect("first asset");
    tx.add_asset("Asset#00", 10_000, &fees, keypair.public_key())
        .expect("second asset");
    tx
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn build_encode_sign_ship_verify_decode() {
    let keypair = Keypair::generate();
    let tx = scenario(&keypair);
    let encoded = tx.encode().expect("encode");
    assert_eq!(encoded.len(), 252);

    // Sender side.
    let wire = SignedPayload::sign(encoded, &keypair)
        .expect("sign")
        .to_bytes();

    // Receiver side.
    let received = SignedPayload::from_bytes(&wire).expect("parse");
    assert!(received.verify());
    assert_eq!(received.kind(), TransactionKind::AddAssets);
    assert_eq!(peek_kind(received.payload()).unwrap(), TransactionKind::AddAssets);

    let decoded = decode_add_assets(received.payload()).expect("decode");
    assert_eq!(decoded.signer(), &keypair.public_key());
    assert_eq!(decoded.seed(), 123);
    let names: Vec<&str> = decoded.entries().iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["Asset#10", "Asset#00"]);
    assert_eq!(decoded.entries()[1].quantity(), 10_000);

    // Re-encoding the decoded state reproduces the signed bytes exactly.
    assert_eq!(
        decoded.encode().unwrap().as_bytes(),
        received.payload().as_bytes()
    );
}

#[test]
fn issue_then_delete_by_derived_id() {
    let keypair = Keypair::generate();
    let issue = scenario(&keypair);
    let ids: Vec<AssetId> = issue
        .entries()
        .iter()
        .map(|e| e.asset_id(&keypair.public_key()))
        .collect();

    let mut delete = DeleteAssetsBuilder::new(keypair.public_key(), 124);
    delete.add_asset_by_name("Asset#10", 5).unwrap();
    delete.add_asset(ids[1], 10_000).unwrap();
    assert_eq!(delete.entries()[0].id, ids[0]);

    let encoded = delete.encode().unwrap();
    assert_eq!(encoded.len(), delete.encoded_len());
    let sig = sign_encoded(&keypair, &encoded);
    assert!(verify_encoded(&keypair.public_key(), &encoded, &sig));

    let decoded = decode_delete_assets(&encoded).unwrap();
    assert_eq!(decoded.entries(), delete.entries());
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[test]
fn independent_builders_agree_byte_for_byte() {
    let keypair = Keypair::from_seed(&[42u8; 32]);
    let a = scenario(&keypair).encode().unwrap();
    let b = scenario(&keypair).encode().unwrap();
    assert_eq!(a, b);
    assert_eq!(sign_encoded(&keypair, &a), sign_encoded(&keypair, &b));
}

#[test]
fn schedule_sharing_does_not_change_bytes() {
    let keypair = Keypair::generate();
    let shared = scenario(&keypair).encode().unwrap();

    let mut separate = AddAssetsBuilder::new(keypair.public_key(), 123);
    separate
        .add_asset("Asset#10", 10, &standard_fees(), keypair.public_key())
        .unwrap();
    separate
        .add_asset("Asset#00", 10_000, &standard_fees(), keypair.public_key())
        .unwrap();
    assert_eq!(separate.encode().unwrap(), shared);
}

#[test]
fn order_is_significant() {
    let keypair = Keypair::generate();
    let fees = standard_fees();
    let mut reversed = AddAssetsBuilder::new(keypair.public_key(), 123);
    reversed
        .add_asset("Asset#00", 10_000, &fees, keypair.public_key())
        .unwrap();
    reversed
        .add_asset("Asset#10", 10, &fees, keypair.public_key())
        .unwrap();
    assert_ne!(
        reversed.encode().unwrap(),
        scenario(&keypair).encode().unwrap()
    );
}

#[test]
fn threads_sharing_one_schedule_encode_identically() {
    let keypair = Keypair::from_seed(&[7u8; 32]);
    let fees = standard_fees();

    let encoded: Vec<Vec<u8>> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let fees = &fees;
                let key = keypair.public_key();
                scope.spawn(move || {
                    let mut tx = AddAssetsBuilder::new(key, 123);
                    tx.add_asset("Asset#10", 10, fees, key).unwrap();
                    tx.add_asset("Asset#00", 10_000, fees, key).unwrap();
                    tx.encode().unwrap().to_vec()
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    let expected = scenario(&keypair).encode().unwrap().to_vec();
    assert_eq!(encoded.len(), 8);
    for bytes in &encoded {
        assert_eq!(bytes, &expected);
    }
    // Every builder has been dropped; only the caller's reference remains.
    assert_eq!(std::sync::Arc::strong_count(&fees), 1);
}

// ---------------------------------------------------------------------------
// Transfer
// ---------------------------------------------------------------------------

#[test]
fn issue_then_transfer_to_another_key() {
    let sender = Keypair::generate();
    let recipient = Keypair::generate();
    let issue = scenario(&sender);
    let id = issue.entries()[0].asset_id(&sender.public_key());

    let mut transfer = TransferBuilder::new(sender.public_key(), recipient.public_key(), 0, 125);
    transfer.set_memo("first delivery").unwrap();
    transfer.add_asset(id, 4).unwrap();

    let wire = SignedPayload::sign(transfer.encode().unwrap(), &sender)
        .unwrap()
        .to_bytes();
    let received = SignedPayload::from_bytes(&wire).unwrap();
    assert!(received.verify());
    assert_eq!(peek_kind(received.payload()).unwrap(), TransactionKind::Transfer);

    let decoded = decode_transfer(received.payload()).unwrap();
    assert_eq!(decoded.recipient(), &recipient.public_key());
    assert_eq!(decoded.memo(), "first delivery");
    assert_eq!(decoded.entries()[0].id, id);
    assert_eq!(decoded.entries()[0].quantity, 4);
}

// ---------------------------------------------------------------------------
// Failure modes
// ---------------------------------------------------------------------------

#[test]
fn invalid_fee_rates_name_the_field() {
    for bad in ["1.5", "-0.1", "1e-3", "", ".5", "0.", " 0.1", "0,1"] {
        let err = FeeSchedule::new(1, "0.1", 1, bad, 1, "0.1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFeeRate, "rate {:?}", bad);
        assert!(err.to_string().contains("trade"), "rate {:?}", bad);
    }
}

#[test]
fn tampered_payload_fails_verification() {
    let keypair = Keypair::generate();
    let encoded = scenario(&keypair).encode().unwrap();
    let sig = sign_encoded(&keypair, &encoded);

    for i in [0, HEADER_SIZE, encoded.len() / 2, encoded.len() - 1] {
        let mut tampered = encoded.to_vec();
        tampered[i] ^= 0x80;
        assert!(
            !verify_encoded(&keypair.public_key(), &tampered, &sig),
            "flip at {} still verified",
            i
        );
    }
}

#[test]
fn limits_from_json_drive_overflow() {
    let limits = EncoderLimits::from_json(r#"{"max_encoded_size": 100}"#).unwrap();
    let keypair = Keypair::generate();
    let fees = standard_fees();
    let mut tx = AddAssetsBuilder::new(keypair.public_key(), 1).with_limits(limits);
    tx.add_asset("Asset#10", 1, &fees, keypair.public_key())
        .unwrap();
    assert_eq!(
        tx.encode().unwrap_err(),
        TxError::EncodingOverflow {
            size: 149,
            max: 100
        }
    );
}
