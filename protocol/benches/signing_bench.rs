// Signing & verification benchmarks over canonical transaction bytes.
//
// Covers Ed25519 keypair generation, detached signing and verification of an
// encoded add_assets transaction, and the SignedPayload wire round trip.

use criterion::{criterion_group, criterion_main, Criterion};

use assetchain_protocol::assets::FeeSchedule;
use assetchain_protocol::crypto::Keypair;
use assetchain_protocol::transaction::{
    sign_encoded, verify_encoded, AddAssetsBuilder, EncodedBuffer, SignedPayload,
};

fn encoded_for(keypair: &Keypair) -> EncodedBuffer {
    let fees = FeeSchedule::new(10, "0.1", 20, "0.2", 9, "0.99999")
        .unwrap()
        .shared();
    let mut tx = AddAssetsBuilder::new(keypair.public_key(), 123);
    tx.add_asset("Asset#10", 10, &fees, keypair.public_key())
        .unwrap();
    tx.add_asset("Asset#00", 10_000, &fees, keypair.public_key())
        .unwrap();
    tx.encode().unwrap()
}

fn bench_keypair_generation(c: &mut Criterion) {
    c.bench_function("ed25519/keypair_generate", |b| {
        b.iter(Keypair::generate);
    });
}

fn bench_sign_encoded(c: &mut Criterion) {
    let keypair = Keypair::generate();
    let encoded = encoded_for(&keypair);

    c.bench_function("ed25519/sign_encoded", |b| {
        b.iter(|| sign_encoded(&keypair, &encoded));
    });
}

fn bench_verify_encoded(c: &mut Criterion) {
    let keypair = Keypair::generate();
    let encoded = encoded_for(&keypair);
    let signature = sign_encoded(&keypair, &encoded);
    let public_key = keypair.public_key();

    c.bench_function("ed25519/verify_encoded", |b| {
        b.iter(|| verify_encoded(&public_key, &encoded, &signature));
    });
}

fn bench_signed_payload_roundtrip(c: &mut Criterion) {
    let keypair = Keypair::generate();
    let wire = SignedPayload::sign(encoded_for(&keypair), &keypair)
        .unwrap()
        .to_bytes();

    c.bench_function("signed_payload/parse_and_verify", |b| {
        b.iter(|| SignedPayload::from_bytes(&wire).unwrap().verify());
    });
}

criterion_group!(
    benches,
    bench_keypair_generation,
    bench_sign_encoded,
    bench_verify_encoded,
    bench_signed_payload_roundtrip,
);
criterion_main!(benches);
