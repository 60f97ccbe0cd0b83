//! # Remote Signer Benchmarks
//!
//! | Path | What is measured |
//! |------|------------------|
//! | rules | pure attestation check against a populated history |
//! | database | one full `may_sign_attestation` transaction on SQLite |
//! | bls | one BLS signature over a 32-byte root |

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rs_01_slashing_protection::domain::{check_attestation, AttestationHistory};
use rs_01_slashing_protection::test_utils::{make_public_key, make_root, migrated_context};
use rs_01_slashing_protection::{SignedAttestation, SlashingProtection, ValidatorId};
use rs_02_signing::BlsKeyPair;
use std::time::Duration;

fn bench_attestation_rules(c: &mut Criterion) {
    let id = ValidatorId(1);
    let prior = |source: u64, target: u64| SignedAttestation {
        validator_id: id,
        source_epoch: source,
        target_epoch: target,
        signing_root: make_root(target as u8),
    };
    let history = AttestationHistory {
        same_target: vec![prior(99, 100)],
        enclosing: None,
        enclosed: Some(prior(50, 60)),
    };
    let candidate = prior(40, 100);

    c.bench_function("rules/check_attestation", |b| {
        b.iter(|| check_attestation(black_box(&candidate), None, black_box(&history)))
    });
}

fn bench_database_decision(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let context = rt
        .block_on(migrated_context(&dir.path().join("bench.db")))
        .unwrap();
    let protection = context.slashing_protection();
    let id = rt
        .block_on(protection.resolve_validator(&make_public_key(1)))
        .unwrap();

    let mut group = c.benchmark_group("database");
    group.measurement_time(Duration::from_secs(10));

    let mut epoch = 0u64;
    group.bench_function("may_sign_attestation", |b| {
        b.iter(|| {
            epoch += 1;
            let root = make_root(epoch as u8);
            rt.block_on(protection.may_sign_attestation(id, epoch, epoch + 1, root))
                .unwrap()
        })
    });
    group.finish();

    rt.block_on(context.close());
}

fn bench_bls_sign(c: &mut Criterion) {
    let keypair = BlsKeyPair::from_ikm(&[7u8; 32]).unwrap();
    let root = [3u8; 32];

    c.bench_function("bls/sign", |b| b.iter(|| keypair.sign(black_box(&root))));
}

criterion_group!(benches, bench_attestation_rules, bench_database_decision, bench_bls_sign);
criterion_main!(benches);
