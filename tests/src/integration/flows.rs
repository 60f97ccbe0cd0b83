//! # Integration Test Flows
//!
//! Signing requests through [`signer_runtime::SignerRuntime`] against key
//! files and a slashing protection database on disk.
//!
//! ## Flows Tested:
//!
//! 1. **Key files → signer → protection**: keys loaded from YAML sign only what
//!    slashing protection allows
//! 2. **Restart**: refusals hold across process restarts
//! 3. **Concurrency**: conflicting requests racing for one validator
//! 4. **Startup gates**: required genesis root, scheduled pruning at boot

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use rs_01_slashing_protection::DenyReason;
    use rs_02_signing::{verify, BlsKeyPair};
    use shared_types::{BlsPublicKey, Root};
    use signer_runtime::{SignerConfig, SignerRuntime, SigningOutcome};
    use tempfile::TempDir;

    const GVR: Root = Root([0x11; 32]);

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct Node {
        dir: TempDir,
    }

    impl Node {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            std::fs::create_dir(dir.path().join("keys")).unwrap();
            Self { dir }
        }

        /// Write a file-raw key and return its public key.
        fn add_key(&self, seed: u8) -> BlsPublicKey {
            let keypair = BlsKeyPair::from_ikm(&[seed; 32]).unwrap();
            let yaml = format!(
                "type: file-raw\nprivateKey: \"0x{}\"\n",
                keypair.secret_hex().as_str()
            );
            std::fs::write(self.keys_dir().join(format!("key-{seed}.yaml")), yaml).unwrap();
            keypair.public_key()
        }

        fn keys_dir(&self) -> std::path::PathBuf {
            self.dir.path().join("keys")
        }

        fn db_path(&self) -> std::path::PathBuf {
            self.dir.path().join("slashing-protection.db")
        }

        fn config(&self, vars: &[(&str, &str)]) -> SignerConfig {
            let mut map: HashMap<String, String> = vars
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            map.insert("SIGNER_DB_URL".into(), sqlite_url(&self.db_path()));
            map.insert("SIGNER_KEY_CONFIG_PATH".into(), self.keys_dir().display().to_string());
            map.entry("SIGNER_DB_AUTO_MIGRATE".into())
                .or_insert_with(|| "true".into());
            SignerConfig::from_lookup(move |key| map.get(key).cloned()).unwrap()
        }

        async fn start(&self, vars: &[(&str, &str)]) -> SignerRuntime {
            SignerRuntime::start(self.config(vars)).await.unwrap()
        }
    }

    fn sqlite_url(path: &Path) -> String {
        format!("sqlite://{}", path.display())
    }

    // =============================================================================
    // KEY FILES → SIGNER → PROTECTION
    // =============================================================================

    #[tokio::test]
    async fn test_loaded_key_signs_and_refuses_double_vote() {
        let node = Node::new();
        let pk = node.add_key(1);
        let runtime = node.start(&[]).await;
        let handler = runtime.handler();

        let signed = handler
            .sign_attestation(&pk, GVR, 4, 5, Root([1; 32]))
            .await
            .unwrap();
        let signature = signed.signature().unwrap();
        assert!(verify(&pk, &[1; 32], &signature));

        let conflicting = handler
            .sign_attestation(&pk, GVR, 4, 5, Root([2; 32]))
            .await
            .unwrap();
        assert_eq!(conflicting, SigningOutcome::Refused(DenyReason::DoubleVote));

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_validators_are_independent() {
        let node = Node::new();
        let a = node.add_key(1);
        let b = node.add_key(2);
        let runtime = node.start(&[]).await;
        let handler = runtime.handler();

        for pk in [a, b] {
            let outcome = handler.sign_block(&pk, GVR, 64, Root([pk.0[0]; 32])).await.unwrap();
            assert!(matches!(outcome, SigningOutcome::Signed(_)));
        }

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_unprotected_artifacts_skip_history() {
        let node = Node::new();
        let pk = node.add_key(1);
        let runtime = node.start(&[]).await;
        let handler = runtime.handler();

        let first = handler.sign_unprotected(&pk, b"randao-reveal").unwrap();
        let second = handler.sign_unprotected(&pk, b"randao-reveal").unwrap();
        assert_eq!(first, second);

        runtime.shutdown().await;
    }

    // =============================================================================
    // RESTART
    // =============================================================================

    #[tokio::test]
    async fn test_refusal_survives_restart() {
        let node = Node::new();
        let pk = node.add_key(3);

        let runtime = node.start(&[]).await;
        let outcome = runtime
            .handler()
            .sign_attestation(&pk, GVR, 10, 12, Root([1; 32]))
            .await
            .unwrap();
        assert!(matches!(outcome, SigningOutcome::Signed(_)));
        runtime.shutdown().await;

        let runtime = node.start(&[("SIGNER_DB_AUTO_MIGRATE", "false")]).await;
        let outcome = runtime
            .handler()
            .sign_attestation(&pk, GVR, 11, 12, Root([2; 32]))
            .await
            .unwrap();
        assert_eq!(outcome, SigningOutcome::Refused(DenyReason::DoubleVote));

        let surrounding = runtime
            .handler()
            .sign_attestation(&pk, GVR, 9, 13, Root([3; 32]))
            .await
            .unwrap();
        assert_eq!(surrounding, SigningOutcome::Refused(DenyReason::SurroundingVote));
        runtime.shutdown().await;
    }

    // =============================================================================
    // CONCURRENCY
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_conflicting_blocks_sign_exactly_once() {
        let node = Node::new();
        let pk = node.add_key(4);
        let runtime = node.start(&[]).await;
        let handler = runtime.handler();

        let tasks: Vec<_> = (1..=16u8)
            .map(|i| {
                let handler = Arc::clone(&handler);
                tokio::spawn(async move { handler.sign_block(&pk, GVR, 100, Root([i; 32])).await })
            })
            .collect();

        let mut signed = 0;
        for result in futures::future::join_all(tasks).await {
            match result.unwrap().unwrap() {
                SigningOutcome::Signed(_) => signed += 1,
                SigningOutcome::Refused(reason) => {
                    assert_eq!(reason, DenyReason::DoubleBlockProposal)
                }
            }
        }
        assert_eq!(signed, 1);

        runtime.shutdown().await;
    }

    // =============================================================================
    // STARTUP GATES
    // =============================================================================

    #[tokio::test]
    async fn test_required_genesis_root_gates_startup() {
        let node = Node::new();
        let pk = node.add_key(5);

        let required = node.config(&[("SIGNER_REQUIRE_GENESIS_ROOT", "true")]);
        let result = SignerRuntime::start(required).await;
        assert!(result.is_err());

        let runtime = node.start(&[]).await;
        runtime.handler().sign_block(&pk, GVR, 1, Root([1; 32])).await.unwrap();
        runtime.shutdown().await;

        let runtime = node.start(&[("SIGNER_REQUIRE_GENESIS_ROOT", "true")]).await;
        let outcome = runtime
            .handler()
            .sign_block(&pk, Root([0x22; 32]), 2, Root([2; 32]))
            .await
            .unwrap();
        assert_eq!(outcome, SigningOutcome::Refused(DenyReason::GenesisMismatch));
        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_pruning_at_boot_raises_watermark() {
        let node = Node::new();
        let pk = node.add_key(6);

        let runtime = node.start(&[]).await;
        for slot in 0..100u64 {
            let outcome = runtime
                .handler()
                .sign_block(&pk, GVR, slot, Root([slot as u8; 32]))
                .await
                .unwrap();
            assert!(matches!(outcome, SigningOutcome::Signed(_)));
        }
        runtime.shutdown().await;

        let runtime = node
            .start(&[
                ("SIGNER_PRUNING_ENABLED", "true"),
                ("SIGNER_PRUNING_AT_BOOT", "true"),
                ("SIGNER_PRUNING_EPOCHS_TO_KEEP", "1"),
                ("SIGNER_PRUNING_SLOTS_PER_EPOCH", "32"),
            ])
            .await;
        let handler = runtime.handler();

        // Floor is 99 - 32 = 67: slot 10 was signed before and is now below it.
        let mut outcome = None;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let current = handler.sign_block(&pk, GVR, 10, Root([10; 32])).await.unwrap();
            if current != SigningOutcome::Refused(DenyReason::BelowWatermark) {
                continue;
            }
            outcome = Some(current);
            break;
        }
        assert_eq!(outcome, Some(SigningOutcome::Refused(DenyReason::BelowWatermark)));

        let fresh = handler.sign_block(&pk, GVR, 100, Root([100; 32])).await.unwrap();
        assert!(matches!(fresh, SigningOutcome::Signed(_)));

        runtime.shutdown().await;
    }
}
