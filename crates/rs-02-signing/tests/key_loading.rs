use rs_02_signing::{
    verify, ArtifactSigner, ArtifactSignerFactory, BlsKeyPair, SignerProvider, SigningError,
};
use std::fs;

fn write_key(dir: &std::path::Path, name: &str, seed: u8) -> BlsKeyPair {
    let keypair = BlsKeyPair::from_ikm(&[seed; 32]).unwrap();
    let yaml = format!("type: file-raw\nprivateKey: \"0x{}\"\n", keypair.secret_hex().as_str());
    fs::write(dir.join(name), yaml).unwrap();
    keypair
}

#[tokio::test]
async fn test_load_directory_of_raw_keys() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_key(dir.path(), "a.yaml", 1);
    let b = write_key(dir.path(), "b.yml", 2);
    fs::write(dir.path().join("README.txt"), "not a key").unwrap();

    let provider = SignerProvider::load_dir(dir.path(), &ArtifactSignerFactory::local())
        .await
        .unwrap();

    assert_eq!(provider.len(), 2);
    let signer = provider.get(&a.public_key()).unwrap();
    let signature = signer.sign(b"root");
    assert!(verify(&a.public_key(), b"root", &signature));
    assert!(provider.get(&b.public_key()).is_some());
}

#[tokio::test]
async fn test_duplicate_key_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_key(dir.path(), "a.yaml", 1);
    write_key(dir.path(), "copy.yaml", 1);

    let result = SignerProvider::load_dir(dir.path(), &ArtifactSignerFactory::local()).await;
    assert!(matches!(result, Err(SigningError::DuplicateKey { .. })));
}

#[tokio::test]
async fn test_malformed_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.yaml"), "type: file-raw\n").unwrap();

    let err = SignerProvider::load_dir(dir.path(), &ArtifactSignerFactory::local())
        .await
        .err()
        .unwrap();
    match err {
        SigningError::InvalidMetadata { path, .. } => assert!(path.ends_with("bad.yaml")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_missing_directory_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result =
        SignerProvider::load_dir(&dir.path().join("absent"), &ArtifactSignerFactory::local()).await;
    assert!(matches!(result, Err(SigningError::Io { .. })));
}
