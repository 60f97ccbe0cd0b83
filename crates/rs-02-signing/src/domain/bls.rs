//! BLS12-381 key pair (min-pk: 48-byte public keys, 96-byte signatures).

use crate::error::{SigningError, SigningResult};
use blst::min_pk::{PublicKey, SecretKey, Signature};
use blst::BLST_ERROR;
use shared_types::{BlsPublicKey, BlsSignature};

/// Domain separation tag for BLS signatures (Ethereum 2.0 compatible)
const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

/// Secret key plus its cached compressed public key.
pub struct BlsKeyPair {
    secret: SecretKey,
    public: BlsPublicKey,
}

impl BlsKeyPair {
    /// Create from 32 big-endian secret key bytes.
    pub fn from_secret_bytes(bytes: &[u8]) -> SigningResult<Self> {
        let secret = SecretKey::from_bytes(bytes).map_err(|e| SigningError::InvalidPrivateKey {
            reason: format!("{:?}", e),
        })?;
        Ok(Self::from_secret(secret))
    }

    /// Create from `0x`-prefixed or bare hex.
    pub fn from_secret_hex(input: &str) -> SigningResult<Self> {
        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = zeroize::Zeroizing::new(hex::decode(trimmed).map_err(|e| {
            SigningError::InvalidPrivateKey {
                reason: e.to_string(),
            }
        })?);
        Self::from_secret_bytes(&bytes)
    }

    /// Derive a key from at least 32 bytes of input keying material.
    pub fn from_ikm(ikm: &[u8]) -> SigningResult<Self> {
        let secret = SecretKey::key_gen(ikm, &[]).map_err(|e| SigningError::InvalidPrivateKey {
            reason: format!("{:?}", e),
        })?;
        Ok(Self::from_secret(secret))
    }

    fn from_secret(secret: SecretKey) -> Self {
        let public = BlsPublicKey(secret.sk_to_pk().compress());
        Self { secret, public }
    }

    pub fn public_key(&self) -> BlsPublicKey {
        self.public
    }

    pub fn sign(&self, message: &[u8]) -> BlsSignature {
        BlsSignature(self.secret.sign(message, DST, &[]).compress())
    }

    /// Secret key bytes (be careful with this!)
    pub fn secret_hex(&self) -> zeroize::Zeroizing<String> {
        zeroize::Zeroizing::new(hex::encode(self.secret.to_bytes()))
    }
}

/// Verify `signature` over `message` for `public_key`.
pub fn verify(public_key: &BlsPublicKey, message: &[u8], signature: &BlsSignature) -> bool {
    let Ok(pk) = PublicKey::uncompress(public_key.as_bytes()) else {
        return false;
    };
    let Ok(sig) = Signature::uncompress(signature.as_bytes()) else {
        return false;
    };
    sig.verify(true, message, DST, &[], &pk, true) == BLST_ERROR::BLST_SUCCESS
}
