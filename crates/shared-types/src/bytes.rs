//! # Fixed-Width Byte Types
//!
//! | Type | Width | Used for |
//! |------|-------|----------|
//! | `Root` | 32 | signing roots, genesis validators root |
//! | `BlsPublicKey` | 48 | compressed BLS12-381 G1 point (validator identity) |
//! | `BlsSignature` | 96 | compressed BLS12-381 G2 point |

use crate::errors::BytesError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Width in bytes.
            pub const LEN: usize = $len;

            /// Copy from a slice, rejecting any other length.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, BytesError> {
                let array: [u8; $len] = bytes.try_into().map_err(|_| BytesError::InvalidLength {
                    kind: $kind,
                    expected: $len,
                    actual: bytes.len(),
                })?;
                Ok(Self(array))
            }

            /// Parse `0x`-prefixed or bare hex.
            pub fn from_hex(input: &str) -> Result<Self, BytesError> {
                let trimmed = input.strip_prefix("0x").unwrap_or(input);
                let bytes = hex::decode(trimmed).map_err(|e| BytesError::InvalidHex {
                    kind: $kind,
                    reason: e.to_string(),
                })?;
                Self::from_slice(&bytes)
            }

            /// Borrow the raw bytes.
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            /// `0x`-prefixed lowercase hex.
            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = BytesError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

fixed_bytes!(
    /// A 32-byte hash tree root.
    Root,
    32,
    "root"
);

fixed_bytes!(
    /// A compressed 48-byte BLS public key.
    BlsPublicKey,
    48,
    "BLS public key"
);

fixed_bytes!(
    /// A compressed 96-byte BLS signature.
    BlsSignature,
    96,
    "BLS signature"
);

impl Root {
    /// All-zero root.
    pub const ZERO: Root = Root([0u8; 32]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip_with_and_without_prefix() {
        let root = Root([0xAB; 32]);
        let text = root.to_string();
        assert!(text.starts_with("0xabab"));
        assert_eq!(text.parse::<Root>().unwrap(), root);
        assert_eq!(Root::from_hex(&text[2..]).unwrap(), root);
    }

    #[test]
    fn test_wrong_length_rejected() {
        let err = BlsPublicKey::from_slice(&[0u8; 32]).unwrap_err();
        assert_eq!(
            err,
            BytesError::InvalidLength {
                kind: "BLS public key",
                expected: 48,
                actual: 32
            }
        );
    }

    #[test]
    fn test_invalid_hex_rejected() {
        assert!(matches!(
            Root::from_hex("0xzz"),
            Err(BytesError::InvalidHex { kind: "root", .. })
        ));
    }

    #[test]
    fn test_serde_uses_hex_strings() {
        let key = BlsPublicKey([0x01; 48]);
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "01".repeat(48)));
        let back: BlsPublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
