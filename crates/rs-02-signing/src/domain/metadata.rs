//! # Signing Metadata
//!
//! One YAML document per key, tagged by `type`:
//!
//! ```yaml
//! type: file-raw
//! privateKey: "0x25295f0d1d592a90b333e26e85149708208e9f8e8bc18f6c77bd62f8ad7a6866"
//! ```
//!
//! | `type` | Backend |
//! |--------|---------|
//! | `file-raw` | hex secret inline |
//! | `aws-secrets` | AWS Secrets Manager |
//! | `fortanix-dsm` | Fortanix DSM |
//! | `yubihsm` | YubiHSM opaque object |

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SigningMetadata {
    #[serde(rename_all = "camelCase")]
    FileRaw { private_key: String },

    #[serde(rename_all = "camelCase")]
    AwsSecrets { region: String, secret_name: String },

    #[serde(rename_all = "camelCase")]
    FortanixDsm {
        server: String,
        api_key: String,
        secret_name: String,
    },

    #[serde(rename = "yubihsm", rename_all = "camelCase")]
    YubiHsm {
        connector_url: String,
        auth_id: u16,
        opaque_data_id: u16,
    },
}

impl SigningMetadata {
    /// Backend label for logs.
    pub fn backend(&self) -> &'static str {
        match self {
            SigningMetadata::FileRaw { .. } => "file-raw",
            SigningMetadata::AwsSecrets { .. } => "aws-secrets",
            SigningMetadata::FortanixDsm { .. } => "fortanix-dsm",
            SigningMetadata::YubiHsm { .. } => "yubihsm",
        }
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }
}

// Secrets stay out of logs.
impl fmt::Debug for SigningMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningMetadata::FileRaw { .. } => f
                .debug_struct("FileRaw")
                .field("private_key", &"<redacted>")
                .finish(),
            SigningMetadata::AwsSecrets {
                region,
                secret_name,
            } => f
                .debug_struct("AwsSecrets")
                .field("region", region)
                .field("secret_name", secret_name)
                .finish(),
            SigningMetadata::FortanixDsm {
                server,
                secret_name,
                ..
            } => f
                .debug_struct("FortanixDsm")
                .field("server", server)
                .field("api_key", &"<redacted>")
                .field("secret_name", secret_name)
                .finish(),
            SigningMetadata::YubiHsm {
                connector_url,
                auth_id,
                opaque_data_id,
            } => f
                .debug_struct("YubiHsm")
                .field("connector_url", connector_url)
                .field("auth_id", auth_id)
                .field("opaque_data_id", opaque_data_id)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_raw_parses() {
        let meta = SigningMetadata::from_yaml("type: file-raw\nprivateKey: \"0xabc\"\n").unwrap();
        assert_eq!(
            meta,
            SigningMetadata::FileRaw {
                private_key: "0xabc".to_string()
            }
        );
        assert_eq!(meta.backend(), "file-raw");
    }

    #[test]
    fn test_remote_variants_parse() {
        let aws = SigningMetadata::from_yaml(
            "type: aws-secrets\nregion: us-east-2\nsecretName: validator-1\n",
        )
        .unwrap();
        assert_eq!(aws.backend(), "aws-secrets");

        let hsm = SigningMetadata::from_yaml(
            "type: yubihsm\nconnectorUrl: http://localhost:12345\nauthId: 1\nopaqueDataId: 5\n",
        )
        .unwrap();
        assert_eq!(
            hsm,
            SigningMetadata::YubiHsm {
                connector_url: "http://localhost:12345".to_string(),
                auth_id: 1,
                opaque_data_id: 5
            }
        );

        let dsm = SigningMetadata::from_yaml(
            "type: fortanix-dsm\nserver: https://dsm\napiKey: k\nsecretName: s\n",
        )
        .unwrap();
        assert_eq!(dsm.backend(), "fortanix-dsm");
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(SigningMetadata::from_yaml("type: hashicorp\nkeyPath: /v1/x\n").is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let meta = SigningMetadata::FileRaw {
            private_key: "0xsecret".to_string(),
        };
        assert!(!format!("{:?}", meta).contains("secret\""));
        assert!(format!("{:?}", meta).contains("<redacted>"));
    }
}
