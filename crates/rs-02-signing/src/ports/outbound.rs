//! Driven Ports (SPI - Outbound)
//!
//! Remote key backends are reached through [`SecretFetcher`]. The concrete
//! clients live outside this crate.

use crate::error::SigningResult;
use async_trait::async_trait;
use zeroize::Zeroizing;

/// Where a remote secret lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SecretRequest {
    AwsSecretsManager {
        region: String,
        secret_name: String,
    },
    FortanixDsm {
        server: String,
        api_key: String,
        secret_name: String,
    },
    YubiHsmOpaque {
        connector_url: String,
        auth_id: u16,
        opaque_data_id: u16,
    },
}

/// Fetch a hex-encoded BLS secret key from a remote backend.
#[async_trait]
pub trait SecretFetcher: Send + Sync {
    async fn fetch(&self, request: &SecretRequest) -> SigningResult<Zeroizing<String>>;
}
