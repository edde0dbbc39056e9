//! Chain access for the dapp.
//!
//! Builds providers from configured endpoints and tracks the wallet session:
//! - [`Capability`]: the signer-or-provider handle contract calls go through
//! - [`Connector`]: how a wallet session is obtained
//! - [`WalletClient`]: the wallet-client context publishing capability changes

mod capability;
mod connector;
mod wallet;

pub use capability::Capability;
pub use connector::{Connector, InjectedConnector};
pub use wallet::WalletClient;

use alloy_network::EthereumWallet;
use alloy_provider::{Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Error parsing or validating URLs
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),

    /// Error talking to the RPC endpoint
    #[error("Connection error: {0}")]
    Connection(String),

    /// Error with private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// No connector with the requested id
    #[error("Unknown connector: {0}")]
    UnknownConnector(String),

    /// Connector exists but has no wallet to offer
    #[error("Connector not available: {0}")]
    ConnectorUnavailable(String),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

/// Convenience function to create an ethereum rpc provider from url.
pub async fn create_provider(rpc_url: &str) -> Result<impl Provider + Clone, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))?;
    let provider = ProviderBuilder::new().connect_http(url);

    Ok(provider)
}

/// Create a provider with wallet signing capability from a private key.
///
/// Returns the provider together with the signer's account address.
pub fn create_wallet_provider(
    rpc_url: &str,
    signer: PrivateKeySigner,
) -> Result<(impl Provider + Clone, alloy_primitives::Address), ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))?;

    let account = signer.address();
    let wallet = EthereumWallet::from(signer);

    let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

    Ok((provider, account))
}

/// Parse a hex private key, with or without `0x` prefix.
pub fn parse_private_key(private_key: &str) -> Result<PrivateKeySigner, ClientError> {
    private_key
        .trim()
        .parse()
        .map_err(|e| ClientError::InvalidPrivateKey(format!("{}", e)))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url() {
        let result = create_provider("not a url").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_wallet_provider_account() {
        let signer = parse_private_key(test_utils::DEV_KEY).unwrap();
        let (_, account) = create_wallet_provider("http://localhost:8545", signer).unwrap();
        assert_eq!(
            account,
            alloy_primitives::address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
    }

    #[test]
    fn test_invalid_private_key() {
        assert!(matches!(
            parse_private_key("0x1234"),
            Err(ClientError::InvalidPrivateKey(_))
        ));
    }
}
