//! Wallet connectors.

use crate::{create_wallet_provider, parse_private_key, Capability, ClientError};
use alloy_provider::Provider;
use alloy_signer::Signer;
use tracing::info;

/// A source of wallet sessions.
pub trait Connector: Send + Sync {
    /// Stable identifier used to pick the connector.
    fn id(&self) -> &'static str;

    /// Human-readable name.
    fn name(&self) -> &'static str;

    /// Whether a wallet is present to connect to.
    fn ready(&self) -> bool;

    /// Open a wallet session against `rpc_url` for `chain_id`.
    fn connect(&self, rpc_url: &str, chain_id: u64) -> Result<Capability, ClientError>;
}

/// Wallet injected into the host environment.
///
/// The dapp has no browser extension to talk to; the injected wallet is the
/// private key handed to the process (usually through `PRIVATE_KEY`).
#[derive(Clone, Default)]
pub struct InjectedConnector {
    private_key: Option<String>,
}

impl InjectedConnector {
    pub fn new(private_key: Option<String>) -> Self {
        Self {
            private_key: private_key.filter(|key| !key.trim().is_empty()),
        }
    }

    /// Read the injected key from environment variable `var`.
    pub fn from_env(var: &str) -> Self {
        Self::new(std::env::var(var).ok())
    }
}

impl std::fmt::Debug for InjectedConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectedConnector")
            .field("ready", &self.ready())
            .finish()
    }
}

impl Connector for InjectedConnector {
    fn id(&self) -> &'static str {
        "injected"
    }

    fn name(&self) -> &'static str {
        "Injected"
    }

    fn ready(&self) -> bool {
        self.private_key.is_some()
    }

    fn connect(&self, rpc_url: &str, chain_id: u64) -> Result<Capability, ClientError> {
        let Some(private_key) = &self.private_key else {
            return Err(ClientError::ConnectorUnavailable(self.id().to_string()));
        };

        let signer = parse_private_key(private_key)?.with_chain_id(Some(chain_id));
        let (provider, account) = create_wallet_provider(rpc_url, signer)?;
        info!(%account, chain_id, "Injected wallet connected");

        Ok(Capability::signer(provider.erased(), account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::DEV_KEY;
    use alloy_primitives::address;

    #[test]
    fn test_not_ready_without_key() {
        let connector = InjectedConnector::new(None);
        assert!(!connector.ready());
        assert!(matches!(
            connector.connect("http://localhost:8545", 1337),
            Err(ClientError::ConnectorUnavailable(id)) if id == "injected"
        ));
    }

    #[test]
    fn test_blank_key_is_not_a_wallet() {
        assert!(!InjectedConnector::new(Some("  ".to_string())).ready());
    }

    #[test]
    fn test_connect_yields_signer() {
        let connector = InjectedConnector::new(Some(DEV_KEY.to_string()));
        let capability = connector.connect("http://localhost:8545", 1337).unwrap();

        assert!(capability.can_sign());
        assert_eq!(
            capability.account(),
            Some(address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"))
        );
    }

    #[test]
    fn test_connect_rejects_bad_url() {
        let connector = InjectedConnector::new(Some(DEV_KEY.to_string()));
        assert!(matches!(
            connector.connect("not a url", 1337),
            Err(ClientError::InvalidUrl(_))
        ));
    }
}
