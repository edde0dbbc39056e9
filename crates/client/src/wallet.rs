use crate::{create_provider, Capability, ClientError, Connector};
use alloy_primitives::Address;
use alloy_provider::Provider;
use config::ChainConfiguration;
use std::{future::Future, sync::Arc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Wallet-client context.
///
/// Holds the read-only provider for the configured chain and publishes the
/// current signer-or-provider capability: the wallet session when one is
/// connected, the read-only provider otherwise. Consumers subscribe and
/// rebuild whatever they derive from the capability when it changes.
pub struct WalletClient {
    chain: ChainConfiguration,
    endpoint: String,
    provider: Capability,
    connectors: Vec<Arc<dyn Connector>>,
    current: watch::Sender<Capability>,
}

impl WalletClient {
    /// Connect the read-only provider to the highest-ranked endpoint that
    /// answers for the configured chain.
    ///
    /// Endpoints are tried in rank order. When none answers, the client is
    /// built on the primary endpoint and requests fail as queries.
    pub async fn new(
        chain: ChainConfiguration,
        connectors: Vec<Arc<dyn Connector>>,
    ) -> Result<Self, ClientError> {
        let primary = chain.primary_endpoint()?;
        let endpoints = chain.endpoints();
        let endpoint = match first_reachable(&endpoints, chain.chain_id(), probe_chain_id).await {
            Some(endpoint) => endpoint.clone(),
            None => {
                warn!(chain = %chain.chain.name, %primary, "No endpoint answered, using primary");
                primary
            }
        };
        let provider = create_provider(&endpoint).await?;
        info!(chain = %chain.chain.name, %endpoint, "Wallet client configured");

        Ok(Self::from_parts(
            chain,
            endpoint,
            Capability::read_only(provider.erased()),
            connectors,
        ))
    }

    /// Assemble a client around an existing read-only capability.
    pub fn from_parts(
        chain: ChainConfiguration,
        endpoint: String,
        provider: Capability,
        connectors: Vec<Arc<dyn Connector>>,
    ) -> Self {
        let (current, _) = watch::channel(provider.clone());
        Self {
            chain,
            endpoint,
            provider,
            connectors,
            current,
        }
    }

    pub const fn chain(&self) -> &ChainConfiguration {
        &self.chain
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Read-only capability, independent of any wallet session.
    pub const fn provider(&self) -> &Capability {
        &self.provider
    }

    /// Wallet session if connected, read-only provider otherwise.
    pub fn signer_or_provider(&self) -> Capability {
        self.current.borrow().clone()
    }

    /// Connected account, if any.
    pub fn account(&self) -> Option<Address> {
        self.current.borrow().account()
    }

    /// Receiver notified whenever the signer-or-provider capability changes.
    pub fn subscribe(&self) -> watch::Receiver<Capability> {
        self.current.subscribe()
    }

    /// Connect with the connector named `id`.
    pub fn connect(&self, id: &str) -> Result<Address, ClientError> {
        let connector = self
            .connectors
            .iter()
            .find(|c| c.id() == id)
            .ok_or_else(|| ClientError::UnknownConnector(id.to_string()))?;

        let session = connector.connect(&self.endpoint, self.chain.chain_id())?;
        let account = session
            .account()
            .ok_or_else(|| ClientError::ConnectorUnavailable(id.to_string()))?;

        self.current.send_replace(session);
        Ok(account)
    }

    /// Connect the first ready connector when auto-connect is enabled.
    ///
    /// Failures are logged and leave the client read-only.
    pub fn auto_connect(&self) -> Option<Address> {
        if !self.chain.auto_connect {
            return None;
        }

        for connector in self.connectors.iter().filter(|c| c.ready()) {
            match self.connect(connector.id()) {
                Ok(account) => return Some(account),
                Err(e) => warn!("Auto-connect via {} failed: {}", connector.name(), e),
            }
        }

        debug!("No wallet available, staying read-only");
        None
    }

    /// End the wallet session and fall back to the read-only provider.
    pub fn disconnect(&self) {
        if self.current.borrow().can_sign() {
            info!("Wallet disconnected");
        }
        self.current.send_replace(self.provider.clone());
    }
}

/// Chain id served at `endpoint`.
async fn probe_chain_id(endpoint: String) -> Result<u64, ClientError> {
    let provider = create_provider(&endpoint).await?;
    provider
        .get_chain_id()
        .await
        .map_err(|e| ClientError::Connection(e.to_string()))
}

/// First endpoint, in rank order, that `probe` reports serving `chain_id`.
async fn first_reachable<F, Fut>(endpoints: &[String], chain_id: u64, probe: F) -> Option<&String>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<u64, ClientError>>,
{
    for endpoint in endpoints {
        match probe(endpoint.clone()).await {
            Ok(id) if id == chain_id => return Some(endpoint),
            Ok(id) => warn!(%endpoint, id, "Endpoint serves another chain, skipping"),
            Err(e) => warn!(%endpoint, "Endpoint unreachable, trying next: {}", e),
        }
    }
    None
}
