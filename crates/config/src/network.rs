//! Chain configuration for the wallet client.
//!
//! A [`ChainConfiguration`] pins the frontend to a single test network, lists
//! the RPC providers it may use ranked by priority, and names the wallet
//! connectors offered to the user. It is built once at startup and never
//! mutated afterwards.

use crate::ConfigError;
use serde::{Deserialize, Serialize};

/// Static description of an EVM chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    /// Chain ID
    pub id: u64,
    /// Display name
    pub name: String,
    /// Short network identifier
    pub network: String,
    /// Public JSON-RPC endpoint
    pub public_rpc: String,
    /// Alchemy HTTP base url, if Alchemy serves this chain
    pub alchemy_http: Option<String>,
    /// Block explorer
    pub explorer: String,
    pub testnet: bool,
}

impl Chain {
    /// Polygon Mumbai testnet.
    pub fn polygon_mumbai() -> Self {
        Self {
            id: 80001,
            name: "Polygon Mumbai".to_string(),
            network: "maticmum".to_string(),
            public_rpc: "https://matic-mumbai.chainstacklabs.com".to_string(),
            alchemy_http: Some("https://polygon-mumbai.g.alchemy.com/v2".to_string()),
            explorer: "https://mumbai.polygonscan.com".to_string(),
            testnet: true,
        }
    }

    /// Local Hardhat node.
    pub fn hardhat() -> Self {
        Self {
            id: 1337,
            name: "Hardhat".to_string(),
            network: "hardhat".to_string(),
            public_rpc: "http://127.0.0.1:8545".to_string(),
            alchemy_http: None,
            explorer: String::new(),
            testnet: true,
        }
    }
}

/// Where a ranked provider gets its endpoint from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderSource {
    /// Generic JSON-RPC endpoint. An empty url disables the provider.
    JsonRpc { http: String },
    /// Alchemy hosted endpoint keyed by an API key.
    Alchemy { api_key: String },
}

/// A provider together with its rank. Lower priority values are tried first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedProvider {
    pub priority: u32,
    pub source: ProviderSource,
}

impl RankedProvider {
    /// Resolve the endpoint url for `chain`, or `None` if this provider
    /// cannot serve it.
    pub fn endpoint(&self, chain: &Chain) -> Option<String> {
        match &self.source {
            ProviderSource::JsonRpc { http } if http.trim().is_empty() => None,
            ProviderSource::JsonRpc { http } => Some(http.trim().to_string()),
            ProviderSource::Alchemy { api_key } if api_key.trim().is_empty() => None,
            ProviderSource::Alchemy { api_key } => chain
                .alchemy_http
                .as_ref()
                .map(|base| format!("{}/{}", base.trim_end_matches('/'), api_key.trim())),
        }
    }
}

/// Wallet connectors offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
    /// Wallet injected into the host environment.
    Injected,
}

/// Immutable network setup shared by the wallet client and every page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfiguration {
    /// Target chain
    pub chain: Chain,
    /// Providers sorted by ascending priority
    pub providers: Vec<RankedProvider>,
    /// Available wallet connectors
    pub connectors: Vec<ConnectorKind>,
    /// Connect the first available wallet at startup
    pub auto_connect: bool,
}

impl ChainConfiguration {
    /// Usable endpoint urls in rank order.
    pub fn endpoints(&self) -> Vec<String> {
        self.providers
            .iter()
            .filter_map(|p| p.endpoint(&self.chain))
            .collect()
    }

    /// Highest-ranked usable endpoint.
    pub fn primary_endpoint(&self) -> Result<String, ConfigError> {
        self.endpoints()
            .into_iter()
            .next()
            .ok_or_else(|| ConfigError::NoUsableProvider(self.chain.name.clone()))
    }

    pub const fn chain_id(&self) -> u64 {
        self.chain.id
    }
}

/// Builder for [`ChainConfiguration`].
#[derive(Debug, Clone)]
pub struct ChainConfigurationBuilder {
    chain: Chain,
    providers: Vec<RankedProvider>,
    connectors: Vec<ConnectorKind>,
    auto_connect: bool,
}

impl ChainConfigurationBuilder {
    /// Start from an arbitrary chain with no providers.
    pub const fn new(chain: Chain) -> Self {
        Self {
            chain,
            providers: Vec::new(),
            connectors: Vec::new(),
            auto_connect: true,
        }
    }

    /// Start with Polygon Mumbai.
    pub fn polygon_mumbai() -> Self {
        Self::new(Chain::polygon_mumbai())
    }

    /// Add a generic JSON-RPC provider.
    pub fn json_rpc(mut self, priority: u32, http: impl Into<String>) -> Self {
        self.providers.push(RankedProvider {
            priority,
            source: ProviderSource::JsonRpc { http: http.into() },
        });
        self
    }

    /// Add an Alchemy provider.
    pub fn alchemy(mut self, priority: u32, api_key: impl Into<String>) -> Self {
        self.providers.push(RankedProvider {
            priority,
            source: ProviderSource::Alchemy {
                api_key: api_key.into(),
            },
        });
        self
    }

    pub fn connector(mut self, connector: ConnectorKind) -> Self {
        if !self.connectors.contains(&connector) {
            self.connectors.push(connector);
        }
        self
    }

    pub const fn auto_connect(mut self, enabled: bool) -> Self {
        self.auto_connect = enabled;
        self
    }

    /// Build the configuration. Providers are ranked by priority; ties keep
    /// insertion order.
    pub fn build(mut self) -> Result<ChainConfiguration, ConfigError> {
        if self.providers.is_empty() {
            return Err(ConfigError::NoUsableProvider(self.chain.name));
        }
        self.providers.sort_by_key(|p| p.priority);

        Ok(ChainConfiguration {
            chain: self.chain,
            providers: self.providers,
            connectors: self.connectors,
            auto_connect: self.auto_connect,
        })
    }
}
