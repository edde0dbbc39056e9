use crate::toast::Position;
use alloy_primitives::Address;
use config::{ChainConfiguration, ChainConfigurationBuilder, ConfigError, ConnectorKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level dapp configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Matic token address. Update after every deploy.
    pub contract_address: Address,

    /// Base-unit exponent used to display balances
    #[serde(default = "default_decimals")]
    pub decimals: u8,

    /// Generic JSON-RPC endpoint, ranked first. Empty disables it.
    #[serde(default)]
    pub json_rpc_url: String,

    /// Alchemy API key, ranked second
    #[serde(default)]
    pub alchemy_api_key: String,

    #[serde(default)]
    pub refetch_on_window_focus: bool,

    /// Connect the injected wallet at startup
    #[serde(default = "default_auto_connect")]
    pub auto_connect: bool,

    #[serde(default)]
    pub toast_position: Position,
}

const fn default_decimals() -> u8 {
    gateway::DEFAULT_DECIMALS
}

const fn default_auto_connect() -> bool {
    true
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> eyre::Result<Self> {
        let config: Self = toml::from_str(contents)?;
        Ok(config)
    }

    /// Polygon Mumbai with the JSON-RPC endpoint ranked above Alchemy.
    pub fn chain_configuration(&self) -> Result<ChainConfiguration, ConfigError> {
        ChainConfigurationBuilder::polygon_mumbai()
            .json_rpc(0, self.json_rpc_url.as_str())
            .alchemy(1, self.alchemy_api_key.as_str())
            .connector(ConnectorKind::Injected)
            .auto_connect(self.auto_connect)
            .build()
    }
}
