//! Contract build and deployment settings.
//!
//! Mirrors the Hardhat project: one compiler version, a local development
//! chain and a public testnet whose url and signing key come from the
//! environment. Recorded deployment addresses live next to the networks so
//! the frontend config can be updated after every deploy.

use crate::ConfigError;
use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, path::Path};

/// Environment variable holding the testnet RPC url.
pub const URL_ENV: &str = "URL_ALCHEMY";
/// Environment variable holding the deployer private key.
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

/// A deployment target.
///
/// `Debug` and `Display` never show account keys.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeployNetwork {
    /// In-process development chain with a fixed chain id.
    Local { chain_id: u64 },
    /// Remote chain reached through an url, signing with the listed keys.
    Remote {
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        accounts: Vec<String>,
    },
}

impl fmt::Debug for DeployNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local { chain_id } => f.debug_struct("Local").field("chain_id", chain_id).finish(),
            Self::Remote { url, accounts } => f
                .debug_struct("Remote")
                .field("url", url)
                .field("accounts", &format_args!("{} configured", accounts.len()))
                .finish(),
        }
    }
}

impl fmt::Display for DeployNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local { chain_id } => write!(f, "local, chain id {chain_id}"),
            Self::Remote { url, accounts } => write!(
                f,
                "remote, url {}, {} account(s) configured",
                url.as_deref().unwrap_or("unset"),
                accounts.len()
            ),
        }
    }
}

impl DeployNetwork {
    /// Remote network whose url and account come from environment lookups.
    ///
    /// A missing private key leaves the account list empty rather than
    /// failing; the deploy tooling rejects the network when it needs to sign.
    pub fn remote_from_env(env: impl Fn(&str) -> Option<String>) -> Self {
        let (url, accounts) = credentials_from_env(env);
        Self::Remote { url, accounts }
    }
}

/// Remote url and signing accounts, ignoring empty values.
fn credentials_from_env(env: impl Fn(&str) -> Option<String>) -> (Option<String>, Vec<String>) {
    let url = env(URL_ENV).filter(|url| !url.is_empty());
    let accounts = env(PRIVATE_KEY_ENV)
        .filter(|key| !key.is_empty())
        .into_iter()
        .collect();
    (url, accounts)
}

/// Compiler and network settings for the contracts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Solidity compiler version
    pub solidity: String,
    /// Named deployment targets
    pub networks: BTreeMap<String, DeployNetwork>,
    /// Last known deployment address per contract
    #[serde(default)]
    pub deployments: BTreeMap<String, Address>,
}

impl DeployConfig {
    /// Default project settings, reading remote credentials through `env`.
    pub fn hardhat(env: impl Fn(&str) -> Option<String>) -> Self {
        let networks = BTreeMap::from([
            ("hardhat".to_string(), DeployNetwork::Local { chain_id: 1337 }),
            ("polygon".to_string(), DeployNetwork::remote_from_env(env)),
        ]);

        let deployments = BTreeMap::from([
            (
                "goflow".to_string(),
                address!("0x8A128E3148C61849AD0faA619d69d8bE311a4152"),
            ),
            (
                "forum".to_string(),
                address!("0xc24f9a8082f7BC1ec076ec9869837a52521D2F66"),
            ),
            (
                "matic".to_string(),
                address!("0x21B0b3a265fEfC1A76B46E538D74dC92814dA8cB"),
            ),
            (
                "amm".to_string(),
                address!("0x5Cc784BDC84A26676A92ad389714B0c7a25B4d33"),
            ),
        ]);

        Self {
            solidity: "0.8.17".to_string(),
            networks,
            deployments,
        }
    }

    /// Default settings with credentials from the process environment.
    pub fn from_env() -> Self {
        Self::hardhat(|name| std::env::var(name).ok())
    }

    /// Load settings from a file, filling remote credentials left out of
    /// it from the process environment.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_toml(&contents)?.with_env(|name| std::env::var(name).ok()))
    }

    /// Fill the url and accounts of remote networks that leave them unset.
    pub fn with_env(mut self, env: impl Fn(&str) -> Option<String>) -> Self {
        let (env_url, env_accounts) = credentials_from_env(env);
        for network in self.networks.values_mut() {
            if let DeployNetwork::Remote { url, accounts } = network {
                if url.is_none() {
                    url.clone_from(&env_url);
                }
                if accounts.is_empty() {
                    accounts.clone_from(&env_accounts);
                }
            }
        }
        self
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the compiler version is a plain `MAJOR.MINOR.PATCH`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parts: Vec<&str> = self.solidity.split('.').collect();
        let well_formed = parts.len() == 3
            && parts
                .iter()
                .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));

        if !well_formed {
            return Err(ConfigError::InvalidCompilerVersion(self.solidity.clone()));
        }
        Ok(())
    }

    pub fn network(&self, name: &str) -> Option<&DeployNetwork> {
        self.networks.get(name)
    }

    /// Recorded deployment address of `contract`.
    pub fn deployment(&self, contract: &str) -> Option<Address> {
        self.deployments.get(contract).copied()
    }
}
