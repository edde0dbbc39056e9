//! Configuration types for the Matic dapp.
//!
//! This crate provides:
//! - The chain configuration consumed by the wallet client
//! - Contract build and deployment settings
//! - Configuration loading and validation

pub mod deploy;
pub mod network;

pub use deploy::{DeployConfig, DeployNetwork};
pub use network::{
    Chain, ChainConfiguration, ChainConfigurationBuilder, ConnectorKind, ProviderSource,
    RankedProvider,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// None of the configured providers can serve the chain
    #[error("No usable RPC provider for {0}")]
    NoUsableProvider(String),

    /// Compiler version is not MAJOR.MINOR.PATCH
    #[error("Invalid compiler version: {0}")]
    InvalidCompilerVersion(String),

    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
