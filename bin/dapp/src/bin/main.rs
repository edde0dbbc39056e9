use alloy_primitives::Address;
use clap::{Parser, Subcommand, ValueEnum};
use client::{Connector, InjectedConnector};
use config::DeployConfig;
use dapp::{
    amount::parse_amount, config::Config, metrics::install_prometheus_exporter, ApprovePage,
    AppShell, BalancePage, ChainPage,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dapp")]
#[command(about = "Read Matic balances and approve spenders on Polygon Mumbai")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "dapp.toml")]
    config: String,

    /// Private key of the injected wallet (hex string, with or without 0x prefix)
    #[arg(short = 'k', long, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Alchemy API key, overrides the configuration file
    #[arg(long, env = "ALCHEMY_API_KEY", hide_env_values = true)]
    alchemy_key: Option<String>,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Serve Prometheus metrics on this port
    #[arg(long)]
    metrics_port: Option<u16>,

    /// Print the query cache after every page
    #[arg(long)]
    devtools: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Show the token balance of an address, the connected wallet by default
    Balance { address: Option<Address> },

    /// Approve a spender for an amount of tokens
    Approve {
        spender: Address,
        /// Amount in base units, or in whole tokens with --decimal
        amount: String,
        /// Read the amount as a decimal token quantity
        #[arg(long)]
        decimal: bool,
    },

    /// Show the chain id of the active provider
    ChainId,

    /// List deployment networks and recorded contract addresses
    Networks {
        /// Deploy settings file, defaults built from the environment otherwise
        #[arg(long)]
        deploy_config: Option<String>,
    },
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
    }
}

fn print_networks(deploy_config: Option<&str>) -> eyre::Result<()> {
    let deploy = match deploy_config {
        Some(path) => DeployConfig::from_file(path)?,
        None => DeployConfig::from_env(),
    };
    deploy.validate()?;

    println!("solidity {}", deploy.solidity);
    for (name, network) in &deploy.networks {
        println!("{name}: {network}");
    }
    for (contract, address) in &deploy.deployments {
        println!("{contract} = {address}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    if let Some(port) = cli.metrics_port {
        install_prometheus_exporter(port)?;
        info!("Prometheus metrics available on port {}", port);
    }

    if let Command::Networks { deploy_config } = &cli.command {
        return print_networks(deploy_config.as_deref());
    }

    info!("Loading config: {}", cli.config);
    let mut config = Config::from_file(&cli.config)?;
    if let Some(key) = cli.alchemy_key {
        config.alchemy_api_key = key;
    }

    info!("Loaded config:");
    info!("  Contract: {}", config.contract_address);
    info!("  Decimals: {}", config.decimals);
    info!("  Notifications: {}", config.toast_position);

    let connectors: Vec<Arc<dyn Connector>> =
        vec![Arc::new(InjectedConnector::new(cli.private_key))];
    let mut shell = AppShell::bootstrap(&config, connectors)
        .await?
        .with_devtools(cli.devtools);

    let result = match cli.command {
        Command::Balance { address } => shell.mount(&BalancePage { owner: address }).await,
        Command::Approve {
            spender,
            amount,
            decimal,
        } => {
            let amount = parse_amount(&amount, decimal, config.decimals)?;
            shell.mount(&ApprovePage { spender, amount }).await
        }
        Command::ChainId => shell.mount(&ChainPage).await,
        Command::Networks { .. } => Ok(()),
    };

    let toasts = shell.shutdown();
    info!("Shown {} notification(s)", toasts.len());

    if let Err(e) = &result {
        error!("{}", e);
    }
    result
}
