//! Process-wide bootstrap.
//!
//! [`AppShell`] builds every context a page needs, once, in a fixed order:
//! wallet client, theme, query cache. Pages are then mounted inside that
//! context together with the progress indicator, navbar, notification host
//! and devtools. Contexts are plain values handed to pages by reference;
//! nothing lives in globals.

use crate::{
    config::Config,
    layout::{Devtools, Navbar, ProgressIndicator, Theme},
    metrics::Metrics,
    pages::Page,
    toast::{self, Toast, Toaster, Toasts},
};
use client::{Connector, WalletClient};
use gateway::{AlloyBindings, BindingFactory, ContractBalanceGateway};
use query::{QueryCache, QueryClient, QueryDefaults};
use std::sync::Arc;
use tracing::info;

/// Shown for any failed query.
pub const NETWORK_ERROR: &str = "Network Error: Ensure your wallet is connected & on the same \
                                 network that your contract is deployed to.";

/// Pieces of the shell, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    WalletClient,
    Theme,
    QueryCache,
    ProgressIndicator,
    Navbar,
    Page,
    NotificationHost,
    Devtools,
}

/// Nesting order of the shell. The last five are siblings inside the
/// query cache.
pub const MOUNT_ORDER: [Layer; 8] = [
    Layer::WalletClient,
    Layer::Theme,
    Layer::QueryCache,
    Layer::ProgressIndicator,
    Layer::Navbar,
    Layer::Page,
    Layer::NotificationHost,
    Layer::Devtools,
];

/// Everything a page can reach.
pub struct AppContext<F: BindingFactory = AlloyBindings> {
    pub wallet: WalletClient,
    pub theme: Theme,
    pub queries: QueryClient,
    pub toasts: Toasts,
    pub gateway: ContractBalanceGateway<F>,
    pub metrics: Metrics,
}

pub struct AppShell<F: BindingFactory = AlloyBindings> {
    cx: AppContext<F>,
    toaster: Toaster,
    devtools: Devtools,
}

impl AppShell<AlloyBindings> {
    /// Connect to the configured chain and build the shell around it.
    pub async fn bootstrap(
        config: &Config,
        connectors: Vec<Arc<dyn Connector>>,
    ) -> eyre::Result<Self> {
        let chain = config.chain_configuration()?;
        let wallet = WalletClient::new(chain, connectors).await?;
        Ok(Self::assemble(config, wallet, AlloyBindings))
    }
}

impl<F: BindingFactory> AppShell<F> {
    /// Build the remaining contexts around an existing wallet client.
    pub fn assemble(config: &Config, wallet: WalletClient, factory: F) -> Self {
        if let Some(account) = wallet.auto_connect() {
            info!("Auto-connected {}", account);
        }

        let theme = Theme::default();
        let metrics = Metrics::new();
        let (toasts, toaster) = toast::channel(config.toast_position);
        let queries = query_client(config, toasts.clone(), metrics.clone());
        let gateway = ContractBalanceGateway::with_factory(
            config.contract_address,
            wallet.subscribe(),
            factory,
        )
        .decimals(config.decimals);

        Self {
            cx: AppContext {
                wallet,
                theme,
                queries,
                toasts,
                gateway,
                metrics,
            },
            toaster,
            devtools: Devtools::default(),
        }
    }

    /// Open the query devtools after every page.
    pub const fn with_devtools(mut self, open: bool) -> Self {
        self.devtools.open = open;
        self
    }

    pub const fn layers(&self) -> &'static [Layer] {
        &MOUNT_ORDER
    }

    pub const fn context(&self) -> &AppContext<F> {
        &self.cx
    }

    /// Render `page` inside the shell.
    ///
    /// Query failures have already become toasts by the time this returns;
    /// errors the page itself raises are returned.
    pub async fn mount<P: Page<F>>(&mut self, page: &P) -> eyre::Result<()> {
        let progress = ProgressIndicator::start(&self.cx.theme, page.title());
        Navbar::render(&self.cx).await;

        let result = page.render(&self.cx).await;

        let elapsed = progress.finish();
        self.cx
            .metrics
            .record_render(page.title(), result.is_ok(), elapsed);
        self.toaster.flush();
        self.devtools.render(&self.cx.queries);

        result
    }

    /// Toasts rendered so far.
    pub fn notifications(&self) -> &[Toast] {
        self.toaster.shown()
    }

    /// Drop the wallet session and render anything still queued.
    pub fn shutdown(mut self) -> Vec<Toast> {
        self.cx.wallet.disconnect();
        self.toaster.flush();
        self.toaster.shown().to_vec()
    }
}

/// Query client whose cache turns every failure into one network toast.
fn query_client(config: &Config, toasts: Toasts, metrics: Metrics) -> QueryClient {
    let defaults = QueryDefaults {
        refetch_on_window_focus: config.refetch_on_window_focus,
        ..Default::default()
    };
    let cache = QueryCache::new().with_on_error(move |_| {
        metrics.record_query_failure();
        metrics.record_notification("error");
        toasts.error(NETWORK_ERROR);
    });

    QueryClient::new(defaults, cache)
}
