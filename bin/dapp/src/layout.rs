//! Chrome mounted around every page: theme, progress indicator, navbar and
//! devtools.

use crate::shell::AppContext;
use alloy_primitives::Address;
use gateway::BindingFactory;
use query::QueryKey;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub font_family: &'static str,
    /// Brand color, also used by the progress indicator
    pub brand: &'static str,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            font_family: "Poppins",
            brand: "#553C9A",
        }
    }
}

/// Marks the start and end of a page transition.
#[derive(Debug)]
pub struct ProgressIndicator {
    page: &'static str,
    started: Instant,
}

impl ProgressIndicator {
    pub fn start(theme: &Theme, page: &'static str) -> Self {
        debug!(color = theme.brand, "Loading {}", page);
        Self {
            page,
            started: Instant::now(),
        }
    }

    /// Stop the indicator and return how long the page took.
    pub fn finish(self) -> Duration {
        let elapsed = self.started.elapsed();
        debug!("Loaded {} in {:?}", self.page, elapsed);
        elapsed
    }
}

/// What the navbar shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navbar {
    pub account: Option<Address>,
    pub chain_id: Option<u64>,
    pub wrong_network: bool,
}

impl Navbar {
    /// Resolve the active network and render the account badge.
    ///
    /// The network lookup is a query, so a failure surfaces as the global
    /// toast and the navbar renders without a chain id.
    pub async fn render<F: BindingFactory>(cx: &AppContext<F>) -> Self {
        let capability = cx.wallet.signer_or_provider();
        let account = capability.account();
        let holder = account.map_or_else(|| "provider".to_string(), |a| a.to_string());

        let chain_id = cx
            .queries
            .fetch(
                QueryKey::new(["network".to_string(), holder]),
                move || async move { capability.resolve_network().await },
            )
            .await
            .ok();

        let expected = cx.wallet.chain().chain_id();
        let wrong_network = chain_id.is_some_and(|id| id != expected);
        if wrong_network {
            warn!(
                "Connected to chain {:?}, contract lives on {}",
                chain_id,
                cx.wallet.chain().chain.name
            );
        }

        match account {
            Some(account) => info!("Matic | {} | chain {:?}", account, chain_id),
            None => info!("Matic | connect wallet | chain {:?}", chain_id),
        }

        Self {
            account,
            chain_id,
            wrong_network,
        }
    }
}

/// Query inspector, closed unless asked for.
#[derive(Debug, Clone, Copy, Default)]
pub struct Devtools {
    pub open: bool,
}

impl Devtools {
    pub fn render(&self, queries: &query::QueryClient) {
        if !self.open {
            return;
        }
        match serde_json::to_string_pretty(&queries.snapshot()) {
            Ok(snapshot) => info!("Query devtools:\n{}", snapshot),
            Err(e) => warn!("Failed to render query devtools: {}", e),
        }
    }
}
