//! Pages mounted inside the shell.

use crate::shell::AppContext;
use alloy_primitives::{Address, U256};
use gateway::BindingFactory;
use query::QueryKey;
use std::future::Future;
use tracing::{info, warn};

/// A screen rendered inside [`AppShell`](crate::shell::AppShell).
pub trait Page<F: BindingFactory> {
    fn title(&self) -> &'static str;

    /// Render the page.
    ///
    /// Failed queries are reported by the query cache and must not be
    /// returned here; only errors the page reports itself are.
    fn render(&self, cx: &AppContext<F>) -> impl Future<Output = eyre::Result<()>>;
}

/// Query key of the balance of `owner`.
pub fn balance_key(owner: Address) -> QueryKey {
    QueryKey::new(["balance".to_string(), owner.to_string()])
}

/// Query key of what `owner` allowed `spender` to spend.
pub fn allowance_key(owner: Address, spender: Address) -> QueryKey {
    QueryKey::new(["allowance".to_string(), owner.to_string(), spender.to_string()])
}

/// Token balance of an address, the connected account by default.
#[derive(Debug, Clone, Default)]
pub struct BalancePage {
    pub owner: Option<Address>,
}

impl<F: BindingFactory> Page<F> for BalancePage {
    fn title(&self) -> &'static str {
        "balance"
    }

    async fn render(&self, cx: &AppContext<F>) -> eyre::Result<()> {
        let Some(owner) = self.owner.or_else(|| cx.wallet.account()) else {
            eyre::bail!("No address given and no wallet connected");
        };

        let balance = cx
            .queries
            .fetch(balance_key(owner), || cx.gateway.get_balance(owner))
            .await;

        match balance {
            Ok(balance) => println!("{owner}: {balance}"),
            Err(e) => warn!("Balance of {} unavailable: {}", owner, e),
        }
        Ok(())
    }
}

/// Grants `spender` an allowance of `amount` base units.
#[derive(Debug, Clone)]
pub struct ApprovePage {
    pub spender: Address,
    pub amount: U256,
}

impl<F: BindingFactory> Page<F> for ApprovePage {
    fn title(&self) -> &'static str {
        "approve"
    }

    async fn render(&self, cx: &AppContext<F>) -> eyre::Result<()> {
        if let Err(e) = cx.gateway.approve(self.spender, self.amount).await {
            cx.metrics.record_approval(false);
            cx.metrics.record_notification("error");
            cx.toasts.error(format!("Approval failed: {e}"));
            return Err(e.into());
        }

        cx.metrics.record_approval(true);
        cx.metrics.record_notification("success");
        cx.toasts.success(format!("Approved {} for {}", self.amount, self.spender));

        let Some(owner) = cx.wallet.account() else {
            return Ok(());
        };
        let key = allowance_key(owner, self.spender);
        cx.queries.invalidate(&key);
        if let Ok(allowance) = cx
            .queries
            .fetch(key, || cx.gateway.allowance(owner, self.spender))
            .await
        {
            info!("Allowance of {} is now {}", self.spender, allowance);
        }
        Ok(())
    }
}

/// Chain the active provider is on, next to the configured one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainPage;

impl<F: BindingFactory> Page<F> for ChainPage {
    fn title(&self) -> &'static str {
        "chain-id"
    }

    async fn render(&self, cx: &AppContext<F>) -> eyre::Result<()> {
        let configured = cx.wallet.chain();
        match cx.gateway.chain_id() {
            Some(id) => println!("{id}"),
            None => println!("unknown"),
        }
        info!(
            "Configured for {} ({})",
            configured.chain.name,
            configured.chain_id()
        );
        Ok(())
    }
}
