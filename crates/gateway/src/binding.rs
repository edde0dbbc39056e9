//! Token contract handles.

use crate::GatewayError;
use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::{DynProvider, Provider};
use binding::IMatic;
use client::Capability;
use std::{future::Future, time::Duration};
use tokio::time;
use tracing::debug;

/// How often a pending approval's receipt is looked up.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Calls the gateway makes against the token contract.
pub trait TokenBinding: Send + Sync {
    /// Raw balance of `owner` in base units.
    fn balance_of(
        &self,
        owner: Address,
    ) -> impl Future<Output = Result<U256, GatewayError>> + Send;

    /// Raw allowance `owner` granted to `spender`.
    fn allowance(
        &self,
        owner: Address,
        spender: Address,
    ) -> impl Future<Output = Result<U256, GatewayError>> + Send;

    /// Submit an approval and return its transaction hash without waiting.
    fn submit_approve(
        &self,
        spender: Address,
        amount: U256,
    ) -> impl Future<Output = Result<TxHash, GatewayError>> + Send;

    /// Wait until `tx_hash` is mined and check it succeeded.
    fn await_confirmation(
        &self,
        tx_hash: TxHash,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;
}

/// Builds a contract handle bound to a capability.
pub trait BindingFactory: Send + Sync {
    type Binding: TokenBinding;

    fn bind(&self, address: Address, capability: &Capability) -> Self::Binding;
}

/// Handles backed by the generated alloy binding.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlloyBindings;

impl BindingFactory for AlloyBindings {
    type Binding = TokenHandle;

    fn bind(&self, address: Address, capability: &Capability) -> TokenHandle {
        TokenHandle {
            contract: IMatic::new(address, capability.provider().clone()),
        }
    }
}

/// The Matic contract reached through one capability's provider.
pub struct TokenHandle {
    contract: IMatic::IMaticInstance<DynProvider>,
}

impl TokenHandle {
    pub fn address(&self) -> &Address {
        self.contract.address()
    }
}

impl TokenBinding for TokenHandle {
    async fn balance_of(&self, owner: Address) -> Result<U256, GatewayError> {
        debug!("Querying balanceOf {} on {}", owner, self.address());
        Ok(self.contract.balanceOf(owner).call().await?)
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, GatewayError> {
        Ok(self.contract.allowance(owner, spender).call().await?)
    }

    async fn submit_approve(
        &self,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, GatewayError> {
        let pending = self.contract.approve(spender, amount).send().await?;
        Ok(*pending.tx_hash())
    }

    async fn await_confirmation(&self, tx_hash: TxHash) -> Result<(), GatewayError> {
        let provider = self.contract.provider();
        let receipt = loop {
            if let Some(receipt) = provider.get_transaction_receipt(tx_hash).await? {
                break receipt;
            }
            debug!("Transaction {} pending", tx_hash);
            time::sleep(RECEIPT_POLL_INTERVAL).await;
        };

        if !receipt.status() {
            return Err(GatewayError::Reverted(tx_hash));
        }
        debug!(
            "Transaction {} mined in block {:?}",
            tx_hash, receipt.block_number
        );
        Ok(())
    }
}
