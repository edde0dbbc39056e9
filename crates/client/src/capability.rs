use crate::ClientError;
use alloy_primitives::Address;
use alloy_provider::{DynProvider, Provider};
use std::{fmt, sync::Arc, sync::OnceLock};
use tracing::debug;

/// Signer-or-provider handle that contract calls go through.
///
/// A capability either carries a signing account (a wallet session) or is
/// read-only. Clones share one instance; two capabilities are the same only
/// if they came from the same construction, see [`Capability::same_as`].
#[derive(Clone)]
pub struct Capability {
    inner: Arc<Inner>,
}

struct Inner {
    provider: DynProvider,
    account: Option<Address>,
    chain_id: OnceLock<u64>,
}

impl Capability {
    /// Read-only access through `provider`.
    pub fn read_only(provider: DynProvider) -> Self {
        Self::build(provider, None)
    }

    /// Wallet session signing as `account`. `provider` must hold the wallet.
    pub fn signer(provider: DynProvider, account: Address) -> Self {
        Self::build(provider, Some(account))
    }

    fn build(provider: DynProvider, account: Option<Address>) -> Self {
        Self {
            inner: Arc::new(Inner {
                provider,
                account,
                chain_id: OnceLock::new(),
            }),
        }
    }

    pub fn provider(&self) -> &DynProvider {
        &self.inner.provider
    }

    /// Signing account, if this is a wallet session.
    pub fn account(&self) -> Option<Address> {
        self.inner.account
    }

    pub fn can_sign(&self) -> bool {
        self.inner.account.is_some()
    }

    /// Whether both handles are the same instance.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Chain id from the provider's network metadata, `None` until resolved.
    pub fn chain_id(&self) -> Option<u64> {
        self.inner.chain_id.get().copied()
    }

    /// Ask the provider for its chain id and remember it.
    pub async fn resolve_network(&self) -> Result<u64, ClientError> {
        if let Some(chain_id) = self.chain_id() {
            return Ok(chain_id);
        }

        let chain_id = self
            .inner
            .provider
            .get_chain_id()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;
        debug!(chain_id, "Resolved provider network");

        Ok(*self.inner.chain_id.get_or_init(|| chain_id))
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("account", &self.inner.account)
            .field("chain_id", &self.chain_id())
            .finish_non_exhaustive()
    }
}
