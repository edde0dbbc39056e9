//! Balance and approval access to the Matic token.
//!
//! [`ContractBalanceGateway`] talks to one fixed contract address through the
//! wallet client's current signer-or-provider capability. The contract handle
//! is derived from that capability and rebuilt only when the capability
//! instance changes.

pub mod binding;
mod format;

pub use binding::{AlloyBindings, BindingFactory, TokenBinding, TokenHandle};
pub use format::format_amount;

use alloy_primitives::{utils::UnitsError, Address, TxHash, U256};
use alloy_transport::TransportError;
use client::Capability;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

/// Token quantity in base units.
pub type Amount = U256;

/// Base-unit exponent of the Matic token.
pub const DEFAULT_DECIMALS: u8 = 18;

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Approval needs a connected wallet
    #[error("No wallet session: connect a wallet before sending transactions")]
    NoWalletSession,

    /// Call, estimation or submission failed
    #[error(transparent)]
    Contract(#[from] alloy_contract::Error),

    /// Waiting for the receipt failed
    #[error(transparent)]
    Confirmation(#[from] TransportError),

    /// Transaction was mined with a failed status
    #[error("Transaction {0} reverted")]
    Reverted(TxHash),

    #[error("Failed to format amount: {0}")]
    Format(#[from] UnitsError),
}

struct Bound<B> {
    capability: Capability,
    handle: Arc<B>,
}

/// Balance reads and approvals against a single token contract.
pub struct ContractBalanceGateway<F: BindingFactory = AlloyBindings> {
    address: Address,
    decimals: u8,
    factory: F,
    capability: watch::Receiver<Capability>,
    bound: Mutex<Option<Bound<F::Binding>>>,
}

impl ContractBalanceGateway<AlloyBindings> {
    /// Gateway using the generated alloy binding.
    pub fn new(address: Address, capability: watch::Receiver<Capability>) -> Self {
        Self::with_factory(address, capability, AlloyBindings)
    }
}

impl<F: BindingFactory> ContractBalanceGateway<F> {
    pub fn with_factory(
        address: Address,
        capability: watch::Receiver<Capability>,
        factory: F,
    ) -> Self {
        Self {
            address,
            decimals: DEFAULT_DECIMALS,
            factory,
            capability,
            bound: Mutex::new(None),
        }
    }

    /// Override the display exponent.
    pub const fn decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    pub const fn address(&self) -> Address {
        self.address
    }

    fn current_capability(&self) -> Capability {
        self.capability.borrow().clone()
    }

    /// Contract handle for the current capability.
    ///
    /// Reuses the cached handle while the capability instance is unchanged.
    pub fn contract(&self) -> Arc<F::Binding> {
        let capability = self.current_capability();
        let mut bound = self.bound.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = bound.as_ref() {
            if existing.capability.same_as(&capability) {
                return existing.handle.clone();
            }
        }

        debug!(
            "Binding contract {} to {}",
            self.address,
            if capability.can_sign() { "signer" } else { "provider" }
        );
        let handle = Arc::new(self.factory.bind(self.address, &capability));
        *bound = Some(Bound {
            capability,
            handle: handle.clone(),
        });
        handle
    }

    /// Balance of `owner` as a decimal string.
    pub async fn get_balance(&self, owner: Address) -> Result<String, GatewayError> {
        let raw = self.contract().balance_of(owner).await?;
        Ok(format_amount(raw, self.decimals)?)
    }

    /// Raw allowance `owner` granted to `spender`.
    pub async fn allowance(
        &self,
        owner: Address,
        spender: Address,
    ) -> Result<Amount, GatewayError> {
        self.contract().allowance(owner, spender).await
    }

    /// Approve `spender` for `amount` base units and wait until mined.
    ///
    /// Rejects before touching the contract when no wallet is connected.
    pub async fn approve(&self, spender: Address, amount: Amount) -> Result<(), GatewayError> {
        if !self.current_capability().can_sign() {
            return Err(GatewayError::NoWalletSession);
        }

        let contract = self.contract();
        let tx_hash = contract.submit_approve(spender, amount).await?;
        info!(
            "Approval submitted: spender={}, amount={}, tx={}",
            spender, amount, tx_hash
        );

        contract.await_confirmation(tx_hash).await?;
        info!("Approval confirmed: tx={}", tx_hash);
        Ok(())
    }

    /// Chain id of the active provider, `None` until its network is known.
    pub fn chain_id(&self) -> Option<u64> {
        self.capability.borrow().chain_id()
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;
    use alloy_provider::{DynProvider, Provider, ProviderBuilder};
    use alloy_transport::mock::Asserter;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub fn mocked_provider(asserter: Asserter) -> DynProvider {
        ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_mocked_client(asserter)
            .erased()
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        BalanceOf(Address),
        Allowance(Address, Address),
        Submit(Address, U256),
        Confirm(TxHash),
    }

    /// Records every call and answers from fixed values.
    #[derive(Default)]
    pub struct MockFactory {
        pub builds: AtomicUsize,
        pub calls: Arc<Mutex<Vec<Call>>>,
        pub balance: U256,
        pub revert: bool,
    }

    impl MockFactory {
        pub fn builds(&self) -> usize {
            self.builds.load(Ordering::SeqCst)
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    pub struct MockBinding {
        calls: Arc<Mutex<Vec<Call>>>,
        balance: U256,
        revert: bool,
    }

    impl BindingFactory for MockFactory {
        type Binding = MockBinding;

        fn bind(&self, _address: Address, _capability: &Capability) -> MockBinding {
            self.builds.fetch_add(1, Ordering::SeqCst);
            MockBinding {
                calls: self.calls.clone(),
                balance: self.balance,
                revert: self.revert,
            }
        }
    }

    impl TokenBinding for MockBinding {
        async fn balance_of(&self, owner: Address) -> Result<U256, GatewayError> {
            self.calls.lock().unwrap().push(Call::BalanceOf(owner));
            Ok(self.balance)
        }

        async fn allowance(
            &self,
            owner: Address,
            spender: Address,
        ) -> Result<U256, GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Allowance(owner, spender));
            Ok(U256::ZERO)
        }

        async fn submit_approve(
            &self,
            spender: Address,
            amount: U256,
        ) -> Result<TxHash, GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Submit(spender, amount));
            Ok(TxHash::repeat_byte(0xaa))
        }

        async fn await_confirmation(&self, tx_hash: TxHash) -> Result<(), GatewayError> {
            self.calls.lock().unwrap().push(Call::Confirm(tx_hash));
            if self.revert {
                return Err(GatewayError::Reverted(tx_hash));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{test_utils::*, *};
    use alloy_primitives::U64;
    use alloy_sol_types::SolValue;
    use alloy_transport::mock::Asserter;

    const TOKEN: Address = alloy_primitives::address!("4242424242424242424242424242424242424242");
    const ONE_TOKEN: u64 = 1_000_000_000_000_000_000;

    fn read_only() -> Capability {
        Capability::read_only(mocked_provider(Asserter::new()))
    }

    fn session() -> Capability {
        Capability::signer(mocked_provider(Asserter::new()), Address::repeat_byte(0x01))
    }

    fn gateway(
        capability: Capability,
        factory: MockFactory,
    ) -> (watch::Sender<Capability>, ContractBalanceGateway<MockFactory>) {
        let (tx, rx) = watch::channel(capability);
        (tx, ContractBalanceGateway::with_factory(TOKEN, rx, factory))
    }

    #[tokio::test]
    async fn test_balance_is_scaled() {
        let factory = MockFactory {
            balance: U256::from(ONE_TOKEN),
            ..Default::default()
        };
        let (_tx, gateway) = gateway(read_only(), factory);
        let owner = Address::repeat_byte(0x05);

        assert_eq!(gateway.get_balance(owner).await.unwrap(), "1");
        assert_eq!(gateway.factory.calls(), vec![Call::BalanceOf(owner)]);
    }

    #[tokio::test]
    async fn test_approve_without_session_rejects_before_calling() {
        let (_tx, gateway) = gateway(read_only(), MockFactory::default());

        let result = gateway.approve(Address::repeat_byte(0x09), U256::from(10)).await;

        assert!(matches!(result, Err(GatewayError::NoWalletSession)));
        assert!(gateway.factory.calls().is_empty());
        assert_eq!(gateway.factory.builds(), 0);
    }

    #[tokio::test]
    async fn test_approve_submits_then_waits() {
        let (_tx, gateway) = gateway(session(), MockFactory::default());
        let spender = Address::repeat_byte(0x09);

        gateway.approve(spender, U256::from(10)).await.unwrap();

        assert_eq!(
            gateway.factory.calls(),
            vec![
                Call::Submit(spender, U256::from(10)),
                Call::Confirm(TxHash::repeat_byte(0xaa)),
            ]
        );
    }

    #[tokio::test]
    async fn test_approve_revert_propagates() {
        let factory = MockFactory {
            revert: true,
            ..Default::default()
        };
        let (_tx, gateway) = gateway(session(), factory);

        let result = gateway.approve(Address::repeat_byte(0x09), U256::from(1)).await;
        assert!(matches!(result, Err(GatewayError::Reverted(_))));
    }

    #[tokio::test]
    async fn test_handle_reused_for_same_capability() {
        let (_tx, gateway) = gateway(read_only(), MockFactory::default());

        let first = gateway.contract();
        let second = gateway.contract();
        gateway.get_balance(Address::ZERO).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(gateway.factory.builds(), 1);
    }

    #[tokio::test]
    async fn test_handle_rebuilt_when_capability_changes() {
        let provider = read_only();
        let (tx, gateway) = gateway(provider.clone(), MockFactory::default());

        let before = gateway.contract();
        tx.send_replace(session());
        let after = gateway.contract();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(gateway.factory.builds(), 2);

        // same instance again: rebuilt once more, then stable
        tx.send_replace(provider);
        gateway.contract();
        gateway.contract();
        assert_eq!(gateway.factory.builds(), 3);
    }

    #[tokio::test]
    async fn test_chain_id_follows_provider_metadata() {
        let asserter = Asserter::new();
        let capability = Capability::read_only(mocked_provider(asserter.clone()));
        let (_tx, gateway) = gateway(capability.clone(), MockFactory::default());

        assert_eq!(gateway.chain_id(), None);

        asserter.push_success(&U64::from(80001));
        capability.resolve_network().await.unwrap();
        assert_eq!(gateway.chain_id(), Some(80001));
    }

    #[tokio::test]
    async fn test_alloy_binding_reads_balance() {
        let asserter = Asserter::new();
        let capability = Capability::read_only(mocked_provider(asserter.clone()));
        let (_tx, rx) = watch::channel(capability);
        let gateway = ContractBalanceGateway::new(TOKEN, rx);

        let raw = U256::from(ONE_TOKEN) * U256::from(3u64) / U256::from(2u64);
        asserter.push_success(&alloy_primitives::Bytes::from(raw.abi_encode()));

        assert_eq!(
            gateway
                .get_balance(Address::repeat_byte(0x05))
                .await
                .unwrap(),
            "1.5"
        );
    }

    #[tokio::test]
    async fn test_alloy_binding_surfaces_rpc_errors() {
        let asserter = Asserter::new();
        let capability = Capability::read_only(mocked_provider(asserter.clone()));
        let (_tx, rx) = watch::channel(capability);
        let gateway = ContractBalanceGateway::new(TOKEN, rx);

        asserter.push_failure_msg("execution reverted");

        assert!(matches!(
            gateway.get_balance(Address::repeat_byte(0x05)).await,
            Err(GatewayError::Contract(_))
        ));
    }

    fn receipt(tx_hash: TxHash, success: bool) -> serde_json::Value {
        let status = if success { "0x1" } else { "0x0" };
        serde_json::json!({
            "type": "0x2",
            "status": status,
            "cumulativeGasUsed": "0xb411",
            "logs": [],
            "logsBloom": format!("0x{}", "00".repeat(256)),
            "transactionHash": tx_hash,
            "transactionIndex": "0x0",
            "blockHash": TxHash::repeat_byte(0xbb),
            "blockNumber": "0x2a",
            "gasUsed": "0xb411",
            "effectiveGasPrice": "0x3b9aca00",
            "from": Address::repeat_byte(0x01),
            "to": TOKEN,
            "contractAddress": null
        })
    }

    #[tokio::test]
    async fn test_alloy_approve_confirms_on_success_receipt() {
        let asserter = Asserter::new();
        let session =
            Capability::signer(mocked_provider(asserter.clone()), Address::repeat_byte(0x01));
        let (_tx, rx) = watch::channel(session);
        let gateway = ContractBalanceGateway::new(TOKEN, rx);
        let tx_hash = TxHash::repeat_byte(0xcc);

        asserter.push_success(&tx_hash);
        asserter.push_success(&receipt(tx_hash, true));

        gateway
            .approve(Address::repeat_byte(0x09), U256::from(ONE_TOKEN))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_alloy_approve_reverted_receipt() {
        let asserter = Asserter::new();
        let session =
            Capability::signer(mocked_provider(asserter.clone()), Address::repeat_byte(0x01));
        let (_tx, rx) = watch::channel(session);
        let gateway = ContractBalanceGateway::new(TOKEN, rx);
        let tx_hash = TxHash::repeat_byte(0xcc);

        asserter.push_success(&tx_hash);
        asserter.push_success(&receipt(tx_hash, false));

        let result = gateway
            .approve(Address::repeat_byte(0x09), U256::from(ONE_TOKEN))
            .await;
        assert!(matches!(result, Err(GatewayError::Reverted(hash)) if hash == tx_hash));
    }

    #[tokio::test]
    async fn test_alloy_approve_waits_for_pending_receipt() {
        let asserter = Asserter::new();
        let session =
            Capability::signer(mocked_provider(asserter.clone()), Address::repeat_byte(0x01));
        let (_tx, rx) = watch::channel(session);
        let gateway = ContractBalanceGateway::new(TOKEN, rx);
        let tx_hash = TxHash::repeat_byte(0xcc);

        asserter.push_success(&tx_hash);
        asserter.push_success(&serde_json::Value::Null);
        asserter.push_success(&receipt(tx_hash, true));

        gateway
            .approve(Address::repeat_byte(0x09), U256::from(ONE_TOKEN))
            .await
            .unwrap();
    }
}
