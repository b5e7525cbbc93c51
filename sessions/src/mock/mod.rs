//! Scripted wallet extension for tests and demos.
//!
//! Holds a set of wallet accounts, the subset the page is authorized for, the
//! current chain, and an in-memory chain running both contracts.
mod chain;

use crate::extension::{Listener, ListenerId, Listeners, WalletExtension};
use crate::rpc::{LogFilter, TransactionRequest};
use crate::Atomic;
use async_trait::async_trait;
use chain::MockChain;
use sepolia_domain::rpc_error::{
    INTERNAL_ERROR, UNAUTHORIZED, UNSUPPORTED_METHOD, USER_REJECTED,
};
use sepolia_domain::{
    Address, ChainId, ContractTarget, EthMethod, ProviderRpcError, TxHash, WalletEvent, U256,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;

#[derive(Default)]
struct MockState {
    wallet_accounts: Vec<Address>,
    authorized: Vec<Address>,
    chain_id: ChainId,
    reject: bool,
    failing: BTreeSet<EthMethod>,
    call_delays: HashMap<Address, Duration>,
    next_delays: HashMap<EthMethod, Duration>,
    history: Vec<EthMethod>,
}

#[derive(Clone, Default)]
pub struct MockExtension {
    state: Atomic<MockState>,
    chain: Atomic<MockChain>,
    listeners: Arc<Listeners>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn param<T: DeserializeOwned>(params: &Value, index: usize) -> Result<T, ProviderRpcError> {
    let value = params
        .get(index)
        .cloned()
        .ok_or_else(|| ProviderRpcError::new(-32602, format!("missing param {index}")))?;
    serde_json::from_value(value).map_err(|e| ProviderRpcError::new(-32602, e.to_string()))
}

fn to_value<T: serde::Serialize>(value: T) -> Result<Value, ProviderRpcError> {
    serde_json::to_value(value).map_err(|e| ProviderRpcError::new(INTERNAL_ERROR.code, e.to_string()))
}

impl MockExtension {
    /// An extension on Sepolia holding no accounts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts the wallet holds. Granted to the page on `eth_requestAccounts`.
    #[must_use]
    pub fn with_accounts(self, accounts: Vec<Address>) -> Self {
        lock(&self.state).wallet_accounts = accounts;
        self
    }

    /// Accounts the page was authorized for in an earlier visit.
    #[must_use]
    pub fn with_authorized(self, accounts: Vec<Address>) -> Self {
        {
            let mut state = lock(&self.state);
            state.wallet_accounts.clone_from(&accounts);
            state.authorized = accounts;
        }
        self
    }

    #[must_use]
    pub fn with_chain(self, chain_id: ChainId) -> Self {
        lock(&self.state).chain_id = chain_id;
        self
    }

    #[must_use]
    pub fn with_contract(self, target: ContractTarget) -> Self {
        lock(&self.chain).deploy(target.address, target.kind);
        self
    }

    #[must_use]
    pub fn with_owner(self, owner: Address) -> Self {
        lock(&self.chain).set_owner(owner);
        self
    }

    /// Make the user decline every prompt from now on.
    pub fn reject_prompts(&self, reject: bool) {
        lock(&self.state).reject = reject;
    }

    /// Answer `method` with an internal error from now on.
    pub fn fail(&self, method: EthMethod) {
        lock(&self.state).failing.insert(method);
    }

    pub fn recover(&self, method: &EthMethod) {
        lock(&self.state).failing.remove(method);
    }

    /// Delay `eth_call`s issued from `account`.
    pub fn delay_calls_from(&self, account: Address, delay: Duration) {
        lock(&self.state).call_delays.insert(account, delay);
    }

    /// Delay only the next request for `method`.
    pub fn delay_next(&self, method: EthMethod, delay: Duration) {
        lock(&self.state).next_delays.insert(method, delay);
    }

    /// User switches account (or revokes with an empty list).
    pub fn switch_accounts(&self, accounts: Vec<Address>) {
        {
            let mut state = lock(&self.state);
            for a in &accounts {
                if !state.wallet_accounts.contains(a) {
                    state.wallet_accounts.push(*a);
                }
            }
            state.authorized.clone_from(&accounts);
        }
        self.emit(&WalletEvent::AccountsChanged, &json!(accounts));
    }

    /// User switches network in the wallet.
    pub fn switch_chain(&self, chain_id: ChainId) {
        lock(&self.state).chain_id = chain_id;
        self.emit(&WalletEvent::ChainChanged, &json!(chain_id.to_hex()));
    }

    /// Push a raw notification.
    pub fn emit(&self, event: &WalletEvent, payload: &Value) {
        debug!("mock emitting {event} {payload}");
        self.listeners.emit(event, payload);
    }

    /// Every method requested so far, in order.
    pub fn requests(&self) -> Vec<EthMethod> {
        lock(&self.state).history.clone()
    }

    pub fn request_count(&self, method: &EthMethod) -> usize {
        lock(&self.state)
            .history
            .iter()
            .filter(|m| *m == method)
            .count()
    }

    pub fn block_number(&self) -> u64 {
        lock(&self.chain).block()
    }

    fn eth_call(&self, params: &Value) -> Result<Value, ProviderRpcError> {
        let tx: TransactionRequest = param(params, 0)?;
        let to = tx.to.ok_or_else(|| ProviderRpcError::new(-32602, "missing to"))?;
        let data = tx.data.unwrap_or_default();
        to_value(lock(&self.chain).call(to, &data)?)
    }

    fn send_transaction(&self, params: &Value) -> Result<Value, ProviderRpcError> {
        let tx: TransactionRequest = param(params, 0)?;
        let from = tx.from.ok_or_else(|| ProviderRpcError::from(UNAUTHORIZED))?;
        {
            let state = lock(&self.state);
            if !state.authorized.contains(&from) {
                return Err(UNAUTHORIZED.into());
            }
            if state.reject {
                return Err(USER_REJECTED.into());
            }
        }
        let to = tx.to.ok_or_else(|| ProviderRpcError::new(-32602, "missing to"))?;
        let data = tx.data.unwrap_or_default();
        let hash: TxHash =
            lock(&self.chain).transact(from, to, &data, tx.value.unwrap_or(U256::ZERO))?;
        to_value(hash)
    }
}

#[async_trait]
impl WalletExtension for MockExtension {
    async fn request(&self, method: EthMethod, params: Value) -> Result<Value, ProviderRpcError> {
        let delay = {
            let mut state = lock(&self.state);
            state.history.push(method.clone());
            if state.failing.contains(&method) {
                return Err(INTERNAL_ERROR.into());
            }
            let per_account = match method {
                EthMethod::Call => param::<TransactionRequest>(&params, 0)
                    .ok()
                    .and_then(|tx| tx.from)
                    .and_then(|from| state.call_delays.get(&from).copied()),
                _ => None,
            };
            state.next_delays.remove(&method).or(per_account)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match method {
            EthMethod::RequestAccounts => {
                let mut state = lock(&self.state);
                if state.reject {
                    return Err(USER_REJECTED.into());
                }
                state.authorized = state.wallet_accounts.clone();
                to_value(&state.authorized)
            }
            EthMethod::Accounts => to_value(&lock(&self.state).authorized),
            EthMethod::ChainId => Ok(json!(lock(&self.state).chain_id.to_hex())),
            EthMethod::Call => self.eth_call(&params),
            EthMethod::SendTransaction => self.send_transaction(&params),
            EthMethod::GetTransactionReceipt => {
                let hash: TxHash = param(&params, 0)?;
                to_value(lock(&self.chain).receipt(&hash))
            }
            EthMethod::GetLogs => {
                let filter: LogFilter = param(&params, 0)?;
                to_value(lock(&self.chain).logs(&filter))
            }
            EthMethod::BlockNumber => Ok(json!(format!("{:#x}", self.block_number()))),
            _ => Err(UNSUPPORTED_METHOD.into()),
        }
    }

    fn on(&self, event: WalletEvent, listener: Listener) -> ListenerId {
        self.listeners.add(event, listener)
    }

    fn remove_listener(&self, event: &WalletEvent, id: ListenerId) -> bool {
        self.listeners.remove(event, id)
    }

    fn listener_count(&self, event: &WalletEvent) -> usize {
        self.listeners.count(event)
    }
}
