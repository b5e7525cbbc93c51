use super::{Listener, ListenerId, Listeners, WalletExtension};
use async_trait::async_trait;
use sepolia_domain::{rpc_error, Address, EthMethod, ProviderRpcError, WalletEvent};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Extension backed by a JSON-RPC node holding unlocked accounts.
///
/// `eth_requestAccounts` marks the page as authorized. Until then
/// `eth_accounts` answers with an empty list, the same as a browser extension
/// that never approved this origin. Account and chain switches on the node are
/// observed by polling and re-emitted as `accountsChanged` / `chainChanged`.
#[derive(Clone)]
pub struct HttpExtension {
    inner: Arc<Inner>,
}

struct Inner {
    client: reqwest::Client,
    url: Url,
    ids: AtomicU64,
    authorized: AtomicBool,
    listeners: Listeners,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ProviderRpcError>,
}

impl HttpExtension {
    pub fn new(url: Url, authorized: bool) -> Self {
        Self {
            inner: Arc::new(Inner {
                client: reqwest::Client::new(),
                url,
                ids: AtomicU64::new(1),
                authorized: AtomicBool::new(authorized),
                listeners: Listeners::default(),
            }),
        }
    }

    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    /// Start polling the node for account and chain switches.
    /// The task ends once every handle to this extension is dropped.
    pub fn spawn_watcher(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            watch(weak, interval).await;
        })
    }
}

impl Inner {
    async fn forward(&self, method: &EthMethod, params: Value) -> Result<Value, ProviderRpcError> {
        let id = self.ids.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method.to_string(),
            "params": params,
        });
        debug!("[{id}] {method}");
        let response = self
            .client
            .post(self.url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| disconnected(&e))?;
        let response: RpcResponse = response.json().await.map_err(|e| disconnected(&e))?;
        if let Some(err) = response.error {
            return Err(err);
        }
        Ok(response.result.unwrap_or(Value::Null))
    }

    async fn accounts(&self) -> Result<Value, ProviderRpcError> {
        if !self.authorized.load(Ordering::SeqCst) {
            return Ok(json!([]));
        }
        self.forward(&EthMethod::Accounts, json!([])).await
    }
}

fn disconnected(err: &reqwest::Error) -> ProviderRpcError {
    let mut e = ProviderRpcError::from(rpc_error::DISCONNECTED);
    e.data = Some(Value::String(err.to_string()));
    e
}

#[async_trait]
impl WalletExtension for HttpExtension {
    async fn request(&self, method: EthMethod, params: Value) -> Result<Value, ProviderRpcError> {
        match method {
            EthMethod::RequestAccounts => {
                let accounts = self.inner.forward(&EthMethod::Accounts, json!([])).await?;
                if !self.inner.authorized.swap(true, Ordering::SeqCst) {
                    info!("authorized {}", self.inner.url);
                }
                Ok(accounts)
            }
            EthMethod::Accounts => self.inner.accounts().await,
            other => self.inner.forward(&other, params).await,
        }
    }

    fn on(&self, event: WalletEvent, listener: Listener) -> ListenerId {
        self.inner.listeners.add(event, listener)
    }

    fn remove_listener(&self, event: &WalletEvent, id: ListenerId) -> bool {
        self.inner.listeners.remove(event, id)
    }

    fn listener_count(&self, event: &WalletEvent) -> usize {
        self.inner.listeners.count(event)
    }
}

async fn watch(inner: Weak<Inner>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    let mut last_accounts: Option<Vec<Address>> = None;
    let mut last_chain: Option<String> = None;
    info!("started extension watcher");
    loop {
        ticker.tick().await;
        let Some(inner) = inner.upgrade() else {
            debug!("extension dropped, stopping watcher");
            return;
        };
        match inner.accounts().await {
            Ok(value) => match serde_json::from_value::<Vec<Address>>(value.clone()) {
                Ok(accounts) => {
                    if last_accounts.as_ref().is_some_and(|prev| *prev != accounts) {
                        inner.listeners.emit(&WalletEvent::AccountsChanged, &value);
                    }
                    last_accounts = Some(accounts);
                }
                Err(e) => warn!("node returned malformed accounts: {e}"),
            },
            Err(e) => warn!("failed to poll accounts: {e}"),
        }
        match inner.forward(&EthMethod::ChainId, json!([])).await {
            Ok(Value::String(chain)) => {
                if last_chain.as_ref().is_some_and(|prev| !prev.eq_ignore_ascii_case(&chain)) {
                    inner
                        .listeners
                        .emit(&WalletEvent::ChainChanged, &Value::String(chain.clone()));
                }
                last_chain = Some(chain);
            }
            Ok(other) => warn!("node returned malformed chain id {other}"),
            Err(e) => warn!("failed to poll chain id: {e}"),
        }
    }
}
