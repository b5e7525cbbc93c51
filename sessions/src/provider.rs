use crate::extension::Extension;
use crate::rpc::{Log, LogFilter, Receipt, TransactionRequest};
use crate::{Error, Result, SyncConfig};
use backoff::ExponentialBackoffBuilder;
use sepolia_domain::{Address, Bytes, ChainId, EthMethod, Network, TxHash};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::fmt::{Debug, Formatter};
use tracing::{debug, trace};

/// Network access derived from the extension handle. Every call is routed
/// through [`crate::WalletExtension::request`].
#[derive(Clone)]
pub struct ExtensionProvider {
    extension: Extension,
    config: SyncConfig,
}

impl Debug for ExtensionProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ExtensionProvider")
    }
}

impl ExtensionProvider {
    pub fn new(extension: Extension, config: SyncConfig) -> Self {
        Self { extension, config }
    }

    async fn request<R: DeserializeOwned>(&self, method: EthMethod, params: Value) -> Result<R> {
        trace!("requesting {method}");
        let value = self.extension.request(method, params).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Prompts the user to authorize this page.
    pub async fn request_accounts(&self) -> Result<Vec<Address>> {
        self.request(EthMethod::RequestAccounts, json!([])).await
    }

    /// Already authorized accounts, never prompts.
    pub async fn accounts(&self) -> Result<Vec<Address>> {
        self.request(EthMethod::Accounts, json!([])).await
    }

    pub async fn chain_id(&self) -> Result<ChainId> {
        let hex: String = self.request(EthMethod::ChainId, json!([])).await?;
        Ok(ChainId::from_hex(&hex)?)
    }

    pub async fn network(&self) -> Result<Network> {
        Ok(Network::from(self.chain_id().await?))
    }

    pub fn signer(&self, address: Address) -> ExtensionSigner {
        ExtensionSigner {
            address,
            provider: self.clone(),
        }
    }

    pub async fn call(&self, tx: &TransactionRequest) -> Result<Bytes> {
        self.request(EthMethod::Call, json!([tx, "latest"])).await
    }

    pub async fn send_transaction(&self, tx: &TransactionRequest) -> Result<TxHash> {
        self.request(EthMethod::SendTransaction, json!([tx])).await
    }

    pub async fn receipt(&self, hash: TxHash) -> Result<Option<Receipt>> {
        self.request(EthMethod::GetTransactionReceipt, json!([hash]))
            .await
    }

    pub async fn logs(&self, filter: &LogFilter) -> Result<Vec<Log>> {
        self.request(EthMethod::GetLogs, json!([filter])).await
    }

    /// Poll for the receipt of `hash` with exponential backoff until it is
    /// mined or the confirmation timeout elapses.
    pub async fn wait_for_receipt(&self, hash: TxHash) -> Result<Receipt> {
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.config.receipt_poll())
            .with_max_interval(self.config.receipt_poll() * 8)
            .with_max_elapsed_time(Some(self.config.confirmation_timeout()))
            .build();
        let receipt = backoff::future::retry(policy, || async move {
            match self.receipt(hash).await {
                Ok(Some(receipt)) => Ok(receipt),
                Ok(None) => {
                    trace!("{hash} not mined yet");
                    Err(backoff::Error::transient(Error::Pending(hash)))
                }
                Err(e) => Err(backoff::Error::permanent(e)),
            }
        })
        .await
        .map_err(|e| match e {
            Error::Pending(hash) => Error::Timeout(hash),
            other => other,
        })?;
        debug!("{hash} mined in block {:?}", receipt.block_number);
        Ok(receipt)
    }

    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }
}

/// Signs by asking the extension to send on behalf of `address`.
#[derive(Clone, Debug)]
pub struct ExtensionSigner {
    address: Address,
    provider: ExtensionProvider,
}

impl ExtensionSigner {
    pub const fn address(&self) -> Address {
        self.address
    }

    pub const fn provider(&self) -> &ExtensionProvider {
        &self.provider
    }

    pub async fn send_transaction(&self, mut tx: TransactionRequest) -> Result<TxHash> {
        tx.from = Some(self.address);
        self.provider.send_transaction(&tx).await
    }
}
