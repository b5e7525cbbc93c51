mod storage;
mod vault;

use crate::provider::{ExtensionProvider, ExtensionSigner};
use crate::rpc::{LogFilter, TransactionRequest};
use crate::{Error, Result};
use alloy_primitives::U64;
use alloy_sol_types::{SolCall, SolEvent};
use sepolia_domain::{Address, ContractKind, ContractTarget, TxHash, B256, U256};
pub use storage::StorageContract;
use tracing::{debug, info};
pub use vault::{Activity, VaultContract, VaultEvent};

/// A contract address and interface paired with the signer of one account.
///
/// Rebuilt whenever the account changes; `binding` is the account generation
/// that produced it.
#[derive(Clone, Debug)]
pub struct BoundContract {
    target: ContractTarget,
    signer: ExtensionSigner,
    binding: u64,
}

impl PartialEq for BoundContract {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
            && self.signer.address() == other.signer.address()
            && self.binding == other.binding
    }
}

impl BoundContract {
    pub(crate) const fn new(target: ContractTarget, signer: ExtensionSigner, binding: u64) -> Self {
        Self {
            target,
            signer,
            binding,
        }
    }

    pub const fn address(&self) -> Address {
        self.target.address
    }

    pub const fn kind(&self) -> ContractKind {
        self.target.kind
    }

    pub const fn target(&self) -> ContractTarget {
        self.target
    }

    pub const fn signer(&self) -> Address {
        self.signer.address()
    }

    pub const fn binding(&self) -> u64 {
        self.binding
    }

    fn provider(&self) -> &ExtensionProvider {
        self.signer.provider()
    }

    pub fn storage(&self) -> Result<StorageContract<'_>> {
        match self.kind() {
            ContractKind::SimpleStorage => Ok(StorageContract::new(self)),
            other @ ContractKind::VaultRegistry => Err(Error::UnsupportedOperation(other)),
        }
    }

    pub fn vault(&self) -> Result<VaultContract<'_>> {
        match self.kind() {
            ContractKind::VaultRegistry => Ok(VaultContract::new(self)),
            other @ ContractKind::SimpleStorage => Err(Error::UnsupportedOperation(other)),
        }
    }

    /// `eth_call` from the bound account.
    pub async fn read<C: SolCall>(&self, call: &C) -> Result<C::Return> {
        let tx = TransactionRequest {
            from: Some(self.signer()),
            to: Some(self.address()),
            data: Some(call.abi_encode().into()),
            value: None,
        };
        let output = self.provider().call(&tx).await?;
        Ok(C::abi_decode_returns(&output, true)?)
    }

    pub async fn write<C: SolCall>(&self, call: &C) -> Result<PendingTransaction> {
        self.write_with_value(call, None).await
    }

    pub async fn write_with_value<C: SolCall>(
        &self,
        call: &C,
        value: Option<U256>,
    ) -> Result<PendingTransaction> {
        let tx = TransactionRequest {
            from: None,
            to: Some(self.address()),
            data: Some(call.abi_encode().into()),
            value,
        };
        let hash = self
            .signer
            .send_transaction(tx)
            .await
            .map_err(Error::into_transaction_failure)?;
        info!("submitted {} to {} as {hash}", C::SIGNATURE, self.target);
        Ok(PendingTransaction {
            hash,
            provider: self.provider().clone(),
        })
    }

    /// Decoded `E` logs of this contract, oldest first. `indexed` filters the
    /// first indexed topic.
    pub async fn events<E: SolEvent>(&self, indexed: Option<B256>) -> Result<Vec<DecodedLog<E>>> {
        let mut topics = vec![Some(E::SIGNATURE_HASH)];
        if indexed.is_some() {
            topics.push(indexed);
        }
        let filter = LogFilter::history(self.address(), topics);
        let logs = self.provider().logs(&filter).await?;
        debug!("{} {} log(s) at {}", logs.len(), E::SIGNATURE, self.target);
        logs.into_iter()
            .map(|log| -> Result<DecodedLog<E>> {
                let event = E::decode_raw_log(log.topics.iter().copied(), &log.data, true)?;
                Ok(DecodedLog {
                    event,
                    transaction_hash: log.transaction_hash,
                    block_number: log.block_number,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct DecodedLog<E> {
    pub event: E,
    pub transaction_hash: Option<TxHash>,
    pub block_number: Option<U64>,
}

/// A submitted transaction.
#[derive(Debug, Clone)]
pub struct PendingTransaction {
    hash: TxHash,
    provider: ExtensionProvider,
}

impl PendingTransaction {
    pub const fn hash(&self) -> TxHash {
        self.hash
    }

    /// Wait for the receipt. A reverted receipt is a failure.
    pub async fn wait(self) -> Result<TxHash> {
        let receipt = self
            .provider
            .wait_for_receipt(self.hash)
            .await
            .map_err(Error::into_transaction_failure)?;
        if !receipt.succeeded() {
            return Err(Error::Reverted(self.hash).into_transaction_failure());
        }
        info!("{} confirmed", self.hash);
        Ok(self.hash)
    }
}
