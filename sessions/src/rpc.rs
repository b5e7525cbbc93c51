//! JSON-RPC payloads exchanged through the extension.
use alloy_primitives::U64;
use sepolia_domain::{Address, Bytes, TxHash, B256, U256};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    #[serde(default)]
    pub transaction_hash: Option<TxHash>,
    #[serde(default)]
    pub block_number: Option<U64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_hash: TxHash,
    #[serde(default)]
    pub block_number: Option<U64>,
    /// `0x1` success, `0x0` reverted
    #[serde(default)]
    pub status: Option<U64>,
    #[serde(default)]
    pub logs: Vec<Log>,
}

impl Receipt {
    pub fn succeeded(&self) -> bool {
        self.status.map_or(true, |s| !s.is_zero())
    }
}

/// `eth_getLogs` filter. A `None` topic matches anything in that position, but
/// a log with fewer topics than the filter never matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    pub address: Address,
    pub topics: Vec<Option<B256>>,
    pub from_block: String,
    pub to_block: String,
}

impl LogFilter {
    /// Whole history of `address`, block 0 to latest.
    pub fn history(address: Address, topics: Vec<Option<B256>>) -> Self {
        Self {
            address,
            topics,
            from_block: String::from("0x0"),
            to_block: String::from("latest"),
        }
    }

    pub fn matches(&self, log: &Log) -> bool {
        if log.address != self.address || log.topics.len() < self.topics.len() {
            return false;
        }
        self.topics.iter().enumerate().all(|(i, wanted)| match wanted {
            None => true,
            Some(t) => log.topics.get(i) == Some(t),
        })
    }
}
