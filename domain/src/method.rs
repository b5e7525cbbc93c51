use {
    serde_with::{DeserializeFromStr, SerializeDisplay},
    std::{
        fmt::{Display, Formatter},
        str::FromStr,
    },
};

const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
const ACCOUNTS: &str = "eth_accounts";
const CHAIN_ID: &str = "eth_chainId";
const CALL: &str = "eth_call";
const SEND_TRANSACTION: &str = "eth_sendTransaction";
const GET_TRANSACTION_RECEIPT: &str = "eth_getTransactionReceipt";
const GET_LOGS: &str = "eth_getLogs";
const BLOCK_NUMBER: &str = "eth_blockNumber";
const GET_BALANCE: &str = "eth_getBalance";

/// JSON-RPC methods a page issues through the wallet extension.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, SerializeDisplay, DeserializeFromStr,
)]
pub enum EthMethod {
    RequestAccounts,
    Accounts,
    ChainId,
    Call,
    SendTransaction,
    GetTransactionReceipt,
    GetLogs,
    BlockNumber,
    GetBalance,
    Other(String),
}

impl EthMethod {
    /// Methods that may suspend on a user prompt inside the extension.
    #[must_use]
    pub const fn prompts(&self) -> bool {
        matches!(self, Self::RequestAccounts | Self::SendTransaction)
    }
}

impl Display for EthMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequestAccounts => write!(f, "{REQUEST_ACCOUNTS}"),
            Self::Accounts => write!(f, "{ACCOUNTS}"),
            Self::ChainId => write!(f, "{CHAIN_ID}"),
            Self::Call => write!(f, "{CALL}"),
            Self::SendTransaction => write!(f, "{SEND_TRANSACTION}"),
            Self::GetTransactionReceipt => write!(f, "{GET_TRANSACTION_RECEIPT}"),
            Self::GetLogs => write!(f, "{GET_LOGS}"),
            Self::BlockNumber => write!(f, "{BLOCK_NUMBER}"),
            Self::GetBalance => write!(f, "{GET_BALANCE}"),
            Self::Other(m) => write!(f, "{m}"),
        }
    }
}

impl FromStr for EthMethod {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            REQUEST_ACCOUNTS => Ok(Self::RequestAccounts),
            ACCOUNTS => Ok(Self::Accounts),
            CHAIN_ID => Ok(Self::ChainId),
            CALL => Ok(Self::Call),
            SEND_TRANSACTION => Ok(Self::SendTransaction),
            GET_TRANSACTION_RECEIPT => Ok(Self::GetTransactionReceipt),
            GET_LOGS => Ok(Self::GetLogs),
            BLOCK_NUMBER => Ok(Self::BlockNumber),
            GET_BALANCE => Ok(Self::GetBalance),
            _ => Ok(Self::Other(String::from(s))),
        }
    }
}
