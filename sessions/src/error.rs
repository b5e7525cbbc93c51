use sepolia_domain::{ContractKind, ProviderRpcError, TxHash};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("wallet extension not detected")]
    WalletUnavailable,

    #[error("user rejected the request")]
    UserRejected,

    #[error("failed to connect wallet: {0}")]
    ConnectionFailure(String),

    #[error("transaction failed: {0}")]
    TransactionFailure(String),

    #[error("transaction {0} reverted")]
    Reverted(TxHash),

    #[error("{0}")]
    InvalidInput(String),

    #[error("connect wallet first")]
    NotConnected,

    #[error("only the contract owner can do this")]
    NotOwner,

    #[error("owner check failed, reconnect wallet")]
    OwnerUnknown,

    #[error("{0} does not support this operation")]
    UnsupportedOperation(ContractKind),

    #[error("timeout waiting for receipt of {0}")]
    Timeout(TxHash),

    #[error("transaction {0} is still pending")]
    Pending(TxHash),

    #[error(transparent)]
    Provider(#[from] ProviderRpcError),

    #[error(transparent)]
    Decode(#[from] alloy_sol_types::Error),

    #[error(transparent)]
    CorruptedPayload(#[from] serde_json::Error),

    #[error(transparent)]
    Domain(#[from] sepolia_domain::Error),
}

impl Error {
    /// Folds low level provider failures into [`Error::ConnectionFailure`].
    /// Rejections and missing extensions keep their identity.
    #[must_use]
    pub fn into_connection_failure(self) -> Self {
        match self {
            Self::Provider(e) if e.is_user_rejected() => Self::UserRejected,
            Self::Provider(e) => Self::ConnectionFailure(e.to_string()),
            Self::Decode(e) => Self::ConnectionFailure(e.to_string()),
            Self::CorruptedPayload(e) => Self::ConnectionFailure(e.to_string()),
            other => other,
        }
    }

    /// Same as [`Error::into_connection_failure`] for the write path.
    #[must_use]
    pub fn into_transaction_failure(self) -> Self {
        match self {
            Self::Provider(e) if e.is_user_rejected() => Self::UserRejected,
            Self::Provider(e) => Self::TransactionFailure(e.message),
            Self::CorruptedPayload(e) => Self::TransactionFailure(e.to_string()),
            Self::Reverted(hash) => Self::TransactionFailure(format!("{hash} reverted")),
            other => other,
        }
    }

    #[must_use]
    pub const fn is_benign(&self) -> bool {
        matches!(self, Self::UserRejected)
    }
}
