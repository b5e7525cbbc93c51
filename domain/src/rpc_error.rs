//! EIP-1193 provider errors.
//!
//! <https://eips.ethereum.org/EIPS/eip-1193#provider-errors>
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrors {
    UserRejected,
    Unauthorized,
    UnsupportedMethod,
    Disconnected,
    ChainDisconnected,
    Internal,
}

impl From<ProviderErrors> for ProviderError<'_> {
    fn from(value: ProviderErrors) -> Self {
        match value {
            ProviderErrors::UserRejected => USER_REJECTED,
            ProviderErrors::Unauthorized => UNAUTHORIZED,
            ProviderErrors::UnsupportedMethod => UNSUPPORTED_METHOD,
            ProviderErrors::Disconnected => DISCONNECTED,
            ProviderErrors::ChainDisconnected => CHAIN_DISCONNECTED,
            ProviderErrors::Internal => INTERNAL_ERROR,
        }
    }
}

pub struct ProviderError<'a> {
    pub code: i64,
    pub message: &'a str,
}

pub const USER_REJECTED: ProviderError = ProviderError {
    code: 4001,
    message: "User rejected the request.",
};

pub const UNAUTHORIZED: ProviderError = ProviderError {
    code: 4100,
    message: "The requested method and/or account has not been authorized by the user.",
};

pub const UNSUPPORTED_METHOD: ProviderError = ProviderError {
    code: 4200,
    message: "The Provider does not support the requested method.",
};

pub const DISCONNECTED: ProviderError = ProviderError {
    code: 4900,
    message: "The Provider is disconnected from all chains.",
};

pub const CHAIN_DISCONNECTED: ProviderError = ProviderError {
    code: 4901,
    message: "The Provider is not connected to the requested chain.",
};

/* ----- JSON-RPC (-32xxx) ----- */
pub const INTERNAL_ERROR: ProviderError = ProviderError {
    code: -32603,
    message: "Internal JSON-RPC error.",
};

/// Error object returned by a failed `request`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("[{code}] {message}")]
pub struct ProviderRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ProviderRpcError {
    #[must_use]
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    #[must_use]
    pub fn is_user_rejected(&self) -> bool {
        self.code == USER_REJECTED.code
    }

    #[must_use]
    pub fn is_disconnected(&self) -> bool {
        self.code == DISCONNECTED.code || self.code == CHAIN_DISCONNECTED.code
    }
}

impl<'a> From<ProviderError<'a>> for ProviderRpcError {
    fn from(value: ProviderError<'a>) -> Self {
        Self::new(value.code, value.message)
    }
}

impl From<ProviderErrors> for ProviderRpcError {
    fn from(value: ProviderErrors) -> Self {
        ProviderError::from(value).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_rejected() -> anyhow::Result<()> {
        let err: ProviderRpcError = ProviderErrors::UserRejected.into();
        assert!(err.is_user_rejected());
        assert_eq!(err.to_string(), "[4001] User rejected the request.");
        let from_wire: ProviderRpcError =
            serde_json::from_str(r#"{"code":4001,"message":"MetaMask Tx Signature: User denied"}"#)?;
        assert!(from_wire.is_user_rejected());
        assert!(from_wire.data.is_none());
        Ok(())
    }

    #[test]
    fn test_disconnected() {
        let err: ProviderRpcError = ProviderErrors::ChainDisconnected.into();
        assert!(err.is_disconnected());
        assert!(!err.is_user_rejected());
    }
}
