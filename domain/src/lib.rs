mod chain;
pub mod contracts;
mod error;
mod event;
mod method;
pub mod rpc_error;

pub use {
    alloy_primitives::{Address, Bytes, TxHash, B256, U256},
    chain::{ChainId, Network, MAINNET, SEPOLIA},
    contracts::{ContractKind, ContractTarget},
    error::Error,
    event::WalletEvent,
    method::EthMethod,
    rpc_error::{ProviderErrors, ProviderRpcError},
};

pub type Result<T> = std::result::Result<T, Error>;

/// `0x1234…cdef` form used in notices and the terminal.
#[must_use]
pub fn shorten_address(address: &Address) -> String {
    let full = address.to_string();
    if full.len() > 12 {
        return format!("{}…{}", &full[..6], &full[full.len() - 4..]);
    }
    full
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten_address() {
        let addr = contracts::SIMPLE_STORAGE_ADDRESS;
        let short = shorten_address(&addr);
        assert!(short.starts_with("0x52"));
        assert!(short.to_lowercase().ends_with("1b1d"));
    }
}
