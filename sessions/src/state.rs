use crate::contract::BoundContract;
use sepolia_domain::{shorten_address, Address, ChainId, Network};
use std::fmt::{Display, Formatter};

/// Local view of the wallet: account, chain and the contract bound to the
/// account's signer.
///
/// `contract` is present exactly when `account` is. Both are only written
/// together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    account: Option<Address>,
    chain_id: Option<ChainId>,
    chain_name: Option<String>,
    contract: Option<BoundContract>,
    owner: Option<Address>,
}

/// Everything rebuilt when the account changes.
#[derive(Debug, Clone)]
pub(crate) struct Binding {
    pub(crate) account: Address,
    pub(crate) contract: BoundContract,
    pub(crate) owner: Option<Address>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Disconnected,
    Connected {
        account: Address,
        chain_id: Option<ChainId>,
        contract: BoundContract,
    },
}

impl Session {
    pub const fn account(&self) -> Option<Address> {
        self.account
    }

    pub const fn chain_id(&self) -> Option<ChainId> {
        self.chain_id
    }

    pub fn chain_name(&self) -> Option<&str> {
        self.chain_name.as_deref()
    }

    pub const fn contract(&self) -> Option<&BoundContract> {
        self.contract.as_ref()
    }

    pub const fn owner(&self) -> Option<Address> {
        self.owner
    }

    pub fn network(&self) -> Option<Network> {
        Some(Network {
            chain_id: self.chain_id?,
            name: self.chain_name.clone()?,
        })
    }

    pub const fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    /// Connected account is the contract owner. Address equality ignores
    /// checksum casing.
    pub fn is_owner(&self) -> bool {
        matches!((self.account, self.owner), (Some(a), Some(o)) if a == o)
    }

    pub fn state(&self) -> SessionState {
        match (self.account, &self.contract) {
            (Some(account), Some(contract)) => SessionState::Connected {
                account,
                chain_id: self.chain_id,
                contract: contract.clone(),
            },
            _ => SessionState::Disconnected,
        }
    }

    pub(crate) fn bind(&mut self, binding: Binding) {
        self.account = Some(binding.account);
        self.contract = Some(binding.contract);
        self.owner = binding.owner;
    }

    pub(crate) fn clear_account(&mut self) {
        self.account = None;
        self.contract = None;
        self.owner = None;
    }

    pub(crate) fn set_network(&mut self, network: Network) {
        self.chain_id = Some(network.chain_id);
        self.chain_name = Some(network.name);
    }
}

impl Display for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.account {
            None => write!(f, "disconnected")?,
            Some(a) => write!(f, "connected {}", shorten_address(&a))?,
        }
        if let Some(network) = self.network() {
            write!(f, " on {network}")?;
        }
        if let Some(contract) = &self.contract {
            write!(f, " bound to {}", contract.target())?;
        }
        if self.is_owner() {
            write!(f, " (owner)")?;
        }
        Ok(())
    }
}
