use {
    alloy_primitives::{address, utils::parse_ether, Address, U256},
    alloy_sol_types::sol,
    serde_with::{DeserializeFromStr, SerializeDisplay},
    std::{
        fmt::{Display, Formatter},
        str::FromStr,
    },
};

/// Deployment of [`SimpleStorage`] on Sepolia.
pub const SIMPLE_STORAGE_ADDRESS: Address = address!("52fc3e42e7e4e6708984f9cd66d1475637da1b1d");

sol! {
    #![sol(all_derives)]
    interface SimpleStorage {
        function setNumber(uint256 num) external;
        function setText(string txt) external;
        function getNumber() external view returns (uint256);
        function getText() external view returns (string memory);
        function number() external view returns (uint256);
        function text() external view returns (string memory);
    }
}

sol! {
    #![sol(all_derives)]
    interface VaultRegistry {
        struct User {
            string name;
            uint256 age;
            address wallet;
            uint256 balance;
        }

        event UserRegistered(address indexed wallet, string name, uint256 age);
        event UserUpdated(address indexed wallet, string name);
        event EtherDeposited(address indexed wallet, uint256 amount);
        event EtherWithdrawn(address indexed wallet, uint256 amount);
        event OwnerWithdrawAll(uint256 amount);

        function register(string name, uint256 age) external;
        function updateUser(string newName) external;
        function deposit() external payable;
        function withdraw(uint256 amount) external;
        function withdrawAllToOwner() external;
        function getUser(address wallet) external view returns (User memory);
        function getAllUsers() external view returns (User[] memory);
        function contractBalance() external view returns (uint256);
        function owner() external view returns (address);
    }
}

/// Which interface a bound contract speaks.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub enum ContractKind {
    #[default]
    SimpleStorage,
    VaultRegistry,
}

impl ContractKind {
    /// Contracts with an `owner()` getter get their owner read on every bind.
    #[must_use]
    pub const fn exposes_owner(&self) -> bool {
        matches!(self, Self::VaultRegistry)
    }
}

impl Display for ContractKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SimpleStorage => write!(f, "simple-storage"),
            Self::VaultRegistry => write!(f, "vault-registry"),
        }
    }
}

impl FromStr for ContractKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "simple-storage" | "storage" => Ok(Self::SimpleStorage),
            "vault-registry" | "vault" => Ok(Self::VaultRegistry),
            _ => Err(crate::Error::InvalidContractKind(String::from(s))),
        }
    }
}

/// A contract address paired with its interface.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ContractTarget {
    pub address: Address,
    pub kind: ContractKind,
}

impl ContractTarget {
    #[must_use]
    pub const fn simple_storage() -> Self {
        Self {
            address: SIMPLE_STORAGE_ADDRESS,
            kind: ContractKind::SimpleStorage,
        }
    }

    #[must_use]
    pub const fn vault_registry(address: Address) -> Self {
        Self {
            address,
            kind: ContractKind::VaultRegistry,
        }
    }
}

impl Default for ContractTarget {
    fn default() -> Self {
        Self::simple_storage()
    }
}

impl Display for ContractTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.kind, self.address)
    }
}

/// Parse a user-entered ether amount into wei. Zero and negative amounts are rejected.
pub fn parse_amount(amount: &str) -> Result<U256, crate::Error> {
    let trimmed = amount.trim();
    if trimmed.is_empty() || trimmed.starts_with('-') {
        return Err(crate::Error::InvalidAmount(String::from(amount)));
    }
    let wei =
        parse_ether(trimmed).map_err(|_| crate::Error::InvalidAmount(String::from(amount)))?;
    if wei.is_zero() {
        return Err(crate::Error::InvalidAmount(String::from(amount)));
    }
    Ok(wei)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy_sol_types::{SolCall, SolEvent},
    };

    #[test]
    fn test_parse_amount() -> anyhow::Result<()> {
        assert_eq!(parse_amount("1")?, U256::from(1_000_000_000_000_000_000u128));
        assert_eq!(parse_amount(" 0.5 ")?, U256::from(500_000_000_000_000_000u128));
        assert!(parse_amount("").is_err());
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("-1").is_err());
        assert!(parse_amount("ten").is_err());
        Ok(())
    }

    #[test]
    fn test_contract_kind() -> anyhow::Result<()> {
        assert!(ContractKind::VaultRegistry.exposes_owner());
        assert!(!ContractKind::SimpleStorage.exposes_owner());
        assert_eq!(ContractKind::VaultRegistry, "vault".parse()?);
        assert_eq!(
            ContractKind::SimpleStorage,
            ContractKind::SimpleStorage.to_string().parse()?
        );
        Ok(())
    }

    #[test]
    fn test_selectors() {
        assert_eq!(SimpleStorage::getNumberCall::SIGNATURE, "getNumber()");
        assert_eq!(SimpleStorage::setNumberCall::SIGNATURE, "setNumber(uint256)");
        assert_eq!(VaultRegistry::ownerCall::SELECTOR, [0x8d, 0xa5, 0xcb, 0x5b]);
        assert_eq!(
            VaultRegistry::EtherDeposited::SIGNATURE,
            "EtherDeposited(address,uint256)"
        );
    }
}
