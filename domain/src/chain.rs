use {
    alloy_chains::Chain,
    serde::{Deserialize, Serialize},
    serde_with::{DeserializeFromStr, SerializeDisplay},
    std::{
        fmt::{self, Display, Formatter},
        str::FromStr,
    },
};

/// Sepolia testnet, the network the deployed contracts live on.
pub const SEPOLIA: ChainId = ChainId(11_155_111);
pub const MAINNET: ChainId = ChainId(1);

const UNKNOWN_NETWORK: &str = "unknown";

#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Ord,
    PartialOrd,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub struct ChainId(u64);

impl ChainId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn id(&self) -> u64 {
        self.0
    }

    /// Hex form as pushed by wallet extensions, i.e. `0xaa36a7`.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("{:#x}", self.0)
    }

    #[must_use]
    pub fn chain(&self) -> Chain {
        Chain::from_id(self.0)
    }

    /// Canonical lowercase network name, or `unknown` for unnamed ids.
    #[must_use]
    pub fn name(&self) -> String {
        self.chain()
            .named()
            .map_or_else(|| String::from(UNKNOWN_NETWORK), |n| n.to_string())
    }

    /// Parse a hex quantity (`0xaa36a7`).
    pub fn from_hex(s: &str) -> Result<Self, crate::Error> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| crate::Error::MalformedChainId(String::from(s)))?;
        if digits.is_empty() {
            return Err(crate::Error::MalformedChainId(String::from(s)));
        }
        u64::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|_| crate::Error::MalformedChainId(String::from(s)))
    }
}

impl Default for ChainId {
    fn default() -> Self {
        SEPOLIA
    }
}

impl From<u64> for ChainId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Chain> for ChainId {
    fn from(value: Chain) -> Self {
        Self(value.id())
    }
}

impl FromStr for ChainId {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Can be either in format:
        // 0x{hex}
        // eip155:{decimal}
        // {decimal}
        let s = s.trim();
        if s.starts_with("0x") || s.starts_with("0X") {
            return Self::from_hex(s);
        }
        let id = s
            .strip_prefix("eip155:")
            .unwrap_or(s)
            .parse::<u64>()
            .map_err(|_| crate::Error::MalformedChainId(String::from(s)))?;
        Ok(Self(id))
    }
}

impl Display for ChainId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Network identity as derived by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Network {
    pub chain_id: ChainId,
    pub name: String,
}

impl From<ChainId> for Network {
    fn from(chain_id: ChainId) -> Self {
        Self {
            chain_id,
            name: chain_id.name(),
        }
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.chain_id)
    }
}
