use {
    serde_with::{DeserializeFromStr, SerializeDisplay},
    std::{
        fmt::{Display, Formatter},
        str::FromStr,
    },
};

const ACCOUNTS_CHANGED: &str = "accountsChanged";
const CHAIN_CHANGED: &str = "chainChanged";
const CONNECT: &str = "connect";
const DISCONNECT: &str = "disconnect";

/// Notifications a wallet extension pushes to subscribed pages.
//               "chainChanged",
//               "accountsChanged",
//               "disconnect",
//               "connect",
//               "message"
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, SerializeDisplay, DeserializeFromStr,
)]
pub enum WalletEvent {
    AccountsChanged,
    ChainChanged,
    Connect,
    Disconnect,
    Other(String),
}

impl WalletEvent {
    /// The two events a session must stay subscribed to.
    pub const SUBSCRIBED: [Self; 2] = [Self::AccountsChanged, Self::ChainChanged];
}

impl FromStr for WalletEvent {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(crate::Error::InvalidEvent(String::from(s)));
        }
        match s.to_lowercase().as_str() {
            "accountschanged" => Ok(Self::AccountsChanged),
            "chainchanged" => Ok(Self::ChainChanged),
            CONNECT => Ok(Self::Connect),
            DISCONNECT => Ok(Self::Disconnect),
            _ => Ok(Self::Other(String::from(s))),
        }
    }
}

impl Display for WalletEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccountsChanged => write!(f, "{ACCOUNTS_CHANGED}"),
            Self::ChainChanged => write!(f, "{CHAIN_CHANGED}"),
            Self::Connect => write!(f, "{CONNECT}"),
            Self::Disconnect => write!(f, "{DISCONNECT}"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}
