use crate::Error;
use std::fmt::{Display, Formatter};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Info,
    /// User cancelled something; not an error.
    Benign,
    Warning,
    Error,
}

impl Display for NoticeLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Benign => write!(f, "cancelled"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub(crate) fn log(&self) {
        match self.level {
            NoticeLevel::Info | NoticeLevel::Benign => info!("{self}"),
            NoticeLevel::Warning | NoticeLevel::Error => warn!("{self}"),
        }
    }
}

impl From<&Error> for Notice {
    fn from(value: &Error) -> Self {
        match value {
            Error::UserRejected => Self {
                level: NoticeLevel::Benign,
                message: String::from("request cancelled in wallet"),
            },
            Error::WalletUnavailable => Self::error("wallet extension not detected, install one"),
            Error::NotConnected
            | Error::NotOwner
            | Error::OwnerUnknown
            | Error::InvalidInput(_) => Self::warning(value.to_string()),
            _ => Self::error(value.to_string()),
        }
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_levels() {
        assert_eq!(
            NoticeLevel::Benign,
            Notice::from(&Error::UserRejected).level
        );
        assert_eq!(NoticeLevel::Warning, Notice::from(&Error::NotOwner).level);
        assert_eq!(
            "[warning] owner check failed, reconnect wallet",
            Notice::from(&Error::OwnerUnknown).to_string()
        );
        assert_eq!(
            NoticeLevel::Error,
            Notice::from(&Error::ConnectionFailure(String::from("boom"))).level
        );
        assert_eq!(
            "[warning] connect wallet first",
            Notice::from(&Error::NotConnected).to_string()
        );
    }
}
