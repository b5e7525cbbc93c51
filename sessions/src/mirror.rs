//! Local mirrors of on-chain values and the form actions that change them.
use crate::contract::{Activity, BoundContract, PendingTransaction, VaultEvent};
use crate::state::Session;
use crate::{Error, Result};
use sepolia_domain::contracts::{parse_amount, VaultRegistry};
use sepolia_domain::{Address, TxHash, U256};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use tracing::debug;

/// A mirrored value: never fetched, fetched, or the last fetch failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReadState<T> {
    #[default]
    NotLoaded,
    Loaded(T),
    Failed(String),
}

impl<T> ReadState<T> {
    pub const fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(v) => Some(v),
            _ => None,
        }
    }

    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl<T: Display> Display for ReadState<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotLoaded => write!(f, "-"),
            Self::Loaded(v) => write!(f, "{v}"),
            Self::Failed(e) => write!(f, "unavailable ({e})"),
        }
    }
}

/// Store `result` in `slot`. A missing connection leaves the slot alone.
fn record<T: Clone>(slot: &mut ReadState<T>, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            *slot = ReadState::Loaded(value.clone());
            Ok(value)
        }
        Err(Error::NotConnected) => Err(Error::NotConnected),
        Err(e) => {
            *slot = ReadState::Failed(e.to_string());
            Err(e)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    SetNumber,
    SetText,
    Register,
    UpdateUser,
    Deposit,
    Withdraw,
    WithdrawAll,
}

/// Mirrors for both dashboard pages.
#[derive(Debug, Default)]
pub struct Dashboard {
    pub number: ReadState<U256>,
    pub text: ReadState<String>,
    pub user: ReadState<VaultRegistry::User>,
    pub users: ReadState<Vec<VaultRegistry::User>>,
    pub balance: ReadState<U256>,
    pub activity: ReadState<Vec<Activity>>,
    pub history: ReadState<Vec<VaultEvent>>,
    transactions: BTreeMap<Action, TxHash>,
}

fn bound(session: &Session) -> Result<&BoundContract> {
    session.contract().ok_or(Error::NotConnected)
}

fn account(session: &Session) -> Result<Address> {
    session.account().ok_or(Error::NotConnected)
}

fn required(value: &str, message: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(String::from(message)));
    }
    Ok(String::from(trimmed))
}

fn amount(value: &str) -> Result<U256> {
    parse_amount(value).map_err(|_| Error::InvalidInput(String::from("enter an amount above 0")))
}

async fn read_number(session: &Session) -> Result<U256> {
    bound(session)?.storage()?.get_number().await
}

async fn read_text(session: &Session) -> Result<String> {
    bound(session)?.storage()?.get_text().await
}

async fn read_user(session: &Session) -> Result<VaultRegistry::User> {
    let account = account(session)?;
    bound(session)?.vault()?.get_user(account).await
}

async fn read_users(session: &Session) -> Result<Vec<VaultRegistry::User>> {
    bound(session)?.vault()?.get_all_users().await
}

async fn read_balance(session: &Session) -> Result<U256> {
    bound(session)?.vault()?.contract_balance().await
}

async fn read_activity(session: &Session) -> Result<Vec<Activity>> {
    let account = account(session)?;
    bound(session)?.vault()?.activity(account).await
}

async fn read_history(session: &Session) -> Result<Vec<VaultEvent>> {
    bound(session)?.vault()?.history().await
}

impl Dashboard {
    /// Hash of the last confirmed transaction for `action`.
    pub fn last_transaction(&self, action: Action) -> Option<TxHash> {
        self.transactions.get(&action).copied()
    }

    /// Only a successful receipt replaces the recorded hash.
    async fn confirm(&mut self, action: Action, pending: PendingTransaction) -> Result<TxHash> {
        let hash = pending.wait().await?;
        self.transactions.insert(action, hash);
        Ok(hash)
    }

    pub async fn refresh_number(&mut self, session: &Session) -> Result<U256> {
        let result = read_number(session).await;
        record(&mut self.number, result)
    }

    pub async fn refresh_text(&mut self, session: &Session) -> Result<String> {
        let result = read_text(session).await;
        record(&mut self.text, result)
    }

    pub async fn set_number(&mut self, session: &Session, input: &str) -> Result<TxHash> {
        let storage = bound(session)?.storage()?;
        let value = input
            .trim()
            .parse::<U256>()
            .map_err(|_| Error::InvalidInput(String::from("enter a whole number")))?;
        let pending = storage.set_number(value).await?;
        let hash = self.confirm(Action::SetNumber, pending).await?;
        if let Err(e) = self.refresh_number(session).await {
            debug!("number refresh after write failed: {e}");
        }
        Ok(hash)
    }

    pub async fn set_text(&mut self, session: &Session, input: &str) -> Result<TxHash> {
        let storage = bound(session)?.storage()?;
        let pending = storage.set_text(input).await?;
        let hash = self.confirm(Action::SetText, pending).await?;
        if let Err(e) = self.refresh_text(session).await {
            debug!("text refresh after write failed: {e}");
        }
        Ok(hash)
    }

    pub async fn load_user(&mut self, session: &Session) -> Result<VaultRegistry::User> {
        let result = read_user(session).await;
        record(&mut self.user, result)
    }

    pub async fn load_users(&mut self, session: &Session) -> Result<Vec<VaultRegistry::User>> {
        let result = read_users(session).await;
        record(&mut self.users, result)
    }

    pub async fn load_balance(&mut self, session: &Session) -> Result<U256> {
        let result = read_balance(session).await;
        record(&mut self.balance, result)
    }

    pub async fn load_activity(&mut self, session: &Session) -> Result<Vec<Activity>> {
        let result = read_activity(session).await;
        record(&mut self.activity, result)
    }

    pub async fn load_history(&mut self, session: &Session) -> Result<Vec<VaultEvent>> {
        let result = read_history(session).await;
        record(&mut self.history, result)
    }

    /// Re-read the vault mirrors after a write. Failures stay in the mirrors.
    async fn reload_vault(&mut self, session: &Session) {
        let _ = self.load_user(session).await;
        let _ = self.load_users(session).await;
        let _ = self.load_balance(session).await;
        let _ = self.load_history(session).await;
    }

    pub async fn register(&mut self, session: &Session, name: &str, age: &str) -> Result<TxHash> {
        let vault = bound(session)?.vault()?;
        let name = required(name, "name and age are required")?;
        let age = required(age, "name and age are required")?
            .parse::<U256>()
            .map_err(|_| Error::InvalidInput(String::from("age must be a whole number")))?;
        let pending = vault.register(name, age).await?;
        let hash = self.confirm(Action::Register, pending).await?;
        self.reload_vault(session).await;
        Ok(hash)
    }

    pub async fn update_user(&mut self, session: &Session, new_name: &str) -> Result<TxHash> {
        let vault = bound(session)?.vault()?;
        let name = required(new_name, "new name is required")?;
        let pending = vault.update_user(name).await?;
        let hash = self.confirm(Action::UpdateUser, pending).await?;
        self.reload_vault(session).await;
        Ok(hash)
    }

    pub async fn deposit(&mut self, session: &Session, ether: &str) -> Result<TxHash> {
        let vault = bound(session)?.vault()?;
        let wei = amount(ether)?;
        let pending = vault.deposit(wei).await?;
        let hash = self.confirm(Action::Deposit, pending).await?;
        self.reload_vault(session).await;
        Ok(hash)
    }

    pub async fn withdraw(&mut self, session: &Session, ether: &str) -> Result<TxHash> {
        let vault = bound(session)?.vault()?;
        let wei = amount(ether)?;
        let pending = vault.withdraw(wei).await?;
        let hash = self.confirm(Action::Withdraw, pending).await?;
        self.reload_vault(session).await;
        Ok(hash)
    }

    /// Owner only. Checked locally before anything reaches the wallet.
    pub async fn withdraw_all_to_owner(&mut self, session: &Session) -> Result<TxHash> {
        let vault = bound(session)?.vault()?;
        if session.owner().is_none() {
            return Err(Error::OwnerUnknown);
        }
        if !session.is_owner() {
            return Err(Error::NotOwner);
        }
        let pending = vault.withdraw_all_to_owner().await?;
        let hash = self.confirm(Action::WithdrawAll, pending).await?;
        self.reload_vault(session).await;
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockExtension;
    use crate::provider::ExtensionProvider;
    use crate::state::Binding;
    use crate::SyncConfig;
    use assert_matches::assert_matches;
    use sepolia_domain::{ContractTarget, EthMethod};
    use std::sync::Arc;

    #[test]
    fn test_read_state() {
        let mut slot: ReadState<U256> = ReadState::default();
        assert_eq!("-", slot.to_string());
        assert_matches!(
            record(&mut slot, Err(Error::NotConnected)),
            Err(Error::NotConnected)
        );
        assert_eq!(ReadState::NotLoaded, slot);

        assert!(record(&mut slot, Err(Error::UserRejected)).is_err());
        assert!(slot.is_failed());

        assert_matches!(record(&mut slot, Ok(U256::from(7))), Ok(_));
        assert_eq!(Some(&U256::from(7)), slot.loaded());
        assert_eq!("7", slot.to_string());
    }

    #[test]
    fn test_validation() {
        assert_matches!(required("  ", "nope"), Err(Error::InvalidInput(m)) if m == "nope");
        assert_eq!("bob", required(" bob ", "nope").unwrap_or_default());
        assert_matches!(amount("0"), Err(Error::InvalidInput(_)));
        assert_matches!(amount("-2"), Err(Error::InvalidInput(_)));
        assert_matches!(amount("0.1"), Ok(_));
    }

    #[tokio::test]
    async fn test_requires_connection() {
        let mut dashboard = Dashboard::default();
        let session = Session::default();
        assert_matches!(
            dashboard.set_number(&session, "1").await,
            Err(Error::NotConnected)
        );
        assert_matches!(
            dashboard.withdraw_all_to_owner(&session).await,
            Err(Error::NotConnected)
        );
        assert_matches!(
            dashboard.refresh_text(&session).await,
            Err(Error::NotConnected)
        );
        assert_eq!(ReadState::NotLoaded, dashboard.text);
        assert_eq!(None, dashboard.last_transaction(Action::SetNumber));
    }

    #[tokio::test]
    async fn test_withdraw_all_without_owner() {
        let owner = Address::repeat_byte(0xaa);
        let target = ContractTarget::vault_registry(Address::repeat_byte(0x77));
        let mock = MockExtension::new()
            .with_authorized(vec![owner])
            .with_contract(target)
            .with_owner(owner);
        let provider = ExtensionProvider::new(Arc::new(mock.clone()), SyncConfig::default());
        let mut session = Session::default();
        // a binding whose owner read never landed
        session.bind(Binding {
            account: owner,
            contract: BoundContract::new(target, provider.signer(owner), 1),
            owner: None,
        });

        let mut dashboard = Dashboard::default();
        assert_matches!(
            dashboard.withdraw_all_to_owner(&session).await,
            Err(Error::OwnerUnknown)
        );
        assert_eq!(0, mock.request_count(&EthMethod::SendTransaction));
        assert_eq!(None, dashboard.last_transaction(Action::WithdrawAll));
    }
}
