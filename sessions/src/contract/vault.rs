use super::{BoundContract, DecodedLog, PendingTransaction};
use crate::Result;
use alloy_primitives::utils::format_ether;
use alloy_primitives::U64;
use alloy_sol_types::SolEvent;
use sepolia_domain::contracts::VaultRegistry;
use sepolia_domain::{shorten_address, Address, TxHash, U256};
use std::cmp::Reverse;
use std::fmt::{Display, Formatter};

/// Typed calls for the `VaultRegistry` contract.
#[derive(Debug, Clone, Copy)]
pub struct VaultContract<'a> {
    contract: &'a BoundContract,
}

impl<'a> VaultContract<'a> {
    pub(super) const fn new(contract: &'a BoundContract) -> Self {
        Self { contract }
    }

    pub async fn owner(&self) -> Result<Address> {
        Ok(self.contract.read(&VaultRegistry::ownerCall {}).await?._0)
    }

    pub async fn register(&self, name: impl Into<String>, age: U256) -> Result<PendingTransaction> {
        self.contract
            .write(&VaultRegistry::registerCall {
                name: name.into(),
                age,
            })
            .await
    }

    pub async fn update_user(&self, new_name: impl Into<String>) -> Result<PendingTransaction> {
        self.contract
            .write(&VaultRegistry::updateUserCall {
                newName: new_name.into(),
            })
            .await
    }

    /// Payable; `amount` is sent as the transaction value in wei.
    pub async fn deposit(&self, amount: U256) -> Result<PendingTransaction> {
        self.contract
            .write_with_value(&VaultRegistry::depositCall {}, Some(amount))
            .await
    }

    pub async fn withdraw(&self, amount: U256) -> Result<PendingTransaction> {
        self.contract
            .write(&VaultRegistry::withdrawCall { amount })
            .await
    }

    pub async fn withdraw_all_to_owner(&self) -> Result<PendingTransaction> {
        self.contract
            .write(&VaultRegistry::withdrawAllToOwnerCall {})
            .await
    }

    pub async fn get_user(&self, wallet: Address) -> Result<VaultRegistry::User> {
        Ok(self
            .contract
            .read(&VaultRegistry::getUserCall { wallet })
            .await?
            ._0)
    }

    pub async fn get_all_users(&self) -> Result<Vec<VaultRegistry::User>> {
        Ok(self.contract.read(&VaultRegistry::getAllUsersCall {}).await?._0)
    }

    pub async fn contract_balance(&self) -> Result<U256> {
        Ok(self
            .contract
            .read(&VaultRegistry::contractBalanceCall {})
            .await?
            ._0)
    }

    /// Everything `account` did against the vault, newest first.
    pub async fn activity(&self, account: Address) -> Result<Vec<Activity>> {
        let feed = self.feed(Some(account)).await?;
        Ok(feed.into_iter().map(|e| e.activity).collect())
    }

    /// Every event of the vault from all wallets, owner sweeps included,
    /// newest first.
    pub async fn history(&self) -> Result<Vec<VaultEvent>> {
        self.feed(None).await
    }

    async fn feed(&self, wallet: Option<Address>) -> Result<Vec<VaultEvent>> {
        let indexed = wallet.as_ref().map(Address::into_word);
        let mut entries: Vec<(Option<U64>, VaultEvent)> = Vec::new();
        for log in self
            .contract
            .events::<VaultRegistry::UserRegistered>(indexed)
            .await?
        {
            entries.push(entry(&log, Some(log.event.wallet), |e, tx| {
                Activity::Registered {
                    name: e.name.clone(),
                    age: e.age,
                    tx,
                }
            }));
        }
        for log in self
            .contract
            .events::<VaultRegistry::UserUpdated>(indexed)
            .await?
        {
            entries.push(entry(&log, Some(log.event.wallet), |e, tx| {
                Activity::Updated {
                    name: e.name.clone(),
                    tx,
                }
            }));
        }
        for log in self
            .contract
            .events::<VaultRegistry::EtherDeposited>(indexed)
            .await?
        {
            entries.push(entry(&log, Some(log.event.wallet), |e, tx| {
                Activity::Deposited {
                    amount: e.amount,
                    tx,
                }
            }));
        }
        for log in self
            .contract
            .events::<VaultRegistry::EtherWithdrawn>(indexed)
            .await?
        {
            entries.push(entry(&log, Some(log.event.wallet), |e, tx| {
                Activity::Withdrew {
                    amount: e.amount,
                    tx,
                }
            }));
        }
        // sweeps carry no wallet topic
        if wallet.is_none() {
            for log in self
                .contract
                .events::<VaultRegistry::OwnerWithdrawAll>(None)
                .await?
            {
                entries.push(entry(&log, None, |e, tx| Activity::OwnerWithdrewAll {
                    amount: e.amount,
                    tx,
                }));
            }
        }
        // sort_by_key is stable, ties stay in reverse discovery order
        entries.reverse();
        entries.sort_by_key(|(block, _)| Reverse(*block));
        Ok(entries.into_iter().map(|(_, e)| e).collect())
    }
}

fn entry<E: SolEvent>(
    log: &DecodedLog<E>,
    wallet: Option<Address>,
    f: impl FnOnce(&E, Option<TxHash>) -> Activity,
) -> (Option<U64>, VaultEvent) {
    let activity = f(&log.event, log.transaction_hash);
    (log.block_number, VaultEvent { wallet, activity })
}

/// One entry of the contract-wide feed. `wallet` is `None` for owner sweeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultEvent {
    pub wallet: Option<Address>,
    pub activity: Activity,
}

impl Display for VaultEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.wallet {
            Some(wallet) => write!(f, "{} {}", shorten_address(&wallet), self.activity),
            None => write!(f, "{}", self.activity),
        }
    }
}

/// One line of the "my events" feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activity {
    Registered {
        name: String,
        age: U256,
        tx: Option<TxHash>,
    },
    Updated {
        name: String,
        tx: Option<TxHash>,
    },
    Deposited {
        amount: U256,
        tx: Option<TxHash>,
    },
    Withdrew {
        amount: U256,
        tx: Option<TxHash>,
    },
    OwnerWithdrewAll {
        amount: U256,
        tx: Option<TxHash>,
    },
}

impl Activity {
    pub const fn tx(&self) -> Option<TxHash> {
        match self {
            Self::Registered { tx, .. }
            | Self::Updated { tx, .. }
            | Self::Deposited { tx, .. }
            | Self::Withdrew { tx, .. }
            | Self::OwnerWithdrewAll { tx, .. } => *tx,
        }
    }
}

impl Display for Activity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registered { name, age, .. } => write!(f, "registered as {name} (age {age})"),
            Self::Updated { name, .. } => write!(f, "renamed to {name}"),
            Self::Deposited { amount, .. } => write!(f, "deposited {} ETH", format_ether(*amount)),
            Self::Withdrew { amount, .. } => write!(f, "withdrew {} ETH", format_ether(*amount)),
            Self::OwnerWithdrewAll { amount, .. } => {
                write!(f, "owner withdrew all {} ETH", format_ether(*amount))
            }
        }
    }
}
