//! In-memory stand-in for the two deployed contracts.
use crate::rpc::{Log, LogFilter, Receipt};
use alloy_primitives::{keccak256, U64};
use alloy_sol_types::{SolCall, SolEvent, SolInterface};
use sepolia_domain::contracts::{SimpleStorage, VaultRegistry};
use sepolia_domain::{Address, Bytes, ContractKind, ProviderRpcError, TxHash, U256};
use std::collections::HashMap;

const EXECUTION_REVERTED: i64 = 3;

fn revert(reason: &str) -> ProviderRpcError {
    ProviderRpcError::new(EXECUTION_REVERTED, format!("execution reverted: {reason}"))
}

/// What a mined call left behind.
struct Outcome {
    logs: Vec<alloy_primitives::LogData>,
}

#[derive(Default)]
pub(crate) struct MockChain {
    contracts: HashMap<Address, ContractKind>,
    number: U256,
    text: String,
    owner: Address,
    users: Vec<VaultRegistry::User>,
    vault_balance: U256,
    receipts: HashMap<TxHash, Receipt>,
    logs: Vec<Log>,
    block: u64,
    nonce: u64,
}

impl MockChain {
    pub(crate) fn deploy(&mut self, address: Address, kind: ContractKind) {
        self.contracts.insert(address, kind);
    }

    pub(crate) fn set_owner(&mut self, owner: Address) {
        self.owner = owner;
    }

    pub(crate) const fn block(&self) -> u64 {
        self.block
    }

    pub(crate) fn receipt(&self, hash: &TxHash) -> Option<Receipt> {
        self.receipts.get(hash).cloned()
    }

    pub(crate) fn logs(&self, filter: &LogFilter) -> Vec<Log> {
        self.logs
            .iter()
            .filter(|log| filter.matches(log))
            .cloned()
            .collect()
    }

    fn kind(&self, to: Address) -> Result<ContractKind, ProviderRpcError> {
        self.contracts
            .get(&to)
            .copied()
            .ok_or_else(|| revert("no contract at address"))
    }

    /// `eth_call`
    pub(crate) fn call(&self, to: Address, data: &[u8]) -> Result<Bytes, ProviderRpcError> {
        let output = match self.kind(to)? {
            ContractKind::SimpleStorage => self.call_storage(data)?,
            ContractKind::VaultRegistry => self.call_vault(data)?,
        };
        Ok(output.into())
    }

    fn call_storage(&self, data: &[u8]) -> Result<Vec<u8>, ProviderRpcError> {
        use SimpleStorage::SimpleStorageCalls as Calls;
        let call = Calls::abi_decode(data, true).map_err(|e| revert(&e.to_string()))?;
        Ok(match call {
            Calls::getNumber(_) => SimpleStorage::getNumberCall::abi_encode_returns(&(self.number,)),
            Calls::number(_) => SimpleStorage::numberCall::abi_encode_returns(&(self.number,)),
            Calls::getText(_) => {
                SimpleStorage::getTextCall::abi_encode_returns(&(self.text.clone(),))
            }
            Calls::text(_) => SimpleStorage::textCall::abi_encode_returns(&(self.text.clone(),)),
            Calls::setNumber(_) | Calls::setText(_) => Vec::new(),
        })
    }

    fn call_vault(&self, data: &[u8]) -> Result<Vec<u8>, ProviderRpcError> {
        use VaultRegistry::VaultRegistryCalls as Calls;
        let call = Calls::abi_decode(data, true).map_err(|e| revert(&e.to_string()))?;
        Ok(match call {
            Calls::owner(_) => VaultRegistry::ownerCall::abi_encode_returns(&(self.owner,)),
            Calls::getUser(c) => {
                let user = self.user(c.wallet).ok_or_else(|| revert("user not registered"))?;
                VaultRegistry::getUserCall::abi_encode_returns(&(user.clone(),))
            }
            Calls::getAllUsers(_) => {
                VaultRegistry::getAllUsersCall::abi_encode_returns(&(self.users.clone(),))
            }
            Calls::contractBalance(_) => {
                VaultRegistry::contractBalanceCall::abi_encode_returns(&(self.vault_balance,))
            }
            // dry runs of writes return nothing
            _ => Vec::new(),
        })
    }

    fn user(&self, wallet: Address) -> Option<&VaultRegistry::User> {
        self.users.iter().find(|u| u.wallet == wallet)
    }

    fn user_mut(&mut self, wallet: Address) -> Option<&mut VaultRegistry::User> {
        self.users.iter_mut().find(|u| u.wallet == wallet)
    }

    /// Mine a transaction in its own block. Reverts still mine, with status 0.
    pub(crate) fn transact(
        &mut self,
        from: Address,
        to: Address,
        data: &[u8],
        value: U256,
    ) -> Result<TxHash, ProviderRpcError> {
        let kind = self.kind(to)?;
        self.nonce += 1;
        self.block += 1;
        let hash = keccak256(self.nonce.to_be_bytes());
        let block_number = Some(U64::from(self.block));
        let outcome = match kind {
            ContractKind::SimpleStorage => self.transact_storage(data),
            ContractKind::VaultRegistry => self.transact_vault(from, data, value),
        };
        let (status, logs) = match outcome {
            Ok(outcome) => {
                let logs: Vec<Log> = outcome
                    .logs
                    .into_iter()
                    .map(|data| Log {
                        address: to,
                        topics: data.topics().to_vec(),
                        data: data.data,
                        transaction_hash: Some(hash),
                        block_number,
                    })
                    .collect();
                self.logs.extend(logs.iter().cloned());
                (U64::from(1), logs)
            }
            Err(reason) => {
                tracing::debug!("{hash} reverted: {reason}");
                (U64::ZERO, Vec::new())
            }
        };
        self.receipts.insert(
            hash,
            Receipt {
                transaction_hash: hash,
                block_number,
                status: Some(status),
                logs,
            },
        );
        Ok(hash)
    }

    fn transact_storage(&mut self, data: &[u8]) -> Result<Outcome, String> {
        use SimpleStorage::SimpleStorageCalls as Calls;
        match Calls::abi_decode(data, true).map_err(|e| e.to_string())? {
            Calls::setNumber(c) => self.number = c.num,
            Calls::setText(c) => self.text = c.txt,
            _ => {}
        }
        Ok(Outcome { logs: Vec::new() })
    }

    fn transact_vault(&mut self, from: Address, data: &[u8], value: U256) -> Result<Outcome, String> {
        use VaultRegistry::VaultRegistryCalls as Calls;
        let call = Calls::abi_decode(data, true).map_err(|e| e.to_string())?;
        let accepts_value = matches!(call, Calls::deposit(_));
        if !value.is_zero() && !accepts_value {
            return Err(String::from("non-payable function"));
        }
        let log = match call {
            Calls::register(c) => {
                if self.user(from).is_some() {
                    return Err(String::from("already registered"));
                }
                self.users.push(VaultRegistry::User {
                    name: c.name.clone(),
                    age: c.age,
                    wallet: from,
                    balance: U256::ZERO,
                });
                VaultRegistry::UserRegistered {
                    wallet: from,
                    name: c.name,
                    age: c.age,
                }
                .encode_log_data()
            }
            Calls::updateUser(c) => {
                let user = self
                    .user_mut(from)
                    .ok_or_else(|| String::from("not registered"))?;
                user.name.clone_from(&c.newName);
                VaultRegistry::UserUpdated {
                    wallet: from,
                    name: c.newName,
                }
                .encode_log_data()
            }
            Calls::deposit(_) => {
                if value.is_zero() {
                    return Err(String::from("zero deposit"));
                }
                let user = self
                    .user_mut(from)
                    .ok_or_else(|| String::from("not registered"))?;
                user.balance += value;
                self.vault_balance += value;
                VaultRegistry::EtherDeposited {
                    wallet: from,
                    amount: value,
                }
                .encode_log_data()
            }
            Calls::withdraw(c) => {
                let user = self
                    .user_mut(from)
                    .ok_or_else(|| String::from("not registered"))?;
                if user.balance < c.amount {
                    return Err(String::from("insufficient balance"));
                }
                user.balance -= c.amount;
                self.vault_balance -= c.amount;
                VaultRegistry::EtherWithdrawn {
                    wallet: from,
                    amount: c.amount,
                }
                .encode_log_data()
            }
            Calls::withdrawAllToOwner(_) => {
                if from != self.owner {
                    return Err(String::from("not owner"));
                }
                let amount = std::mem::take(&mut self.vault_balance);
                for user in &mut self.users {
                    user.balance = U256::ZERO;
                }
                VaultRegistry::OwnerWithdrawAll { amount }.encode_log_data()
            }
            _ => return Ok(Outcome { logs: Vec::new() }),
        };
        Ok(Outcome { logs: vec![log] })
    }
}
