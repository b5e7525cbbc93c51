use super::{BoundContract, PendingTransaction};
use crate::Result;
use sepolia_domain::contracts::SimpleStorage;
use sepolia_domain::U256;

/// Typed calls for the `SimpleStorage` contract.
#[derive(Debug, Clone, Copy)]
pub struct StorageContract<'a> {
    contract: &'a BoundContract,
}

impl<'a> StorageContract<'a> {
    pub(super) const fn new(contract: &'a BoundContract) -> Self {
        Self { contract }
    }

    pub async fn get_number(&self) -> Result<U256> {
        Ok(self.contract.read(&SimpleStorage::getNumberCall {}).await?._0)
    }

    pub async fn set_number(&self, num: U256) -> Result<PendingTransaction> {
        self.contract
            .write(&SimpleStorage::setNumberCall { num })
            .await
    }

    pub async fn get_text(&self) -> Result<String> {
        Ok(self.contract.read(&SimpleStorage::getTextCall {}).await?._0)
    }

    pub async fn set_text(&self, txt: impl Into<String>) -> Result<PendingTransaction> {
        self.contract
            .write(&SimpleStorage::setTextCall { txt: txt.into() })
            .await
    }

    /// Public state variable getter.
    pub async fn number(&self) -> Result<U256> {
        Ok(self.contract.read(&SimpleStorage::numberCall {}).await?._0)
    }

    pub async fn text(&self) -> Result<String> {
        Ok(self.contract.read(&SimpleStorage::textCall {}).await?._0)
    }
}
