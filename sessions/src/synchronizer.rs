use crate::contract::BoundContract;
use crate::extension::Extension;
use crate::notice::Notice;
use crate::provider::ExtensionProvider;
use crate::state::{Binding, Session};
use crate::{Error, Result, SyncConfig};
use sepolia_domain::{shorten_address, Address, ChainId, ContractTarget, Network};
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, trace, warn};

const NOTICE_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Authorization {
    Prompt,
    Silent,
}

/// Proof that an account commit is still the latest operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ticket {
    /// Generation taken when the trigger arrived.
    Issued(u64),
    /// Counter value seen when the operation started; the next generation is
    /// claimed at commit time.
    Observed(u64),
}

impl Ticket {
    /// The generation this commit will carry.
    const fn generation(self) -> u64 {
        match self {
            Self::Issued(generation) => generation,
            Self::Observed(seen) => seen + 1,
        }
    }

    fn redeem(self, counter: &AtomicU64) -> bool {
        match self {
            Self::Issued(generation) => counter.load(Ordering::SeqCst) == generation,
            Self::Observed(seen) => counter
                .compare_exchange(seen, seen + 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok(),
        }
    }
}

/// Keeps a [`Session`] consistent with the wallet extension.
///
/// Account/binding fields and chain fields are each guarded by a generation
/// counter. A notification takes a generation when it arrives; `connect` and
/// `silent_reconnect` only observe the counter and claim the next generation
/// when they have something to commit. A result is committed only if no newer
/// operation on the same fields started since, so the session always ends up
/// reflecting the latest trigger and an attempt that commits nothing never
/// supersedes anyone.
#[derive(Clone)]
pub struct SessionSynchronizer {
    inner: Arc<Inner>,
}

struct Inner {
    extension: Option<Extension>,
    target: ContractTarget,
    config: SyncConfig,
    session: watch::Sender<Session>,
    notices: broadcast::Sender<Notice>,
    account_generation: AtomicU64,
    chain_generation: AtomicU64,
}

impl Debug for SessionSynchronizer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionSynchronizer({})", self.inner.target)
    }
}

impl SessionSynchronizer {
    pub fn new(extension: Option<Extension>, target: ContractTarget, config: SyncConfig) -> Self {
        let (session, _) = watch::channel(Session::default());
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                extension,
                target,
                config,
                session,
                notices,
                account_generation: AtomicU64::new(0),
                chain_generation: AtomicU64::new(0),
            }),
        }
    }

    pub(crate) fn extension(&self) -> Result<Extension> {
        self.inner
            .extension
            .clone()
            .ok_or(Error::WalletUnavailable)
    }

    pub fn provider(&self) -> Result<ExtensionProvider> {
        Ok(ExtensionProvider::new(
            self.extension()?,
            self.inner.config.clone(),
        ))
    }

    pub fn target(&self) -> ContractTarget {
        self.inner.target
    }

    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        self.inner.session.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.session.subscribe()
    }

    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.inner.notices.subscribe()
    }

    pub fn is_owner(&self) -> bool {
        self.inner.session.borrow().is_owner()
    }

    /// Ask the extension for authorization and populate the session.
    /// Failures are also published as notices; the session is left as it was.
    pub async fn connect(&self) -> Result<Session> {
        info!("connecting wallet for {}", self.inner.target);
        let result = self.populate(Authorization::Prompt).await;
        self.report(result)
    }

    /// Populate from already authorized accounts without prompting.
    /// A missing extension or an empty account list leaves the session empty.
    pub async fn silent_reconnect(&self) -> Result<Session> {
        if self.inner.extension.is_none() {
            debug!("no wallet extension, skipping silent reconnect");
            return Ok(self.session());
        }
        let result = self.populate(Authorization::Silent).await;
        self.report(result)
    }

    pub async fn on_accounts_changed(&self, accounts: Vec<Address>) {
        let generation = self.next_account_generation();
        self.reconcile_accounts(generation, accounts).await;
    }

    pub async fn on_chain_changed(&self, chain: String) {
        let generation = self.next_chain_generation();
        self.reconcile_chain(generation, chain).await;
    }

    /// Forget the account locally. The extension keeps its authorization.
    pub fn disconnect(&self) {
        let generation = self.next_account_generation();
        if self.commit_binding(Ticket::Issued(generation), None, None) {
            self.notify(Notice::info("wallet disconnected"));
        }
    }

    pub(crate) fn next_account_generation(&self) -> u64 {
        self.inner.account_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn next_chain_generation(&self) -> u64 {
        self.inner.chain_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) async fn reconcile_accounts(&self, generation: u64, accounts: Vec<Address>) {
        trace!("[{generation}] accounts changed {accounts:?}");
        let Some(account) = accounts.first().copied() else {
            if self.commit_binding(Ticket::Issued(generation), None, None) {
                self.notify(Notice::info("wallet disconnected"));
            }
            return;
        };
        let binding = match self.provider() {
            Ok(provider) => self.bind(&provider, account, generation).await,
            Err(e) => Err(e),
        };
        match binding {
            Ok(binding) => {
                if self.commit_binding(Ticket::Issued(generation), Some(binding), None) {
                    self.notify(Notice::info(format!(
                        "switched to {}",
                        shorten_address(&account)
                    )));
                }
            }
            Err(e) => self.notify(Notice::from(&e.into_connection_failure())),
        }
    }

    pub(crate) async fn reconcile_chain(&self, generation: u64, chain: String) {
        trace!("[{generation}] chain changed {chain}");
        let chain_id = match chain.parse::<ChainId>() {
            Ok(id) => id,
            Err(e) => {
                self.notify(Notice::from(&Error::from(e)));
                return;
            }
        };
        let network = match self.provider() {
            Ok(provider) => match provider.network().await {
                Ok(network) if network.chain_id == chain_id => network,
                Ok(network) => {
                    debug!("provider reports {network}, notification said {chain_id}");
                    Network::from(chain_id)
                }
                Err(e) => {
                    warn!("failed to query network name: {e}");
                    Network::from(chain_id)
                }
            },
            Err(_) => Network::from(chain_id),
        };
        self.commit_network(generation, network);
    }

    async fn populate(&self, mode: Authorization) -> Result<Session> {
        let provider = self.provider()?;
        let ticket = Ticket::Observed(self.inner.account_generation.load(Ordering::SeqCst));
        let chain_generation = self.inner.chain_generation.load(Ordering::SeqCst);
        let accounts = match mode {
            Authorization::Prompt => provider.request_accounts().await,
            Authorization::Silent => provider.accounts().await,
        }
        .map_err(Error::into_connection_failure)?;
        let Some(account) = accounts.first().copied() else {
            return match mode {
                Authorization::Silent => {
                    debug!("no previously authorized accounts");
                    Ok(self.session())
                }
                Authorization::Prompt => Err(Error::ConnectionFailure(String::from(
                    "wallet returned no accounts",
                ))),
            };
        };
        let binding = self
            .bind(&provider, account, ticket.generation())
            .await
            .map_err(Error::into_connection_failure)?;
        let network = provider
            .network()
            .await
            .map_err(Error::into_connection_failure)?;
        if self.commit_binding(ticket, Some(binding), Some((chain_generation, network))) {
            self.notify(Notice::info(format!(
                "connected {}",
                shorten_address(&account)
            )));
        }
        Ok(self.session())
    }

    async fn bind(
        &self,
        provider: &ExtensionProvider,
        account: Address,
        generation: u64,
    ) -> Result<Binding> {
        let contract = BoundContract::new(self.inner.target, provider.signer(account), generation);
        let owner = if self.inner.target.kind.exposes_owner() {
            let owner = contract.vault()?.owner().await?;
            debug!("{} is owned by {owner}", self.inner.target);
            Some(owner)
        } else {
            None
        };
        Ok(Binding {
            account,
            contract,
            owner,
        })
    }

    /// Commit account fields (and chain fields when given) unless a newer
    /// operation took over meanwhile. Returns true when applied.
    fn commit_binding(
        &self,
        ticket: Ticket,
        binding: Option<Binding>,
        network: Option<(u64, Network)>,
    ) -> bool {
        let inner = &self.inner;
        let generation = ticket.generation();
        let mut committed_network = None;
        let applied = inner.session.send_if_modified(|session| {
            if !ticket.redeem(&inner.account_generation) {
                return false;
            }
            match binding {
                Some(binding) => session.bind(binding),
                None => session.clear_account(),
            }
            if let Some((chain_generation, network)) = network {
                if inner.chain_generation.load(Ordering::SeqCst) == chain_generation {
                    committed_network = Some(network.clone());
                    session.set_network(network);
                }
            }
            true
        });
        if applied {
            debug!("[{generation}] committed {}", self.session());
        } else {
            debug!("[{generation}] superseded, discarding");
        }
        if let Some(network) = committed_network {
            self.check_network(&network);
        }
        applied
    }

    fn commit_network(&self, generation: u64, network: Network) -> bool {
        let inner = &self.inner;
        let applied = inner.session.send_if_modified(|session| {
            if inner.chain_generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            session.set_network(network.clone());
            true
        });
        if applied {
            info!("network is now {network}");
            self.check_network(&network);
        } else {
            debug!("[{generation}] chain change superseded, discarding");
        }
        applied
    }

    fn check_network(&self, network: &Network) {
        let expected = self.inner.config.expected_chain;
        if network.chain_id != expected {
            self.notify(Notice::warning(format!(
                "not on {}, wallet is on {network}",
                Network::from(expected)
            )));
        }
    }

    fn report<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.notify(Notice::from(e));
        }
        result
    }

    pub(crate) fn notify(&self, notice: Notice) {
        notice.log();
        if self.inner.notices.send(notice).is_err() {
            trace!("no notice subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_claims_once() {
        let counter = AtomicU64::new(3);
        assert!(!Ticket::Observed(2).redeem(&counter));
        assert_eq!(3, counter.load(Ordering::SeqCst));

        let ticket = Ticket::Observed(3);
        assert_eq!(4, ticket.generation());
        assert!(ticket.redeem(&counter));
        assert_eq!(4, counter.load(Ordering::SeqCst));
        // a second claim from the same observation loses
        assert!(!ticket.redeem(&counter));

        assert!(Ticket::Issued(4).redeem(&counter));
        assert!(!Ticket::Issued(3).redeem(&counter));
    }
}
