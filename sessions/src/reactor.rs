use crate::extension::{Extension, ListenerId};
use crate::{Result, SessionSynchronizer};
use sepolia_domain::{Address, WalletEvent};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use xtra::{Context, Handler, Mailbox};

/// Change notifications pushed by the extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    AccountsChanged(Vec<Address>),
    ChainChanged(String),
}

impl Notification {
    fn parse(event: &WalletEvent, payload: Value) -> Option<Self> {
        match event {
            WalletEvent::AccountsChanged => match serde_json::from_value(payload) {
                Ok(accounts) => Some(Self::AccountsChanged(accounts)),
                Err(e) => {
                    warn!("malformed accountsChanged payload: {e}");
                    None
                }
            },
            WalletEvent::ChainChanged => match payload {
                Value::String(chain) => Some(Self::ChainChanged(chain)),
                other => {
                    warn!("malformed chainChanged payload: {other}");
                    None
                }
            },
            _ => None,
        }
    }
}

/// Processes notifications one at a time. Each gets a generation here, in
/// arrival order, and reconciles on its own task so slow provider calls never
/// hold up the next notification.
#[derive(Clone, xtra::Actor)]
pub(crate) struct SessionActor {
    sync: SessionSynchronizer,
}

impl Handler<Notification> for SessionActor {
    type Return = ();

    async fn handle(&mut self, message: Notification, _ctx: &mut Context<Self>) -> Self::Return {
        let sync = self.sync.clone();
        match message {
            Notification::AccountsChanged(accounts) => {
                let generation = sync.next_account_generation();
                tokio::spawn(async move {
                    sync.reconcile_accounts(generation, accounts).await;
                });
            }
            Notification::ChainChanged(chain) => {
                let generation = sync.next_chain_generation();
                tokio::spawn(async move {
                    sync.reconcile_chain(generation, chain).await;
                });
            }
        }
    }
}

async fn event_loop(
    mut rx: mpsc::UnboundedReceiver<Notification>,
    actor: xtra::Address<SessionActor>,
) {
    info!("started event loop for wallet notifications");
    while let Some(n) = rx.recv().await {
        if actor.send(n).await.is_err() {
            warn!("session actor channel has closed");
            return;
        }
    }
    debug!("wallet notification loop finished");
}

/// Live subscription of a synchronizer to its extension.
///
/// Dropping it removes both listeners, which closes the notification
/// channel and stops the actor.
#[must_use = "dropping a Mount unsubscribes immediately"]
pub struct Mount {
    extension: Extension,
    listeners: Vec<(WalletEvent, ListenerId)>,
}

impl std::fmt::Debug for Mount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Mount")
    }
}

impl Mount {
    /// Explicit unmount; same as dropping.
    pub fn teardown(mut self) {
        self.release();
    }

    fn release(&mut self) {
        for (event, id) in self.listeners.drain(..) {
            if !self.extension.remove_listener(&event, id) {
                warn!("{id} for {event} was already removed");
            }
        }
    }
}

impl Drop for Mount {
    fn drop(&mut self) {
        if !self.listeners.is_empty() {
            debug!("unmounting session");
            self.release();
        }
    }
}

impl SessionSynchronizer {
    /// Subscribe to account and chain changes, then try a silent reconnect.
    ///
    /// Listeners are registered before the reconnect so no switch made while
    /// it runs is lost.
    pub async fn mount(&self) -> Result<Mount> {
        let extension = self.extension()?;
        let (tx, rx) = mpsc::unbounded_channel::<Notification>();
        let actor = xtra::spawn_tokio(
            SessionActor { sync: self.clone() },
            Mailbox::unbounded(),
        );
        tokio::spawn(async move {
            event_loop(rx, actor).await;
        });

        let listeners = WalletEvent::SUBSCRIBED
            .into_iter()
            .map(|event| {
                let tx = tx.clone();
                let listened = event.clone();
                let id = extension.on(
                    event.clone(),
                    Arc::new(move |payload: Value| {
                        if let Some(n) = Notification::parse(&listened, payload) {
                            if tx.send(n).is_err() {
                                warn!("failed to forward {listened} notification");
                            }
                        }
                    }),
                );
                (event, id)
            })
            .collect();
        let mount = Mount {
            extension,
            listeners,
        };
        // errors are already published as notices
        let _ = self.silent_reconnect().await;
        Ok(mount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_notification() {
        assert_eq!(
            Some(Notification::AccountsChanged(vec![])),
            Notification::parse(&WalletEvent::AccountsChanged, json!([]))
        );
        assert_eq!(
            Some(Notification::ChainChanged(String::from("0x1"))),
            Notification::parse(&WalletEvent::ChainChanged, json!("0x1"))
        );
        assert_eq!(
            None,
            Notification::parse(&WalletEvent::AccountsChanged, json!("0xabc"))
        );
        assert_eq!(
            None,
            Notification::parse(&WalletEvent::Connect, json!({}))
        );
    }
}
