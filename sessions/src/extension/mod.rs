//! The injected wallet capability.
//!
//! Shaped after EIP-1193: one `request` entry point plus an event emitter.
//! Listener callbacks are synchronous and must not block; the synchronizer's
//! listeners only push into a channel.
mod http;

use async_trait::async_trait;
use dashmap::DashMap;
use derive_more::Display;
pub use http::HttpExtension;
use sepolia_domain::{EthMethod, ProviderRpcError, WalletEvent};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

pub type Listener = Arc<dyn Fn(Value) + Send + Sync>;

pub type Extension = Arc<dyn WalletExtension>;

#[derive(Debug, Display, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("listener-{_0}")]
pub struct ListenerId(u64);

#[async_trait]
pub trait WalletExtension: Send + Sync + 'static {
    /// Issue a JSON-RPC request. May suspend on a user prompt.
    async fn request(&self, method: EthMethod, params: Value) -> Result<Value, ProviderRpcError>;

    fn on(&self, event: WalletEvent, listener: Listener) -> ListenerId;

    /// Returns false if `id` was not registered for `event`.
    fn remove_listener(&self, event: &WalletEvent, id: ListenerId) -> bool;

    fn listener_count(&self, event: &WalletEvent) -> usize;
}

/// Listener bookkeeping shared by the extension implementations.
#[derive(Default)]
pub struct Listeners {
    next: AtomicU64,
    registered: DashMap<WalletEvent, Vec<(ListenerId, Listener)>>,
}

impl Listeners {
    pub fn add(&self, event: WalletEvent, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next.fetch_add(1, Ordering::Relaxed));
        trace!("adding {id} for {event}");
        self.registered
            .entry(event)
            .or_default()
            .push((id, listener));
        id
    }

    pub fn remove(&self, event: &WalletEvent, id: ListenerId) -> bool {
        let Some(mut listeners) = self.registered.get_mut(event) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        before != listeners.len()
    }

    pub fn count(&self, event: &WalletEvent) -> usize {
        self.registered.get(event).map_or(0, |l| l.len())
    }

    /// Invoke every listener of `event` with `payload`.
    pub fn emit(&self, event: &WalletEvent, payload: &Value) {
        // snapshot first, a listener may touch the registry
        let listeners: Vec<Listener> = self
            .registered
            .get(event)
            .map(|l| l.iter().map(|(_, f)| Arc::clone(f)).collect())
            .unwrap_or_default();
        trace!("emit {event} to {} listener(s)", listeners.len());
        for listener in listeners {
            listener(payload.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_listeners() {
        let listeners = Listeners::default();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let id = listeners.add(
            WalletEvent::ChainChanged,
            Arc::new(move |_: Value| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        assert_eq!(1, listeners.count(&WalletEvent::ChainChanged));
        assert_eq!(0, listeners.count(&WalletEvent::AccountsChanged));

        listeners.emit(&WalletEvent::ChainChanged, &json!("0x1"));
        listeners.emit(&WalletEvent::AccountsChanged, &json!([]));
        assert_eq!(1, hits.load(Ordering::SeqCst));

        assert!(!listeners.remove(&WalletEvent::AccountsChanged, id));
        assert!(listeners.remove(&WalletEvent::ChainChanged, id));
        assert!(!listeners.remove(&WalletEvent::ChainChanged, id));
        assert_eq!(0, listeners.count(&WalletEvent::ChainChanged));
    }
}
