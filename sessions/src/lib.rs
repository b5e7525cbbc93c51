mod config;
mod contract;
mod error;
pub mod extension;
mod mirror;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod notice;
mod provider;
mod reactor;
pub mod rpc;
mod state;
mod synchronizer;

pub use config::SyncConfig;
pub use contract::{
    Activity, BoundContract, DecodedLog, PendingTransaction, StorageContract, VaultContract,
    VaultEvent,
};
pub use error::Error;
pub use extension::{HttpExtension, Listener, ListenerId, WalletExtension};
pub use mirror::{Action, Dashboard, ReadState};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockExtension;
pub use notice::{Notice, NoticeLevel};
pub use provider::{ExtensionProvider, ExtensionSigner};
pub use reactor::{Mount, Notification};
pub use sepolia_domain as domain;
pub use state::{Session, SessionState};
use std::sync::{Arc, Mutex, Once};
pub use synchronizer::SessionSynchronizer;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

pub type Result<T> = std::result::Result<T, Error>;
pub type Atomic<T> = Arc<Mutex<T>>;

static INIT: Once = Once::new();

/// Console subscriber for tests and examples, filtered by `RUST_LOG`.
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_target(true)
            .with_level(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    });
}
