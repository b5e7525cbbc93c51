#![allow(dead_code)]

use sepolia_mesh::domain::{Address, ContractTarget};
use sepolia_mesh::{
    init_tracing, MockExtension, Notice, NoticeLevel, Session, SessionSynchronizer, SyncConfig,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::timeout;

pub(crate) struct TestStuff {
    pub(crate) mock: MockExtension,
    pub(crate) sync: SessionSynchronizer,
}

pub(crate) fn account_a() -> Address {
    Address::repeat_byte(0xaa)
}

pub(crate) fn account_b() -> Address {
    Address::repeat_byte(0xbb)
}

pub(crate) fn vault() -> ContractTarget {
    ContractTarget::vault_registry(Address::repeat_byte(0x77))
}

pub(crate) fn fast_config() -> SyncConfig {
    SyncConfig {
        receipt_poll_ms: 5,
        confirmation_timeout_secs: 5,
        ..Default::default()
    }
}

pub(crate) async fn yield_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// Synchronizer for `target` over `mock`, with the contract deployed.
pub(crate) fn init_test_components(mock: MockExtension, target: ContractTarget) -> TestStuff {
    init_tracing();
    let mock = mock.with_contract(target);
    let sync = SessionSynchronizer::new(Some(Arc::new(mock.clone())), target, fast_config());
    TestStuff { mock, sync }
}

pub(crate) fn storage_components(mock: MockExtension) -> TestStuff {
    init_test_components(mock, ContractTarget::simple_storage())
}

/// Vault owned by account A.
pub(crate) fn vault_components(mock: MockExtension) -> TestStuff {
    init_test_components(mock.with_owner(account_a()), vault())
}

/// Wait until the session satisfies `f`.
pub(crate) async fn wait_for<F>(sync: &SessionSynchronizer, f: F) -> anyhow::Result<Session>
where
    F: Fn(&Session) -> bool,
{
    let mut rx = sync.subscribe();
    let session = timeout(Duration::from_secs(5), rx.wait_for(|s| f(s)))
        .await??
        .clone();
    Ok(session)
}

/// Next notice at `level`, skipping others.
pub(crate) async fn next_notice(
    rx: &mut broadcast::Receiver<Notice>,
    level: NoticeLevel,
) -> anyhow::Result<Notice> {
    let notice = timeout(Duration::from_secs(5), async {
        loop {
            let notice = rx.recv().await?;
            if notice.level == level {
                return Ok::<_, broadcast::error::RecvError>(notice);
            }
        }
    })
    .await??;
    Ok(notice)
}

pub(crate) fn assert_consistent(session: &Session) {
    assert_eq!(
        session.account().is_some(),
        session.contract().is_some(),
        "account and contract out of step: {session}"
    );
    if let (Some(account), Some(contract)) = (session.account(), session.contract()) {
        assert_eq!(account, contract.signer(), "stale signer: {session}");
    }
}
