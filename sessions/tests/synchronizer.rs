mod test_utils;

use assert_matches::assert_matches;
use sepolia_mesh::domain::{ChainId, ContractTarget, EthMethod, WalletEvent, MAINNET, SEPOLIA};
use sepolia_mesh::{
    Error, MockExtension, NoticeLevel, SessionState, SessionSynchronizer, WalletExtension,
};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use test_utils::*;

#[tokio::test]
async fn test_silent_reconnect_authorized() -> anyhow::Result<()> {
    let t = storage_components(MockExtension::new().with_authorized(vec![account_a()]));
    let mount = t.sync.mount().await?;
    let session = t.sync.session();
    assert_consistent(&session);
    assert_matches!(session.state(), SessionState::Connected { account, chain_id, .. } => {
        assert_eq!(account_a(), account);
        assert_eq!(Some(SEPOLIA), chain_id);
    });
    assert_eq!(Some("sepolia"), session.chain_name());
    assert_eq!(0, t.mock.request_count(&EthMethod::RequestAccounts));
    mount.teardown();
    Ok(())
}

#[tokio::test]
async fn test_silent_reconnect_unauthorized() -> anyhow::Result<()> {
    let t = storage_components(MockExtension::new().with_accounts(vec![account_a()]));
    let session = t.sync.silent_reconnect().await?;
    assert_eq!(SessionState::Disconnected, session.state());
    assert_eq!(None, session.chain_id());
    assert_eq!(0, t.mock.request_count(&EthMethod::RequestAccounts));
    assert_eq!(1, t.mock.request_count(&EthMethod::Accounts));

    // repeatable without side effects
    let again = t.sync.silent_reconnect().await?;
    assert_eq!(session, again);
    assert_eq!(0, t.mock.request_count(&EthMethod::RequestAccounts));
    Ok(())
}

#[tokio::test]
async fn test_connect() -> anyhow::Result<()> {
    let t = storage_components(MockExtension::new().with_accounts(vec![account_a(), account_b()]));
    let session = t.sync.connect().await?;
    assert_consistent(&session);
    assert_eq!(Some(account_a()), session.account());
    assert_eq!(Some(SEPOLIA), session.chain_id());
    let contract = session.contract().expect("bound contract");
    assert_eq!(ContractTarget::simple_storage(), contract.target());
    assert_eq!(None, session.owner());
    assert!(!t.sync.is_owner());
    assert_eq!(1, t.mock.request_count(&EthMethod::RequestAccounts));
    Ok(())
}

#[tokio::test]
async fn test_connect_rejected() -> anyhow::Result<()> {
    let t = storage_components(MockExtension::new().with_accounts(vec![account_a()]));
    let mut notices = t.sync.notices();
    t.mock.reject_prompts(true);
    assert_matches!(t.sync.connect().await, Err(Error::UserRejected));
    assert_eq!(SessionState::Disconnected, t.sync.session().state());
    let notice = next_notice(&mut notices, NoticeLevel::Benign).await?;
    assert!(notice.message.contains("cancelled"));
    Ok(())
}

#[tokio::test]
async fn test_connect_without_extension() -> anyhow::Result<()> {
    sepolia_mesh::init_tracing();
    let sync = SessionSynchronizer::new(None, ContractTarget::simple_storage(), fast_config());
    let mut notices = sync.notices();
    assert_matches!(sync.connect().await, Err(Error::WalletUnavailable));
    next_notice(&mut notices, NoticeLevel::Error).await?;
    assert_eq!(SessionState::Disconnected, sync.session().state());

    // nothing to reconnect to, and nothing to mount on
    assert!(sync.silent_reconnect().await?.account().is_none());
    assert_matches!(sync.mount().await, Err(Error::WalletUnavailable));
    Ok(())
}

#[tokio::test]
async fn test_connect_failure_keeps_session() -> anyhow::Result<()> {
    let t = storage_components(MockExtension::new().with_accounts(vec![account_a()]));
    let before = t.sync.connect().await?;
    t.mock.fail(EthMethod::ChainId);
    assert_matches!(t.sync.connect().await, Err(Error::ConnectionFailure(_)));
    let after = t.sync.session();
    assert_eq!(before, after);
    assert_consistent(&after);
    Ok(())
}

#[tokio::test]
async fn test_connect_no_accounts() -> anyhow::Result<()> {
    let t = storage_components(MockExtension::new());
    assert_matches!(t.sync.connect().await, Err(Error::ConnectionFailure(_)));
    assert!(!t.sync.session().is_connected());
    Ok(())
}

#[tokio::test]
async fn test_accounts_changed_empty_disconnects() -> anyhow::Result<()> {
    let t = storage_components(MockExtension::new().with_authorized(vec![account_a()]));
    let _mount = t.sync.mount().await?;
    assert!(t.sync.session().is_connected());

    t.mock.switch_accounts(vec![]);
    let session = wait_for(&t.sync, |s| !s.is_connected()).await?;
    assert_eq!(SessionState::Disconnected, session.state());
    assert!(session.contract().is_none());
    assert!(session.owner().is_none());
    // chain fields are independent of the account
    assert_eq!(Some(SEPOLIA), session.chain_id());
    Ok(())
}

#[tokio::test]
async fn test_accounts_changed_rebinds() -> anyhow::Result<()> {
    let t = vault_components(MockExtension::new().with_authorized(vec![account_a()]));
    let _mount = t.sync.mount().await?;
    let first = t.sync.session();
    assert!(t.sync.is_owner());

    t.mock.switch_accounts(vec![account_b(), account_a()]);
    let session = wait_for(&t.sync, |s| s.account() == Some(account_b())).await?;
    assert_consistent(&session);
    let rebound = session.contract().expect("bound contract");
    assert_eq!(account_b(), rebound.signer());
    assert_ne!(first.contract().map(|c| c.binding()), Some(rebound.binding()));
    assert_eq!(Some(account_a()), session.owner());
    assert!(!session.is_owner());
    Ok(())
}

#[tokio::test]
async fn test_latest_accounts_win() -> anyhow::Result<()> {
    let t = vault_components(MockExtension::new().with_authorized(vec![account_a()]));
    let _mount = t.sync.mount().await?;
    t.mock.switch_accounts(vec![]);
    wait_for(&t.sync, |s| !s.is_connected()).await?;

    // A's owner read is slow, B's is not
    t.mock.delay_calls_from(account_a(), Duration::from_millis(300));
    t.mock.switch_accounts(vec![account_a()]);
    t.mock.switch_accounts(vec![account_b()]);

    let session = wait_for(&t.sync, |s| s.account() == Some(account_b())).await?;
    assert_consistent(&session);
    yield_ms(600).await;
    let session = t.sync.session();
    assert_eq!(Some(account_b()), session.account());
    assert_eq!(Some(account_b()), session.contract().map(|c| c.signer()));
    assert_consistent(&session);
    Ok(())
}

/// Pending B switch with a slow owner read, then a wallet call fails.
async fn switch_to_b_then_fail(t: &TestStuff, method: EthMethod) {
    t.mock.delay_calls_from(account_b(), Duration::from_millis(300));
    t.mock.switch_accounts(vec![account_b()]);
    yield_ms(20).await;
    t.mock.fail(method);
}

#[tokio::test]
async fn test_failed_connect_keeps_pending_switch() -> anyhow::Result<()> {
    let t = vault_components(MockExtension::new().with_authorized(vec![account_a()]));
    let _mount = t.sync.mount().await?;
    assert_eq!(Some(account_a()), t.sync.session().account());

    switch_to_b_then_fail(&t, EthMethod::RequestAccounts).await;
    assert_matches!(t.sync.connect().await, Err(Error::ConnectionFailure(_)));

    wait_for(&t.sync, |s| s.account() == Some(account_b())).await?;
    yield_ms(500).await;
    let session = t.sync.session();
    assert_eq!(Some(account_b()), session.account());
    assert_eq!(Some(account_b()), session.contract().map(|c| c.signer()));
    assert_consistent(&session);
    Ok(())
}

#[tokio::test]
async fn test_failed_silent_reconnect_keeps_pending_switch() -> anyhow::Result<()> {
    let t = vault_components(MockExtension::new().with_authorized(vec![account_a()]));
    let _mount = t.sync.mount().await?;

    switch_to_b_then_fail(&t, EthMethod::Accounts).await;
    assert_matches!(
        t.sync.silent_reconnect().await,
        Err(Error::ConnectionFailure(_))
    );

    wait_for(&t.sync, |s| s.account() == Some(account_b())).await?;
    yield_ms(500).await;
    let session = t.sync.session();
    assert_eq!(Some(account_b()), session.account());
    assert_eq!(Some(account_b()), session.contract().map(|c| c.signer()));
    assert_consistent(&session);
    Ok(())
}

#[tokio::test]
async fn test_latest_chain_wins() -> anyhow::Result<()> {
    let t = storage_components(
        MockExtension::new()
            .with_authorized(vec![account_a()])
            .with_chain(ChainId::new(17000)),
    );
    let _mount = t.sync.mount().await?;
    assert_eq!(Some(ChainId::new(17000)), t.sync.session().chain_id());

    // the first notification's chain lookup is slow, the second is not
    t.mock.delay_next(EthMethod::ChainId, Duration::from_millis(300));
    t.mock.emit(&WalletEvent::ChainChanged, &json!("0x1"));
    yield_ms(20).await;
    t.mock.emit(&WalletEvent::ChainChanged, &json!("0xaa36a7"));

    wait_for(&t.sync, |s| s.chain_id() == Some(SEPOLIA)).await?;
    yield_ms(500).await;
    let session = t.sync.session();
    assert_eq!(Some(SEPOLIA), session.chain_id());
    assert_eq!(Some(11_155_111), session.chain_id().map(|c| c.id()));
    assert_eq!(Some("sepolia"), session.chain_name());
    assert_eq!(Some(account_a()), session.account());
    Ok(())
}

#[tokio::test]
async fn test_every_committed_state_is_consistent() -> anyhow::Result<()> {
    let t = vault_components(MockExtension::new().with_authorized(vec![account_a()]));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut rx = t.sync.subscribe();
    let collector = {
        let seen = seen.clone();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let session = rx.borrow_and_update().clone();
                seen.lock().expect("lock").push(session);
            }
        })
    };
    let _mount = t.sync.mount().await?;
    t.mock.switch_accounts(vec![account_b()]);
    t.mock.switch_chain(MAINNET);
    t.mock.switch_accounts(vec![]);
    t.mock.switch_accounts(vec![account_a()]);
    wait_for(&t.sync, |s| {
        s.account() == Some(account_a()) && s.chain_id() == Some(MAINNET)
    })
    .await?;
    yield_ms(200).await;
    collector.abort();

    let seen = seen.lock().expect("lock");
    assert!(!seen.is_empty());
    for session in seen.iter() {
        assert_consistent(session);
    }
    Ok(())
}

#[tokio::test]
async fn test_chain_changed_keeps_binding() -> anyhow::Result<()> {
    let t = storage_components(MockExtension::new().with_accounts(vec![account_a()]));
    let _mount = t.sync.mount().await?;
    let connected = t.sync.connect().await?;
    let binding = connected.contract().map(|c| c.binding());

    t.mock.emit(&WalletEvent::ChainChanged, &json!("0xaa36a7"));
    yield_ms(50).await;
    let session = wait_for(&t.sync, |s| s.chain_id() == Some(SEPOLIA)).await?;
    assert_eq!(Some(account_a()), session.account());
    assert_eq!(binding, session.contract().map(|c| c.binding()));

    let mut notices = t.sync.notices();
    t.mock.switch_chain(MAINNET);
    let session = wait_for(&t.sync, |s| s.chain_id() == Some(MAINNET)).await?;
    assert_eq!(Some("mainnet"), session.chain_name());
    assert_eq!(Some(account_a()), session.account());
    assert_eq!(binding, session.contract().map(|c| c.binding()));
    let warning = next_notice(&mut notices, NoticeLevel::Warning).await?;
    assert!(warning.message.contains("sepolia"));
    Ok(())
}

#[tokio::test]
async fn test_chain_changed_while_disconnected() -> anyhow::Result<()> {
    let t = storage_components(MockExtension::new());
    let _mount = t.sync.mount().await?;
    t.mock.switch_chain(ChainId::new(17000));
    let session = wait_for(&t.sync, |s| s.chain_id() == Some(ChainId::new(17000))).await?;
    assert!(!session.is_connected());
    assert_eq!(Some("holesky"), session.chain_name());
    Ok(())
}

#[tokio::test]
async fn test_malformed_chain_ignored() -> anyhow::Result<()> {
    let t = storage_components(MockExtension::new().with_accounts(vec![account_a()]));
    let before = t.sync.connect().await?;
    let mut notices = t.sync.notices();
    t.sync.on_chain_changed(String::from("0xnothex")).await;
    next_notice(&mut notices, NoticeLevel::Error).await?;
    assert_eq!(before, t.sync.session());
    Ok(())
}

#[tokio::test]
async fn test_mount_teardown_restores_listeners() -> anyhow::Result<()> {
    let t = storage_components(MockExtension::new().with_authorized(vec![account_a()]));
    let accounts = WalletEvent::AccountsChanged;
    let chain = WalletEvent::ChainChanged;
    let before = (
        t.mock.listener_count(&accounts),
        t.mock.listener_count(&chain),
    );
    for i in 0..5 {
        let mount = t.sync.mount().await?;
        assert_eq!(before.0 + 1, t.mock.listener_count(&accounts));
        assert_eq!(before.1 + 1, t.mock.listener_count(&chain));
        if i % 2 == 0 {
            mount.teardown();
        } else {
            drop(mount);
        }
        assert_eq!(
            before,
            (
                t.mock.listener_count(&accounts),
                t.mock.listener_count(&chain)
            )
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_unmounted_ignores_notifications() -> anyhow::Result<()> {
    let t = storage_components(MockExtension::new().with_authorized(vec![account_a()]));
    let mount = t.sync.mount().await?;
    mount.teardown();
    t.mock.switch_accounts(vec![]);
    yield_ms(50).await;
    assert_eq!(Some(account_a()), t.sync.session().account());
    Ok(())
}

#[tokio::test]
async fn test_disconnect_is_local() -> anyhow::Result<()> {
    let t = storage_components(MockExtension::new().with_authorized(vec![account_a()]));
    let _mount = t.sync.mount().await?;
    t.sync.disconnect();
    let session = t.sync.session();
    assert!(!session.is_connected());
    assert_consistent(&session);

    // the extension still remembers the page
    let session = t.sync.silent_reconnect().await?;
    assert_eq!(Some(account_a()), session.account());
    Ok(())
}
