pub mod storage;
pub mod vault;

use crate::cli::SubCommands;
use crate::config::AppConfig;
use console::Term;
use sepolia_mesh::domain::{ContractKind, ContractTarget};
use sepolia_mesh::{Dashboard, HttpExtension, Notice, Session, SessionSynchronizer};
use std::io::Write;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

pub struct Context {
    pub sync: SessionSynchronizer,
    pub dashboard: Dashboard,
    pub term: Term,
    extension: HttpExtension,
}

impl Context {
    pub fn new(cfg: &AppConfig, target: ContractTarget) -> anyhow::Result<Self> {
        let extension = HttpExtension::new(cfg.rpc_url()?, cfg.authorized);
        let sync = SessionSynchronizer::new(
            Some(Arc::new(extension.clone())),
            target,
            cfg.sync.clone(),
        );
        tracing::debug!("dashboard for {target} via {}", extension.url());
        Ok(Self {
            sync,
            dashboard: Dashboard::default(),
            term: Term::stdout(),
            extension,
        })
    }

    /// Reuse an earlier authorization, prompting only when there is none.
    pub async fn session(&self) -> anyhow::Result<Session> {
        let session = self.sync.silent_reconnect().await?;
        if session.is_connected() {
            return Ok(session);
        }
        Ok(self.sync.connect().await?)
    }

    pub fn notice(&mut self, notice: &Notice) -> anyhow::Result<()> {
        writeln!(self.term, "{notice}")?;
        Ok(())
    }
}

const fn contract_for(cmd: &SubCommands) -> Option<ContractKind> {
    match cmd {
        SubCommands::Number(_) | SubCommands::Text(_) => Some(ContractKind::SimpleStorage),
        SubCommands::Vault(_) => Some(ContractKind::VaultRegistry),
        SubCommands::Status | SubCommands::Connect | SubCommands::Watch => None,
    }
}

pub async fn run(cmd: SubCommands, cfg: &AppConfig) -> anyhow::Result<()> {
    let target = cfg.target(contract_for(&cmd))?;
    let mut ctx = Context::new(cfg, target)?;
    let result = match cmd {
        SubCommands::Status => status(&mut ctx).await,
        SubCommands::Connect => connect(&mut ctx).await,
        SubCommands::Watch => watch(&mut ctx).await,
        SubCommands::Number(cmd) => storage::number(&mut ctx, cmd).await,
        SubCommands::Text(cmd) => storage::text(&mut ctx, cmd).await,
        SubCommands::Vault(args) => vault::run(&mut ctx, args.command).await,
    };
    // library failures surface as notices, a cancelled prompt is not a failure
    match result {
        Err(e) => match e.downcast_ref::<sepolia_mesh::Error>() {
            Some(err) => {
                ctx.notice(&Notice::from(err))?;
                if err.is_benign() {
                    Ok(())
                } else {
                    Err(e)
                }
            }
            None => Err(e),
        },
        ok => ok,
    }
}

async fn status(ctx: &mut Context) -> anyhow::Result<()> {
    let session = ctx.sync.silent_reconnect().await?;
    writeln!(ctx.term, "{session}")?;
    if !session.is_connected() {
        writeln!(ctx.term, "run `connect` to authorize an account")?;
    }
    Ok(())
}

async fn connect(ctx: &mut Context) -> anyhow::Result<()> {
    let session = ctx.sync.connect().await?;
    writeln!(ctx.term, "{session}")?;
    Ok(())
}

async fn watch(ctx: &mut Context) -> anyhow::Result<()> {
    let mut sessions = ctx.sync.subscribe();
    let mut notices = ctx.sync.notices();
    let watcher = ctx
        .extension
        .spawn_watcher(ctx.sync.config().watcher_poll());
    let mount = ctx.sync.mount().await?;
    writeln!(ctx.term, "{}", ctx.sync.session())?;
    loop {
        tokio::select! {
            changed = sessions.changed() => {
                if changed.is_err() {
                    break;
                }
                let session = sessions.borrow_and_update().clone();
                writeln!(ctx.term, "{session}")?;
            }
            notice = notices.recv() => match notice {
                Ok(notice) => ctx.notice(&notice)?,
                Err(RecvError::Lagged(n)) => tracing::warn!("skipped {n} notices"),
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    mount.teardown();
    watcher.abort();
    Ok(())
}
