use super::Context;
use crate::cli::StorageCommand;
use sepolia_mesh::Action;
use std::io::Write;

pub async fn number(ctx: &mut Context, cmd: StorageCommand) -> anyhow::Result<()> {
    let session = ctx.session().await?;
    match cmd {
        StorageCommand::Get => {
            ctx.dashboard.refresh_number(&session).await?;
        }
        StorageCommand::Set { value } => {
            ctx.dashboard.set_number(&session, &value).await?;
            if let Some(hash) = ctx.dashboard.last_transaction(Action::SetNumber) {
                writeln!(ctx.term, "tx {hash}")?;
            }
        }
    }
    writeln!(ctx.term, "number: {}", ctx.dashboard.number)?;
    Ok(())
}

pub async fn text(ctx: &mut Context, cmd: StorageCommand) -> anyhow::Result<()> {
    let session = ctx.session().await?;
    match cmd {
        StorageCommand::Get => {
            ctx.dashboard.refresh_text(&session).await?;
        }
        StorageCommand::Set { value } => {
            ctx.dashboard.set_text(&session, &value).await?;
            if let Some(hash) = ctx.dashboard.last_transaction(Action::SetText) {
                writeln!(ctx.term, "tx {hash}")?;
            }
        }
    }
    writeln!(ctx.term, "text: {}", ctx.dashboard.text)?;
    Ok(())
}
