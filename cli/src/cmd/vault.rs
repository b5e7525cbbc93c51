use super::Context;
use crate::cli::VaultCommand;
use alloy_primitives::utils::format_ether;
use sepolia_mesh::domain::contracts::VaultRegistry;
use sepolia_mesh::domain::shorten_address;
use sepolia_mesh::Action;
use std::io::Write;

fn action(cmd: &VaultCommand) -> Option<Action> {
    match cmd {
        VaultCommand::Register { .. } => Some(Action::Register),
        VaultCommand::Update { .. } => Some(Action::UpdateUser),
        VaultCommand::Deposit { .. } => Some(Action::Deposit),
        VaultCommand::Withdraw { .. } => Some(Action::Withdraw),
        VaultCommand::WithdrawAll => Some(Action::WithdrawAll),
        _ => None,
    }
}

fn user_line(user: &VaultRegistry::User) -> String {
    format!(
        "{} {} age {} balance {} ETH",
        shorten_address(&user.wallet),
        user.name,
        user.age,
        format_ether(user.balance)
    )
}

pub async fn run(ctx: &mut Context, cmd: VaultCommand) -> anyhow::Result<()> {
    let session = ctx.session().await?;
    let submitted = action(&cmd);
    match cmd {
        VaultCommand::Register { name, age } => {
            ctx.dashboard.register(&session, &name, &age).await?;
        }
        VaultCommand::Update { name } => {
            ctx.dashboard.update_user(&session, &name).await?;
        }
        VaultCommand::Deposit { amount } => {
            ctx.dashboard.deposit(&session, &amount).await?;
        }
        VaultCommand::Withdraw { amount } => {
            ctx.dashboard.withdraw(&session, &amount).await?;
        }
        VaultCommand::WithdrawAll => {
            ctx.dashboard.withdraw_all_to_owner(&session).await?;
        }
        VaultCommand::User => {
            let user = ctx.dashboard.load_user(&session).await?;
            writeln!(ctx.term, "{}", user_line(&user))?;
            return Ok(());
        }
        VaultCommand::Users => {
            let users = ctx.dashboard.load_users(&session).await?;
            if users.is_empty() {
                writeln!(ctx.term, "no registered users")?;
            }
            for user in &users {
                writeln!(ctx.term, "{}", user_line(user))?;
            }
            return Ok(());
        }
        VaultCommand::Balance => {}
        VaultCommand::Activity => {
            let activity = ctx.dashboard.load_activity(&session).await?;
            if activity.is_empty() {
                writeln!(ctx.term, "no activity")?;
            }
            for entry in &activity {
                writeln!(ctx.term, "{entry}")?;
            }
            return Ok(());
        }
        VaultCommand::Events => {
            let history = ctx.dashboard.load_history(&session).await?;
            if history.is_empty() {
                writeln!(ctx.term, "no vault events")?;
            }
            for event in &history {
                writeln!(ctx.term, "{event}")?;
            }
            return Ok(());
        }
    }
    if let Some(hash) = submitted.and_then(|a| ctx.dashboard.last_transaction(a)) {
        writeln!(ctx.term, "tx {hash}")?;
    }
    let balance = ctx.dashboard.load_balance(&session).await?;
    writeln!(ctx.term, "vault balance: {} ETH", format_ether(balance))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sepolia_mesh::domain::{Address, U256};

    #[test]
    fn test_user_line() {
        let user = VaultRegistry::User {
            name: String::from("alice"),
            age: U256::from(30),
            wallet: Address::repeat_byte(0xaa),
            balance: U256::from(1_500_000_000_000_000_000u64),
        };
        let line = user_line(&user);
        assert!(line.contains("alice age 30"));
        assert!(line.contains("balance 1.5"));
    }

    #[test]
    fn test_reads_submit_nothing() {
        assert_eq!(None, action(&VaultCommand::Balance));
        assert_eq!(None, action(&VaultCommand::Events));
        assert_eq!(Some(Action::WithdrawAll), action(&VaultCommand::WithdrawAll));
    }
}
