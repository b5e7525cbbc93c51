use clap::{Args, Parser, Subcommand, ValueHint};

#[derive(Debug, Parser)]
#[command(version, about = "Sepolia wallet session and contract dashboard")]
pub struct Cli {
    #[clap(subcommand)]
    pub subcommands: Option<SubCommands>,

    #[arg(long,
    env = "SEPOLIA_CONFIG_PATH",
    value_hint = ValueHint::FilePath,
    value_name = "FILEPATH",
    required = false,
    global = true,
    )]
    pub config: Option<std::path::PathBuf>,

    #[arg(
        long,
        short,
        env = "SEPOLIA_PROFILE",
        global = true,
        value_name = "PROFILE_NAME",
        help = "override default config with this profile name"
    )]
    pub profile: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum SubCommands {
    /// Reconnect without prompting and print the session.
    #[command()]
    Status,

    /// Ask the wallet for accounts and print the session.
    #[command()]
    Connect,

    /// Follow account and network changes until interrupted.
    #[command()]
    Watch,

    #[command(subcommand)]
    Number(StorageCommand),

    #[command(subcommand)]
    Text(StorageCommand),

    Vault(VaultArgs),
}

#[derive(Debug, Subcommand)]
pub enum StorageCommand {
    #[command()]
    Get,

    #[command()]
    Set { value: String },
}

#[derive(Debug, Args)]
pub struct VaultArgs {
    #[command(subcommand)]
    pub command: VaultCommand,
}

#[derive(Debug, Subcommand)]
pub enum VaultCommand {
    #[command()]
    Register { name: String, age: String },

    #[command()]
    Update { name: String },

    /// Deposit ether, e.g. `0.5`.
    #[command()]
    Deposit { amount: String },

    #[command()]
    Withdraw { amount: String },

    /// Sweep the vault to its owner.
    #[command()]
    WithdrawAll,

    #[command()]
    User,

    #[command()]
    Users,

    #[command()]
    Balance,

    #[command()]
    Activity,

    /// Every vault event from all wallets, newest first
    #[command()]
    Events,
}
