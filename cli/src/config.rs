use {
    config::{Config, File, FileFormat},
    microxdg::XdgApp,
    sepolia_mesh::{
        domain::{Address, ContractKind, ContractTarget},
        SyncConfig,
    },
    serde::Deserialize,
    std::{
        fmt::Display,
        path::{Path, PathBuf},
    },
    url::Url,
};

const APP_NAME: &str = env!("CARGO_BIN_NAME");
const SEPOLIA_RPC: &str = "https://rpc.sepolia.org";

fn default_rpc_url() -> String {
    String::from(SEPOLIA_RPC)
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_rpc_url")]
    rpc_url: String,
    /// Contract the dashboard binds when a command does not pick one.
    #[serde(default)]
    pub contract: ContractKind,
    pub vault_address: Option<Address>,
    /// Treat the page as already authorized (silent reconnect succeeds).
    #[serde(default)]
    pub authorized: bool,
    #[serde(default)]
    pub sync: SyncConfig,
}

impl Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rpc:{} contract:{}", self.rpc_url, self.contract)?;
        if let Some(vault) = self.vault_address {
            write!(f, " vault:{vault}")?;
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            contract: ContractKind::default(),
            vault_address: None,
            authorized: false,
            sync: SyncConfig::default(),
        }
    }
}

fn default_config_file() -> anyhow::Result<PathBuf> {
    config_file("config.toml")
}

fn config_file(name: &str) -> anyhow::Result<PathBuf> {
    let x = XdgApp::new(APP_NAME)?;
    let mut p = x.app_config()?;
    p.push(name);
    Ok(p)
}

impl AppConfig {
    /// Load `cfg` (or the default `config.toml`), then the profile, then `SEPOLIA_*` variables.
    ///
    /// An explicit `--config` must exist; the default file is optional.
    pub fn new(cfg: Option<PathBuf>, profile: Option<String>) -> anyhow::Result<Self> {
        let (cfg, required) = match cfg {
            None => (default_config_file()?, false),
            Some(cfg) => (cfg, true),
        };
        Self::new_with_override(&cfg, required, profile)
    }

    fn new_with_override(
        cfg_default: &Path,
        required: bool,
        cfg_override: Option<String>,
    ) -> anyhow::Result<Self> {
        tracing::debug!("Loading config {}", cfg_default.display());
        let p = format!("{}", cfg_default.display());
        let mut cfg =
            Config::builder().add_source(File::new(&p, FileFormat::Toml).required(required));
        if let Some(profile) = cfg_override {
            let profile_loc = format!("{profile}.toml");
            let profile_loc = config_file(profile_loc.as_str())?;
            tracing::debug!("Loading profile config {}", profile_loc.display());
            cfg = cfg.add_source(
                File::new(&profile_loc.display().to_string(), FileFormat::Toml).required(true),
            );
        }
        cfg = cfg.add_source(
            config::Environment::with_prefix("SEPOLIA")
                .separator("__")
                .try_parsing(true),
        );
        let conf: Self = cfg.build()?.try_deserialize()?;
        Ok(conf)
    }

    pub fn rpc_url(&self) -> anyhow::Result<Url> {
        Ok(Url::parse(&self.rpc_url)?)
    }

    /// Resolve the contract for `kind`, falling back to the configured default.
    pub fn target(&self, kind: Option<ContractKind>) -> anyhow::Result<ContractTarget> {
        match kind.unwrap_or(self.contract) {
            ContractKind::SimpleStorage => Ok(ContractTarget::simple_storage()),
            ContractKind::VaultRegistry => self
                .vault_address
                .map(ContractTarget::vault_registry)
                .ok_or_else(|| anyhow::anyhow!("vault_address is not configured")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_load_file() -> anyhow::Result<()> {
        let path = std::env::temp_dir().join(format!("sepolia-cli-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path)?;
        writeln!(file, "rpc_url = \"http://localhost:8545/\"")?;
        writeln!(file, "contract = \"vault-registry\"")?;
        writeln!(
            file,
            "vault_address = \"0x7777777777777777777777777777777777777777\""
        )?;
        writeln!(file, "[sync]\nreceipt_poll_ms = 50")?;
        drop(file);

        let cfg = AppConfig::new(Some(path.clone()), None)?;
        std::fs::remove_file(path)?;
        assert_eq!("http://localhost:8545/", cfg.rpc_url()?.as_str());
        assert_eq!(ContractKind::VaultRegistry, cfg.contract);
        assert_eq!(50, cfg.sync.receipt_poll_ms);
        assert_eq!(
            ContractTarget::vault_registry(Address::repeat_byte(0x77)),
            cfg.target(None)?
        );
        assert_eq!(
            ContractTarget::simple_storage(),
            cfg.target(Some(ContractKind::SimpleStorage))?
        );
        Ok(())
    }

    #[test]
    fn test_missing_vault() -> anyhow::Result<()> {
        let cfg = AppConfig::default();
        assert_eq!("https://rpc.sepolia.org/", cfg.rpc_url()?.as_str());
        assert_eq!(ContractKind::SimpleStorage, cfg.contract);
        assert_matches!(cfg.target(Some(ContractKind::VaultRegistry)), Err(_));
        Ok(())
    }

    #[test]
    fn test_explicit_file_required() {
        let missing = std::env::temp_dir().join("sepolia-cli-does-not-exist.toml");
        assert!(AppConfig::new(Some(missing), None).is_err());
    }
}
