use microxdg::XdgApp;
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log to `<data dir>/sepolia-cli/<crate>.log`, filtered by `RUST_LOG`.
pub fn initialize_logging() -> anyhow::Result<()> {
    let directory = XdgApp::new(env!("CARGO_PKG_NAME"))?.app_data()?;
    std::fs::create_dir_all(&directory)?;
    let log_path = directory.join(format!("{}.log", env!("CARGO_CRATE_NAME")));
    let log_file = std::fs::File::create(log_path)?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var(
            "RUST_LOG",
            format!(
                "{}=debug,sepolia_mesh=debug,sepolia_domain=info",
                env!("CARGO_CRATE_NAME")
            ),
        );
    }
    let file_subscriber = tracing_subscriber::fmt::layer()
        .with_file(false)
        .with_line_number(false)
        .with_writer(log_file)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(false)
        .with_filter(EnvFilter::from_default_env());
    tracing_subscriber::registry()
        .with(file_subscriber)
        .with(ErrorLayer::default())
        .init();
    Ok(())
}
