//! ArkVault CLI
//!
//! Logs go to stderr so that `--json` output on stdout stays machine-readable.
//! Set `RUST_LOG=debug` for more detail.

use clap::Parser;
use vault_cli::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut stdout = std::io::stdout().lock();
    run(cli, &mut stdout).await
}
