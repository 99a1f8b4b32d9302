//! delaybench entry point

use clap::Parser;
use delaybench::cli::{cmd_run, Cli};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "delaybench=info".into()),
        )
        .init();

    let config = Cli::parse().into_config()?;
    cmd_run(&config)?;
    Ok(())
}
