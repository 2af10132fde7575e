//! pdfdeck - Arrange and merge PDF pages interactively.
//!
//! Takes no arguments. Settings are read from the JSON file named by
//! `PDFDECK_CONFIG`; diagnostics are controlled by `RUST_LOG`.

use anyhow::{Context, Result};
use std::io;

use pdfdeck::config::Config;
use pdfdeck::shell::Shell;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = Config::discover().context("Failed to load configuration")?;
    log::debug!("{} v{} starting with {config:?}", pdfdeck::NAME, pdfdeck::VERSION);

    let stdin = io::stdin();
    let mut shell = Shell::new(&config, stdin.lock());
    shell.run().await?;

    Ok(())
}
