mod commands;
mod messages;
mod notifier;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use respawn_core::{RespawnBuilder, RespawnConfig};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::Reply;
use crate::notifier::ConsoleNotifier;

#[derive(Parser)]
#[command(version, about = "Boss respawn timers")]
struct Args {
    /// TOML config file. Built-in roster when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Snapshot file, overrides `state_path` from the config.
    #[arg(short, long)]
    state: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => RespawnConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => RespawnConfig::default(),
    };
    if let Some(state) = args.state {
        config.state_path = state;
    }
    tracing::info!(
        state = %config.state_path.display(),
        bosses = config.bosses.len(),
        "respawn starting"
    );

    let service = RespawnBuilder::from_config(&config)
        .notifier(Arc::new(ConsoleNotifier::new()))
        .start()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("reading stdin")?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                None
            }
        };
        let Some(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match commands::respond(line, &service).await {
            Ok(Reply::Quit) => break,
            Ok(Reply::Text(text)) if text.is_empty() => {}
            Ok(Reply::Text(text)) => println!("{text}"),
            Err(err) => print!("{err}"),
        }
    }

    service.shutdown().await;
    Ok(())
}
