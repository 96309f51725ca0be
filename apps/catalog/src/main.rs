mod commands;
mod render;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use client_core::{config, CatalogSession, HttpRemoteStore, SessionError, SessionEvent};
use commands::{parse_command, Command, HELP};
use render::{render_failure, render_snapshot};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    /// API root; `/products` is appended. Overrides catalog.toml and environment.
    #[arg(long)]
    api_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings();
    if let Some(api_url) = args.api_url {
        settings.api_url = api_url;
    }
    let store = HttpRemoteStore::new(&settings.api_url)?;
    tracing::info!(api_url = %store.base_url(), "catalog: starting");
    let session = CatalogSession::new(Arc::new(store));

    let renderer = tokio::spawn(render_events(BroadcastStream::new(session.subscribe())));

    println!("Product catalog at {}. Type 'help' for commands.", settings.api_url);
    // A failed load is already reported through the event stream.
    let _ = session.initialize().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        match command {
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::List => print!("{}", render_snapshot(&session.snapshot().await)),
            Command::Intent(intent) => match session.dispatch(intent).await {
                Ok(()) | Err(SessionError::Network(_)) => {}
                Err(err) => println!("{err}"),
            },
        }
    }

    drop(session);
    let _ = renderer.await;
    Ok(())
}

async fn render_events(mut events: BroadcastStream<SessionEvent>) {
    while let Some(event) = events.next().await {
        match event {
            Ok(SessionEvent::StateChanged(snapshot)) => print!("{}", render_snapshot(&snapshot)),
            Ok(SessionEvent::IntentFailed { intent, error }) => {
                println!("{}", render_failure(intent, &error))
            }
            Err(err) => tracing::warn!(%err, "catalog: renderer fell behind"),
        }
    }
}
