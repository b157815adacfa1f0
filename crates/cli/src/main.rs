mod cli;
mod config;
mod terminal;
mod transcript;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};

use chatwire_core::config::load_dotenv;
use chatwire_core::RequestMetadata;
use chatwire_transport::{
    get_or_create_session_id, ChatClient, FileStore, KeyValueStore, MemoryStore,
};

use crate::cli::CliArgs;
use crate::terminal::{Terminal, SEND_FAILED};
use crate::transcript::Transcript;

fn session_store(args: &CliArgs) -> Box<dyn KeyValueStore> {
    if args.ephemeral {
        return Box::new(MemoryStore::new());
    }
    match args
        .storage
        .as_deref()
        .map(PathBuf::from)
        .or_else(FileStore::default_path)
    {
        Some(path) => Box::new(FileStore::new(path)),
        None => {
            warn!("no durable storage location, session id will not persist");
            Box::new(MemoryStore::new())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with replies.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let args = CliArgs::parse();
    let terminal = Terminal::new();

    let config = config::load(&args).context("failed to load configuration")?;
    config.log_summary();

    if args.show_config {
        let summary = serde_json::to_string_pretty(&config.redacted_summary())
            .context("failed to render config summary")?;
        println!("{}", summary);
        return Ok(());
    }

    let store = session_store(&args);
    let session_id = get_or_create_session_id(store.as_ref(), &config.session_storage_key);

    let metadata = RequestMetadata::new(
        args.path.clone(),
        format!("chatwire-cli/{}", env!("CARGO_PKG_VERSION")),
    );
    let client = ChatClient::new(&config, session_id, metadata);

    terminal.print_banner(client.mode(), client.session_id())?;
    if !config.is_configured() {
        terminal.print_info("No endpoint configured yet; set CHAT_WEBHOOK_URL or CHAT_TRIGGER_URL.")?;
    }

    let mut transcript = Transcript::new();
    if let Some(greeting) = transcript.turns().first() {
        terminal.print_reply(&greeting.content)?;
    }

    // One send at a time: the next line is not read until this one resolves.
    loop {
        let input = match terminal.read_input()? {
            Some(text) => text,
            None => {
                terminal.print_info("Goodbye.")?;
                break;
            }
        };

        if input.is_empty() {
            continue;
        }

        let spinner = terminal.start_spinner("assistant is typing")?;
        let prior = transcript.push_user(input.clone());
        let result = client.send(&input, prior).await;
        spinner.stop();

        match result {
            Ok(reply) => {
                info!(len = reply.len(), "reply received");
                terminal.print_reply(&reply)?;
                transcript.push_assistant(reply);
            }
            Err(e) => {
                error!(error = %e, "send failed");
                terminal.print_system(SEND_FAILED)?;
                terminal.print_error(&e.to_string())?;
            }
        }
    }

    Ok(())
}
