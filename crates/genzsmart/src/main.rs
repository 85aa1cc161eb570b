// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! GenzSmart - an LLM conversation orchestrator.
//!
//! This is the binary entry point: a thin manual driver over the agent,
//! search and memory crates.

mod chat;
mod memory;
mod models;
mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use genzsmart_config::GenzsmartConfig;

/// GenzSmart - chat with any configured model, backed by search, memory and tools.
#[derive(Parser, Debug)]
#[command(name = "genzsmart", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Send one message, or start an interactive session when none is given.
    Chat(chat::ChatArgs),
    /// Run a web search.
    Search(search::SearchArgs),
    /// List providers and their models.
    Models(models::ModelsArgs),
    /// Inspect and maintain stored memory facts.
    Memory(memory::MemoryArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => genzsmart_config::load_and_validate_path(path),
        None => genzsmart_config::load_and_validate(),
    };
    let config: GenzsmartConfig = match loaded {
        Ok(config) => config,
        Err(errors) => {
            genzsmart_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Some(Commands::Chat(args)) => chat::run_chat(&config, args).await,
        Some(Commands::Search(args)) => search::run_search(&config, args).await,
        Some(Commands::Models(args)) => models::run_models(args),
        Some(Commands::Memory(args)) => memory::run_memory(&config, args).await,
        None => {
            println!("genzsmart: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber. `RUST_LOG` wins over `log_level`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("genzsmart={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
