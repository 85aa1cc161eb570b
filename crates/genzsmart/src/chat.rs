// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `genzsmart chat` command implementation.
//!
//! Sends a single message, or runs a readline session that keeps the
//! conversation history in process for the lifetime of the command.

use std::io::Write;
use std::sync::Arc;

use clap::Args;
use colored::Colorize;
use futures::StreamExt;
use genzsmart_agent::{
    AgentContext, AgentEvent, AgentOrchestrator, AgentResponse, AgentServices, HistoryTurn,
    InMemoryHistory,
};
use genzsmart_config::GenzsmartConfig;
use genzsmart_core::GenzsmartError;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::info;

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Message to send. Omit for an interactive session.
    pub message: Option<String>,

    /// Provider id, overriding `agent.default_provider`.
    #[arg(long)]
    pub provider: Option<String>,

    /// Model, overriding the provider's default.
    #[arg(long)]
    pub model: Option<String>,

    /// Search the web before answering.
    #[arg(long)]
    pub search: bool,

    /// Print tokens as they arrive.
    #[arg(long)]
    pub stream: bool,

    /// Do not inject stored memory into the prompt.
    #[arg(long)]
    pub no_memory: bool,

    /// Replace the configured system prompt.
    #[arg(long)]
    pub system: Option<String>,
}

/// Runs the `genzsmart chat` command.
pub async fn run_chat(config: &GenzsmartConfig, args: ChatArgs) -> Result<(), GenzsmartError> {
    let mut config = config.clone();
    if let Some(provider) = &args.provider {
        config.agent.default_provider = provider.clone();
    }

    let history = Arc::new(InMemoryHistory::new());
    let mut services = AgentServices::from_config(&config).await?;
    services.settings.model = args.model.clone();
    let agent = AgentOrchestrator::new(services.with_history(history.clone()));
    let conversation_id = uuid::Uuid::new_v4().to_string();
    info!(conversation_id = conversation_id.as_str(), "chat session started");

    if let Some(message) = args.message.as_deref() {
        return run_turn(&agent, &history, &conversation_id, message, &args).await;
    }

    let mut rl = DefaultEditor::new()
        .map_err(|e| GenzsmartError::Internal(format!("failed to initialize readline: {e}")))?;
    println!("{}", "genzsmart chat".bold().green());
    println!("Type {} to exit.\n", "/quit".yellow());

    let prompt = format!("{}> ", "you".green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);
                if let Err(e) = run_turn(&agent, &history, &conversation_id, trimmed, &args).await {
                    eprintln!("{}: {e}", "error".red());
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

fn context_for(args: &ChatArgs, conversation_id: &str, message: &str) -> AgentContext {
    let mut ctx = AgentContext::new(message)
        .in_conversation(conversation_id)
        .with_search(args.search)
        .with_memory(!args.no_memory);
    if let Some(system) = &args.system {
        ctx = ctx.with_system_prompt(system.clone());
    }
    ctx
}

/// One exchange: answer `message`, print it, and record both turns.
async fn run_turn(
    agent: &AgentOrchestrator,
    history: &InMemoryHistory,
    conversation_id: &str,
    message: &str,
    args: &ChatArgs,
) -> Result<(), GenzsmartError> {
    let ctx = context_for(args, conversation_id, message);

    let answer = if args.stream {
        stream_answer(agent, &ctx).await?
    } else {
        let response = agent.process_message(&ctx, None).await?;
        print_response(&response);
        response.content
    };

    history.append(conversation_id, HistoryTurn::user(message)).await;
    history
        .append(conversation_id, HistoryTurn::assistant(answer))
        .await;
    Ok(())
}

async fn stream_answer(agent: &AgentOrchestrator, ctx: &AgentContext) -> Result<String, GenzsmartError> {
    let mut events = agent.stream_message(ctx, None).await;
    let mut stdout = std::io::stdout();
    let mut text = String::new();

    while let Some(event) = events.next().await {
        match event {
            AgentEvent::Start { .. } => {}
            AgentEvent::Token { token, .. } => {
                print!("{token}");
                let _ = stdout.flush();
                text.push_str(&token);
            }
            AgentEvent::Done { .. } => println!(),
            AgentEvent::Error { error, .. } => {
                println!();
                return Err(GenzsmartError::provider(error));
            }
        }
    }
    Ok(text)
}

fn print_response(response: &AgentResponse) {
    println!("{}", response.content);
    for call in &response.tool_calls {
        let status = if call.executed { "ok" } else { "failed" };
        println!("{}", format!("[tool {} {status}]", call.tool).dimmed());
    }
    if let Some(search) = &response.search_results {
        println!(
            "{}",
            format!("[{} search results from {}]", search.results.len(), search.provider).dimmed()
        );
    }
    if response.memory_used {
        println!("{}", "[memory used]".dimmed());
    }
}
