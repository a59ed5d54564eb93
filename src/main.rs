//! Parley CLI binary entry point.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use parley::cli::{ChatArgs, Cli, Commands, HistoryArgs};
use parley::config::ParleyConfig;
use parley::coordinator::{ConverseRequest, RunCoordinator};
use parley::error::ParleyError;
use parley::history::ConversationLog;
use parley::narration::{NarrationEvent, NarrationKind};
use parley::service::AssistantsClient;
use parley::types::{Assistant, Participant};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match load_config(cli.config.as_deref()) {
        Ok(config) => match cli.command {
            Commands::Chat(args) => handle_chat(&config, args).await,
            Commands::History(args) => handle_history(&config, args).await,
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        if let Some(hint) = e.recovery_suggestion().hint() {
            eprintln!("hint: {hint}");
        }
        std::process::exit(1);
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<ParleyConfig, ParleyError> {
    match path {
        Some(path) => ParleyConfig::load(path),
        None => Ok(ParleyConfig::from_env()),
    }
}

async fn handle_chat(config: &ParleyConfig, args: ChatArgs) -> Result<(), ParleyError> {
    let client = Arc::new(AssistantsClient::from_config(config)?);
    let assistant = Assistant::new(args.name, args.assistant);
    let mut coordinator =
        RunCoordinator::new(Participant::User, assistant, client).with_config(config);
    if let Some(thread) = args.thread {
        coordinator = coordinator.resume(thread);
    }

    let request = ConverseRequest::builder()
        .message(args.message)
        .stream(!args.quiet)
        .maybe_deadline(args.timeout.map(Duration::from_secs))
        .build();

    let reply = coordinator
        .converse(request)
        .for_each_event(print_event)
        .await?;
    if args.quiet {
        println!("{reply}");
    }

    if let Some(thread) = coordinator.remote_id() {
        eprintln!("thread: {thread}");
    }
    Ok(())
}

fn print_event(event: NarrationEvent) {
    match event.kind {
        NarrationKind::Text => println!("{}: {}", event.sender, event.content),
        NarrationKind::FunctionCall => eprintln!("  -> {}", event.content),
        NarrationKind::FunctionOutput => {
            eprintln!("  <- {}: {}", event.sender, truncate(&event.content, 200))
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

async fn handle_history(config: &ParleyConfig, args: HistoryArgs) -> Result<(), ParleyError> {
    let client = Arc::new(AssistantsClient::from_config(config)?);
    let log = ConversationLog::new(client, Some(args.thread))
        .with_limit(args.limit.unwrap_or(config.history_limit));
    for entry in log.history().await? {
        println!("{}: {}", entry.role, entry.content);
    }
    Ok(())
}
