//! CLI entry point for Parley.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Talk to a remote assistant from the terminal
#[derive(Parser, Debug)]
#[command(name = "parley", version, about = "Parley: converse with remote assistants")]
pub struct Cli {
    /// TOML config file, overlaid by the environment
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send one message and print the narration
    Chat(ChatArgs),
    /// Print a conversation oldest-first
    History(HistoryArgs),
}

/// Arguments for the `chat` subcommand.
#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// Remote assistant id (e.g. asst_abc123)
    #[arg(short, long)]
    pub assistant: String,

    /// Existing conversation to continue
    #[arg(short, long)]
    pub thread: Option<String>,

    /// Display name of the assistant in narration
    #[arg(short, long, default_value = "Assistant")]
    pub name: String,

    /// Only print the final reply
    #[arg(long)]
    pub quiet: bool,

    /// Give up after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Message to send
    pub message: String,
}

/// Arguments for the `history` subcommand.
#[derive(Parser, Debug)]
pub struct HistoryArgs {
    /// Conversation to print
    #[arg(short, long)]
    pub thread: String,

    /// Maximum number of messages
    #[arg(short, long)]
    pub limit: Option<usize>,
}
