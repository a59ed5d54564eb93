//! Parley: drive remote assistant runs to completion with local tools.
//!
//! A [`RunCoordinator`](coordinator::RunCoordinator) sends a message to a
//! remote assistant, polls the resulting run, executes any tools the run asks
//! for, feeds their outputs back, and narrates every step in order before
//! yielding the final reply.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use parley::prelude::*;
//!
//! # async fn example() -> parley::error::Result<()> {
//! let config = ParleyConfig::from_env();
//! let client = Arc::new(AssistantsClient::from_config(&config)?);
//! let assistant = Assistant::new("Helper", "asst_123");
//! let mut conversation = RunCoordinator::new(Participant::User, assistant, client)
//!     .with_config(&config);
//!
//! let reply = conversation
//!     .converse("What's 2+2?")
//!     .for_each_event(|event| println!("{event}"))
//!     .await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod history;
pub mod narration;
pub mod prelude;
pub mod service;
pub mod tools;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
