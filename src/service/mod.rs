//! Remote conversation and run services.
//!
//! The coordinator only talks to these traits. [`openai::AssistantsClient`]
//! implements both over HTTP; tests substitute in-memory fakes.

pub mod http;
pub mod openai;

pub use openai::AssistantsClient;

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::types::{LogMessage, MessageOrder, NewMessage, Run, ToolOutputSubmission};

/// Append-only conversation log.
#[async_trait]
pub trait ConversationService: Send + Sync {
    /// Create an empty conversation and return its remote id.
    async fn create_conversation(&self) -> Result<String, ParleyError>;

    /// Confirm a conversation exists, returning its remote id.
    async fn retrieve_conversation(&self, conversation_id: &str) -> Result<String, ParleyError>;

    async fn append_message(
        &self,
        conversation_id: &str,
        message: NewMessage,
    ) -> Result<LogMessage, ParleyError>;

    async fn list_messages(
        &self,
        conversation_id: &str,
        order: MessageOrder,
        limit: usize,
    ) -> Result<Vec<LogMessage>, ParleyError>;
}

/// Remote reasoning runs over a conversation.
#[async_trait]
pub trait RunService: Send + Sync {
    async fn create_run(&self, conversation_id: &str, assistant_id: &str) -> Result<Run, ParleyError>;

    async fn retrieve_run(&self, conversation_id: &str, run_id: &str) -> Result<Run, ParleyError>;

    /// Answer a `requires_action` pause. Returns the resumed run.
    async fn submit_tool_outputs(
        &self,
        conversation_id: &str,
        run_id: &str,
        outputs: Vec<ToolOutputSubmission>,
    ) -> Result<Run, ParleyError>;

    /// Ask the service to stop an active run. Returns the run, usually in
    /// `cancelling`.
    async fn cancel_run(&self, conversation_id: &str, run_id: &str) -> Result<Run, ParleyError>;
}
