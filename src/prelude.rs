//! Convenience re-exports for common use.

pub use crate::config::ParleyConfig;
pub use crate::coordinator::{ConverseItem, ConverseRequest, ConverseStream, RunCoordinator};
pub use crate::error::{ParleyError, Result};
pub use crate::history::HistoryEntry;
pub use crate::narration::{NarrationEvent, NarrationKind};
pub use crate::service::{AssistantsClient, ConversationService, RunService};
pub use crate::tools::{
    FnTool, Tool, ToolArguments, ToolContext, ToolParameters, ToolRegistry, ToolReturn, TypedTool,
};
pub use crate::types::{Assistant, Attachment, ConversationRecord, Participant, Role};
