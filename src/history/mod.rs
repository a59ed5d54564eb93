//! Read-only access to a conversation's message history.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DEFAULT_HISTORY_LIMIT;
use crate::error::ParleyError;
use crate::service::ConversationService;
use crate::types::{MessageOrder, Role};

/// One prior message, flattened to its text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

/// History reader for one remote conversation. Independent of any run.
#[derive(Clone)]
pub struct ConversationLog {
    service: Arc<dyn ConversationService>,
    remote_id: Option<String>,
    limit: usize,
}

impl ConversationLog {
    pub fn new(service: Arc<dyn ConversationService>, remote_id: Option<String>) -> Self {
        Self {
            service,
            remote_id,
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Page size for history reads.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn remote_id(&self) -> Option<&str> {
        self.remote_id.as_deref()
    }

    /// Messages oldest-first, at most one page. Empty when no remote log is
    /// bound yet.
    pub async fn history(&self) -> Result<Vec<HistoryEntry>, ParleyError> {
        let Some(remote_id) = self.remote_id.as_deref() else {
            return Ok(Vec::new());
        };
        debug!(conversation_id = %remote_id, limit = self.limit, "listing history");
        let messages = self
            .service
            .list_messages(remote_id, MessageOrder::Asc, self.limit)
            .await?;
        Ok(messages
            .into_iter()
            .map(|m| HistoryEntry {
                role: m.role,
                content: m.text(),
            })
            .collect())
    }
}

impl std::fmt::Debug for ConversationLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationLog")
            .field("remote_id", &self.remote_id)
            .field("limit", &self.limit)
            .finish()
    }
}
