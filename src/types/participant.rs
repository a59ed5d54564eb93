//! Conversation participants.

use serde::{Deserialize, Serialize};

use crate::tools::ToolRegistry;

/// Name used for the end user in narration.
pub const USER_NAME: &str = "User";

/// The party that opens the exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Participant {
    /// A human end user.
    User,
    /// Another agent talking to the responder.
    Agent { name: String },
}

impl Participant {
    pub fn agent(name: impl Into<String>) -> Self {
        Self::Agent { name: name.into() }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::User => USER_NAME,
            Self::Agent { name } => name,
        }
    }
}

impl Default for Participant {
    fn default() -> Self {
        Self::User
    }
}

/// The responding agent: a remote assistant plus its local tools.
#[derive(Debug, Clone)]
pub struct Assistant {
    name: String,
    assistant_id: String,
    tools: ToolRegistry,
}

impl Assistant {
    /// Create an assistant with no tools.
    pub fn new(name: impl Into<String>, assistant_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            assistant_id: assistant_id.into(),
            tools: ToolRegistry::default(),
        }
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Remote identity used when creating runs.
    pub fn assistant_id(&self) -> &str {
        &self.assistant_id
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }
}
