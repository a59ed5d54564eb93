//! Ordered narration of a conversational exchange.
//!
//! Every observable step of a `converse` call (user text, tool call, tool
//! output, final reply) is a [`NarrationEvent`]. The [`NarrationEmitter`]
//! stamps events with a per-call sequence number so observers can rebuild the
//! timeline, and drops everything when narration is disabled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Kind of narrated step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NarrationKind {
    Text,
    FunctionCall,
    FunctionOutput,
}

/// One unit of observable progress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NarrationEvent {
    /// Position within one `converse` call, starting at 1. Zero until emitted.
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub kind: NarrationKind,
    pub sender: String,
    pub recipient: String,
    pub content: String,
}

impl NarrationEvent {
    pub fn new(
        kind: NarrationKind,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            seq: 0,
            timestamp: Utc::now(),
            kind,
            sender: sender.into(),
            recipient: recipient.into(),
            content: content.into(),
        }
    }

    pub fn text(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::new(NarrationKind::Text, sender, recipient, content)
    }

    pub fn function_call(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::new(NarrationKind::FunctionCall, sender, recipient, content)
    }

    pub fn function_output(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::new(NarrationKind::FunctionOutput, sender, recipient, content)
    }
}

impl std::fmt::Display for NarrationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} -> {}: {}",
            self.kind, self.sender, self.recipient, self.content
        )
    }
}

/// Sequences events for one `converse` call.
#[derive(Debug)]
pub struct NarrationEmitter {
    enabled: bool,
    next_seq: u64,
}

impl NarrationEmitter {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            next_seq: 1,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Stamp `event` for delivery, or drop it when narration is off.
    pub fn emit(&mut self, mut event: NarrationEvent) -> Option<NarrationEvent> {
        if !self.enabled {
            return None;
        }
        event.seq = self.next_seq;
        self.next_seq += 1;
        Some(event)
    }
}
