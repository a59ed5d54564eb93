//! Conversation identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::participant::Participant;

/// Local conversation identifier.
pub type ConversationId = Uuid;

/// Serializable identity of a conversation, enough to resume it later.
///
/// Storing records is left to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationRecord {
    pub id: ConversationId,
    /// Remote log identifier, absent until the first message is sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    pub initiator: Participant,
    pub responder: String,
    pub assistant_id: String,
}
