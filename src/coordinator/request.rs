//! Inputs to a single `converse` call.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::types::Attachment;

/// One message to send, plus how to observe and bound the exchange.
///
/// ```
/// use std::time::Duration;
/// use parley::coordinator::ConverseRequest;
///
/// let request = ConverseRequest::builder()
///     .message("Summarize the attached report")
///     .deadline(Duration::from_secs(60))
///     .build();
/// assert!(request.stream);
/// ```
#[derive(Debug, Clone, bon::Builder)]
pub struct ConverseRequest {
    #[builder(into)]
    pub message: String,
    /// Files attached to the message.
    #[builder(default)]
    pub attachments: Vec<Attachment>,
    /// Emit narration events. When off, only the reply is produced.
    #[builder(default = true)]
    pub stream: bool,
    /// Cancels the call at its next suspension point.
    pub cancel: Option<CancellationToken>,
    /// Wall-clock budget for the whole call, measured from its start.
    pub deadline: Option<Duration>,
}

impl ConverseRequest {
    /// Streaming request with no attachments and no deadline.
    pub fn new(message: impl Into<String>) -> Self {
        Self::builder().message(message).build()
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }
}

impl From<&str> for ConverseRequest {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ConverseRequest {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}
