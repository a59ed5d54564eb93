//! Error classification and what a caller can do about it.

/// Where an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Server,
    /// Any other rejection by the remote service.
    Api,
    Configuration,
    Serialization,
    /// The remote run itself failed.
    Run,
    Cancelled,
    ToolExecution,
    Unknown,
}

/// Next step for whoever started the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    RetryWithBackoff,
    CheckCredentials,
    CheckConfiguration,
    /// A conversation, run, or assistant id was not recognised.
    CheckIdentifiers,
    /// The call stopped early; sending again cancels the interrupted run first.
    ResendMessage,
    /// The run failed remotely; its reason says why.
    InspectRun,
    CheckToolImplementation,
    None,
}

impl RecoverySuggestion {
    /// One-line hint for terminal output.
    pub fn hint(self) -> Option<&'static str> {
        match self {
            Self::RetryWithBackoff => Some("the service is busy or unreachable; try again shortly"),
            Self::CheckCredentials => Some("check OPENAI_API_KEY and OPENAI_ORG_ID"),
            Self::CheckConfiguration => Some("check the config file and PARLEY_* environment variables"),
            Self::CheckIdentifiers => Some("check the assistant and thread ids"),
            Self::ResendMessage => Some("send the message again to continue the conversation"),
            Self::InspectRun => Some("the assistant's run failed; the reason above comes from the service"),
            Self::CheckToolImplementation => Some("a local tool is misconfigured"),
            Self::None => None,
        }
    }
}
