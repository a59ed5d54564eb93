//! OpenAI Assistants v2 implementation of the remote services.

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::http::{assistants_headers, build_client, status_to_error};
use super::{ConversationService, RunService};
use crate::config::{ParleyConfig, DEFAULT_BASE_URL};
use crate::error::ParleyError;
use crate::types::{
    ContentPart, LogMessage, MessageOrder, NewMessage, Role, Run, RunError, RunStatus,
    ToolCallRequest, ToolOutputSubmission,
};
use crate::util::retry::RetryPolicy;

/// HTTP client for the thread, message, and run endpoints.
///
/// GETs retry any retryable error under the configured policy. POSTs create
/// remote state, so they only retry when the service rejected the request
/// outright with a rate limit.
#[derive(Clone)]
pub struct AssistantsClient {
    http: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
    retry: RetryPolicy,
}

impl std::fmt::Debug for AssistantsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantsClient")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish()
    }
}

impl AssistantsClient {
    /// Client for the public endpoint with default timeouts and no retry.
    pub fn new(api_key: &str) -> Result<Self, ParleyError> {
        Self::from_config(&ParleyConfig::default().with_api_key(api_key))
    }

    pub fn from_config(config: &ParleyConfig) -> Result<Self, ParleyError> {
        let headers = assistants_headers(config.require_api_key()?, config.organization.as_deref())?;
        let base_url = if config.base_url.is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            config.base_url.trim_end_matches('/').to_string()
        };
        Ok(Self {
            http: build_client(config.request_timeout())?,
            base_url,
            headers,
            retry: RetryPolicy::default().with_max_attempts(config.max_attempts),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ParleyError> {
        let url = format!("{}{}", self.base_url, path);
        self.retry.execute(|| self.get_once(&url, query)).await
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ParleyError> {
        debug!(%url, "GET");
        let resp = self
            .http
            .get(url)
            .headers(self.headers.clone())
            .query(query)
            .send()
            .await?;
        decode(resp).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ParleyError> {
        let url = format!("{}{}", self.base_url, path);
        self.retry
            .execute_if(
                || self.post_once(&url, body),
                |e| matches!(e, ParleyError::RateLimited { .. }),
            )
            .await
    }

    async fn post_once<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, ParleyError> {
        debug!(%url, "POST");
        let resp = self
            .http
            .post(url)
            .headers(self.headers.clone())
            .json(body)
            .send()
            .await?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ParleyError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(status_to_error(status.as_u16(), &body));
    }
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl ConversationService for AssistantsClient {
    async fn create_conversation(&self) -> Result<String, ParleyError> {
        let thread: ThreadObject = self.post("/threads", &serde_json::json!({})).await?;
        debug!(conversation_id = %thread.id, "created thread");
        Ok(thread.id)
    }

    async fn retrieve_conversation(&self, conversation_id: &str) -> Result<String, ParleyError> {
        let thread: ThreadObject = self.get(&format!("/threads/{conversation_id}"), &[]).await?;
        Ok(thread.id)
    }

    async fn append_message(
        &self,
        conversation_id: &str,
        message: NewMessage,
    ) -> Result<LogMessage, ParleyError> {
        let created: MessageObject = self
            .post(&format!("/threads/{conversation_id}/messages"), &message)
            .await?;
        Ok(created.into())
    }

    async fn list_messages(
        &self,
        conversation_id: &str,
        order: MessageOrder,
        limit: usize,
    ) -> Result<Vec<LogMessage>, ParleyError> {
        let page: ListObject<MessageObject> = self
            .get(
                &format!("/threads/{conversation_id}/messages"),
                &[("order", order.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        Ok(page.data.into_iter().map(LogMessage::from).collect())
    }
}

#[async_trait]
impl RunService for AssistantsClient {
    async fn create_run(&self, conversation_id: &str, assistant_id: &str) -> Result<Run, ParleyError> {
        let run: RunObject = self
            .post(
                &format!("/threads/{conversation_id}/runs"),
                &serde_json::json!({ "assistant_id": assistant_id }),
            )
            .await?;
        Ok(run.into())
    }

    async fn retrieve_run(&self, conversation_id: &str, run_id: &str) -> Result<Run, ParleyError> {
        let run: RunObject = self
            .get(&format!("/threads/{conversation_id}/runs/{run_id}"), &[])
            .await?;
        Ok(run.into())
    }

    async fn submit_tool_outputs(
        &self,
        conversation_id: &str,
        run_id: &str,
        outputs: Vec<ToolOutputSubmission>,
    ) -> Result<Run, ParleyError> {
        let run: RunObject = self
            .post(
                &format!("/threads/{conversation_id}/runs/{run_id}/submit_tool_outputs"),
                &serde_json::json!({ "tool_outputs": outputs }),
            )
            .await?;
        Ok(run.into())
    }

    async fn cancel_run(&self, conversation_id: &str, run_id: &str) -> Result<Run, ParleyError> {
        let run: RunObject = self
            .post(
                &format!("/threads/{conversation_id}/runs/{run_id}/cancel"),
                &serde_json::json!({}),
            )
            .await?;
        debug!(run_id = %run.id, status = %run.status, "cancel requested");
        Ok(run.into())
    }
}

// Wire shapes

#[derive(Debug, Deserialize)]
struct ThreadObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ListObject<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct MessageObject {
    id: String,
    role: Role,
    #[serde(default)]
    content: Vec<WireContent>,
    #[serde(default)]
    created_at: Option<i64>,
    #[serde(default)]
    run_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireContent {
    Text { text: WireText },
    ImageFile { image_file: WireImageFile },
    ImageUrl { image_url: WireImageUrl },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct WireText {
    value: String,
}

#[derive(Debug, Deserialize)]
struct WireImageFile {
    file_id: String,
}

#[derive(Debug, Deserialize)]
struct WireImageUrl {
    url: String,
}

impl From<MessageObject> for LogMessage {
    fn from(m: MessageObject) -> Self {
        Self {
            id: m.id,
            role: m.role,
            content: m
                .content
                .into_iter()
                .map(|part| match part {
                    WireContent::Text { text } => ContentPart::Text { text: text.value },
                    WireContent::ImageFile { image_file } => ContentPart::ImageFile {
                        file_id: image_file.file_id,
                    },
                    WireContent::ImageUrl { image_url } => ContentPart::ImageUrl { url: image_url.url },
                    WireContent::Other => ContentPart::Unsupported,
                })
                .collect(),
            created_at: m.created_at.and_then(|secs| DateTime::from_timestamp(secs, 0)),
            run_id: m.run_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RunObject {
    id: String,
    thread_id: String,
    #[serde(default)]
    assistant_id: String,
    status: RunStatus,
    #[serde(default)]
    required_action: Option<RequiredAction>,
    #[serde(default)]
    last_error: Option<RunError>,
}

#[derive(Debug, Deserialize)]
struct RequiredAction {
    #[serde(default)]
    submit_tool_outputs: Option<SubmitToolOutputs>,
}

#[derive(Debug, Deserialize)]
struct SubmitToolOutputs {
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

impl From<RunObject> for Run {
    fn from(r: RunObject) -> Self {
        let pending_tool_calls = r
            .required_action
            .and_then(|a| a.submit_tool_outputs)
            .map(|s| {
                s.tool_calls
                    .into_iter()
                    .map(|c| ToolCallRequest {
                        id: c.id,
                        name: c.function.name,
                        arguments: c.function.arguments,
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            id: r.id,
            conversation_id: r.thread_id,
            assistant_id: r.assistant_id,
            status: r.status,
            pending_tool_calls,
            last_error: r.last_error,
        }
    }
}
