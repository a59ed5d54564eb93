//! Drives remote runs to completion for one conversation.
//!
//! A [`RunCoordinator`] owns the remote conversation id and the latest run
//! snapshot for one (initiator, responder) pair. Each [`RunCoordinator::converse`]
//! call appends a message, starts a run, polls it, answers tool pauses through
//! the [`ToolInvoker`], and yields narration in production order before the
//! final reply.

mod cancel;
mod request;
mod stream;

pub use request::ConverseRequest;
pub use stream::{ConverseItem, ConverseOutput, ConverseStream};

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use tracing::{debug, info, warn};
use uuid::Uuid;

use self::cancel::CancelGuard;
use crate::config::{ParleyConfig, DEFAULT_HISTORY_LIMIT, DEFAULT_POLL_INTERVAL_MS};
use crate::error::ParleyError;
use crate::history::{ConversationLog, HistoryEntry};
use crate::narration::{NarrationEmitter, NarrationEvent};
use crate::service::{AssistantsClient, ConversationService, RunService};
use crate::tools::{ToolContext, ToolInvocation, ToolInvoker};
use crate::types::{
    Assistant, ConversationId, ConversationRecord, MessageOrder, NewMessage, Participant, Run,
    RunStatus, ToolOutputSubmission,
};

/// Conversation between one initiator and one remote assistant.
///
/// At most one run is active per conversation: a `converse` call first waits
/// out any queued or in-progress run left by an earlier call, and cancels one
/// left paused for tool outputs. Callers must not
/// drive the same remote conversation from two coordinators at once.
pub struct RunCoordinator<S = AssistantsClient> {
    id: ConversationId,
    initiator: Participant,
    responder: Assistant,
    service: Arc<S>,
    invoker: ToolInvoker,
    remote_id: Option<String>,
    /// Whether `remote_id` has been confirmed with the service.
    remote_confirmed: bool,
    run: Option<Run>,
    poll_interval: Duration,
    history_limit: usize,
}

impl<S> RunCoordinator<S>
where
    S: ConversationService + RunService + 'static,
{
    /// New conversation. The remote log is created on the first `converse`.
    pub fn new(initiator: Participant, responder: Assistant, service: Arc<S>) -> Self {
        let invoker = ToolInvoker::new(responder.tools().clone());
        Self {
            id: Uuid::new_v4(),
            initiator,
            responder,
            service,
            invoker,
            remote_id: None,
            remote_confirmed: false,
            run: None,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Rebuild a coordinator from a stored record.
    pub fn from_record(
        record: ConversationRecord,
        responder: Assistant,
        service: Arc<S>,
    ) -> Result<Self, ParleyError> {
        if record.assistant_id != responder.assistant_id() {
            return Err(ParleyError::InvalidArgument(format!(
                "record belongs to assistant {}, not {}",
                record.assistant_id,
                responder.assistant_id()
            )));
        }
        let mut coordinator = Self::new(record.initiator, responder, service);
        coordinator.id = record.id;
        coordinator.remote_id = record.remote_id;
        Ok(coordinator)
    }

    /// Continue an existing remote conversation. The id is confirmed with the
    /// service on first use.
    pub fn resume(mut self, remote_id: impl Into<String>) -> Self {
        self.remote_id = Some(remote_id.into());
        self.remote_confirmed = false;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Apply pacing settings from `config`.
    pub fn with_config(self, config: &ParleyConfig) -> Self {
        self.with_poll_interval(config.poll_interval())
            .with_history_limit(config.history_limit)
    }

    pub fn id(&self) -> ConversationId {
        self.id
    }

    /// Remote log id, once one exists.
    pub fn remote_id(&self) -> Option<&str> {
        self.remote_id.as_deref()
    }

    pub fn initiator(&self) -> &Participant {
        &self.initiator
    }

    pub fn responder(&self) -> &Assistant {
        &self.responder
    }

    /// Latest known snapshot of the most recent run.
    pub fn current_run(&self) -> Option<&Run> {
        self.run.as_ref()
    }

    /// Serializable identity, enough to resume with [`Self::from_record`].
    pub fn record(&self) -> ConversationRecord {
        ConversationRecord {
            id: self.id,
            remote_id: self.remote_id.clone(),
            initiator: self.initiator.clone(),
            responder: self.responder.name().to_string(),
            assistant_id: self.responder.assistant_id().to_string(),
        }
    }

    /// Send a message and drive the resulting run to completion.
    ///
    /// The stream yields narration events (when `stream` is set) and ends with
    /// [`ConverseItem::Reply`]. Any remote or run failure ends it with an error.
    pub fn converse(&mut self, request: impl Into<ConverseRequest>) -> ConverseStream<'_> {
        ConverseStream::new(Box::pin(self.drive(request.into())))
    }

    /// Send a message without narration and return only the reply.
    pub async fn get_completion(&mut self, message: impl Into<String>) -> Result<String, ParleyError> {
        let request = ConverseRequest::builder()
            .message(message)
            .stream(false)
            .build();
        self.converse(request).into_reply().await
    }

    /// Read access to the remote log, independent of any run.
    pub fn log(&self) -> ConversationLog {
        let service: Arc<dyn ConversationService> = self.service.clone();
        ConversationLog::new(service, self.remote_id.clone()).with_limit(self.history_limit)
    }

    /// Prior messages oldest-first.
    pub async fn history(&self) -> Result<Vec<HistoryEntry>, ParleyError> {
        self.log().history().await
    }

    fn drive(
        &mut self,
        request: ConverseRequest,
    ) -> impl Stream<Item = Result<ConverseItem, ParleyError>> + Send + '_ {
        async_stream::try_stream! {
            let guard = CancelGuard::new(request.cancel.clone(), request.deadline);
            let mut emitter = NarrationEmitter::new(request.stream);
            let initiator = self.initiator.name().to_string();
            let responder = self.responder.name().to_string();

            let conversation_id = self.ensure_conversation(&guard).await?;
            self.await_active_run(&conversation_id, &guard).await?;

            guard.check()?;
            let message = NewMessage::user(request.message.clone())
                .with_attachments(request.attachments.clone());
            self.service.append_message(&conversation_id, message).await?;
            if let Some(event) = emitter.emit(NarrationEvent::text(&initiator, &responder, &request.message)) {
                yield ConverseItem::Event(event);
            }

            guard.check()?;
            let mut run = self
                .service
                .create_run(&conversation_id, self.responder.assistant_id())
                .await?;
            info!(conversation_id = %conversation_id, run_id = %run.id, "run started");
            self.run = Some(run.clone());

            loop {
                debug!(run_id = %run.id, status = %run.status, "run status");
                if run.status.is_transient() {
                    guard.sleep(self.poll_interval).await?;
                    run = self.service.retrieve_run(&conversation_id, &run.id).await?;
                    self.run = Some(run.clone());
                    continue;
                }

                match run.status {
                    RunStatus::RequiresAction => {
                        let mut outputs = Vec::with_capacity(run.pending_tool_calls.len());
                        let mut answered = HashSet::new();
                        for call in &run.pending_tool_calls {
                            if !answered.insert(call.id.clone()) {
                                warn!(run_id = %run.id, call_id = %call.id, "duplicate tool call id ignored");
                                continue;
                            }
                            if let Some(event) = emitter.emit(NarrationEvent::function_call(
                                &responder,
                                &initiator,
                                call.to_string(),
                            )) {
                                yield ConverseItem::Event(event);
                            }

                            let ctx = ToolContext {
                                caller: responder.clone(),
                                initiator: initiator.clone(),
                                conversation_id: Some(conversation_id.clone()),
                                tool_call_id: call.id.clone(),
                                tool_name: call.name.clone(),
                                cancel: guard.token().child_token(),
                            };
                            let outcome = match guard.run(self.invoker.invoke(call, ctx)).await? {
                                ToolInvocation::Completed(outcome) => {
                                    if let Some(event) = emitter.emit(NarrationEvent::function_output(
                                        &call.name,
                                        &responder,
                                        outcome.display_text(),
                                    )) {
                                        yield ConverseItem::Event(event);
                                    }
                                    outcome
                                }
                                ToolInvocation::Narrated(mut narrated) => {
                                    while let Some(event) = guard.run(narrated.next_event()).await? {
                                        if let Some(event) = emitter.emit(event) {
                                            yield ConverseItem::Event(event);
                                        }
                                    }
                                    narrated.finish()
                                }
                            };
                            outputs.push(ToolOutputSubmission {
                                tool_call_id: call.id.clone(),
                                output: outcome.primary_text(),
                            });
                        }

                        guard.check()?;
                        debug!(run_id = %run.id, count = outputs.len(), "submitting tool outputs");
                        run = self
                            .service
                            .submit_tool_outputs(&conversation_id, &run.id, outputs)
                            .await?;
                        self.run = Some(run.clone());
                    }
                    RunStatus::Failed => {
                        let reason = run.failure_reason();
                        warn!(run_id = %run.id, %reason, "run failed");
                        Err::<(), ParleyError>(ParleyError::RunFailed {
                            run_id: run.id.clone(),
                            reason,
                        })?;
                    }
                    status => {
                        info!(run_id = %run.id, %status, "run finished");
                        let latest = self
                            .service
                            .list_messages(&conversation_id, MessageOrder::Desc, 1)
                            .await?;
                        let reply = latest.into_iter().next().map(|m| m.text()).ok_or_else(|| {
                            ParleyError::InvalidState(format!(
                                "run {} finished but conversation {conversation_id} has no messages",
                                run.id
                            ))
                        })?;
                        if let Some(event) = emitter.emit(NarrationEvent::text(&responder, &initiator, &reply)) {
                            yield ConverseItem::Event(event);
                        }
                        yield ConverseItem::Reply(reply);
                        break;
                    }
                }
            }
        }
    }

    async fn ensure_conversation(&mut self, guard: &CancelGuard) -> Result<String, ParleyError> {
        guard.check()?;
        let id = match self.remote_id.clone() {
            Some(id) if self.remote_confirmed => return Ok(id),
            Some(id) => {
                let id = self.service.retrieve_conversation(&id).await?;
                debug!(conversation_id = %id, "resumed conversation");
                id
            }
            None => {
                let id = self.service.create_conversation().await?;
                info!(conversation_id = %id, responder = %self.responder.name(), "created conversation");
                id
            }
        };
        self.remote_id = Some(id.clone());
        self.remote_confirmed = true;
        Ok(id)
    }

    /// Settle the run held from an earlier call before touching the log.
    ///
    /// Queued or in-progress runs are polled to completion. A run still paused
    /// for tool outputs (its call was cancelled mid-tool) is cancelled remotely
    /// and polled through `cancelling`.
    async fn await_active_run(
        &mut self,
        conversation_id: &str,
        guard: &CancelGuard,
    ) -> Result<(), ParleyError> {
        while let Some((run_id, status)) = self
            .run
            .as_ref()
            .filter(|run| run.status.is_active())
            .map(|run| (run.id.clone(), run.status))
        {
            let next = if status.is_actionable() {
                guard.check()?;
                info!(conversation_id = %conversation_id, %run_id, "cancelling run left awaiting tool outputs");
                self.service.cancel_run(conversation_id, &run_id).await?
            } else {
                debug!(%run_id, %status, "waiting for active run to settle");
                guard.sleep(self.poll_interval).await?;
                self.service.retrieve_run(conversation_id, &run_id).await?
            };
            self.run = Some(next);
        }
        Ok(())
    }
}

impl<S> std::fmt::Debug for RunCoordinator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunCoordinator")
            .field("id", &self.id)
            .field("initiator", &self.initiator)
            .field("responder", &self.responder.name())
            .field("remote_id", &self.remote_id)
            .field("run", &self.run.as_ref().map(|r| (&r.id, r.status)))
            .finish()
    }
}
