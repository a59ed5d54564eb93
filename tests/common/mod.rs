//! Shared test helpers and a scripted in-memory assistant service.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use parley::error::ParleyError;
use parley::narration::{NarrationEvent, NarrationKind};
use parley::service::{ConversationService, RunService};
use parley::types::*;

/// One scripted transition of a fake run.
///
/// Every `create_run`, `retrieve_run`, and `submit_tool_outputs` call applies
/// the next step. A run whose script is exhausted keeps its last status.
#[derive(Debug, Clone)]
pub enum Step {
    Status(RunStatus),
    RequiresAction(Vec<ToolCallRequest>),
    /// Complete and append `reply` to the log as the assistant.
    Complete(String),
    Fail { code: String, message: String },
}

impl Step {
    pub fn queued() -> Self {
        Self::Status(RunStatus::Queued)
    }

    pub fn in_progress() -> Self {
        Self::Status(RunStatus::InProgress)
    }

    pub fn complete(reply: &str) -> Self {
        Self::Complete(reply.to_string())
    }

    pub fn call(id: &str, name: &str, arguments: &str) -> Self {
        Self::RequiresAction(vec![tool_call(id, name, arguments)])
    }

    pub fn fail(code: &str, message: &str) -> Self {
        Self::Fail {
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}

pub fn tool_call(id: &str, name: &str, arguments: &str) -> ToolCallRequest {
    ToolCallRequest {
        id: id.to_string(),
        name: name.to_string(),
        arguments: arguments.to_string(),
    }
}

/// Outputs submitted for one pause.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub run_id: String,
    pub outputs: Vec<ToolOutputSubmission>,
}

struct FakeRun {
    run: Run,
    steps: VecDeque<Step>,
}

#[derive(Default)]
struct FakeThread {
    messages: Vec<LogMessage>,
    runs: Vec<FakeRun>,
}

#[derive(Default)]
struct FakeState {
    threads: HashMap<String, FakeThread>,
    scripts: VecDeque<Vec<Step>>,
    submissions: Vec<Submission>,
    appended: Vec<NewMessage>,
    calls: Vec<String>,
    fail_submit: bool,
    next_id: u64,
}

impl FakeState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}_{}", self.next_id)
    }

    fn record(&mut self, operation: &str) {
        self.calls.push(operation.to_string());
    }
}

/// In-memory conversation and run service driven by per-run scripts.
///
/// `append_message` and `create_run` fail while the thread still has a run
/// that is queued, in progress, cancelling, or awaiting tool outputs,
/// mirroring the remote service's one-active-run rule.
#[derive(Default)]
pub struct FakeAssistantService {
    state: Mutex<FakeState>,
}

impl FakeAssistantService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script for the next run created, in creation order.
    pub fn script(self, steps: Vec<Step>) -> Self {
        self.state.lock().unwrap().scripts.push_back(steps);
        self
    }

    /// Make every tool output submission fail with a server error.
    pub fn failing_submissions(self) -> Self {
        self.state.lock().unwrap().fail_submit = true;
        self
    }

    /// Pre-create a thread holding `messages` (role, text), oldest first.
    pub fn with_thread(self, id: &str, messages: &[(Role, &str)]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let mut thread = FakeThread::default();
            for (i, (role, text)) in messages.iter().enumerate() {
                thread.messages.push(log_message(&format!("msg_seed_{i}"), *role, text, None));
            }
            state.threads.insert(id.to_string(), thread);
        }
        self
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn appended(&self) -> Vec<NewMessage> {
        self.state.lock().unwrap().appended.clone()
    }

    /// Names of the service operations invoked, in order.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls().iter().filter(|c| *c == operation).count()
    }

    pub fn runs_created(&self) -> usize {
        self.count("create_run")
    }
}

fn log_message(id: &str, role: Role, text: &str, run_id: Option<String>) -> LogMessage {
    LogMessage {
        id: id.to_string(),
        role,
        content: vec![ContentPart::Text {
            text: text.to_string(),
        }],
        created_at: None,
        run_id,
    }
}

fn not_found(what: &str, id: &str) -> ParleyError {
    ParleyError::api(404, format!("No {what} found with id '{id}'."))
}

fn ensure_no_active_run(state: &FakeState, thread_id: &str) -> Result<(), ParleyError> {
    let thread = state
        .threads
        .get(thread_id)
        .ok_or_else(|| not_found("thread", thread_id))?;
    match thread.runs.iter().find(|r| r.run.status.is_active()) {
        Some(active) => Err(ParleyError::api(
            400,
            format!(
                "Thread {thread_id} already has an active run {}.",
                active.run.id
            ),
        )),
        None => Ok(()),
    }
}

/// Apply the next scripted step of `run_id` in `thread_id`.
fn advance(state: &mut FakeState, thread_id: &str, run_id: &str) -> Result<Run, ParleyError> {
    let message_id = state.next_id("msg");
    let thread = state
        .threads
        .get_mut(thread_id)
        .ok_or_else(|| not_found("thread", thread_id))?;
    let fake = thread
        .runs
        .iter_mut()
        .find(|r| r.run.id == run_id)
        .ok_or_else(|| not_found("run", run_id))?;

    if let Some(step) = fake.steps.pop_front() {
        fake.run.pending_tool_calls.clear();
        match step {
            Step::Status(status) => fake.run.status = status,
            Step::RequiresAction(calls) => {
                fake.run.status = RunStatus::RequiresAction;
                fake.run.pending_tool_calls = calls;
            }
            Step::Complete(reply) => {
                fake.run.status = RunStatus::Completed;
                let run_id = Some(fake.run.id.clone());
                let snapshot = fake.run.clone();
                thread
                    .messages
                    .push(log_message(&message_id, Role::Assistant, &reply, run_id));
                return Ok(snapshot);
            }
            Step::Fail { code, message } => {
                fake.run.status = RunStatus::Failed;
                fake.run.last_error = Some(RunError { code, message });
            }
        }
    }
    Ok(fake.run.clone())
}

#[async_trait]
impl ConversationService for FakeAssistantService {
    async fn create_conversation(&self) -> Result<String, ParleyError> {
        let mut state = self.state.lock().unwrap();
        state.record("create_conversation");
        let id = state.next_id("thread");
        state.threads.insert(id.clone(), FakeThread::default());
        Ok(id)
    }

    async fn retrieve_conversation(&self, conversation_id: &str) -> Result<String, ParleyError> {
        let mut state = self.state.lock().unwrap();
        state.record("retrieve_conversation");
        if state.threads.contains_key(conversation_id) {
            Ok(conversation_id.to_string())
        } else {
            Err(not_found("thread", conversation_id))
        }
    }

    async fn append_message(
        &self,
        conversation_id: &str,
        message: NewMessage,
    ) -> Result<LogMessage, ParleyError> {
        let mut state = self.state.lock().unwrap();
        state.record("append_message");
        ensure_no_active_run(&state, conversation_id)?;
        let id = state.next_id("msg");
        state.appended.push(message.clone());
        let thread = state
            .threads
            .get_mut(conversation_id)
            .ok_or_else(|| not_found("thread", conversation_id))?;
        let logged = log_message(&id, message.role, &message.content, None);
        thread.messages.push(logged.clone());
        Ok(logged)
    }

    async fn list_messages(
        &self,
        conversation_id: &str,
        order: MessageOrder,
        limit: usize,
    ) -> Result<Vec<LogMessage>, ParleyError> {
        let mut state = self.state.lock().unwrap();
        state.record("list_messages");
        let thread = state
            .threads
            .get(conversation_id)
            .ok_or_else(|| not_found("thread", conversation_id))?;
        let messages: Vec<LogMessage> = match order {
            MessageOrder::Asc => thread.messages.iter().take(limit).cloned().collect(),
            MessageOrder::Desc => thread.messages.iter().rev().take(limit).cloned().collect(),
        };
        Ok(messages)
    }
}

#[async_trait]
impl RunService for FakeAssistantService {
    async fn create_run(&self, conversation_id: &str, assistant_id: &str) -> Result<Run, ParleyError> {
        let mut state = self.state.lock().unwrap();
        state.record("create_run");
        ensure_no_active_run(&state, conversation_id)?;

        let run_id = state.next_id("run");
        let steps: VecDeque<Step> = state.scripts.pop_front().unwrap_or_default().into();
        let thread = state
            .threads
            .get_mut(conversation_id)
            .ok_or_else(|| not_found("thread", conversation_id))?;
        thread.runs.push(FakeRun {
            run: Run {
                id: run_id.clone(),
                conversation_id: conversation_id.to_string(),
                assistant_id: assistant_id.to_string(),
                status: RunStatus::Queued,
                pending_tool_calls: vec![],
                last_error: None,
            },
            steps,
        });
        advance(&mut state, conversation_id, &run_id)
    }

    async fn retrieve_run(&self, conversation_id: &str, run_id: &str) -> Result<Run, ParleyError> {
        let mut state = self.state.lock().unwrap();
        state.record("retrieve_run");
        advance(&mut state, conversation_id, run_id)
    }

    async fn submit_tool_outputs(
        &self,
        conversation_id: &str,
        run_id: &str,
        outputs: Vec<ToolOutputSubmission>,
    ) -> Result<Run, ParleyError> {
        let mut state = self.state.lock().unwrap();
        state.record("submit_tool_outputs");
        if state.fail_submit {
            return Err(ParleyError::api(500, "The server had an error processing your request."));
        }
        state.submissions.push(Submission {
            run_id: run_id.to_string(),
            outputs,
        });
        advance(&mut state, conversation_id, run_id)
    }

    /// Moves an active run to `cancelling`; the next retrieve reports `cancelled`.
    async fn cancel_run(&self, conversation_id: &str, run_id: &str) -> Result<Run, ParleyError> {
        let mut state = self.state.lock().unwrap();
        state.record("cancel_run");
        let fake = state
            .threads
            .get_mut(conversation_id)
            .ok_or_else(|| not_found("thread", conversation_id))?
            .runs
            .iter_mut()
            .find(|r| r.run.id == run_id)
            .ok_or_else(|| not_found("run", run_id))?;
        if !fake.run.status.is_active() {
            return Err(ParleyError::api(
                400,
                format!("Cannot cancel run with status '{}'.", fake.run.status),
            ));
        }
        fake.run.status = RunStatus::Cancelling;
        fake.run.pending_tool_calls.clear();
        fake.steps = VecDeque::from(vec![Step::Status(RunStatus::Cancelled)]);
        Ok(fake.run.clone())
    }
}

/// (kind, sender, recipient, content) of each event, for order comparisons.
pub fn timeline(events: &[NarrationEvent]) -> Vec<(NarrationKind, String, String, String)> {
    events
        .iter()
        .map(|e| {
            (
                e.kind,
                e.sender.clone(),
                e.recipient.clone(),
                e.content.clone(),
            )
        })
        .collect()
}

pub fn text(sender: &str, recipient: &str, content: &str) -> (NarrationKind, String, String, String) {
    (
        NarrationKind::Text,
        sender.to_string(),
        recipient.to_string(),
        content.to_string(),
    )
}

pub fn function_call(
    sender: &str,
    recipient: &str,
    content: &str,
) -> (NarrationKind, String, String, String) {
    (
        NarrationKind::FunctionCall,
        sender.to_string(),
        recipient.to_string(),
        content.to_string(),
    )
}

pub fn function_output(
    sender: &str,
    recipient: &str,
    content: &str,
) -> (NarrationKind, String, String, String) {
    (
        NarrationKind::FunctionOutput,
        sender.to_string(),
        recipient.to_string(),
        content.to_string(),
    )
}
