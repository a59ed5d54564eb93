//! The lazy result of `converse`.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::BoxStream;
use futures::{Stream, StreamExt};

use crate::error::ParleyError;
use crate::narration::NarrationEvent;

/// One item of a `converse` stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ConverseItem {
    Event(NarrationEvent),
    /// The responder's final text. Always the last item of a successful call.
    Reply(String),
}

/// Everything a drained `converse` call produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ConverseOutput {
    pub events: Vec<NarrationEvent>,
    pub reply: String,
}

/// Ordered narration of one exchange, terminated by the reply.
///
/// Nothing happens until the stream is polled. Dropping it part-way leaves the
/// remote run in whatever state it reached; the next `converse` call waits for
/// that run to settle before starting another.
pub struct ConverseStream<'a> {
    inner: BoxStream<'a, Result<ConverseItem, ParleyError>>,
}

impl<'a> ConverseStream<'a> {
    pub(crate) fn new(inner: BoxStream<'a, Result<ConverseItem, ParleyError>>) -> Self {
        Self { inner }
    }

    /// Drain the stream, discarding events.
    pub async fn into_reply(self) -> Result<String, ParleyError> {
        self.for_each_event(|_| {}).await
    }

    /// Drain the stream, keeping every event.
    pub async fn collect(self) -> Result<ConverseOutput, ParleyError> {
        let mut events = Vec::new();
        let reply = self.for_each_event(|event| events.push(event)).await?;
        Ok(ConverseOutput { events, reply })
    }

    /// Drain the stream, handing each event to `f` as it arrives.
    pub async fn for_each_event<F>(mut self, mut f: F) -> Result<String, ParleyError>
    where
        F: FnMut(NarrationEvent),
    {
        while let Some(item) = self.inner.next().await {
            match item? {
                ConverseItem::Event(event) => f(event),
                ConverseItem::Reply(reply) => return Ok(reply),
            }
        }
        Err(ParleyError::InvalidState(
            "conversation ended without a reply".to_string(),
        ))
    }
}

impl Stream for ConverseStream<'_> {
    type Item = Result<ConverseItem, ParleyError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl std::fmt::Debug for ConverseStream<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ConverseStream(..)")
    }
}
