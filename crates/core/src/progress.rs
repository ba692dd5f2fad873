//! Progress events: the outbound stream of a reason-act run.
//!
//! The controller reports each thought, action, observation and answer
//! to an optional [`ProgressSink`]. Delivery is fire-and-forget: a sink
//! that is slow, full or gone must never stall the loop, so every sink
//! here is non-blocking and the controller swallows its errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use crate::error::SinkError;

/// Events emitted by the controller while a run progresses.
///
/// Wire names:
/// - `thought`     : reasoning text parsed from the model
/// - `action`      : the tool the model chose
/// - `action_input`: the raw input for that tool
/// - `observation` : what the tool returned (or its error text)
/// - `answer`      : the final answer that ended the run
/// - `error`       : a fatal error that aborted the run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Thought { content: String, at: DateTime<Utc> },

    Action { name: String, at: DateTime<Utc> },

    ActionInput { input: String, at: DateTime<Utc> },

    Observation { content: String, at: DateTime<Utc> },

    Answer { content: String, at: DateTime<Utc> },

    Error { message: String, stage: String, at: DateTime<Utc> },
}

impl ProgressEvent {
    pub fn thought(content: impl Into<String>) -> Self {
        Self::Thought { content: content.into(), at: Utc::now() }
    }

    pub fn action(name: impl Into<String>) -> Self {
        Self::Action { name: name.into(), at: Utc::now() }
    }

    pub fn action_input(input: impl Into<String>) -> Self {
        Self::ActionInput { input: input.into(), at: Utc::now() }
    }

    pub fn observation(content: impl Into<String>) -> Self {
        Self::Observation { content: content.into(), at: Utc::now() }
    }

    pub fn answer(content: impl Into<String>) -> Self {
        Self::Answer { content: content.into(), at: Utc::now() }
    }

    pub fn error(message: impl Into<String>, stage: impl Into<String>) -> Self {
        Self::Error { message: message.into(), stage: stage.into(), at: Utc::now() }
    }

    /// Wire name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Thought { .. } => "thought",
            Self::Action { .. } => "action",
            Self::ActionInput { .. } => "action_input",
            Self::Observation { .. } => "observation",
            Self::Answer { .. } => "answer",
            Self::Error { .. } => "error",
        }
    }

    /// The text payload carried by the event.
    pub fn payload(&self) -> &str {
        match self {
            Self::Thought { content, .. }
            | Self::Observation { content, .. }
            | Self::Answer { content, .. } => content,
            Self::Action { name, .. } => name,
            Self::ActionInput { input, .. } => input,
            Self::Error { message, .. } => message,
        }
    }
}

/// Receiver of progress events, typically a UI.
///
/// Implementations must return promptly; blocking here blocks the run.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: &ProgressEvent) -> Result<(), SinkError>;
}

/// Forwards events into a bounded tokio channel without waiting.
///
/// When the consumer falls behind the event is dropped and
/// [`SinkError::Full`] is reported.
pub struct ChannelSink {
    sender: mpsc::Sender<ProgressEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver that drains it.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ProgressEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, event: &ProgressEvent) -> Result<(), SinkError> {
        self.sender.try_send(event.clone()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SinkError::Full,
            mpsc::error::TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}

/// Counts events per kind.
///
/// Usage accounting attaches here, as an observer of the event stream,
/// rather than as state inside the controller.
#[derive(Debug, Default)]
pub struct EventTally {
    thoughts: AtomicU64,
    actions: AtomicU64,
    observations: AtomicU64,
    answers: AtomicU64,
    errors: AtomicU64,
}

/// A point-in-time copy of an [`EventTally`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TallySnapshot {
    pub thoughts: u64,
    pub actions: u64,
    pub observations: u64,
    pub answers: u64,
    pub errors: u64,
}

impl EventTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> TallySnapshot {
        TallySnapshot {
            thoughts: self.thoughts.load(Ordering::Relaxed),
            actions: self.actions.load(Ordering::Relaxed),
            observations: self.observations.load(Ordering::Relaxed),
            answers: self.answers.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

impl ProgressSink for EventTally {
    fn emit(&self, event: &ProgressEvent) -> Result<(), SinkError> {
        let counter = match event {
            ProgressEvent::Thought { .. } => &self.thoughts,
            ProgressEvent::Action { .. } => &self.actions,
            // The input is reported alongside its action; not counted twice.
            ProgressEvent::ActionInput { .. } => return Ok(()),
            ProgressEvent::Observation { .. } => &self.observations,
            ProgressEvent::Answer { .. } => &self.answers,
            ProgressEvent::Error { .. } => &self.errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Delivers every event to several sinks.
///
/// A failing sink does not stop delivery to the others; the last error
/// seen is reported.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn ProgressSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl ProgressSink for FanoutSink {
    fn emit(&self, event: &ProgressEvent) -> Result<(), SinkError> {
        let mut result = Ok(());
        for sink in &self.sinks {
            if let Err(e) = sink.emit(event) {
                result = Err(e);
            }
        }
        result
    }
}
