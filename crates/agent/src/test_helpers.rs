//! Shared test doubles for the reason-act tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rustedreason_core::error::{ModelError, SinkError, ToolError};
use rustedreason_core::model::Model;
use rustedreason_core::progress::{ProgressEvent, ProgressSink};
use rustedreason_core::tool::{InputFormat, Tool};

/// A model that returns a sequence of scripted responses.
///
/// Each call to `invoke` returns the next response in the queue. When
/// built with [`ScriptedModel::repeating`] the single response is
/// returned forever; otherwise running out of responses panics.
pub struct ScriptedModel {
    responses: Vec<String>,
    repeat: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: responses.into_iter().map(String::from).collect(),
            repeat: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn repeating(response: &str) -> Self {
        Self {
            repeat: true,
            ..Self::new(vec![response])
        }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Every prompt received, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Model for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn invoke(&self, prompt: &str) -> Result<String, ModelError> {
        let mut prompts = self.prompts.lock().unwrap();
        let index = if self.repeat { 0 } else { prompts.len() };
        let Some(response) = self.responses.get(index) else {
            panic!(
                "ScriptedModel: no more responses (call #{}, have {})",
                prompts.len(),
                self.responses.len()
            );
        };
        prompts.push(prompt.to_string());
        Ok(response.clone())
    }
}

/// A model whose backend is always down.
pub struct FailingModel;

#[async_trait]
impl Model for FailingModel {
    fn name(&self) -> &str {
        "failing"
    }

    async fn invoke(&self, _prompt: &str) -> Result<String, ModelError> {
        Err(ModelError::Network("connection refused".into()))
    }
}

/// A model that never answers.
pub struct PendingModel;

#[async_trait]
impl Model for PendingModel {
    fn name(&self) -> &str {
        "pending"
    }

    async fn invoke(&self, _prompt: &str) -> Result<String, ModelError> {
        std::future::pending().await
    }
}

/// Returns its input unchanged.
pub struct EchoTool {
    name: String,
}

impl EchoTool {
    pub fn named(name: &str) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Echoes the input back"
    }

    async fn call(&self, input: &str) -> Result<String, ToolError> {
        Ok(input.to_string())
    }
}

/// Like [`EchoTool`], but asks the dispatcher for JSON input.
pub struct JsonEchoTool {
    name: String,
}

impl JsonEchoTool {
    pub fn named(name: &str) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Tool for JsonEchoTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Echoes the JSON payload back"
    }

    fn input_format(&self) -> InputFormat {
        InputFormat::Json
    }

    async fn call(&self, input: &str) -> Result<String, ToolError> {
        Ok(input.to_string())
    }
}

/// Always fails with a fixed message.
pub struct FailingTool {
    name: String,
    message: String,
}

impl FailingTool {
    pub fn new(name: &str, message: &str) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    async fn call(&self, _input: &str) -> Result<String, ToolError> {
        Err(ToolError::Failed(self.message.clone()))
    }
}

/// Sleeps before answering; named `slow`.
pub struct SlowTool {
    delay: Duration,
}

impl SlowTool {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Tool for SlowTool {
    fn name(&self) -> &str {
        "slow"
    }

    fn description(&self) -> &str {
        "Takes its time"
    }

    async fn call(&self, _input: &str) -> Result<String, ToolError> {
        tokio::time::sleep(self.delay).await;
        Ok("finally".into())
    }
}

/// Records every event it receives.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingSink {
    pub fn types(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type().to_string())
            .collect()
    }

    pub fn payloads(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.payload().to_string())
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: &ProgressEvent) -> Result<(), SinkError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Rejects every event.
pub struct FailingSink;

impl ProgressSink for FailingSink {
    fn emit(&self, _event: &ProgressEvent) -> Result<(), SinkError> {
        Err(SinkError::Closed)
    }
}
