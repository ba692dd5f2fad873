//! End-to-end integration tests for the RustedReason reason-act loop.
//!
//! These tests exercise the full pipeline from user input to answer,
//! using a scripted model and the real built-in tools.

use std::sync::{Arc, Mutex};

use rustedreason_agent::react::{Controller, Dispatcher, PromptMode};
use rustedreason_agent::ReactAgent;
use rustedreason_config::AppConfig;
use rustedreason_core::error::{Error, ModelError};
use rustedreason_core::memory::{ConversationMemory, InMemoryConversation, Speaker};
use rustedreason_core::model::Model;
use rustedreason_core::progress::{ChannelSink, EventTally, FanoutSink};
use rustedreason_tools::default_catalog;
use tokio_util::sync::CancellationToken;

// ── Mock Model ───────────────────────────────────────────────────────────

/// A mock model that returns scripted responses in sequence.
struct ScriptedModel {
    responses: Vec<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn new(responses: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            responses: responses.iter().map(|r| r.to_string()).collect(),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Model for ScriptedModel {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn invoke(&self, prompt: &str) -> Result<String, ModelError> {
        let mut prompts = self.prompts.lock().unwrap();
        let Some(response) = self.responses.get(prompts.len()).cloned() else {
            panic!(
                "ScriptedModel exhausted: call #{}, have {}",
                prompts.len(),
                self.responses.len()
            );
        };
        prompts.push(prompt.to_string());
        Ok(response)
    }
}

fn builtin_dispatcher() -> Arc<Dispatcher> {
    let config = AppConfig::default();
    Arc::new(Dispatcher::new(default_catalog(
        config.tools.shell.allowed_commands,
        config.tools.file_read.allowed_roots,
    )))
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn calculator_question_answered_in_two_iterations() {
    let model = ScriptedModel::new(&[
        "Thought: compute\nAction: calculator\nAction Input: 2+2",
        "Thought: done\nFinal Answer: 4",
    ]);
    let mut controller = Controller::new(model.clone(), builtin_dispatcher());

    let answer = controller
        .execute("what is 2+2", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(answer, "4");
    assert_eq!(model.calls(), 2);
    let steps = &controller.ledger().state().steps;
    assert_eq!(steps[0].observation.as_deref(), Some("4"));
    assert!(model.last_prompt().contains("Observation: 4\n"));
}

#[tokio::test]
async fn file_read_with_freeform_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "the meeting is on tuesday").unwrap();

    let first = format!(
        "Thought: read the notes\nAction: File Read\nAction Input: {}",
        path.display()
    );
    let model = ScriptedModel::new(&[first.as_str(), "Thought: found it\nFinal Answer: Tuesday"]);
    let mut controller = Controller::new(model.clone(), builtin_dispatcher());

    let answer = controller
        .execute("when is the meeting?", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(answer, "Tuesday");
    assert_eq!(
        controller.ledger().state().steps[0].observation.as_deref(),
        Some("the meeting is on tuesday")
    );
}

#[tokio::test]
async fn blocked_shell_command_is_observed_not_fatal() {
    let model = ScriptedModel::new(&[
        "Thought: clean up\nAction: shell\nAction Input: rm -rf /tmp/x",
        "Thought: not allowed, stop here\nFinal Answer: I can't delete files.",
    ]);
    let mut controller = Controller::new(model.clone(), builtin_dispatcher());

    let answer = controller
        .execute("delete the temp dir", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(answer, "I can't delete files.");
    let observation = controller.ledger().state().steps[0]
        .observation
        .clone()
        .unwrap();
    assert!(observation.starts_with("Error executing shell: permission denied"));
}

#[tokio::test]
async fn unknown_tool_fails_the_run() {
    let model = ScriptedModel::new(&["Thought: search\nAction: web_search\nAction Input: rust"]);
    let mut controller = Controller::new(model, builtin_dispatcher());

    let err = controller
        .execute("latest rust release?", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ToolNotFound(ref name) if name == "web_search"));
    assert_eq!(err.stage(), "dispatch");
    assert_eq!(controller.ledger().len(), 1);
}

#[tokio::test]
async fn exhausted_run_returns_best_answer() {
    let model = ScriptedModel::new(&[
        "Thought: multiply\nAction: calculator\nAction Input: 6*7",
        "Thought: I need to double check\nAction: calculator\nAction Input: 7*6",
    ]);
    let mut controller =
        Controller::new(model.clone(), builtin_dispatcher()).with_max_iterations(2);

    let answer = controller
        .execute("what is six times seven", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(answer, "42");
    assert_eq!(model.calls(), 2);
}

#[tokio::test]
async fn agent_streams_events_and_remembers() {
    let model = ScriptedModel::new(&[
        "Thought: compute\nAction: calculator\nAction Input: (2 + 3) * 4",
        "Thought: done\nFinal Answer: 20",
    ]);
    let (channel, mut events) = ChannelSink::new(16);
    let tally = Arc::new(EventTally::new());
    let sink = FanoutSink::new()
        .with(Arc::new(channel))
        .with(tally.clone());
    let memory = Arc::new(InMemoryConversation::new());

    let controller = Controller::new(model, builtin_dispatcher())
        .with_mode(PromptMode::Execute)
        .with_sink(Arc::new(sink));
    let mut agent = ReactAgent::new(controller).with_memory(memory.clone());

    let answer = agent
        .execute("what is (2+3)*4", &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(answer, "20");

    let mut kinds = Vec::new();
    while let Ok(event) = events.try_recv() {
        kinds.push(event.event_type());
    }
    assert_eq!(
        kinds,
        vec!["thought", "action", "action_input", "observation", "thought", "answer"]
    );

    let totals = tally.snapshot();
    assert_eq!(totals.thoughts, 2);
    assert_eq!(totals.actions, 1);
    assert_eq!(totals.observations, 1);
    assert_eq!(totals.answers, 1);
    assert_eq!(totals.errors, 0);

    let history = memory.messages().await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].speaker, Speaker::User);
    assert_eq!(history[1].content, "20");
}

#[tokio::test]
async fn cancelled_before_start() {
    let model = ScriptedModel::new(&["Final Answer: never"]);
    let mut controller = Controller::new(model.clone(), builtin_dispatcher());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = controller.execute("anything", &cancel).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled));
    assert_eq!(model.calls(), 0);
    assert!(controller.ledger().is_empty());
}
