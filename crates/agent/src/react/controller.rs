//! Loop controller: drives one reason-act run to completion.
//!
//! Per iteration: compose a prompt, invoke the model, parse the reply,
//! record it, return on a final answer, otherwise dispatch the action and
//! record the observation, then ask the termination policy. A run that
//! ends without a final answer returns the ledger's best answer, not an
//! error.
//!
//! Only three failures leave [`Controller::execute`]: a model error, an
//! unknown tool name, and cancellation.

use std::sync::Arc;

use rustedreason_core::error::Error;
use rustedreason_core::model::Model;
use rustedreason_core::progress::{ProgressEvent, ProgressSink};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use super::dispatcher::Dispatcher;
use super::ledger::Ledger;
use super::parser;
use super::policy::{HeuristicPolicy, StopReason, TerminationPolicy};
use super::prompt::{PromptComposer, PromptMode};

pub const DEFAULT_MAX_ITERATIONS: usize = 5;

/// Orchestrates the parser, ledger, dispatcher, composer and policy.
pub struct Controller {
    model: Arc<dyn Model>,
    dispatcher: Arc<Dispatcher>,
    composer: PromptComposer,
    policy: Box<dyn TerminationPolicy>,
    ledger: Ledger,
    max_iterations: usize,
    sink: Option<Arc<dyn ProgressSink>>,
}

impl Controller {
    pub fn new(model: Arc<dyn Model>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            model,
            dispatcher,
            composer: PromptComposer::default(),
            policy: Box::new(HeuristicPolicy),
            ledger: Ledger::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            sink: None,
        }
    }

    /// Set max iterations. Zero is treated as one.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// Attach a progress sink.
    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Replace the default [`HeuristicPolicy`].
    pub fn with_policy(mut self, policy: Box<dyn TerminationPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_mode(mut self, mode: PromptMode) -> Self {
        self.composer.set_mode(mode);
        self
    }

    pub fn with_custom_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.composer.set_custom_prompt(prompt);
        self
    }

    pub fn set_custom_prompt(&mut self, prompt: impl Into<String>) {
        self.composer.set_custom_prompt(prompt);
    }

    pub fn composer(&self) -> &PromptComposer {
        &self.composer
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// The ledger of the most recent run. Empty after a cancelled run.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Run the loop for `input` until it answers, stops, or fails.
    pub async fn execute(
        &mut self,
        input: &str,
        cancel: &CancellationToken,
    ) -> Result<String, Error> {
        let run_id = Uuid::new_v4();
        let span = info_span!("react_run", %run_id);
        self.run(input, cancel).instrument(span).await
    }

    async fn run(&mut self, input: &str, cancel: &CancellationToken) -> Result<String, Error> {
        self.ledger.reset();
        self.ledger.set_input(input);

        info!(
            model = self.model.name(),
            max_iterations = self.max_iterations,
            tools = self.dispatcher.names().len(),
            "Reason-act run starting"
        );

        let result = self.iterate(cancel).await;

        match &result {
            Ok(answer) => {
                info!(
                    iterations = self.ledger.len(),
                    answer_len = answer.len(),
                    "Reason-act run completed"
                );
            }
            Err(e) => {
                warn!(stage = e.stage(), error = %e, "Reason-act run failed");
                self.emit(ProgressEvent::error(e.to_string(), e.stage()));
                if matches!(e, Error::Cancelled) {
                    self.ledger.reset();
                }
            }
        }
        result
    }

    async fn iterate(&mut self, cancel: &CancellationToken) -> Result<String, Error> {
        for iteration in 1..=self.max_iterations {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let prompt = self
                .composer
                .compose(self.ledger.state(), self.dispatcher.describe());
            debug!(iteration, prompt_len = prompt.len(), "Invoking model");

            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                response = self.model.invoke(&prompt) => response?,
            };

            let parsed = parser::parse(&response);
            self.ledger.add_step(&parsed);
            if !parsed.thought.is_empty() {
                self.emit(ProgressEvent::thought(&parsed.thought));
            }

            if parsed.is_final() {
                self.emit(ProgressEvent::answer(&parsed.final_answer));
                return Ok(parsed.final_answer);
            }

            if self.ledger.has_action() {
                let (action, action_input) = match self.ledger.state().last_step() {
                    Some(step) => (step.action.clone(), step.action_input.clone()),
                    None => break,
                };
                self.emit(ProgressEvent::action(&action));
                self.emit(ProgressEvent::action_input(&action_input));

                let observation = self
                    .dispatcher
                    .execute(&action, &action_input, cancel)
                    .await?;

                self.emit(ProgressEvent::observation(&observation));
                self.ledger.add_observation(&observation);
            }

            if let Some(reason) = self.policy.should_stop(&self.ledger, self.max_iterations) {
                match reason {
                    StopReason::Stuck => warn!(iteration, "Model repeated the same action, stopping"),
                    StopReason::IterationCap => warn!(iteration, "Max iterations reached"),
                    other => debug!(iteration, reason = ?other, "Termination policy stopped the run"),
                }
                break;
            }
        }

        Ok(self.ledger.best_answer())
    }

    /// Deliver an event. A failing sink is logged and otherwise ignored.
    fn emit(&self, event: ProgressEvent) {
        let Some(sink) = &self.sink else {
            return;
        };
        if let Err(e) = sink.emit(&event) {
            warn!(event = event.event_type(), error = %e, "Progress sink rejected event");
        }
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("model", &self.model.name())
            .field("dispatcher", &self.dispatcher)
            .field("mode", &self.composer.mode())
            .field("max_iterations", &self.max_iterations)
            .field("steps", &self.ledger.len())
            .finish()
    }
}
