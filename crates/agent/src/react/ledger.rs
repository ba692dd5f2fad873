//! State ledger: the append-only step history of one run.
//!
//! Besides recording steps, the ledger derives two signals the loop
//! needs: whether the model is stuck repeating one action, and the best
//! answer available when the run ends without an explicit final answer.

use serde::Serialize;

use super::parser::ParsedStep;

/// Thoughts containing this phrase are still working, not answering.
const IN_PROGRESS_MARKER: &str = "i need to";

/// How many consecutive identical actions count as stuck.
const STUCK_WINDOW: usize = 3;

/// One thought/action/observation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Step {
    pub thought: String,
    /// Empty when the step took no action.
    pub action: String,
    /// Always empty when `action` is.
    pub action_input: String,
    /// Written at most once, after the step's tool call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
}

impl Step {
    pub fn has_action(&self) -> bool {
        !self.action.is_empty()
    }

    pub fn observation_text(&self) -> &str {
        self.observation.as_deref().unwrap_or("")
    }
}

/// Everything recorded for a single `execute` call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunState {
    pub input: String,
    pub steps: Vec<Step>,
    /// Always equal to `steps.len()`.
    pub current_index: usize,
}

impl RunState {
    pub fn last_step(&self) -> Option<&Step> {
        self.steps.last()
    }
}

/// True for observations that report a failure rather than a result.
pub fn is_error_observation(text: &str) -> bool {
    text.starts_with("Error:") || text.starts_with("Error executing ")
}

/// Owner of the [`RunState`] for one run at a time.
#[derive(Debug, Default)]
pub struct Ledger {
    state: RunState,
    candidates: Vec<String>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous run entirely.
    pub fn reset(&mut self) {
        self.state = RunState::default();
        self.candidates.clear();
    }

    pub fn set_input(&mut self, input: &str) {
        self.state.input = input.to_string();
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn len(&self) -> usize {
        self.state.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.steps.is_empty()
    }

    /// Append a parsed response as a new step.
    ///
    /// An action input without an action is dropped. An action with an
    /// empty input is kept: some tools take no arguments.
    pub fn add_step(&mut self, parsed: &ParsedStep) {
        let action_input = if parsed.action.is_empty() {
            String::new()
        } else {
            parsed.action_input.clone()
        };

        self.state.steps.push(Step {
            thought: parsed.thought.clone(),
            action: parsed.action.clone(),
            action_input,
            observation: None,
        });
        self.state.current_index = self.state.steps.len();

        if !parsed.thought.is_empty() && !parsed.thought.to_lowercase().contains(IN_PROGRESS_MARKER)
        {
            self.candidates.push(parsed.thought.clone());
        }
    }

    /// Record the observation for the latest step.
    ///
    /// Returns `false` without changing anything when there is no step or
    /// the latest step already has an observation.
    pub fn add_observation(&mut self, text: &str) -> bool {
        let Some(step) = self.state.steps.last_mut() else {
            return false;
        };
        if step.observation.is_some() {
            return false;
        }

        step.observation = Some(text.to_string());
        if !text.is_empty() && !is_error_observation(text) {
            self.candidates.push(text.to_string());
        }
        true
    }

    /// The answer to return when no explicit final answer was given.
    ///
    /// Newest non-error observation first, then the newest candidate
    /// answer, then the newest thought (possibly empty).
    pub fn best_answer(&self) -> String {
        let observed = self.state.steps.iter().rev().find_map(|step| {
            step.observation
                .as_deref()
                .filter(|o| !o.is_empty() && !is_error_observation(o))
        });
        if let Some(observation) = observed {
            return observation.to_string();
        }

        if let Some(candidate) = self.candidates.last() {
            return candidate.clone();
        }

        self.state
            .last_step()
            .map(|step| step.thought.clone())
            .unwrap_or_default()
    }

    pub fn has_action(&self) -> bool {
        self.state.last_step().is_some_and(Step::has_action)
    }

    /// True when the last three steps that took an action all took the
    /// same one.
    pub fn is_stuck(&self) -> bool {
        let recent: Vec<&str> = self
            .state
            .steps
            .iter()
            .rev()
            .filter(|step| step.has_action())
            .take(STUCK_WINDOW)
            .map(|step| step.action.as_str())
            .collect();

        recent.len() == STUCK_WINDOW && recent.windows(2).all(|pair| pair[0] == pair[1])
    }
}
