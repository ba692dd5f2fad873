//! Prompt composer: renders the next model request from the run state.
//!
//! Output depends only on the mode, the optional override, the catalog
//! description and the [`RunState`], so the same inputs always produce
//! the same bytes.

use std::fmt::Write as _;
use std::str::FromStr;

use super::ledger::RunState;

const EXECUTE_INSTRUCTIONS: &str = "\
You are a helpful assistant that answers questions by reasoning step by step and using tools when they help.

You have access to the following tools:";

const PLAN_INSTRUCTIONS: &str = "\
You are a careful planner. Do not call any tools. Work out a short numbered plan that would answer the question, naming which of the tools below each step would use.

Tools that the plan may refer to:";

const EXECUTE_FORMAT: &str = "\
Use the following format, one item per line:

Thought: what you should do next
Action: the tool to use, exactly as named above
Action Input: the input for the tool, on a single line
Observation: the tool's result (written for you, never by you)
... (Thought/Action/Action Input/Observation can repeat)
Thought: I now know the final answer
Final Answer: the answer to the question";

const PLAN_FORMAT: &str = "\
Use the following format:

Thought: your reasoning about the plan
Final Answer: the numbered plan, on a single line";

/// Which leading instruction block the prompt uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromptMode {
    /// Reason and act with tools until answered.
    #[default]
    Execute,
    /// Produce a plan only.
    Plan,
}

impl FromStr for PromptMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "execute" => Ok(Self::Execute),
            "plan" => Ok(Self::Plan),
            other => Err(format!("unknown prompt mode '{other}' (expected execute or plan)")),
        }
    }
}

/// Builds prompts for the reason-act loop.
#[derive(Debug, Clone, Default)]
pub struct PromptComposer {
    mode: PromptMode,
    custom_prompt: Option<String>,
}

impl PromptComposer {
    pub fn new(mode: PromptMode) -> Self {
        Self {
            mode,
            custom_prompt: None,
        }
    }

    pub fn mode(&self) -> PromptMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PromptMode) {
        self.mode = mode;
    }

    /// Replace the built-in instructions. An empty string clears the override.
    pub fn set_custom_prompt(&mut self, prompt: impl Into<String>) {
        let prompt = prompt.into();
        self.custom_prompt = if prompt.trim().is_empty() {
            None
        } else {
            Some(prompt)
        };
    }

    pub fn custom_prompt(&self) -> Option<&str> {
        self.custom_prompt.as_deref()
    }

    /// Render the prompt for the next model call.
    pub fn compose(&self, state: &RunState, tools: &str) -> String {
        let mut out = String::new();

        match &self.custom_prompt {
            // The override is used as written; catalog and transcript follow it.
            Some(custom) => {
                out.push_str(custom.trim_end());
                out.push_str("\n\nAvailable tools:\n");
                out.push_str(tools);
                out.push_str("\n\nQuestion: ");
                out.push_str(&state.input);
                out.push('\n');
            }
            None => {
                let (instructions, format) = match self.mode {
                    PromptMode::Execute => (EXECUTE_INSTRUCTIONS, EXECUTE_FORMAT),
                    PromptMode::Plan => (PLAN_INSTRUCTIONS, PLAN_FORMAT),
                };
                out.push_str(instructions);
                out.push_str("\n\n");
                out.push_str(tools);
                out.push_str("\n\n");
                out.push_str(format);
                out.push_str("\n\nBegin!\n\nQuestion: ");
                out.push_str(&state.input);
                out.push('\n');
            }
        }

        out.push_str(&render_transcript(state));
        out
    }
}

/// Every prior step in order, one marker line per non-empty field.
pub fn render_transcript(state: &RunState) -> String {
    let mut out = String::new();
    for step in &state.steps {
        for (marker, value) in [
            ("Thought", step.thought.as_str()),
            ("Action", step.action.as_str()),
            ("Action Input", step.action_input.as_str()),
            ("Observation", step.observation_text()),
        ] {
            if !value.is_empty() {
                let _ = writeln!(out, "{marker}: {value}");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::react::ledger::Step;

    const TOOLS: &str = "calculator: does math\nshell: runs commands";

    fn state_with_steps() -> RunState {
        RunState {
            input: "what is 2+2".into(),
            steps: vec![
                Step {
                    thought: "compute".into(),
                    action: "calculator".into(),
                    action_input: "2+2".into(),
                    observation: Some("4".into()),
                },
                Step {
                    thought: "thinking more".into(),
                    ..Step::default()
                },
            ],
            current_index: 2,
        }
    }

    #[test]
    fn compose_is_deterministic() {
        let composer = PromptComposer::default();
        let state = state_with_steps();
        assert_eq!(composer.compose(&state, TOOLS), composer.compose(&state, TOOLS));
    }

    #[test]
    fn execute_prompt_layout() {
        let prompt = PromptComposer::default().compose(&state_with_steps(), TOOLS);
        assert!(prompt.starts_with(EXECUTE_INSTRUCTIONS));
        assert!(prompt.contains("calculator: does math\nshell: runs commands"));
        assert!(prompt.contains("Question: what is 2+2\n"));
        assert!(prompt.ends_with(
            "Thought: compute\nAction: calculator\nAction Input: 2+2\nObservation: 4\nThought: thinking more\n"
        ));
    }

    #[test]
    fn empty_fields_not_rendered() {
        let prompt = PromptComposer::default().compose(&state_with_steps(), TOOLS);
        let tail = prompt.split("Question: what is 2+2\n").nth(1).unwrap();
        assert_eq!(tail.matches("Action:").count(), 1);
        assert_eq!(tail.matches("Observation:").count(), 1);
    }

    #[test]
    fn plan_mode_changes_instructions() {
        let state = state_with_steps();
        let plan = PromptComposer::new(PromptMode::Plan).compose(&state, TOOLS);
        let execute = PromptComposer::new(PromptMode::Execute).compose(&state, TOOLS);
        assert!(plan.starts_with(PLAN_INSTRUCTIONS));
        assert!(plan.contains("Do not call any tools"));
        assert_ne!(plan, execute);
    }

    #[test]
    fn custom_prompt_appends_catalog_and_transcript() {
        let mut composer = PromptComposer::default();
        composer.set_custom_prompt("You are a pirate. Answer in pirate speak.");
        let prompt = composer.compose(&state_with_steps(), TOOLS);

        assert!(prompt.starts_with("You are a pirate. Answer in pirate speak.\n\nAvailable tools:\n"));
        assert!(prompt.contains(TOOLS));
        assert!(!prompt.contains(EXECUTE_INSTRUCTIONS));
        assert!(prompt.ends_with("Observation: 4\nThought: thinking more\n"));
    }

    #[test]
    fn blank_custom_prompt_clears_override() {
        let mut composer = PromptComposer::default();
        composer.set_custom_prompt("custom");
        composer.set_custom_prompt("  ");
        assert!(composer.custom_prompt().is_none());
    }

    #[test]
    fn mode_from_str() {
        assert_eq!("plan".parse::<PromptMode>().unwrap(), PromptMode::Plan);
        assert_eq!(" Execute ".parse::<PromptMode>().unwrap(), PromptMode::Execute);
        assert!("chat".parse::<PromptMode>().is_err());
    }
}
