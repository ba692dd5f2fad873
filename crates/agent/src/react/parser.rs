//! Response parser: turns raw model text into a [`ParsedStep`].
//!
//! Markers are matched case-insensitively at the start of a line
//! (leading whitespace allowed): `Thought:`, `Action:`, `Action Input:`,
//! `Observation:`, `Final Answer:`. Only the first line carrying a value
//! counts for each marker, and values never continue onto the next line.
//!
//! Parsing never fails. Text without any of the `Thought`, `Action` or
//! `Final Answer` markers is classified as a final answer, unless it
//! mentions `thought:` or `action:` somewhere, in which case it becomes
//! the thought.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// One marker per line; `action\s+input` is listed before `action` so the
/// alternation prefers the longer marker.
static MARKER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[ \t]*(final[ \t]+answer|action[ \t]+input|action|thought|observation)[ \t]*:(.*)$",
    )
    .expect("marker pattern is valid")
});

/// A model response broken into its reason-act parts.
///
/// Every field is trimmed; an empty string means "not present".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedStep {
    pub thought: String,
    pub action: String,
    pub action_input: String,
    pub observation: String,
    pub final_answer: String,
    pub raw: String,
}

#[derive(Debug, Clone, Copy)]
enum Marker {
    Thought,
    Action,
    ActionInput,
    Observation,
    FinalAnswer,
}

impl Marker {
    fn from_label(label: &str) -> Self {
        let compact: String = label
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        match compact.as_str() {
            "finalanswer" => Self::FinalAnswer,
            "actioninput" => Self::ActionInput,
            "action" => Self::Action,
            "observation" => Self::Observation,
            _ => Self::Thought,
        }
    }
}

impl ParsedStep {
    fn slot(&mut self, marker: Marker) -> &mut String {
        match marker {
            Marker::Thought => &mut self.thought,
            Marker::Action => &mut self.action,
            Marker::ActionInput => &mut self.action_input,
            Marker::Observation => &mut self.observation,
            Marker::FinalAnswer => &mut self.final_answer,
        }
    }

    /// True when the model declared it is done.
    pub fn is_final(&self) -> bool {
        !self.final_answer.is_empty()
    }
}

/// Parse a raw model response. Total: every input yields a step.
pub fn parse(raw: &str) -> ParsedStep {
    let mut step = ParsedStep {
        raw: raw.to_string(),
        ..ParsedStep::default()
    };

    for line in raw.lines() {
        let Some(caps) = MARKER_LINE.captures(line) else {
            continue;
        };
        let marker = Marker::from_label(&caps[1]);
        let value = caps[2].trim();
        let slot = step.slot(marker);
        if slot.is_empty() && !value.is_empty() {
            *slot = value.to_string();
        }
    }

    if step.thought.is_empty() && step.action.is_empty() && step.final_answer.is_empty() {
        let lower = raw.to_lowercase();
        let trimmed = raw.trim().to_string();
        if lower.contains("thought:") || lower.contains("action:") {
            step.thought = trimmed;
        } else {
            step.final_answer = trimmed;
        }
    }

    step
}

/// Permissive `key: value` splitter for freeform action input.
///
/// Splits at the first colon that does not start a `://` scheme
/// separator. Input with no such colon maps to `{"input": <input>}`.
pub fn parse_key_values(input: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();

    let split_at = input
        .match_indices(':')
        .map(|(i, _)| i)
        .find(|&i| !input[i..].starts_with("://"));

    match split_at {
        Some(i) => {
            out.insert(
                input[..i].trim().to_string(),
                input[i + 1..].trim().to_string(),
            );
        }
        None => {
            out.insert("input".to_string(), input.trim().to_string());
        }
    }
    out
}
