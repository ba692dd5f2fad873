//! Termination policy: decides after each iteration whether to stop.

use super::ledger::{Ledger, RunState, is_error_observation};

/// Why a run stopped before the model gave a final answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    IterationCap,
    Stuck,
    SufficientObservation,
    ConcludingThought,
}

/// Pluggable stop condition, evaluated after every iteration.
pub trait TerminationPolicy: Send + Sync {
    fn should_stop(&self, ledger: &Ledger, max_iterations: usize) -> Option<StopReason>;
}

const CONCLUDING_PHRASES: [&str; 4] = ["the answer is", "therefore", "in conclusion", "final answer"];
const COUNTING_CUES: [&str; 3] = ["how many", "count", "number of"];
const LISTING_CUES: [&str; 3] = ["file", "directory", "list"];

/// The default policy: iteration cap, stuck detection, then a text
/// heuristic over the latest observation and thought.
///
/// The heuristic is a proxy for "the question looks answered". Swap in a
/// different [`TerminationPolicy`] for anything stricter.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPolicy;

impl HeuristicPolicy {
    /// Does this observation plausibly answer `question`?
    pub fn observation_suffices(observation: &str, question: &str) -> bool {
        if observation.starts_with("Error:")
            || observation.contains("not found")
            || observation.contains("failed")
        {
            return false;
        }

        let question = question.to_lowercase();
        let length = observation.chars().count();

        if COUNTING_CUES.iter().any(|cue| question.contains(cue)) {
            return observation.chars().any(|c| c.is_ascii_digit());
        }
        if LISTING_CUES.iter().any(|cue| question.contains(cue)) {
            return length > 20;
        }
        length > 30
    }

    pub fn thought_concludes(thought: &str) -> bool {
        let thought = thought.to_lowercase();
        CONCLUDING_PHRASES.iter().any(|p| thought.contains(p))
    }

    fn has_good_answer(state: &RunState) -> Option<StopReason> {
        let last = state.last_step()?;

        if let Some(observation) = last.observation.as_deref()
            && !observation.is_empty()
            && !is_error_observation(observation)
            && Self::observation_suffices(observation, &state.input)
        {
            return Some(StopReason::SufficientObservation);
        }

        Self::thought_concludes(&last.thought).then_some(StopReason::ConcludingThought)
    }
}

impl TerminationPolicy for HeuristicPolicy {
    fn should_stop(&self, ledger: &Ledger, max_iterations: usize) -> Option<StopReason> {
        let state = ledger.state();
        if state.current_index >= max_iterations {
            return Some(StopReason::IterationCap);
        }
        if ledger.is_stuck() {
            return Some(StopReason::Stuck);
        }
        Self::has_good_answer(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::react::parser::ParsedStep;

    fn ledger(input: &str, steps: &[(&str, &str, Option<&str>)]) -> Ledger {
        let mut ledger = Ledger::new();
        ledger.set_input(input);
        for (thought, action, observation) in steps {
            ledger.add_step(&ParsedStep {
                thought: thought.to_string(),
                action: action.to_string(),
                action_input: if action.is_empty() { String::new() } else { "x".into() },
                ..ParsedStep::default()
            });
            if let Some(o) = observation {
                ledger.add_observation(o);
            }
        }
        ledger
    }

    #[test]
    fn empty_ledger_continues() {
        assert_eq!(HeuristicPolicy.should_stop(&Ledger::new(), 5), None);
    }

    #[test]
    fn iteration_cap() {
        let l = ledger("q", &[("a", "", None), ("b", "", None)]);
        assert_eq!(HeuristicPolicy.should_stop(&l, 2), Some(StopReason::IterationCap));
        assert_eq!(HeuristicPolicy.should_stop(&l, 3), None);
    }

    #[test]
    fn stuck_detected() {
        let l = ledger(
            "q",
            &[("", "search", Some("no")), ("", "search", Some("no")), ("", "search", Some("no"))],
        );
        assert_eq!(HeuristicPolicy.should_stop(&l, 10), Some(StopReason::Stuck));
    }

    #[test]
    fn long_observation_suffices() {
        let l = ledger(
            "who wrote it?",
            &[("look", "search", Some("It was written by a committee of many authors."))],
        );
        assert_eq!(
            HeuristicPolicy.should_stop(&l, 5),
            Some(StopReason::SufficientObservation)
        );
    }

    #[test]
    fn short_observation_continues() {
        let l = ledger("who wrote it?", &[("look", "search", Some("a committee"))]);
        assert_eq!(HeuristicPolicy.should_stop(&l, 5), None);
    }

    #[test]
    fn counting_question_needs_digit() {
        assert!(HeuristicPolicy::observation_suffices("3", "How many files are there?"));
        assert!(!HeuristicPolicy::observation_suffices(
            "there are several of them in the folder, quite a lot",
            "How many files are there?"
        ));
    }

    #[test]
    fn listing_question_threshold() {
        assert!(HeuristicPolicy::observation_suffices("a.txt b.txt c.txt d.txt", "list the files"));
        assert!(!HeuristicPolicy::observation_suffices("a.txt", "list the files"));
    }

    #[test]
    fn failure_words_rejected() {
        for o in [
            "Error: the long and detailed failure message here",
            "the requested resource was not found on this server",
            "the operation failed after a long and careful attempt",
        ] {
            assert!(!HeuristicPolicy::observation_suffices(o, "anything"), "{o}");
        }
    }

    #[test]
    fn error_observation_falls_through_to_thought() {
        let l = ledger(
            "q",
            &[("therefore I will retry", "tool", Some("Error executing tool: disk full, please retry later"))],
        );
        assert_eq!(
            HeuristicPolicy.should_stop(&l, 5),
            Some(StopReason::ConcludingThought)
        );

        let l = ledger("q", &[("let me retry", "tool", Some("Error executing tool: disk full, please retry later"))]);
        assert_eq!(HeuristicPolicy.should_stop(&l, 5), None);
    }

    #[test]
    fn concluding_thought() {
        for t in ["The answer is 7", "Therefore, 7", "In conclusion: 7", "my FINAL ANSWER is 7"] {
            assert!(HeuristicPolicy::thought_concludes(t), "{t}");
        }
        assert!(!HeuristicPolicy::thought_concludes("I need to look this up"));
    }
}
