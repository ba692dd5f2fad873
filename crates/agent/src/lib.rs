//! The reason-act loop of RustedReason.
//!
//! The controller follows a **Thought → Action → Observation** cycle:
//!
//! 1. **Compose** a prompt from the step history and the tool catalog
//! 2. **Invoke** the model
//! 3. **Parse** its reply into thought, action and final answer
//! 4. **If final answer**: return it
//! 5. **If action**: run the tool, record the observation
//! 6. **Decide** whether to stop, otherwise loop back to step 1
//!
//! A run that stops without a final answer returns the best answer seen
//! so far. [`ReactAgent`] wraps the controller with conversation memory.

pub mod agent;
pub mod react;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use agent::ReactAgent;
pub use react::{
    Controller, Dispatcher, HeuristicPolicy, Ledger, ParsedStep, PromptComposer, PromptMode,
    RunState, Step, StopReason, TerminationPolicy,
};
