//! The reason-act core.
//!
//! Leaves first:
//!
//! - [`ledger`]: append-only step history, stuck and best-answer signals
//! - [`parser`]: marker extraction with a guaranteed fallback
//! - [`dispatcher`]: normalized tool lookup and failure-to-observation
//! - [`prompt`]: deterministic prompt rendering
//! - [`policy`]: pluggable stop conditions
//! - [`controller`]: the loop itself

pub mod controller;
pub mod dispatcher;
pub mod ledger;
pub mod parser;
pub mod policy;
pub mod prompt;

pub use controller::{Controller, DEFAULT_MAX_ITERATIONS};
pub use dispatcher::{Dispatcher, coerce_input};
pub use ledger::{Ledger, RunState, Step, is_error_observation};
pub use parser::{ParsedStep, parse, parse_key_values};
pub use policy::{HeuristicPolicy, StopReason, TerminationPolicy};
pub use prompt::{PromptComposer, PromptMode};
