//! # RustedReason Core
//!
//! Domain types, traits, and error definitions for the RustedReason
//! reason-act loop. This crate has **no framework dependencies**: it
//! defines the seams (model, tool, progress sink, memory) that the other
//! crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator of the loop is a trait here. Implementations
//! live in their respective crates. This enables:
//! - Swapping model backends and tools via configuration
//! - Easy testing with scripted mock implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod memory;
pub mod model;
pub mod progress;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ModelError, Result, SinkError, ToolError};
pub use memory::{ConversationMemory, InMemoryConversation, MemoryMessage, Speaker};
pub use model::Model;
pub use progress::{ChannelSink, EventTally, FanoutSink, ProgressEvent, ProgressSink, TallySnapshot};
pub use tool::{InputFormat, Tool, ToolCatalog};
