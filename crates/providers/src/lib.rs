//! Model backend implementations for RustedReason.
//!
//! All backends implement the `rustedreason_core::Model` trait.
//! [`build_from_config`] picks one based on configuration and wraps it
//! in a [`RetryModel`] for transient transport failures.

pub mod openai_compat;
pub mod retry;
pub mod router;

pub use openai_compat::OpenAiCompatModel;
pub use retry::RetryModel;
pub use router::build_from_config;
