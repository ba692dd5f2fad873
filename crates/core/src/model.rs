//! Model trait: the abstraction over language-model backends.
//!
//! The reason-act loop treats one model call as an atomic
//! request/response: a rendered prompt goes in, completion text comes
//! out. Streaming, retries and transport details belong to the
//! implementation (see `RetryModel` in the providers crate), never to
//! the loop.

use async_trait::async_trait;
use crate::error::ModelError;

/// The core Model trait.
///
/// Every backend (OpenAI-compatible HTTP, scripted test doubles) implements
/// this trait. The controller calls `invoke()` without knowing which
/// backend is in use.
#[async_trait]
pub trait Model: Send + Sync {
    /// A human-readable name for this model backend (e.g., "openai", "ollama").
    fn name(&self) -> &str;

    /// Send a prompt and get the complete completion text.
    async fn invoke(&self, prompt: &str) -> std::result::Result<String, ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UppercaseModel;

    #[async_trait]
    impl Model for UppercaseModel {
        fn name(&self) -> &str {
            "uppercase"
        }

        async fn invoke(&self, prompt: &str) -> Result<String, ModelError> {
            Ok(prompt.to_uppercase())
        }
    }

    #[tokio::test]
    async fn model_is_object_safe() {
        let model: Box<dyn Model> = Box::new(UppercaseModel);
        assert_eq!(model.invoke("hi").await.unwrap(), "HI");
    }
}
