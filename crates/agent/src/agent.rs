//! `ReactAgent`: the reason-act controller plus conversation memory.
//!
//! The controller never touches memory. After a successful run the agent
//! records the user's input and the returned answer, in that order.
//! Failed and cancelled runs leave memory untouched.

use std::sync::Arc;

use rustedreason_core::error::Error;
use rustedreason_core::memory::{ConversationMemory, MemoryMessage};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::react::{Controller, Ledger};

pub struct ReactAgent {
    controller: Controller,
    memory: Option<Arc<dyn ConversationMemory>>,
}

impl ReactAgent {
    pub fn new(controller: Controller) -> Self {
        Self {
            controller,
            memory: None,
        }
    }

    /// Attach durable conversation history.
    pub fn with_memory(mut self, memory: Arc<dyn ConversationMemory>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Replace the built-in instructions for every following run.
    pub fn set_custom_prompt(&mut self, prompt: impl Into<String>) {
        self.controller.set_custom_prompt(prompt);
    }

    /// Run the loop, then remember the exchange.
    pub async fn execute(
        &mut self,
        input: &str,
        cancel: &CancellationToken,
    ) -> Result<String, Error> {
        let answer = self.controller.execute(input, cancel).await?;

        if let Some(memory) = &self.memory {
            memory.add_user_message(input).await?;
            memory.add_assistant_message(&answer).await?;
            debug!("Exchange recorded in conversation memory");
        }
        Ok(answer)
    }

    /// Forget the conversation. A no-op without memory.
    pub async fn clear_memory(&self) -> Result<(), Error> {
        if let Some(memory) = &self.memory {
            memory.clear().await?;
        }
        Ok(())
    }

    /// Remembered messages, oldest first. Empty without memory.
    pub async fn history(&self) -> Result<Vec<MemoryMessage>, Error> {
        match &self.memory {
            Some(memory) => Ok(memory.messages().await?),
            None => Ok(Vec::new()),
        }
    }

    pub fn ledger(&self) -> &Ledger {
        self.controller.ledger()
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }
}
