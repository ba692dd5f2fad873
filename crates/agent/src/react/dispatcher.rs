//! Capability dispatcher: resolves action names to tools and runs them.
//!
//! Name resolution is exact after normalization: the lookup is keyed by
//! each tool's lowercase name and by its compact form (lowercase with
//! `_`, `-` and spaces removed), so `File Read`, `file_read` and
//! `fileread` all reach the same tool. There is no prefix or fuzzy
//! matching beyond that.
//!
//! Failures inside a tool never abort a run. They come back as an
//! observation reading `Error executing <name>: <message>` so the model
//! can correct itself. Only an unknown name is a hard error.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rustedreason_core::error::{Error, ToolError};
use rustedreason_core::tool::{InputFormat, Tool, ToolCatalog};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::parser::parse_key_values;

/// Resolves and executes tools from a fixed catalog.
pub struct Dispatcher {
    catalog: ToolCatalog,
    lookup: HashMap<String, usize>,
    description: String,
    timeout: Option<Duration>,
}

/// Lowercase, trimmed.
fn lowercase_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Lowercase with separators removed.
fn compact_key(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' ' | '\t'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl Dispatcher {
    /// Build the lookup once. On key collisions the earlier tool wins.
    pub fn new(catalog: ToolCatalog) -> Self {
        let mut lookup = HashMap::new();
        for (index, tool) in catalog.iter().enumerate() {
            lookup.entry(lowercase_key(tool.name())).or_insert(index);
            lookup.entry(compact_key(tool.name())).or_insert(index);
        }
        let description = catalog.describe();

        Self {
            catalog,
            lookup,
            description,
            timeout: None,
        }
    }

    /// Bound every tool call. A call that runs out of time becomes an
    /// error observation, like any other tool failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// `name: description` per tool, in registration order.
    pub fn describe(&self) -> &str {
        &self.description
    }

    pub fn names(&self) -> Vec<&str> {
        self.catalog.names()
    }

    /// Find the tool an action name refers to.
    pub fn resolve(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        let index = self
            .lookup
            .get(&lowercase_key(name))
            .or_else(|| self.lookup.get(&compact_key(name)))?;
        self.catalog.iter().nth(*index)
    }

    /// Run the named tool on `input` and return the observation text.
    ///
    /// # Errors
    ///
    /// [`Error::ToolNotFound`] when the name resolves to nothing, and
    /// [`Error::Cancelled`] when `cancel` fires during the call.
    pub async fn execute(
        &self,
        name: &str,
        input: &str,
        cancel: &CancellationToken,
    ) -> Result<String, Error> {
        let display_name = name.trim();
        let tool = self
            .resolve(name)
            .ok_or_else(|| Error::ToolNotFound(display_name.to_string()))?;

        let payload = match tool.input_format() {
            InputFormat::Raw => input.to_string(),
            InputFormat::Json => coerce_input(tool.name(), input),
        };
        debug!(tool = tool.name(), payload = %payload, "Dispatching tool call");

        let started = Instant::now();
        let call = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, tool.call(&payload))
                    .await
                    .unwrap_or(Err(ToolError::Timeout(limit.as_millis() as u64))),
                None => tool.call(&payload).await,
            }
        };

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(tool = tool.name(), "Tool call cancelled");
                return Err(Error::Cancelled);
            }
            outcome = call => outcome,
        };

        let duration_ms = started.elapsed().as_millis() as u64;
        let status = match &outcome {
            Ok(_) => "ok",
            Err(ToolError::Timeout(_)) => "timeout",
            Err(_) => "error",
        };
        info!(
            target: "rustedreason::audit",
            tool = tool.name(),
            ok = outcome.is_ok(),
            outcome = status,
            duration_ms,
            input_preview = %preview(&payload),
            "tool"
        );

        Ok(match outcome {
            Ok(output) => output,
            Err(e) => format!("Error executing {display_name}: {e}"),
        })
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("tools", &self.catalog.names())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Shape freeform action input into the JSON object a tool expects.
///
/// Input that already starts with `{` passes through unchanged. Text with
/// `key: value` pairs (comma separated, no `://`) becomes an object of
/// those pairs; fragments without a colon are dropped. Anything else lands in one conventional field picked by
/// tool name.
pub fn coerce_input(tool_name: &str, input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with('{') {
        return input.to_string();
    }

    let mut fields = serde_json::Map::new();
    if trimmed.contains(':') && !trimmed.contains("://") {
        for pair in trimmed.split(',').filter(|pair| pair.contains(':')) {
            for (key, value) in parse_key_values(pair) {
                if !key.is_empty() {
                    fields.insert(key, serde_json::Value::String(value));
                }
            }
        }
    }

    if fields.is_empty() {
        fields.insert(
            default_field(tool_name).to_string(),
            serde_json::Value::String(trimmed.to_string()),
        );
    }

    serde_json::Value::Object(fields).to_string()
}

fn default_field(tool_name: &str) -> &'static str {
    match compact_key(tool_name).as_str() {
        "fileread" => "path",
        "filewrite" => "content",
        "bash" | "shell" => "command",
        "webfetch" => "url",
        _ => "input",
    }
}

fn preview(payload: &str) -> String {
    if payload.chars().count() > 200 {
        format!("{}...", payload.chars().take(200).collect::<String>())
    } else {
        payload.to_string()
    }
}
