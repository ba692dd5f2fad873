//! Shell tool: execute system commands.
//!
//! Supports command allowlisting. The per-call timeout is enforced by the
//! dispatcher, not here.

use async_trait::async_trait;
use rustedreason_core::error::ToolError;
use rustedreason_core::tool::{InputFormat, Tool};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::args;

/// Characters that would let a second command ride along after an
/// allowlisted one.
const CHAINING: [&str; 6] = [";", "&&", "||", "|", "`", "$("];

/// Execute shell commands with safety constraints.
pub struct ShellTool {
    /// If non-empty, only these commands are allowed.
    allowed_commands: Vec<String>,
}

impl ShellTool {
    pub fn new(allowed_commands: Vec<String>) -> Self {
        Self { allowed_commands }
    }

    fn is_command_allowed(&self, command: &str) -> bool {
        if self.allowed_commands.is_empty() {
            return true; // No allowlist = all commands allowed
        }

        if CHAINING.iter().any(|c| command.contains(c)) {
            return false;
        }

        let base_cmd = command.split_whitespace().next().unwrap_or("");
        self.allowed_commands.iter().any(|a| a == base_cmd)
    }
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &str {
        "shell"
    }

    fn description(&self) -> &str {
        "Execute a shell command and return stdout/stderr. Input: the command line, e.g. ls -la"
    }

    fn input_format(&self) -> InputFormat {
        InputFormat::Json
    }

    async fn call(&self, input: &str) -> Result<String, ToolError> {
        let command = args::required_str(input, "command")?;

        if !self.is_command_allowed(&command) {
            let base = command.split_whitespace().next().unwrap_or("");
            return Err(ToolError::PermissionDenied(format!(
                "Command '{base}' not in allowlist"
            )));
        }

        debug!(command = %command, "Executing shell command");

        let output = if cfg!(target_os = "windows") {
            Command::new("cmd").args(["/C", &command]).output().await
        } else {
            Command::new("sh").args(["-c", &command]).output().await
        }?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            warn!(command = %command, exit_code = code, "Command failed");
            let text = format!("[exit code: {code}]\n{stdout}\n{stderr}");
            return Err(ToolError::Failed(text.trim().to_string()));
        }

        let text = if stderr.is_empty() {
            stdout.into_owned()
        } else {
            format!("{stdout}\n[stderr]: {stderr}")
        };
        Ok(text.trim().to_string())
    }
}
