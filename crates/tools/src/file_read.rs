//! File read tool: read file contents with path validation.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use rustedreason_core::error::ToolError;
use rustedreason_core::tool::{InputFormat, Tool};

use crate::args;

pub struct FileReadTool {
    /// Allowed root directories. Empty = allow all.
    allowed_roots: Vec<PathBuf>,
}

impl FileReadTool {
    /// Create a file read tool with no path restrictions.
    pub fn new() -> Self {
        Self {
            allowed_roots: Vec::new(),
        }
    }

    /// Create a file read tool confined to `allowed_roots`.
    pub fn with_roots(allowed_roots: Vec<String>) -> Self {
        Self {
            allowed_roots: allowed_roots.into_iter().map(PathBuf::from).collect(),
        }
    }

    fn check_path(&self, path: &str) -> Result<PathBuf, ToolError> {
        let requested = Path::new(path);
        if requested.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(ToolError::PermissionDenied(format!(
                "path traversal is not allowed: {path}"
            )));
        }

        if self.allowed_roots.is_empty() {
            return Ok(requested.to_path_buf());
        }

        // Resolve symlinks when the file exists so a link cannot escape a root.
        let resolved = requested
            .canonicalize()
            .unwrap_or_else(|_| requested.to_path_buf());
        let inside = self.allowed_roots.iter().any(|root| {
            let root = root.canonicalize().unwrap_or_else(|_| root.clone());
            resolved.starts_with(&root)
        });

        if inside {
            Ok(resolved)
        } else {
            Err(ToolError::PermissionDenied(format!(
                "{path} is outside the allowed directories"
            )))
        }
    }
}

impl Default for FileReadTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FileReadTool {
    fn name(&self) -> &str {
        "file_read"
    }

    fn description(&self) -> &str {
        "Read the contents of a file at the given path. Input: the file path"
    }

    fn input_format(&self) -> InputFormat {
        InputFormat::Json
    }

    async fn call(&self, input: &str) -> Result<String, ToolError> {
        let path = args::required_str(input, "path")?;
        let path = self.check_path(&path)?;

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ToolError::Failed(format!("Failed to read file: {e}")))?;
        Ok(content)
    }
}
